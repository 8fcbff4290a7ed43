//! CNI environment definitions.
//!
//! The container runtime passes its arguments as `CNI_*` environment
//! variables; the long flags exist for manual debugging.

use std::fmt;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};

use crate::error::{PluginError, PluginResult};

/// Operation requested by the container runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CniCommand {
    /// Put the interface into the VRF.
    #[value(name = "ADD")]
    Add,
    /// Verify the interface is still in the VRF.
    #[value(name = "CHECK")]
    Check,
    /// Release the interface, removing the VRF after its last member.
    #[value(name = "DEL")]
    Del,
    /// Report supported CNI versions.
    #[value(name = "VERSION")]
    Version,
}

impl CniCommand {
    /// Whether the command needs the result of earlier plugins.
    #[must_use]
    pub const fn requires_prev_result(self) -> bool {
        matches!(self, Self::Add | Self::Check)
    }
}

impl fmt::Display for CniCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => write!(f, "ADD"),
            Self::Check => write!(f, "CHECK"),
            Self::Del => write!(f, "DEL"),
            Self::Version => write!(f, "VERSION"),
        }
    }
}

/// VRF CNI plugin
#[derive(Parser, Debug)]
#[command(name = "vrf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Operation to perform
    #[arg(long, env = "CNI_COMMAND", value_enum)]
    pub command: CniCommand,

    /// Container ID
    #[arg(long, env = "CNI_CONTAINERID")]
    pub container_id: Option<String>,

    /// Path to the container network namespace
    #[arg(long, env = "CNI_NETNS")]
    pub netns: Option<PathBuf>,

    /// Name of the container interface
    #[arg(long, env = "CNI_IFNAME")]
    pub ifname: Option<String>,

    /// Extra plugin arguments (unused)
    #[arg(long, env = "CNI_ARGS")]
    pub args: Option<String>,

    /// Plugin search path (unused)
    #[arg(long, env = "CNI_PATH")]
    pub path: Option<String>,
}

impl Cli {
    /// The namespace path.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::MissingEnvironment`] if `CNI_NETNS` is unset or empty.
    pub fn netns(&self) -> PluginResult<&Path> {
        self.netns
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(PluginError::MissingEnvironment { name: "CNI_NETNS" })
    }

    /// The interface name.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::MissingEnvironment`] if `CNI_IFNAME` is unset or empty.
    pub fn ifname(&self) -> PluginResult<&str> {
        self.ifname
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(PluginError::MissingEnvironment { name: "CNI_IFNAME" })
    }
}
