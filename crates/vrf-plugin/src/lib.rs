//! # vrf-plugin
//!
//! CNI plugin that places a container interface into a named VRF.
//!
//! The runtime passes the operation in `CNI_*` environment variables and
//! the network configuration on stdin. `ADD` enslaves the interface to the
//! VRF (creating it on first use), `CHECK` verifies the membership and `DEL`
//! removes the VRF once its last interface is detached.

#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod error;
pub mod plugin;
pub mod version;

pub use cli::{Cli, CniCommand};
pub use config::NetConf;
pub use error::{ErrorResponse, PluginError, PluginResult};
pub use plugin::{Invocation, run};
pub use version::{CURRENT_VERSION, SUPPORTED_VERSIONS, VersionInfo};
