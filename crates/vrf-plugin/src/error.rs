//! Plugin errors and their CNI error codes.

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vrf_common::{LinkError, VrfError};

use crate::cli::CniCommand;

/// Result type alias using [`PluginError`].
pub type PluginResult<T> = Result<T, PluginError>;

/// Well-known CNI error codes.
pub mod codes {
    /// Incompatible CNI version.
    pub const INCOMPATIBLE_VERSION: u32 = 1;
    /// Invalid or missing environment variables.
    pub const INVALID_ENVIRONMENT: u32 = 4;
    /// I/O failure.
    pub const IO_FAILURE: u32 = 5;
    /// Failed to decode content.
    pub const DECODING_FAILURE: u32 = 6;
    /// Invalid network config.
    pub const INVALID_NETWORK_CONFIG: u32 = 7;
    /// Try again later.
    pub const TRY_AGAIN_LATER: u32 = 11;
    /// First plugin-specific code.
    pub const PLUGIN_FAILURE: u32 = 100;
}

/// Errors surfaced to the container runtime.
#[derive(Error, Diagnostic, Debug)]
pub enum PluginError {
    /// The configuration names a CNI version this plugin does not speak.
    #[error("incompatible CNI versions: config is {version:?}, plugin supports {supported}")]
    #[diagnostic(code(vrf::plugin::version))]
    IncompatibleVersion {
        /// Version requested by the configuration.
        version: String,
        /// Comma separated list of supported versions.
        supported: String,
    },

    /// A required `CNI_*` variable is missing.
    #[error("required environment variable {name} is not set")]
    #[diagnostic(code(vrf::plugin::environment))]
    MissingEnvironment {
        /// Variable name.
        name: &'static str,
    },

    /// The `CNI_*` variables are malformed.
    #[error("invalid environment: {message}")]
    #[diagnostic(code(vrf::plugin::environment))]
    InvalidEnvironment {
        /// What is wrong.
        message: String,
    },

    /// The network configuration is not valid JSON for this plugin.
    #[error("failed to load netconf: {message}")]
    #[diagnostic(code(vrf::plugin::decode))]
    Decode {
        /// Parser message.
        message: String,
    },

    /// The network configuration is well formed but unusable.
    #[error("{message}")]
    #[diagnostic(code(vrf::plugin::config))]
    InvalidConfig {
        /// What is wrong.
        message: String,
    },

    /// Reading input or starting the runtime failed.
    #[error("I/O error: {0}")]
    #[diagnostic(code(vrf::plugin::io))]
    Io(#[from] std::io::Error),

    /// The netlink connection could not be opened.
    #[error("failed to open netlink connection: {0}")]
    #[diagnostic(code(vrf::plugin::netlink))]
    Netlink(#[from] LinkError),

    /// The result could not be encoded.
    #[error("failed to encode result: {0}")]
    #[diagnostic(code(vrf::plugin::encode))]
    Encode(#[from] serde_json::Error),

    /// The VRF operation failed.
    #[error("{command} failed: {source}")]
    #[diagnostic(code(vrf::plugin::operation))]
    Operation {
        /// Command being executed.
        command: CniCommand,
        /// Underlying failure.
        source: VrfError,
    },
}

impl PluginError {
    /// The CNI error code reported for this error.
    #[must_use]
    pub const fn code(&self) -> u32 {
        match self {
            Self::IncompatibleVersion { .. } => codes::INCOMPATIBLE_VERSION,
            Self::MissingEnvironment { .. } | Self::InvalidEnvironment { .. } => {
                codes::INVALID_ENVIRONMENT
            }
            Self::Io(_) => codes::IO_FAILURE,
            Self::Decode { .. } => codes::DECODING_FAILURE,
            Self::InvalidConfig { .. } => codes::INVALID_NETWORK_CONFIG,
            Self::Operation { source, .. } => match source {
                VrfError::InvalidLinkName { .. } => codes::INVALID_NETWORK_CONFIG,
                _ => match source.link_error() {
                    Some(LinkError::AlreadyExists { .. }) => codes::TRY_AGAIN_LATER,
                    _ => codes::PLUGIN_FAILURE,
                },
            },
            Self::Netlink(_) | Self::Encode(_) => codes::PLUGIN_FAILURE,
        }
    }

    /// Build the error object printed on stdout.
    #[must_use]
    pub fn to_response(&self, cni_version: &str) -> ErrorResponse {
        ErrorResponse {
            cni_version: cni_version.to_string(),
            code: self.code(),
            msg: self.to_string(),
            details: std::error::Error::source(self).map(ToString::to_string),
        }
    }
}

/// CNI error object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// CNI version of the response.
    pub cni_version: String,
    /// Error code.
    pub code: u32,
    /// Short message.
    pub msg: String,
    /// Underlying cause, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
