//! CNI version negotiation.

use serde::{Deserialize, Serialize};

use crate::error::{PluginError, PluginResult};

/// CNI specification versions this plugin implements. `CHECK` first
/// appeared in 0.4.0.
pub const SUPPORTED_VERSIONS: &[&str] = &["0.4.0", "1.0.0"];

/// Version reported by `VERSION`.
pub const CURRENT_VERSION: &str = "1.0.0";

/// Reply to the `VERSION` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    /// Version of this reply.
    pub cni_version: String,
    /// Every version the plugin accepts.
    pub supported_versions: Vec<String>,
}

impl VersionInfo {
    /// Version information for this plugin.
    #[must_use]
    pub fn current() -> Self {
        Self {
            cni_version: CURRENT_VERSION.to_string(),
            supported_versions: SUPPORTED_VERSIONS.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Ensure the configuration speaks a supported version.
///
/// # Errors
///
/// Returns [`PluginError::IncompatibleVersion`] otherwise.
pub fn check_supported(version: &str) -> PluginResult<()> {
    if SUPPORTED_VERSIONS.contains(&version) {
        Ok(())
    } else {
        Err(PluginError::IncompatibleVersion {
            version: version.to_string(),
            supported: SUPPORTED_VERSIONS.join(", "),
        })
    }
}
