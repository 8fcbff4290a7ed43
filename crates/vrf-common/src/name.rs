//! Kernel link name validation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{VrfError, VrfResult};

/// A validated network link name.
///
/// Link names must:
/// - Be 1-15 bytes long (`IFNAMSIZ` minus the trailing NUL)
/// - Not be `.` or `..`
/// - Not contain `/`, `:`, NUL or whitespace
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LinkName(String);

impl LinkName {
    /// Maximum length of a link name in bytes.
    pub const MAX_LENGTH: usize = 15;

    /// Create a new link name, validating the format.
    ///
    /// # Errors
    ///
    /// Returns [`VrfError::InvalidLinkName`] if the name cannot be used for a link.
    pub fn new(name: impl Into<String>) -> VrfResult<Self> {
        let name = name.into();
        if let Err(reason) = Self::validate(&name) {
            return Err(VrfError::InvalidLinkName { name, reason });
        }
        Ok(Self(name))
    }

    /// Get the link name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(name: &str) -> Result<(), &'static str> {
        if name.is_empty() {
            return Err("name is empty");
        }
        if name.len() > Self::MAX_LENGTH {
            return Err("name is longer than 15 bytes");
        }
        if name == "." || name == ".." {
            return Err("name is reserved");
        }
        if name
            .chars()
            .any(|c| c == '/' || c == ':' || c == '\0' || c.is_whitespace())
        {
            return Err("name contains a forbidden character");
        }
        Ok(())
    }
}

impl fmt::Display for LinkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LinkName {
    type Err = VrfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for LinkName {
    type Error = VrfError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LinkName> for String {
    fn from(name: LinkName) -> Self {
        name.0
    }
}

impl AsRef<str> for LinkName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn valid_names() {
        assert!(LinkName::new("vrf0").is_ok());
        assert!(LinkName::new("eth0.100").is_ok());
        assert!(LinkName::new("a-very-long-nm1").is_ok());
    }

    #[test]
    fn invalid_names() {
        assert!(LinkName::new("").is_err());
        assert!(LinkName::new("sixteen-bytes-xx").is_err());
        assert!(LinkName::new("..").is_err());
        assert!(LinkName::new("eth/0").is_err());
        assert!(LinkName::new("eth:0").is_err());
        assert!(LinkName::new("eth 0").is_err());
    }

    #[test]
    fn serde_rejects_invalid() {
        let ok: LinkName = serde_json::from_str("\"vrf-blue\"").unwrap();
        assert_eq!(ok.as_str(), "vrf-blue");
        assert!(serde_json::from_str::<LinkName>("\"\"").is_err());
    }

    proptest! {
        #[test]
        fn short_alphanumeric_names_are_valid(name in "[a-z0-9_.-]{1,15}") {
            prop_assume!(name != "." && name != "..");
            prop_assert!(LinkName::new(name).is_ok());
        }
    }
}
