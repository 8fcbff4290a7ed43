//! Error types for VRF lifecycle operations.

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias using [`VrfError`].
pub type VrfResult<T> = Result<T, VrfError>;

/// Outcome of a failed kernel link request.
///
/// Backends classify kernel replies into this closed set so callers never
/// have to inspect error strings.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// No link matched the request.
    #[error("Link not found: {name}")]
    #[diagnostic(code(vrf::link::not_found))]
    NotFound {
        /// Name (or index) of the missing link.
        name: String,
    },

    /// A link with the same name (or a conflicting attribute) already exists.
    #[error("Link already exists: {name}")]
    #[diagnostic(code(vrf::link::exists))]
    AlreadyExists {
        /// Name of the conflicting link.
        name: String,
    },

    /// Any other kernel or transport failure.
    #[error("{operation} failed: {message}")]
    #[diagnostic(code(vrf::link::kernel))]
    Kernel {
        /// The request that failed.
        operation: &'static str,
        /// Positive errno reported by the kernel, if any.
        errno: Option<i32>,
        /// Human readable description.
        message: String,
    },
}

impl LinkError {
    /// Classify a positive errno returned for `operation` on link `name`.
    #[must_use]
    pub fn from_errno(operation: &'static str, name: &str, errno: i32) -> Self {
        match errno {
            libc::ENODEV => Self::NotFound {
                name: name.to_string(),
            },
            libc::EEXIST => Self::AlreadyExists {
                name: name.to_string(),
            },
            _ => Self::Kernel {
                operation,
                errno: Some(errno),
                message: std::io::Error::from_raw_os_error(errno).to_string(),
            },
        }
    }

    /// Build a failure that carries no errno (transport or decoding problems).
    #[must_use]
    pub fn kernel(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Kernel {
            operation,
            errno: None,
            message: message.into(),
        }
    }

    /// Returns true if the link did not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Errors raised by VRF lifecycle operations.
#[derive(Error, Diagnostic, Debug)]
pub enum VrfError {
    /// No link with the VRF name exists.
    #[error("VRF not found: {name}")]
    #[diagnostic(code(vrf::vrf::not_found))]
    VrfNotFound {
        /// The VRF name that was looked up.
        name: String,
    },

    /// A link with the VRF name exists but is not a VRF.
    #[error("Link {name} is not a VRF (kind: {kind})")]
    #[diagnostic(
        code(vrf::vrf::wrong_type),
        help("Rename or remove the existing link, or choose a different vrfname")
    )]
    WrongLinkType {
        /// The conflicting link name.
        name: String,
        /// The kind the existing link reports.
        kind: String,
    },

    /// Enumerating links to pick a routing table failed.
    #[error("Failed to list links while allocating a routing table: {source}")]
    #[diagnostic(code(vrf::table::query))]
    AllocationQuery {
        /// Underlying backend failure.
        source: LinkError,
    },

    /// Every routing table id above the current maximum is taken.
    #[error("No routing table id available above {max}")]
    #[diagnostic(code(vrf::table::exhausted))]
    TableIdsExhausted {
        /// Highest table id observed.
        max: u32,
    },

    /// Creating the VRF link failed.
    #[error("Could not add VRF {name} with table {table}: {source}")]
    #[diagnostic(code(vrf::vrf::create))]
    Creation {
        /// The VRF name.
        name: String,
        /// The table id that was requested.
        table: u32,
        /// Underlying backend failure.
        source: LinkError,
    },

    /// The VRF was created but could not be brought up.
    #[error("Could not set link up for VRF {name}: {source}")]
    #[diagnostic(code(vrf::vrf::activate))]
    Activation {
        /// The VRF name.
        name: String,
        /// Underlying backend failure.
        source: LinkError,
    },

    /// The interface to enslave does not exist.
    #[error("Interface not found: {name}")]
    #[diagnostic(code(vrf::interface::not_found))]
    InterfaceNotFound {
        /// The interface name.
        name: String,
    },

    /// Setting the VRF as master of the interface failed.
    #[error("Could not set VRF {vrf} as master of {interface}: {source}")]
    #[diagnostic(code(vrf::interface::set_master))]
    MembershipAssignment {
        /// The VRF name.
        vrf: String,
        /// The interface name.
        interface: String,
        /// Underlying backend failure.
        source: LinkError,
    },

    /// The interface is not enslaved to the VRF.
    #[error("Failed to find {interface} associated to VRF {vrf}")]
    #[diagnostic(code(vrf::interface::mismatch))]
    VerificationMismatch {
        /// The VRF name.
        vrf: String,
        /// The interface name.
        interface: String,
    },

    /// A link query failed.
    #[error("Failed to {context}: {source}")]
    #[diagnostic(code(vrf::link::query))]
    Query {
        /// What was being looked up.
        context: String,
        /// Underlying backend failure.
        source: LinkError,
    },

    /// Removing the VRF link failed.
    #[error("Could not delete VRF {name}: {source}")]
    #[diagnostic(code(vrf::vrf::delete))]
    Deletion {
        /// The VRF name.
        name: String,
        /// Underlying backend failure.
        source: LinkError,
    },

    /// A VRF or interface name is not a valid kernel link name.
    #[error("Invalid link name {name:?}: {reason}")]
    #[diagnostic(
        code(vrf::name::invalid),
        help("Link names are 1-15 bytes without '/', ':' or whitespace")
    )]
    InvalidLinkName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Entering the target network namespace failed.
    #[error("Failed to enter network namespace {path}: {source}")]
    #[diagnostic(code(vrf::netns), help("Try running with elevated privileges (sudo)"))]
    Namespace {
        /// The namespace path.
        path: String,
        /// Underlying OS error.
        source: std::io::Error,
    },
}

impl VrfError {
    /// Returns true if the requested VRF does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::VrfNotFound { .. })
    }

    /// The backend failure behind this error, if there is one.
    #[must_use]
    pub const fn link_error(&self) -> Option<&LinkError> {
        match self {
            Self::AllocationQuery { source }
            | Self::Creation { source, .. }
            | Self::Activation { source, .. }
            | Self::MembershipAssignment { source, .. }
            | Self::Query { source, .. }
            | Self::Deletion { source, .. } => Some(source),
            _ => None,
        }
    }
}
