//! Views onto kernel links.

use vrf_common::{VrfError, VrfResult};

/// Link type as reported by `IFLA_INFO_KIND`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkKind {
    /// A VRF device bound to a routing table.
    Vrf {
        /// Routing table id (`IFLA_VRF_TABLE`).
        table: u32,
    },
    /// Any other link type.
    Other {
        /// The reported kind, if the link has one (physical devices do not).
        kind: Option<String>,
    },
}

impl LinkKind {
    /// Kind of a link without `IFLA_LINKINFO`.
    #[must_use]
    pub const fn unknown() -> Self {
        Self::Other { kind: None }
    }

    /// Human readable kind.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Vrf { .. } => "vrf",
            Self::Other { kind: Some(kind) } => kind,
            Self::Other { kind: None } => "device",
        }
    }
}

/// A network link in the current namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Kernel interface index.
    pub index: u32,
    /// Interface name.
    pub name: String,
    /// Index of the master device, if enslaved.
    pub master: Option<u32>,
    /// Whether `IFF_UP` is set.
    pub up: bool,
    /// Link type.
    pub kind: LinkKind,
}

impl Link {
    /// Routing table of a VRF link.
    #[must_use]
    pub const fn vrf_table(&self) -> Option<u32> {
        match self.kind {
            LinkKind::Vrf { table } => Some(table),
            LinkKind::Other { .. } => None,
        }
    }

    /// Returns true if this link is enslaved to `master`.
    #[must_use]
    pub fn is_member_of(&self, master: &Vrf) -> bool {
        self.master == Some(master.index)
    }
}

/// Handle to an existing VRF device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vrf {
    /// VRF device name.
    pub name: String,
    /// Kernel interface index.
    pub index: u32,
    /// Routing table id.
    pub table: u32,
}

impl Vrf {
    /// Interpret a link as a VRF.
    ///
    /// # Errors
    ///
    /// Returns [`VrfError::WrongLinkType`] if the link is not a VRF device.
    pub fn try_from_link(link: Link) -> VrfResult<Self> {
        match link.kind {
            LinkKind::Vrf { table } => Ok(Self {
                name: link.name,
                index: link.index,
                table,
            }),
            LinkKind::Other { .. } => Err(VrfError::WrongLinkType {
                kind: link.kind.name().to_string(),
                name: link.name,
            }),
        }
    }
}

impl TryFrom<Link> for Vrf {
    type Error = VrfError;

    fn try_from(link: Link) -> Result<Self, Self::Error> {
        Self::try_from_link(link)
    }
}
