//! Link backend capability.
//!
//! Every component of the VRF lifecycle talks to the kernel through
//! [`LinkBackend`], so the same logic runs against rtnetlink in production
//! and against [`MemoryBackend`] in tests.

use async_trait::async_trait;
use vrf_common::LinkError;

use crate::link::Link;

pub mod memory;
pub mod netlink;

pub use memory::{MemoryBackend, Operation};
pub use netlink::NetlinkBackend;

/// Kernel link operations needed to manage VRFs.
#[async_trait]
pub trait LinkBackend: Send + Sync {
    /// List every link in the namespace.
    async fn list_links(&self) -> Result<Vec<Link>, LinkError>;

    /// Look up a link by name.
    async fn link_by_name(&self, name: &str) -> Result<Link, LinkError>;

    /// Create a VRF device bound to `table`. The device is left down.
    async fn add_vrf(&self, name: &str, table: u32) -> Result<(), LinkError>;

    /// Set `IFF_UP` on a link.
    async fn set_up(&self, index: u32) -> Result<(), LinkError>;

    /// Enslave link `index` to `master`.
    async fn set_master(&self, index: u32, master: u32) -> Result<(), LinkError>;

    /// Delete a link.
    async fn delete_link(&self, index: u32) -> Result<(), LinkError>;
}
