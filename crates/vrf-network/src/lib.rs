//! # vrf-network
//!
//! VRF lifecycle management for container network namespaces.
//!
//! This crate places a container interface inside a named VRF:
//! - Routing table allocation for new VRFs
//! - Find-or-create of VRF devices
//! - Interface membership (enslaving and enumeration)
//! - Attach, verify and detach entry points with last-member cleanup
//!
//! All kernel access goes through the [`LinkBackend`] trait.

#![warn(missing_docs)]

pub mod allocator;
pub mod backend;
pub mod directory;
pub mod lifecycle;
pub mod link;
pub mod membership;
pub mod netns;
pub mod ops;

pub use allocator::{allocate_table, next_table_id};
pub use backend::{LinkBackend, MemoryBackend, NetlinkBackend};
pub use directory::find_vrf;
pub use lifecycle::VrfManager;
pub use link::{Link, LinkKind, Vrf};
pub use netns::{enter_netns, netns_exists};
pub use ops::{DetachOutcome, VrfRequest, attach_interface, detach_interface, verify_interface};
