//! # vrf-common
//!
//! Shared utilities and types for the VRF plugin.
//!
//! This crate provides common functionality used across the workspace:
//! - The error taxonomy for VRF lifecycle operations
//! - Backend outcomes for kernel link requests
//! - Validated kernel link names

#![warn(missing_docs)]

pub mod error;
pub mod name;

pub use error::{LinkError, VrfError, VrfResult};
pub use name::LinkName;
