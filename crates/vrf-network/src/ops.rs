//! Attach, verify and detach entry points.
//!
//! Each call is independent and reads the live link table; nothing is
//! remembered between invocations. Failures are not rolled back, so an
//! attach that fails after creating its VRF leaves the (empty) VRF behind.

use vrf_common::{LinkName, VrfError, VrfResult};

use crate::backend::LinkBackend;
use crate::lifecycle::VrfManager;
use crate::link::Vrf;
use crate::membership;

/// One interface and the VRF it belongs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VrfRequest {
    /// VRF device name.
    pub vrf: LinkName,
    /// Container interface name.
    pub interface: LinkName,
}

impl VrfRequest {
    /// Build a request from raw names.
    ///
    /// # Errors
    ///
    /// Returns [`VrfError::InvalidLinkName`] if either name is not a valid link name.
    pub fn new(vrf: impl Into<String>, interface: impl Into<String>) -> VrfResult<Self> {
        Ok(Self {
            vrf: LinkName::new(vrf)?,
            interface: LinkName::new(interface)?,
        })
    }
}

/// What [`detach_interface`] did to the VRF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetachOutcome {
    /// The VRF did not exist.
    VrfAbsent,
    /// The interface was the only member, so the VRF was deleted.
    VrfDeleted,
    /// The VRF was left in place.
    VrfRetained {
        /// Number of members found.
        members: usize,
    },
}

/// Put the interface into the VRF, creating the VRF if needed.
///
/// # Errors
///
/// Any lookup, creation or membership error aborts the operation.
pub async fn attach_interface<B: LinkBackend + ?Sized>(
    backend: &B,
    request: &VrfRequest,
) -> VrfResult<Vrf> {
    let vrf = VrfManager::new(backend)
        .find_or_create(request.vrf.as_str())
        .await?;
    membership::attach(backend, &vrf, request.interface.as_str()).await?;
    Ok(vrf)
}

/// Check that the interface is currently a member of the VRF.
///
/// # Errors
///
/// - [`VrfError::VrfNotFound`] if the VRF does not exist.
/// - [`VrfError::VerificationMismatch`] if the interface is not a member.
pub async fn verify_interface<B: LinkBackend + ?Sized>(
    backend: &B,
    request: &VrfRequest,
) -> VrfResult<()> {
    let vrf = VrfManager::new(backend).find(request.vrf.as_str()).await?;
    let members = membership::members_of(backend, &vrf).await?;

    if members
        .iter()
        .any(|l| l.name == request.interface.as_str())
    {
        tracing::debug!(vrf = %request.vrf, interface = %request.interface, "Membership verified");
        Ok(())
    } else {
        Err(VrfError::VerificationMismatch {
            vrf: request.vrf.to_string(),
            interface: request.interface.to_string(),
        })
    }
}

/// Release the interface from the VRF, deleting the VRF if the interface is
/// its last member.
///
/// The VRF is deleted only when exactly one member remains and it is the
/// interface being detached; the caller removes the interface itself
/// afterwards. A missing VRF counts as already detached.
///
/// # Errors
///
/// Lookup failures other than a missing VRF, and deletion failures.
pub async fn detach_interface<B: LinkBackend + ?Sized>(
    backend: &B,
    request: &VrfRequest,
) -> VrfResult<DetachOutcome> {
    let manager = VrfManager::new(backend);
    let vrf = match manager.find(request.vrf.as_str()).await {
        Ok(vrf) => vrf,
        Err(err) if err.is_not_found() => {
            tracing::debug!(vrf = %request.vrf, "VRF already gone");
            return Ok(DetachOutcome::VrfAbsent);
        }
        Err(err) => return Err(err),
    };

    let members = membership::members_of(backend, &vrf).await?;
    match members.as_slice() {
        [only] if only.name == request.interface.as_str() => {
            manager.delete(&vrf).await?;
            Ok(DetachOutcome::VrfDeleted)
        }
        _ => {
            tracing::debug!(
                vrf = %request.vrf,
                interface = %request.interface,
                members = members.len(),
                "Keeping VRF"
            );
            Ok(DetachOutcome::VrfRetained {
                members: members.len(),
            })
        }
    }
}
