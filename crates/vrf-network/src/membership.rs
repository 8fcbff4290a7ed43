//! VRF membership of interfaces.

use vrf_common::{LinkError, VrfError, VrfResult};

use crate::backend::LinkBackend;
use crate::link::{Link, Vrf};

/// Enslave `interface` to `vrf`.
///
/// An interface that is already a member is left alone.
///
/// # Errors
///
/// - [`VrfError::InterfaceNotFound`] if the interface does not exist.
/// - [`VrfError::MembershipAssignment`] if the kernel rejects the new master.
pub async fn attach<B: LinkBackend + ?Sized>(
    backend: &B,
    vrf: &Vrf,
    interface: &str,
) -> VrfResult<()> {
    let link = match backend.link_by_name(interface).await {
        Ok(link) => link,
        Err(LinkError::NotFound { .. }) => {
            return Err(VrfError::InterfaceNotFound {
                name: interface.to_string(),
            });
        }
        Err(source) => {
            return Err(VrfError::Query {
                context: format!("look up interface {interface}"),
                source,
            });
        }
    };

    if link.is_member_of(vrf) {
        tracing::debug!(vrf = %vrf.name, interface, "Interface already in VRF");
        return Ok(());
    }

    backend
        .set_master(link.index, vrf.index)
        .await
        .map_err(|source| VrfError::MembershipAssignment {
            vrf: vrf.name.clone(),
            interface: interface.to_string(),
            source,
        })?;

    tracing::info!(vrf = %vrf.name, interface, "Interface added to VRF");
    Ok(())
}

/// List the interfaces enslaved to `vrf`, in enumeration order.
///
/// # Errors
///
/// Returns [`VrfError::Query`] if links cannot be listed.
pub async fn members_of<B: LinkBackend + ?Sized>(backend: &B, vrf: &Vrf) -> VrfResult<Vec<Link>> {
    let links = backend
        .list_links()
        .await
        .map_err(|source| VrfError::Query {
            context: format!("list interfaces of VRF {}", vrf.name),
            source,
        })?;
    Ok(links.into_iter().filter(|l| l.is_member_of(vrf)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MemoryBackend, Operation};
    use crate::lifecycle::VrfManager;

    async fn setup() -> (MemoryBackend, Vrf) {
        let backend = MemoryBackend::new();
        backend.add_interface("eth0").unwrap();
        backend.add_interface("eth1").unwrap();
        let vrf = VrfManager::new(&backend).create("vrf0").await.unwrap();
        (backend, vrf)
    }

    #[tokio::test]
    async fn attach_sets_master() {
        let (backend, vrf) = setup().await;
        attach(&backend, &vrf, "eth0").await.unwrap();
        assert_eq!(backend.link("eth0").unwrap().master, Some(vrf.index));
    }

    #[tokio::test]
    async fn attach_is_idempotent() {
        let (backend, vrf) = setup().await;
        attach(&backend, &vrf, "eth0").await.unwrap();
        // A second set_master would consume this failure.
        backend.fail_next(Operation::SetMaster, LinkError::kernel("set master", "EBUSY"));
        attach(&backend, &vrf, "eth0").await.unwrap();

        assert_eq!(members_of(&backend, &vrf).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn attach_missing_interface() {
        let (backend, vrf) = setup().await;
        let err = attach(&backend, &vrf, "eth9").await.unwrap_err();
        assert!(matches!(err, VrfError::InterfaceNotFound { ref name } if name == "eth9"));
    }

    #[tokio::test]
    async fn attach_rejected_by_kernel() {
        let (backend, vrf) = setup().await;
        backend.fail_next(
            Operation::SetMaster,
            LinkError::from_errno("set master", "eth0", libc::EBUSY),
        );
        let err = attach(&backend, &vrf, "eth0").await.unwrap_err();
        assert!(matches!(err, VrfError::MembershipAssignment { .. }));
        assert_eq!(backend.link("eth0").unwrap().master, None);
    }

    #[tokio::test]
    async fn members_are_filtered_by_master() {
        let (backend, vrf) = setup().await;
        let other = VrfManager::new(&backend).create("vrf1").await.unwrap();
        attach(&backend, &vrf, "eth0").await.unwrap();
        attach(&backend, &other, "eth1").await.unwrap();

        let members = members_of(&backend, &vrf).await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].name, "eth0");
    }

    #[tokio::test]
    async fn empty_vrf_has_no_members() {
        let (backend, vrf) = setup().await;
        assert!(members_of(&backend, &vrf).await.unwrap().is_empty());
    }
}
