//! VRF creation and removal.

use vrf_common::{LinkError, VrfError, VrfResult};

use crate::allocator::allocate_table;
use crate::backend::LinkBackend;
use crate::directory::find_vrf;
use crate::link::Vrf;

/// Creates, finds and deletes VRF devices on a [`LinkBackend`].
pub struct VrfManager<'a, B: LinkBackend + ?Sized> {
    backend: &'a B,
}

impl<'a, B: LinkBackend + ?Sized> VrfManager<'a, B> {
    /// Create a manager operating on `backend`.
    pub const fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Get the backend.
    #[must_use]
    pub const fn backend(&self) -> &'a B {
        self.backend
    }

    /// Find an existing VRF.
    ///
    /// # Errors
    ///
    /// See [`find_vrf`].
    pub async fn find(&self, name: &str) -> VrfResult<Vrf> {
        find_vrf(self.backend, name).await
    }

    /// Find the VRF called `name`, creating it if no link has that name.
    ///
    /// # Errors
    ///
    /// Lookup errors other than [`VrfError::VrfNotFound`] are returned as is;
    /// creation errors are described on [`VrfManager::create`].
    pub async fn find_or_create(&self, name: &str) -> VrfResult<Vrf> {
        match self.find(name).await {
            Ok(vrf) => {
                tracing::debug!(vrf = %name, table = vrf.table, "Reusing existing VRF");
                Ok(vrf)
            }
            Err(err) if err.is_not_found() => self.create(name).await,
            Err(err) => Err(err),
        }
    }

    /// Create a VRF on a freshly allocated routing table and bring it up.
    ///
    /// If the device is created but cannot be brought up it is deleted again
    /// before the error is returned.
    ///
    /// # Errors
    ///
    /// - [`VrfError::AllocationQuery`] or [`VrfError::TableIdsExhausted`] if no
    ///   table can be allocated.
    /// - [`VrfError::Creation`] if the kernel rejects the device, including a
    ///   concurrent creator winning the name or table.
    /// - [`VrfError::Activation`] if the device cannot be set up.
    pub async fn create(&self, name: &str) -> VrfResult<Vrf> {
        let table = allocate_table(self.backend).await?;

        tracing::debug!(vrf = %name, table, "Creating VRF");
        let creation = |source: LinkError| VrfError::Creation {
            name: name.to_string(),
            table,
            source,
        };
        self.backend.add_vrf(name, table).await.map_err(creation)?;
        let link = self.backend.link_by_name(name).await.map_err(creation)?;
        let vrf = Vrf::try_from_link(link)?;

        if let Err(source) = self.backend.set_up(vrf.index).await {
            tracing::warn!(vrf = %name, error = %source, "Failed to bring VRF up, removing it");
            if let Err(e) = self.backend.delete_link(vrf.index).await {
                tracing::warn!(vrf = %name, error = %e, "Failed to remove inactive VRF");
            }
            return Err(VrfError::Activation {
                name: name.to_string(),
                source,
            });
        }

        tracing::info!(vrf = %name, table, index = vrf.index, "VRF created");
        Ok(vrf)
    }

    /// Delete a VRF device. Its members are released by the kernel.
    ///
    /// # Errors
    ///
    /// Returns [`VrfError::Deletion`] if the device cannot be removed.
    pub async fn delete(&self, vrf: &Vrf) -> VrfResult<()> {
        tracing::debug!(vrf = %vrf.name, index = vrf.index, "Deleting VRF");
        self.backend
            .delete_link(vrf.index)
            .await
            .map_err(|source| VrfError::Deletion {
                name: vrf.name.clone(),
                source,
            })?;
        tracing::info!(vrf = %vrf.name, table = vrf.table, "VRF deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MemoryBackend, Operation};

    #[tokio::test]
    async fn creates_missing_vrf_up() {
        let backend = MemoryBackend::new();
        let manager = VrfManager::new(&backend);

        let vrf = manager.find_or_create("vrf0").await.unwrap();
        assert_eq!(vrf.table, 1);
        assert!(backend.link("vrf0").unwrap().up);
    }

    #[tokio::test]
    async fn reuses_existing_vrf() {
        let backend = MemoryBackend::new();
        let manager = VrfManager::new(&backend);

        let first = manager.find_or_create("vrf0").await.unwrap();
        let second = manager.find_or_create("vrf0").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(backend.links().len(), 2);
    }

    #[tokio::test]
    async fn wrong_type_is_not_replaced() {
        let backend = MemoryBackend::new();
        backend.add_interface("vrf0").unwrap();
        let manager = VrfManager::new(&backend);

        let err = manager.find_or_create("vrf0").await.unwrap_err();
        assert!(matches!(err, VrfError::WrongLinkType { .. }));
        assert!(backend.link("vrf0").unwrap().vrf_table().is_none());
    }

    #[tokio::test]
    async fn creation_race_is_surfaced() {
        let backend = MemoryBackend::new();
        backend.fail_next(
            Operation::AddVrf,
            LinkError::AlreadyExists {
                name: "vrf0".to_string(),
            },
        );
        let manager = VrfManager::new(&backend);

        let err = manager.find_or_create("vrf0").await.unwrap_err();
        assert!(matches!(
            err,
            VrfError::Creation {
                table: 1,
                source: LinkError::AlreadyExists { .. },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn activation_failure_removes_vrf() {
        let backend = MemoryBackend::new();
        backend.fail_next(Operation::SetUp, LinkError::kernel("set link up", "EIO"));
        let manager = VrfManager::new(&backend);

        let err = manager.find_or_create("vrf0").await.unwrap_err();
        assert!(matches!(err, VrfError::Activation { .. }));
        assert!(backend.link("vrf0").is_none());
    }

    #[tokio::test]
    async fn lookup_failures_are_not_creation_signals() {
        let backend = MemoryBackend::new();
        backend.fail_next(Operation::LinkByName, LinkError::kernel("get link", "EBUSY"));
        let manager = VrfManager::new(&backend);

        assert!(matches!(
            manager.find_or_create("vrf0").await,
            Err(VrfError::Query { .. })
        ));
        assert!(backend.link("vrf0").is_none());
    }

    #[tokio::test]
    async fn delete_removes_device() {
        let backend = MemoryBackend::new();
        let manager = VrfManager::new(&backend);
        let vrf = manager.create("vrf0").await.unwrap();

        manager.delete(&vrf).await.unwrap();
        assert!(manager.find("vrf0").await.unwrap_err().is_not_found());
        assert!(matches!(
            manager.delete(&vrf).await,
            Err(VrfError::Deletion { .. })
        ));
    }
}
