//! In-memory link table with kernel-like semantics.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use parking_lot::Mutex;
use vrf_common::LinkError;

use super::LinkBackend;
use crate::link::{Link, LinkKind};

/// Backend operations, used to inject failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// [`LinkBackend::list_links`].
    ListLinks,
    /// [`LinkBackend::link_by_name`].
    LinkByName,
    /// [`LinkBackend::add_vrf`].
    AddVrf,
    /// [`LinkBackend::set_up`].
    SetUp,
    /// [`LinkBackend::set_master`].
    SetMaster,
    /// [`LinkBackend::delete_link`].
    DeleteLink,
}

#[derive(Debug)]
struct State {
    links: BTreeMap<u32, Link>,
    next_index: u32,
    failures: HashMap<Operation, LinkError>,
}

impl State {
    fn find(&self, name: &str) -> Option<&Link> {
        self.links.values().find(|l| l.name == name)
    }

    fn insert(&mut self, name: &str, kind: LinkKind) -> Result<u32, LinkError> {
        if self.find(name).is_some() {
            return Err(LinkError::AlreadyExists {
                name: name.to_string(),
            });
        }
        let index = self.next_index;
        self.next_index += 1;
        self.links.insert(
            index,
            Link {
                index,
                name: name.to_string(),
                master: None,
                up: false,
                kind,
            },
        );
        Ok(index)
    }

    fn take_failure(&mut self, op: Operation) -> Result<(), LinkError> {
        self.failures.remove(&op).map_or(Ok(()), Err)
    }
}

/// A link table held in process memory.
///
/// Behaves like a fresh network namespace: it starts with `lo`, assigns
/// increasing indexes, rejects duplicate names and releases subordinates
/// when their master is deleted.
#[derive(Debug)]
pub struct MemoryBackend {
    state: Mutex<State>,
    strict_tables: bool,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// Create a namespace containing only the loopback device.
    #[must_use]
    pub fn new() -> Self {
        let mut links = BTreeMap::new();
        links.insert(
            1,
            Link {
                index: 1,
                name: "lo".to_string(),
                master: None,
                up: true,
                kind: LinkKind::unknown(),
            },
        );
        Self {
            state: Mutex::new(State {
                links,
                next_index: 2,
                failures: HashMap::new(),
            }),
            strict_tables: false,
        }
    }

    /// Reject VRFs that reuse a routing table, like `net.vrf.strict_mode=1`.
    #[must_use]
    pub fn with_strict_tables(mut self) -> Self {
        self.strict_tables = true;
        self
    }

    /// Add a plain interface and return its index.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::AlreadyExists`] if the name is taken.
    pub fn add_interface(&self, name: &str) -> Result<u32, LinkError> {
        self.add_link(
            name,
            LinkKind::Other {
                kind: Some("dummy".to_string()),
            },
        )
    }

    /// Add a link of any kind and return its index.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::AlreadyExists`] if the name is taken.
    pub fn add_link(&self, name: &str, kind: LinkKind) -> Result<u32, LinkError> {
        self.state.lock().insert(name, kind)
    }

    /// Remove a link by name, as a container runtime tearing down an
    /// interface would. Returns false if it did not exist.
    pub fn remove_link(&self, name: &str) -> bool {
        let mut state = self.state.lock();
        let Some(index) = state.find(name).map(|l| l.index) else {
            return false;
        };
        Self::remove_index(&mut state, index);
        true
    }

    /// Snapshot of a link by name.
    #[must_use]
    pub fn link(&self, name: &str) -> Option<Link> {
        self.state.lock().find(name).cloned()
    }

    /// Snapshot of every link, ordered by index.
    #[must_use]
    pub fn links(&self) -> Vec<Link> {
        self.state.lock().links.values().cloned().collect()
    }

    /// Make the next call of `op` fail with `error`.
    pub fn fail_next(&self, op: Operation, error: LinkError) {
        self.state.lock().failures.insert(op, error);
    }

    fn remove_index(state: &mut State, index: u32) {
        state.links.remove(&index);
        for link in state.links.values_mut() {
            if link.master == Some(index) {
                link.master = None;
            }
        }
    }
}

fn missing(index: u32) -> LinkError {
    LinkError::NotFound {
        name: format!("index {index}"),
    }
}

#[async_trait]
impl LinkBackend for MemoryBackend {
    async fn list_links(&self) -> Result<Vec<Link>, LinkError> {
        let mut state = self.state.lock();
        state.take_failure(Operation::ListLinks)?;
        Ok(state.links.values().cloned().collect())
    }

    async fn link_by_name(&self, name: &str) -> Result<Link, LinkError> {
        let mut state = self.state.lock();
        state.take_failure(Operation::LinkByName)?;
        state.find(name).cloned().ok_or_else(|| LinkError::NotFound {
            name: name.to_string(),
        })
    }

    async fn add_vrf(&self, name: &str, table: u32) -> Result<(), LinkError> {
        let mut state = self.state.lock();
        state.take_failure(Operation::AddVrf)?;
        if self.strict_tables && state.links.values().any(|l| l.vrf_table() == Some(table)) {
            return Err(LinkError::AlreadyExists {
                name: name.to_string(),
            });
        }
        state.insert(name, LinkKind::Vrf { table }).map(|_| ())
    }

    async fn set_up(&self, index: u32) -> Result<(), LinkError> {
        let mut state = self.state.lock();
        state.take_failure(Operation::SetUp)?;
        let link = state.links.get_mut(&index).ok_or_else(|| missing(index))?;
        link.up = true;
        Ok(())
    }

    async fn set_master(&self, index: u32, master: u32) -> Result<(), LinkError> {
        let mut state = self.state.lock();
        state.take_failure(Operation::SetMaster)?;
        let master_link = state.links.get(&master).ok_or_else(|| missing(master))?;
        if master_link.vrf_table().is_none() || master == index {
            return Err(LinkError::from_errno(
                "set master",
                &master_link.name,
                libc::EOPNOTSUPP,
            ));
        }
        let link = state.links.get_mut(&index).ok_or_else(|| missing(index))?;
        link.master = Some(master);
        Ok(())
    }

    async fn delete_link(&self, index: u32) -> Result<(), LinkError> {
        let mut state = self.state.lock();
        state.take_failure(Operation::DeleteLink)?;
        if !state.links.contains_key(&index) {
            return Err(missing(index));
        }
        Self::remove_index(&mut state, index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn starts_with_loopback() {
        let backend = MemoryBackend::new();
        let links = backend.list_links().await.unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].name, "lo");
    }

    #[tokio::test]
    async fn duplicate_names_are_rejected() {
        let backend = MemoryBackend::new();
        backend.add_interface("eth0").unwrap();
        assert!(matches!(
            backend.add_vrf("eth0", 1).await,
            Err(LinkError::AlreadyExists { .. })
        ));
    }

    #[tokio::test]
    async fn strict_tables_reject_reuse() {
        let backend = MemoryBackend::new().with_strict_tables();
        backend.add_vrf("vrf0", 1).await.unwrap();
        assert!(backend.add_vrf("vrf1", 1).await.is_err());

        let relaxed = MemoryBackend::new();
        relaxed.add_vrf("vrf0", 1).await.unwrap();
        assert!(relaxed.add_vrf("vrf1", 1).await.is_ok());
    }

    #[tokio::test]
    async fn deleting_master_releases_members() {
        let backend = MemoryBackend::new();
        let eth = backend.add_interface("eth0").unwrap();
        backend.add_vrf("vrf0", 1).await.unwrap();
        let vrf = backend.link("vrf0").unwrap().index;

        backend.set_master(eth, vrf).await.unwrap();
        assert_eq!(backend.link("eth0").unwrap().master, Some(vrf));

        backend.delete_link(vrf).await.unwrap();
        assert_eq!(backend.link("eth0").unwrap().master, None);
    }

    #[tokio::test]
    async fn set_master_requires_vrf() {
        let backend = MemoryBackend::new();
        let eth0 = backend.add_interface("eth0").unwrap();
        let eth1 = backend.add_interface("eth1").unwrap();
        assert!(matches!(
            backend.set_master(eth0, eth1).await,
            Err(LinkError::Kernel { .. })
        ));
    }

    #[tokio::test]
    async fn injected_failure_fires_once() {
        let backend = MemoryBackend::new();
        backend.fail_next(Operation::ListLinks, LinkError::kernel("dump links", "boom"));
        assert!(backend.list_links().await.is_err());
        assert!(backend.list_links().await.is_ok());
    }
}
