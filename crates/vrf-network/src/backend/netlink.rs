//! rtnetlink-backed link operations.

use async_trait::async_trait;
use futures::TryStreamExt;
use rtnetlink::packet_route::link::{
    InfoData, InfoKind, InfoVrf, LinkAttribute, LinkFlags, LinkInfo, LinkMessage,
};
use rtnetlink::{Handle, LinkUnspec, LinkVrf};
use vrf_common::LinkError;

use super::LinkBackend;
use crate::link::{Link, LinkKind};

/// Link backend talking `NETLINK_ROUTE` to the kernel.
///
/// The socket is bound to the network namespace of the thread that calls
/// [`NetlinkBackend::connect`].
pub struct NetlinkBackend {
    handle: Handle,
}

impl NetlinkBackend {
    /// Open a netlink socket and drive it on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Kernel`] if the socket cannot be opened.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn connect() -> Result<Self, LinkError> {
        let (connection, handle, _) = rtnetlink::new_connection()
            .map_err(|e| LinkError::kernel("open netlink socket", e.to_string()))?;
        tokio::spawn(connection);
        tracing::debug!("Netlink connection established");
        Ok(Self { handle })
    }
}

fn classify(operation: &'static str, name: &str, err: rtnetlink::Error) -> LinkError {
    match err {
        rtnetlink::Error::NetlinkError(msg) => match msg.code {
            Some(code) => LinkError::from_errno(operation, name, -code.get()),
            None => LinkError::kernel(operation, format!("{msg:?}")),
        },
        other => LinkError::kernel(operation, other.to_string()),
    }
}

fn kind_name(kind: &InfoKind) -> String {
    match kind {
        InfoKind::Other(name) => name.clone(),
        known => format!("{known:?}").to_lowercase(),
    }
}

fn decode(msg: &LinkMessage) -> Link {
    let mut name = String::new();
    let mut master = None;
    let mut info_kind = None;
    let mut table = None;

    for attr in &msg.attributes {
        match attr {
            LinkAttribute::IfName(n) => name.clone_from(n),
            LinkAttribute::Controller(index) => master = Some(*index),
            LinkAttribute::LinkInfo(infos) => {
                for info in infos {
                    match info {
                        LinkInfo::Kind(kind) => info_kind = Some(kind.clone()),
                        LinkInfo::Data(InfoData::Vrf(vrf)) => {
                            for nla in vrf {
                                if let InfoVrf::TableId(id) = nla {
                                    table = Some(*id);
                                }
                            }
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }

    let kind = match info_kind {
        Some(InfoKind::Vrf) => LinkKind::Vrf {
            table: table.unwrap_or_default(),
        },
        Some(other) => LinkKind::Other {
            kind: Some(kind_name(&other)),
        },
        None => LinkKind::unknown(),
    };

    Link {
        index: msg.header.index,
        name,
        master,
        up: msg.header.flags.contains(LinkFlags::Up),
        kind,
    }
}

#[async_trait]
impl LinkBackend for NetlinkBackend {
    async fn list_links(&self) -> Result<Vec<Link>, LinkError> {
        tracing::debug!("Dumping links");
        let messages: Vec<LinkMessage> = self
            .handle
            .link()
            .get()
            .execute()
            .try_collect()
            .await
            .map_err(|e| classify("dump links", "*", e))?;
        Ok(messages.iter().map(decode).collect())
    }

    async fn link_by_name(&self, name: &str) -> Result<Link, LinkError> {
        tracing::debug!(name, "Looking up link");
        let msg = self
            .handle
            .link()
            .get()
            .match_name(name.to_string())
            .execute()
            .try_next()
            .await
            .map_err(|e| classify("get link", name, e))?;
        msg.as_ref().map(decode).ok_or_else(|| LinkError::NotFound {
            name: name.to_string(),
        })
    }

    async fn add_vrf(&self, name: &str, table: u32) -> Result<(), LinkError> {
        tracing::debug!(name, table, "Adding VRF link");
        self.handle
            .link()
            .add(LinkVrf::new(name, table).build())
            .execute()
            .await
            .map_err(|e| classify("add vrf", name, e))
    }

    async fn set_up(&self, index: u32) -> Result<(), LinkError> {
        tracing::debug!(index, "Setting link up");
        self.handle
            .link()
            .set(LinkUnspec::new_with_index(index).up().build())
            .execute()
            .await
            .map_err(|e| classify("set link up", &format!("index {index}"), e))
    }

    async fn set_master(&self, index: u32, master: u32) -> Result<(), LinkError> {
        tracing::debug!(index, master, "Setting link master");
        self.handle
            .link()
            .set(LinkUnspec::new_with_index(index).controller(master).build())
            .execute()
            .await
            .map_err(|e| classify("set master", &format!("index {index}"), e))
    }

    async fn delete_link(&self, index: u32) -> Result<(), LinkError> {
        tracing::debug!(index, "Deleting link");
        self.handle
            .link()
            .del(index)
            .execute()
            .await
            .map_err(|e| classify("delete link", &format!("index {index}"), e))
    }
}
