//! Routing table allocation.
//!
//! Tables are picked from a snapshot of the existing VRFs: the next id is
//! one above the highest table in use. Nothing is reserved, so two callers
//! working from the same snapshot receive the same id; the second creation
//! then either fails in the kernel or produces a shared table.

use vrf_common::{VrfError, VrfResult};

use crate::backend::LinkBackend;
use crate::link::Link;

/// Pick the table id following the highest VRF table among `links`.
///
/// # Errors
///
/// Returns [`VrfError::TableIdsExhausted`] if the highest table is `u32::MAX`.
pub fn next_table_id<'a>(links: impl IntoIterator<Item = &'a Link>) -> VrfResult<u32> {
    let max = links
        .into_iter()
        .filter_map(Link::vrf_table)
        .max()
        .unwrap_or(0);
    max.checked_add(1)
        .ok_or(VrfError::TableIdsExhausted { max })
}

/// Allocate a routing table id for a new VRF.
///
/// # Errors
///
/// Returns [`VrfError::AllocationQuery`] if links cannot be listed.
pub async fn allocate_table<B: LinkBackend + ?Sized>(backend: &B) -> VrfResult<u32> {
    let links = backend
        .list_links()
        .await
        .map_err(|source| VrfError::AllocationQuery { source })?;
    let table = next_table_id(&links)?;
    tracing::debug!(table, "Allocated routing table");
    Ok(table)
}
