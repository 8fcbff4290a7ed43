//! VRF lookup by name.

use vrf_common::{LinkError, VrfError, VrfResult};

use crate::backend::LinkBackend;
use crate::link::Vrf;

/// Find the VRF device called `name`.
///
/// # Errors
///
/// - [`VrfError::VrfNotFound`] if no link has that name.
/// - [`VrfError::WrongLinkType`] if the link exists but is not a VRF.
/// - [`VrfError::Query`] for any other backend failure.
pub async fn find_vrf<B: LinkBackend + ?Sized>(backend: &B, name: &str) -> VrfResult<Vrf> {
    match backend.link_by_name(name).await {
        Ok(link) => Vrf::try_from_link(link),
        Err(LinkError::NotFound { .. }) => Err(VrfError::VrfNotFound {
            name: name.to_string(),
        }),
        Err(source) => Err(VrfError::Query {
            context: format!("look up VRF {name}"),
            source,
        }),
    }
}
