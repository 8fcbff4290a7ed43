//! Command dispatch.

use std::path::PathBuf;

use serde_json::Value;
use vrf_common::VrfError;
use vrf_network::{
    DetachOutcome, LinkBackend, NetlinkBackend, VrfRequest, attach_interface, detach_interface,
    enter_netns, netns_exists, verify_interface,
};

use crate::cli::{Cli, CniCommand};
use crate::config::NetConf;
use crate::error::{PluginError, PluginResult};
use crate::version::{self, VersionInfo};

/// A validated plugin invocation.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Requested operation.
    pub command: CniCommand,
    /// Network configuration.
    pub conf: NetConf,
    /// VRF and interface to operate on.
    pub request: VrfRequest,
    /// Namespace holding the interface.
    pub netns: PathBuf,
}

impl Invocation {
    /// Validate the environment and configuration without touching the kernel.
    ///
    /// # Errors
    ///
    /// Configuration, version and environment errors.
    pub fn load(cli: &Cli, input: &[u8]) -> PluginResult<Self> {
        let conf = NetConf::parse(input)?;
        version::check_supported(&conf.cni_version)?;
        if cli.command.requires_prev_result() {
            conf.prev_result()?;
        }

        let netns = cli.netns()?.to_path_buf();
        let request = VrfRequest::new(conf.vrf_name.as_str(), cli.ifname()?).map_err(|e| {
            PluginError::InvalidEnvironment {
                message: e.to_string(),
            }
        })?;

        Ok(Self {
            command: cli.command,
            conf,
            request,
            netns,
        })
    }

    /// Run the operation against `backend` and build the stdout reply.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Operation`] if the VRF operation fails.
    pub async fn dispatch<B: LinkBackend + ?Sized>(
        &self,
        backend: &B,
    ) -> PluginResult<Option<Value>> {
        let command = self.command;
        let failed = |source: VrfError| PluginError::Operation { command, source };

        match command {
            CniCommand::Add => {
                let vrf = attach_interface(backend, &self.request)
                    .await
                    .map_err(failed)?;
                tracing::info!(
                    vrf = %vrf.name,
                    table = vrf.table,
                    interface = %self.request.interface,
                    "Interface attached"
                );
                self.conf.pass_through_result().map(Some)
            }
            CniCommand::Check => {
                verify_interface(backend, &self.request)
                    .await
                    .map_err(failed)?;
                Ok(None)
            }
            CniCommand::Del => {
                let outcome = detach_interface(backend, &self.request)
                    .await
                    .map_err(failed)?;
                if outcome == DetachOutcome::VrfDeleted {
                    tracing::info!(vrf = %self.request.vrf, "Last interface detached, VRF removed");
                }
                Ok(None)
            }
            CniCommand::Version => Ok(Some(serde_json::to_value(VersionInfo::current())?)),
        }
    }
}

/// Execute a non-`VERSION` command inside the container namespace.
///
/// Enters the namespace on the calling thread, then drives a
/// current-thread runtime so every netlink request is issued from it.
///
/// # Errors
///
/// Any validation, namespace or VRF error.
pub fn run(cli: &Cli, input: &[u8]) -> PluginResult<Option<Value>> {
    let invocation = Invocation::load(cli, input)?;

    if invocation.command == CniCommand::Del && !netns_exists(&invocation.netns) {
        tracing::info!(
            netns = %invocation.netns.display(),
            "Network namespace already removed, nothing to detach"
        );
        return Ok(None);
    }

    enter_netns(&invocation.netns).map_err(|source| PluginError::Operation {
        command: invocation.command,
        source,
    })?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async {
        let backend = NetlinkBackend::connect()?;
        invocation.dispatch(&backend).await
    })
}
