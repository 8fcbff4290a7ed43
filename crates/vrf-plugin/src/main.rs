//! VRF CNI plugin entry point.

use std::io::{self, Read};
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use serde::Serialize;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use vrf_plugin::{CURRENT_VERSION, Cli, CniCommand, NetConf, PluginError, VersionInfo};

fn main() -> ExitCode {
    // stdout carries the CNI reply, so logs go to stderr
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("vrf_plugin=info,vrf_network=info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(io::stderr))
        .with(filter)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let err = PluginError::InvalidEnvironment {
                message: e.to_string().trim().to_string(),
            };
            return report(&err, CURRENT_VERSION);
        }
    };

    if cli.command == CniCommand::Version {
        return print(&VersionInfo::current());
    }

    let mut input = Vec::new();
    if let Err(e) = io::stdin().read_to_end(&mut input) {
        return report(&PluginError::Io(e), CURRENT_VERSION);
    }

    tracing::debug!(
        command = %cli.command,
        container = cli.container_id.as_deref().unwrap_or_default(),
        "Executing"
    );

    match vrf_plugin::run(&cli, &input) {
        Ok(Some(reply)) => print(&reply),
        Ok(None) => ExitCode::SUCCESS,
        Err(err) => {
            let version =
                NetConf::peek_version(&input).unwrap_or_else(|| CURRENT_VERSION.to_string());
            report(&err, &version)
        }
    }
}

fn print<T: Serialize>(reply: &T) -> ExitCode {
    match serde_json::to_string(reply) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => report(&PluginError::Encode(e), CURRENT_VERSION),
    }
}

fn report(err: &PluginError, cni_version: &str) -> ExitCode {
    tracing::error!(code = err.code(), "{err}");
    let response = err.to_response(cni_version);
    match serde_json::to_string(&response) {
        Ok(json) => println!("{json}"),
        Err(_) => println!(
            r#"{{"cniVersion":"{cni_version}","code":{},"msg":"failed to encode error"}}"#,
            err.code()
        ),
    }
    ExitCode::FAILURE
}
