// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use outpost::config::Config;
use outpost::kubernetes::{create_client_from_kubeconfig, parse_kubeconfig};
use outpost::provision::Provisioner;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!("Starting Outpost");

    let config = Config::load()?;
    info!(
        "Configuration loaded: project={}, cluster={}, version={}, datacenter={}",
        config.provision.project_name,
        config.provision.cluster_name,
        config.provision.k8s_version,
        config.provision.datacenter
    );

    let seed = create_client_from_kubeconfig(parse_kubeconfig(&config.seed_kubeconfig)?).await?;
    info!("Connected to seed cluster");

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling provisioning");
            signal_cancel.cancel();
        }
    });

    let provisioned = Provisioner::new(seed, config.provision, cancel).run().await?;
    info!(
        "Done: project={}, cluster={}, machine deployment={}",
        provisioned.project_id, provisioned.cluster_id, provisioned.machine_deployment
    );
    Ok(())
}
