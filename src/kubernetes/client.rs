// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Client creation from kubeconfig documents

use crate::error::{OutpostError, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::Client;
use std::future::Future;
use tracing::debug;

/// Turns parsed credentials into a connected client
pub trait Connector {
    fn connect(&self, kubeconfig: Kubeconfig) -> impl Future<Output = Result<Client>> + Send;
}

/// Connects to the API server named by the kubeconfig's current context
#[derive(Debug, Clone, Copy, Default)]
pub struct KubeconfigConnector;

impl Connector for KubeconfigConnector {
    async fn connect(&self, kubeconfig: Kubeconfig) -> Result<Client> {
        create_client_from_kubeconfig(kubeconfig).await
    }
}

/// Parse a kubeconfig document
pub fn parse_kubeconfig(raw: &[u8]) -> Result<Kubeconfig> {
    let kubeconfig = std::str::from_utf8(raw)
        .map_err(|e| OutpostError::KubeconfigError(format!("Kubeconfig is not UTF-8: {}", e)))?;

    serde_yaml::from_str(kubeconfig)
        .map_err(|e| OutpostError::KubeconfigError(format!("Failed to parse kubeconfig: {}", e)))
}

/// Create a Kubernetes client from a parsed kubeconfig
pub async fn create_client_from_kubeconfig(kubeconfig: Kubeconfig) -> Result<Client> {
    let client_config =
        kube::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
            .await
            .map_err(|e| {
                OutpostError::KubeconfigError(format!("Failed to create config: {}", e))
            })?;

    debug!("Creating client for {}", client_config.cluster_url);

    Client::try_from(client_config)
        .map_err(|e| OutpostError::KubeconfigError(format!("Failed to create client: {}", e)))
}
