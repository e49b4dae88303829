// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! User cluster client bootstrapping from the admin kubeconfig secret

use crate::constants::{kubeconfig, namespaces};
use crate::error::{OutpostError, Result};
use crate::kubernetes::{parse_kubeconfig, probes, Connector, PollSettings};
use crate::types::MachineDeployment;
use k8s_openapi::api::core::v1::{Pod, Secret};
use kube::{Api, Client};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

/// Client for a user cluster, exposing the kinds the workflow manages there
#[derive(Clone)]
pub struct UserClusterClient {
    client: Client,
}

impl UserClusterClient {
    pub fn machine_deployments(&self) -> Api<MachineDeployment> {
        Api::namespaced(self.client.clone(), namespaces::MACHINES)
    }

    pub fn pods(&self, namespace: &str) -> Api<Pod> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

/// Builds a [`UserClusterClient`] once the control plane has published the
/// cluster's admin kubeconfig on the seed
pub struct CredentialBootstrapper<'a, C> {
    seed: &'a Client,
    connector: &'a C,
    settings: PollSettings,
    cancel: &'a CancellationToken,
}

impl<'a, C: Connector> CredentialBootstrapper<'a, C> {
    pub fn new(
        seed: &'a Client,
        connector: &'a C,
        settings: PollSettings,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            seed,
            connector,
            settings,
            cancel,
        }
    }

    #[instrument(skip(self))]
    pub async fn bootstrap(&self, cluster_id: &str) -> Result<UserClusterClient> {
        let namespace = kubeconfig::cluster_namespace(cluster_id);
        let secrets: Api<Secret> = Api::namespaced(self.seed.clone(), &namespace);

        info!(
            "Waiting for kubeconfig secret '{}/{}'...",
            namespace,
            kubeconfig::SECRET_NAME
        );
        let secret = probes::wait_for_existence(
            &secrets,
            kubeconfig::SECRET_NAME,
            self.settings,
            self.cancel,
        )
        .await?;

        let kubeconfig = parse_kubeconfig(kubeconfig_data(&secret, cluster_id)?)?;

        if self.cancel.is_cancelled() {
            return Err(OutpostError::Cancelled);
        }
        let client = self.connector.connect(kubeconfig).await?;

        info!("Connected to user cluster {}", cluster_id);
        Ok(UserClusterClient { client })
    }
}

fn kubeconfig_data<'s>(secret: &'s Secret, cluster_id: &str) -> Result<&'s [u8]> {
    let Some(data) = secret.data.as_ref() else {
        return Err(OutpostError::KubeconfigError(format!(
            "Kubeconfig secret for cluster {} has no data",
            cluster_id
        )));
    };

    let Some(kubeconfig) = data.get(kubeconfig::DATA_KEY) else {
        return Err(OutpostError::KubeconfigError(format!(
            "Kubeconfig secret for cluster {} does not contain '{}' key",
            cluster_id,
            kubeconfig::DATA_KEY
        )));
    };

    Ok(&kubeconfig.0)
}
