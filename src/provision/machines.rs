// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Worker nodes for the user cluster

use super::{submit, UserClusterClient};
use crate::constants::{labels, namespaces};
use crate::error::Result;
use crate::types::machine_deployment::{
    LabelSelector, MachineDeploymentSpec, MachineSpec, MachineTemplateSpec, MachineVersionInfo,
    ProviderSpec, TemplateMetadata,
};
use crate::types::{Cluster, MachineDeployment};
use kube::ResourceExt;
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

const REPLICAS: i32 = 2;

/// Build a GCE MachineDeployment whose kubelet matches the cluster version
pub fn build_machine_deployment(
    name: &str,
    network: &str,
    subnetwork: &str,
    cluster: &Cluster,
) -> MachineDeployment {
    let selector = BTreeMap::from([(labels::MACHINE.to_string(), name.to_string())]);

    let provider_config = serde_json::json!({
        "cloudProvider": "gce",
        "cloudProviderSpec": {
            "zone": "europe-west2-a",
            "machineType": "e2-highcpu-2",
            "diskSize": 25,
            "diskType": "pd-standard",
            "preemptible": false,
            "network": network,
            "subnetwork": subnetwork,
            "assignPublicIPAddress": true,
            "multizone": false,
            "regional": false,
            "tags": [format!("kubernetes-cluster-{}", cluster.name_any())]
        },
        "operatingSystem": "ubuntu",
        "operatingSystemSpec": {
            "ubuntu": {
                "distUpgradeOnBoot": false
            }
        }
    });

    let mut deployment = MachineDeployment::new(
        name,
        MachineDeploymentSpec {
            replicas: Some(REPLICAS),
            selector: LabelSelector {
                match_labels: selector.clone(),
            },
            template: MachineTemplateSpec {
                metadata: TemplateMetadata { labels: selector },
                spec: MachineSpec {
                    provider_spec: ProviderSpec {
                        value: provider_config,
                    },
                    versions: MachineVersionInfo {
                        kubelet: cluster.spec.version.clone(),
                    },
                },
            },
        },
    );
    deployment.metadata.namespace = Some(namespaces::MACHINES.to_string());
    deployment
}

/// Submit the MachineDeployment; the machine controller takes it from there
#[instrument(skip_all, fields(machine_deployment = %deployment.name_any()))]
pub async fn create_machine_deployment(
    user: &UserClusterClient,
    deployment: &MachineDeployment,
    cancel: &CancellationToken,
) -> Result<MachineDeployment> {
    let created = submit(&user.machine_deployments(), deployment, cancel).await?;
    info!(
        "Created MachineDeployment {} with {} replicas",
        created.name_any(),
        created.spec.replicas.unwrap_or_default()
    );
    Ok(created)
}
