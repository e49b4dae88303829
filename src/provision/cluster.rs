// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! User cluster creation on the seed cluster

use super::{generate_id, submit};
use crate::config::{ClusterReadiness, GcpSettings, PollProfile};
use crate::constants::labels;
use crate::error::{OutpostError, Result};
use crate::kubernetes::probes;
use crate::types::cluster::{
    AuditLoggingSettings, CloudSpec, ClusterNetworkingConfig, ClusterSpec, CniPluginSettings,
    GcpCloudSpec, KubernetesDashboard, NetworkRanges,
};
use crate::types::{Cluster, ClusterPhase};
use kube::api::{ObjectMeta, Patch, PatchParams};
use kube::{Api, Client, ResourceExt};
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

/// Inputs for the cluster payload
#[derive(Debug, Clone)]
pub struct ClusterRequest<'a> {
    pub display_name: &'a str,
    pub project_id: &'a str,
    pub version: &'a str,
    pub datacenter: &'a str,
    pub gcp: &'a GcpSettings,
}

/// How the new cluster is taken over once it exists
#[derive(Debug, Clone)]
pub struct ClusterRollout<'a> {
    pub owner_email: &'a str,
    pub readiness: ClusterReadiness,
    pub kubermatic_version: Option<&'a str>,
    pub polls: PollProfile,
}

/// Build a GCP backed cluster owned by the given project
pub fn build_cluster(id: &str, request: &ClusterRequest<'_>) -> Cluster {
    Cluster {
        metadata: ObjectMeta {
            name: Some(id.to_string()),
            labels: Some(BTreeMap::from([(
                labels::PROJECT_ID.to_string(),
                request.project_id.to_string(),
            )])),
            ..Default::default()
        },
        spec: ClusterSpec {
            human_readable_name: request.display_name.to_string(),
            version: request.version.to_string(),
            cloud: CloudSpec {
                datacenter_name: request.datacenter.to_string(),
                gcp: Some(GcpCloudSpec {
                    service_account: request.gcp.service_account.clone(),
                    network: request.gcp.network.clone(),
                    subnetwork: request.gcp.subnetwork.clone(),
                }),
            },
            cluster_network: ClusterNetworkingConfig {
                konnectivity_enabled: Some(true),
                ip_family: "IPv4".to_string(),
                proxy_mode: "ipvs".to_string(),
                pods: NetworkRanges {
                    cidr_blocks: vec!["172.25.0.0/16".to_string()],
                },
                services: NetworkRanges {
                    cidr_blocks: vec!["10.240.16.0/20".to_string()],
                },
                node_cidr_mask_size_ipv4: Some(24),
                node_local_dns_cache_enabled: Some(true),
            },
            cni_plugin: Some(CniPluginSettings {
                plugin_type: "canal".to_string(),
                version: "v3.23".to_string(),
            }),
            container_runtime: "containerd".to_string(),
            enable_user_ssh_key_agent: Some(true),
            enable_operating_system_manager: Some(true),
            kubernetes_dashboard: Some(KubernetesDashboard { enabled: true }),
            audit_logging: Some(AuditLoggingSettings::default()),
            pause: false,
        },
        status: None,
    }
}

/// Create a cluster and wait until the control plane has brought it up.
///
/// Between creation and readiness the owner email is written into the
/// status, because the control plane cannot take it at creation time yet.
#[instrument(skip_all, fields(cluster = %request.display_name, project = %request.project_id))]
pub async fn create_cluster(
    client: &Client,
    request: &ClusterRequest<'_>,
    rollout: &ClusterRollout<'_>,
    cancel: &CancellationToken,
) -> Result<Cluster> {
    let clusters: Api<Cluster> = Api::all(client.clone());
    let cluster = build_cluster(&generate_id(), request);

    let created = submit(&clusters, &cluster, cancel).await?;
    let id = created.name_any();
    info!("Created cluster '{}' with ID {}", request.display_name, id);

    probes::wait_until_visible(&clusters, &id, rollout.polls.cluster_cache, cancel).await?;

    set_owner_email(&clusters, &id, rollout.owner_email, cancel).await?;

    wait_for_cluster_ready(&clusters, &id, rollout, cancel).await
}

// TODO: drop once the control plane accepts the owner on cluster creation
async fn set_owner_email(
    clusters: &Api<Cluster>,
    id: &str,
    owner_email: &str,
    cancel: &CancellationToken,
) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(OutpostError::Cancelled);
    }

    let patch = serde_json::json!({ "status": { "userEmail": owner_email } });
    clusters
        .patch_status(id, &PatchParams::default(), &Patch::Merge(&patch))
        .await
        .map_err(|source| OutpostError::Submission {
            kind: "Cluster status".to_string(),
            name: id.to_string(),
            source,
        })?;

    info!("Set owner of cluster {} to {}", id, owner_email);
    Ok(())
}

async fn wait_for_cluster_ready(
    clusters: &Api<Cluster>,
    id: &str,
    rollout: &ClusterRollout<'_>,
    cancel: &CancellationToken,
) -> Result<Cluster> {
    let settings = rollout.polls.cluster_ready;

    match rollout.readiness {
        ClusterReadiness::Initialized => {
            let kubermatic_version = rollout.kubermatic_version;
            if kubermatic_version.is_none() {
                warn!("No Kubermatic version configured, accepting conditions from any version");
            }
            probes::wait_until(clusters, id, "initialized", settings, cancel, |c: &Cluster| {
                c.is_initialized(kubermatic_version)
            })
            .await
        }
        ClusterReadiness::Running => {
            probes::wait_for_phase(clusters, id, ClusterPhase::Running, settings, cancel).await
        }
    }
}
