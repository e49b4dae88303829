// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use super::HasPhase;
use crate::constants::{conditions, labels};
use kube::{CustomResource, ResourceExt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[kube(group = "kubermatic.k8c.io", version = "v1", kind = "Cluster")]
#[kube(status = "ClusterStatus")]
#[serde(rename_all = "camelCase")]
pub struct ClusterSpec {
    pub human_readable_name: String,
    pub version: String,
    pub cloud: CloudSpec,
    pub cluster_network: ClusterNetworkingConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cni_plugin: Option<CniPluginSettings>,
    #[serde(default)]
    pub container_runtime: String,
    #[serde(
        rename = "enableUserSSHKeyAgent",
        skip_serializing_if = "Option::is_none"
    )]
    pub enable_user_ssh_key_agent: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_operating_system_manager: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kubernetes_dashboard: Option<KubernetesDashboard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_logging: Option<AuditLoggingSettings>,
    #[serde(default)]
    pub pause: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CloudSpec {
    #[serde(rename = "dc")]
    pub datacenter_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gcp: Option<GcpCloudSpec>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GcpCloudSpec {
    pub service_account: String,
    pub network: String,
    pub subnetwork: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterNetworkingConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub konnectivity_enabled: Option<bool>,
    pub ip_family: String,
    pub proxy_mode: String,
    pub pods: NetworkRanges,
    pub services: NetworkRanges,
    #[serde(
        rename = "nodeCidrMaskSizeIPv4",
        skip_serializing_if = "Option::is_none"
    )]
    pub node_cidr_mask_size_ipv4: Option<i32>,
    #[serde(
        rename = "nodeLocalDNSCacheEnabled",
        skip_serializing_if = "Option::is_none"
    )]
    pub node_local_dns_cache_enabled: Option<bool>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NetworkRanges {
    pub cidr_blocks: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
pub struct CniPluginSettings {
    #[serde(rename = "type")]
    pub plugin_type: String,
    pub version: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
pub struct KubernetesDashboard {
    pub enabled: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditLoggingSettings {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub policy_preset: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<ClusterPhase>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub conditions: BTreeMap<String, ClusterCondition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extended_health: Option<ExtendedClusterHealth>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub versions: Option<ClusterVersionsStatus>,
}

#[derive(Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterCondition {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubermatic_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterVersionsStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_plane: Option<String>,
}

/// Health of the control plane components the control plane reports on
#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedClusterHealth {
    #[serde(default)]
    pub apiserver: HealthStatus,
    #[serde(default)]
    pub scheduler: HealthStatus,
    #[serde(default)]
    pub controller: HealthStatus,
    #[serde(default)]
    pub machine_controller: HealthStatus,
    #[serde(default)]
    pub etcd: HealthStatus,
    #[serde(default)]
    pub cloud_provider_infrastructure: HealthStatus,
    #[serde(default)]
    pub user_cluster_controller_manager: HealthStatus,
}

impl ExtendedClusterHealth {
    pub fn all_healthy(&self) -> bool {
        [
            self.apiserver,
            self.scheduler,
            self.controller,
            self.machine_controller,
            self.etcd,
            self.cloud_provider_infrastructure,
            self.user_cluster_controller_manager,
        ]
        .iter()
        .all(|h| *h == HealthStatus::Up)
    }
}

#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, schemars::JsonSchema,
)]
pub enum HealthStatus {
    #[default]
    #[serde(rename = "HealthStatusDown")]
    Down,
    #[serde(rename = "HealthStatusUp")]
    Up,
    #[serde(rename = "HealthStatusProvisioning")]
    Provisioning,
}

#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, schemars::JsonSchema,
)]
pub enum ClusterPhase {
    Pending,
    Running,
    Terminating,
    Error,
    /// Any phase this client does not order, e.g. `Creating` or `Updating`
    #[serde(other)]
    Unknown,
}

impl fmt::Display for ClusterPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ClusterPhase::Pending => "Pending",
            ClusterPhase::Running => "Running",
            ClusterPhase::Terminating => "Terminating",
            ClusterPhase::Error => "Error",
            ClusterPhase::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

impl HasPhase for Cluster {
    type Phase = ClusterPhase;

    fn phase(&self) -> Option<ClusterPhase> {
        self.status
            .as_ref()
            .and_then(|s| s.phase)
            .filter(|p| *p != ClusterPhase::Unknown)
    }
}

impl ClusterStatus {
    /// Check a condition is "True", optionally stamped by the given control plane version
    pub fn has_condition(&self, condition_type: &str, kubermatic_version: Option<&str>) -> bool {
        self.conditions.get(condition_type).is_some_and(|c| {
            c.status == "True"
                && kubermatic_version
                    .map_or(true, |v| c.kubermatic_version.as_deref() == Some(v))
        })
    }
}

impl Cluster {
    /// Check whether the control plane has finished setting up this cluster.
    ///
    /// Once `ClusterInitialized` has been set it stays true. Before that, every
    /// controller must have reconciled the cluster, all control plane components
    /// must be healthy and the control plane must run the requested version.
    /// With `kubermatic_version` set, reconcile conditions from other control
    /// plane versions do not count.
    pub fn is_initialized(&self, kubermatic_version: Option<&str>) -> bool {
        let Some(status) = self.status.as_ref() else {
            return false;
        };

        if status.has_condition(conditions::CLUSTER_INITIALIZED, None) {
            return true;
        }

        let reconciled = conditions::RECONCILE_SUCCESS
            .iter()
            .all(|t| status.has_condition(t, kubermatic_version));
        let healthy = status
            .extended_health
            .as_ref()
            .is_some_and(ExtendedClusterHealth::all_healthy);
        let up_to_date = status
            .versions
            .as_ref()
            .and_then(|v| v.control_plane.as_deref())
            == Some(self.spec.version.as_str());

        reconciled && healthy && up_to_date
    }

    /// ID of the owning project, from the project label
    pub fn project_id(&self) -> Option<&str> {
        self.labels().get(labels::PROJECT_ID).map(String::as_str)
    }
}
