// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Label keys set on seed cluster resources
pub mod labels {
    /// Links a Cluster to the Project that owns it
    pub const PROJECT_ID: &str = "project-id";
    /// Selector label shared by a MachineDeployment and its machines
    pub const MACHINE: &str = "machine";
}

/// Namespaces used inside a user cluster
pub mod namespaces {
    /// Where the machine controller watches MachineDeployments
    pub const MACHINES: &str = "kube-system";
}

/// Where the control plane publishes a user cluster's admin credentials
pub mod kubeconfig {
    pub const SECRET_NAME: &str = "admin-kubeconfig";
    pub const DATA_KEY: &str = "kubeconfig";

    /// Namespace holding a user cluster's control plane objects
    pub fn cluster_namespace(cluster_id: &str) -> String {
        format!("cluster-{}", cluster_id)
    }
}

/// Polling bounds for each readiness wait
pub mod poll {
    use std::time::Duration;

    pub const PROJECT_INTERVAL: Duration = Duration::from_secs(5);
    pub const PROJECT_TIMEOUT: Duration = Duration::from_secs(60);

    /// Only waits for the informer cache to catch up with the write
    pub const CACHE_INTERVAL: Duration = Duration::from_millis(100);
    pub const CACHE_TIMEOUT: Duration = Duration::from_secs(5);

    pub const CLUSTER_INTERVAL: Duration = Duration::from_secs(5);
    pub const CLUSTER_TIMEOUT: Duration = Duration::from_secs(5 * 60);

    pub const SECRET_INTERVAL: Duration = Duration::from_secs(5);
    pub const SECRET_TIMEOUT: Duration = Duration::from_secs(3 * 60);
}

/// Cluster status condition types the control plane sets once each of its
/// controllers has reconciled a new cluster
pub mod conditions {
    pub const CLUSTER_INITIALIZED: &str = "ClusterInitialized";

    pub const RECONCILE_SUCCESS: &[&str] = &[
        "ClusterControllerReconciledSuccessfully",
        "AddonControllerReconciledSuccessfully",
        "AddonInstallerControllerReconciledSuccessfully",
        "BackupControllerReconciledSuccessfully",
        // spelled the way the control plane spells it
        "CloudControllerReconcilledSuccessfully",
        "UpdateControllerReconciledSuccessfully",
        "MonitoringControllerReconciledSuccessfully",
        "MachineDeploymentReconciledSuccessfully",
        "MLAControllerReconciledSuccessfully",
        "ClusterTemplateControllerReconciledSuccessfully",
    ];
}

/// Length of generated resource identifiers
pub const ID_LENGTH: usize = 10;
