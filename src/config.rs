// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::poll;
use crate::error::{OutpostError, Result};
use crate::kubernetes::PollSettings;
use clap::{Parser, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};

/// Provision a project, a user cluster, worker nodes and a sample workload
/// on a Kubermatic seed cluster.
#[derive(Parser, Debug, Clone)]
#[command(name = "outpost", version, about, long_about = None)]
pub struct Args {
    /// Path to the seed cluster kubeconfig
    #[arg(long, env = "SEED_KUBECONFIG")]
    pub seed_kubeconfig: Option<PathBuf>,

    /// Path to the GCP service account used by the user cluster
    #[arg(long, env = "GCP_SERVICE_ACCOUNT")]
    pub gcp_service_account: Option<PathBuf>,

    /// GCP network for the user cluster and its nodes
    #[arg(long, env = "GCP_NETWORK", default_value = "")]
    pub gcp_network: String,

    /// GCP subnetwork for the user cluster and its nodes
    #[arg(long, env = "GCP_SUBNET", default_value = "")]
    pub gcp_subnet: String,

    /// Project display name
    #[arg(long, env = "PROJECT_NAME", default_value = "test-project")]
    pub project_name: String,

    /// Cluster display name
    #[arg(long, env = "CLUSTER_NAME", default_value = "test-cluster")]
    pub cluster_name: String,

    /// MachineDeployment name
    #[arg(long, env = "MACHINE_NAME", default_value = "test-machine")]
    pub machine_name: String,

    /// Kubernetes version of the user cluster
    #[arg(long, env = "K8S_VERSION", default_value = "1.23.9")]
    pub k8s_version: String,

    /// Seed datacenter the cluster is created in
    #[arg(long, env = "DATACENTER", default_value = "gcp-westeurope-2")]
    pub datacenter: String,

    /// Email recorded as the cluster owner
    #[arg(long, env = "OWNER_EMAIL")]
    pub owner_email: Option<String>,

    /// How to decide that a new cluster is ready
    #[arg(long, env = "CLUSTER_READINESS", value_enum, default_value_t = ClusterReadiness::Initialized)]
    pub cluster_readiness: ClusterReadiness,

    /// Only count cluster conditions stamped by this Kubermatic version
    #[arg(long, env = "KUBERMATIC_VERSION")]
    pub kubermatic_version: Option<String>,
}

/// Readiness check applied to a new cluster before bootstrapping its client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ClusterReadiness {
    /// All controllers reconciled and all control plane components healthy
    #[default]
    Initialized,
    /// Cluster phase is Running
    Running,
}

/// Polling bounds for every readiness wait of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollProfile {
    pub project: PollSettings,
    pub cluster_cache: PollSettings,
    pub cluster_ready: PollSettings,
    pub secret: PollSettings,
}

impl Default for PollProfile {
    fn default() -> Self {
        Self {
            project: PollSettings::new(poll::PROJECT_INTERVAL, poll::PROJECT_TIMEOUT),
            cluster_cache: PollSettings::new(poll::CACHE_INTERVAL, poll::CACHE_TIMEOUT),
            cluster_ready: PollSettings::new(poll::CLUSTER_INTERVAL, poll::CLUSTER_TIMEOUT),
            secret: PollSettings::new(poll::SECRET_INTERVAL, poll::SECRET_TIMEOUT),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GcpSettings {
    pub service_account: String,
    pub network: String,
    pub subnetwork: String,
}

/// Everything a provisioning run needs besides the seed client
#[derive(Debug, Clone)]
pub struct ProvisionConfig {
    pub project_name: String,
    pub cluster_name: String,
    pub machine_name: String,
    pub k8s_version: String,
    pub datacenter: String,
    pub gcp: GcpSettings,
    pub owner_email: String,
    pub cluster_readiness: ClusterReadiness,
    pub kubermatic_version: Option<String>,
    pub polls: PollProfile,
}

/// Operator configuration loaded from flags and environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub seed_kubeconfig: Vec<u8>,
    pub provision: ProvisionConfig,
}

impl Config {
    /// Load configuration from the command line, falling back to environment variables
    pub fn load() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    pub fn from_args(args: Args) -> Result<Self> {
        let seed_kubeconfig_path = args
            .seed_kubeconfig
            .ok_or_else(|| OutpostError::ConfigError("Seed kubeconfig is required".to_string()))?;
        let service_account_path = args.gcp_service_account.ok_or_else(|| {
            OutpostError::ConfigError("GCP service account is required".to_string())
        })?;
        let owner_email = args
            .owner_email
            .filter(|e| !e.is_empty())
            .ok_or_else(|| OutpostError::ConfigError("Owner email is required".to_string()))?;

        validate_version(&args.k8s_version)?;

        let seed_kubeconfig = read_file(&seed_kubeconfig_path)?;
        let service_account = String::from_utf8(read_file(&service_account_path)?).map_err(|_| {
            OutpostError::ConfigError(format!(
                "GCP service account {} is not valid UTF-8",
                service_account_path.display()
            ))
        })?;

        Ok(Config {
            seed_kubeconfig,
            provision: ProvisionConfig {
                project_name: args.project_name,
                cluster_name: args.cluster_name,
                machine_name: args.machine_name,
                k8s_version: args.k8s_version.trim_start_matches('v').to_string(),
                datacenter: args.datacenter,
                gcp: GcpSettings {
                    service_account,
                    network: args.gcp_network,
                    subnetwork: args.gcp_subnet,
                },
                owner_email,
                cluster_readiness: args.cluster_readiness,
                kubermatic_version: args.kubermatic_version,
                polls: PollProfile::default(),
            },
        })
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path)
        .map_err(|e| OutpostError::ConfigError(format!("Failed to read {}: {}", path.display(), e)))
}

/// Accept `MAJOR.MINOR.PATCH`, optionally prefixed with `v`
fn validate_version(version: &str) -> Result<()> {
    let parts: Vec<&str> = version.trim_start_matches('v').split('.').collect();
    let valid = parts.len() == 3
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()));

    if valid {
        Ok(())
    } else {
        Err(OutpostError::ConfigError(format!(
            "Invalid Kubernetes version '{}'",
            version
        )))
    }
}
