// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use super::bootstrap::CredentialBootstrapper;
use super::cluster::{create_cluster, ClusterRequest, ClusterRollout};
use super::machines::{build_machine_deployment, create_machine_deployment};
use super::project::create_project;
use super::workload::create_sample_workload;
use crate::config::ProvisionConfig;
use crate::error::Result;
use crate::kubernetes::{Connector, KubeconfigConnector};
use kube::{Client, ResourceExt};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

/// Identifiers of everything a successful run created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provisioned {
    pub project_id: String,
    pub cluster_id: String,
    pub machine_deployment: String,
}

/// Runs the provisioning stages in order against a seed cluster.
///
/// Stages are fail-fast: the first error ends the run and nothing that was
/// created before it is rolled back.
pub struct Provisioner<C = KubeconfigConnector> {
    seed: Client,
    config: ProvisionConfig,
    connector: C,
    cancel: CancellationToken,
}

impl Provisioner<KubeconfigConnector> {
    pub fn new(seed: Client, config: ProvisionConfig, cancel: CancellationToken) -> Self {
        Self::with_connector(seed, config, KubeconfigConnector, cancel)
    }
}

impl<C: Connector> Provisioner<C> {
    pub fn with_connector(
        seed: Client,
        config: ProvisionConfig,
        connector: C,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            seed,
            config,
            connector,
            cancel,
        }
    }

    #[instrument(skip(self), fields(project = %self.config.project_name, cluster = %self.config.cluster_name))]
    pub async fn run(&self) -> Result<Provisioned> {
        let config = &self.config;

        info!("Creating project '{}'", config.project_name);
        let project = create_project(
            &self.seed,
            &config.project_name,
            config.polls.project,
            &self.cancel,
        )
        .await?;
        let project_id = project.name_any();
        info!("Project {} is active", project_id);

        let request = ClusterRequest {
            display_name: &config.cluster_name,
            project_id: &project_id,
            version: &config.k8s_version,
            datacenter: &config.datacenter,
            gcp: &config.gcp,
        };
        let rollout = ClusterRollout {
            owner_email: &config.owner_email,
            readiness: config.cluster_readiness,
            kubermatic_version: config.kubermatic_version.as_deref(),
            polls: config.polls,
        };
        info!("Creating cluster '{}' in project {}", config.cluster_name, project_id);
        let cluster = create_cluster(&self.seed, &request, &rollout, &self.cancel).await?;
        let cluster_id = cluster.name_any();
        info!("Cluster {} is ready", cluster_id);

        let user = CredentialBootstrapper::new(
            &self.seed,
            &self.connector,
            config.polls.secret,
            &self.cancel,
        )
        .bootstrap(&cluster_id)
        .await?;

        let deployment = build_machine_deployment(
            &config.machine_name,
            &config.gcp.network,
            &config.gcp.subnetwork,
            &cluster,
        );
        let deployment = create_machine_deployment(&user, &deployment, &self.cancel).await?;

        create_sample_workload(&user, &self.cancel).await?;

        info!(
            "Provisioned project {} with cluster {}",
            project_id, cluster_id
        );
        Ok(Provisioned {
            project_id,
            cluster_id,
            machine_deployment: deployment.name_any(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClusterReadiness, GcpSettings, PollProfile};
    use crate::error::OutpostError;
    use crate::provision::workload::build_sample_pod;
    use crate::test_utils::{
        cluster_json, kubeconfig_yaml, not_found_json, project_json, secret_json, status_json,
        MockConnector, MockService,
    };
    use crate::types::Cluster;

    const PROJECTS: &str = "/apis/kubermatic.k8c.io/v1/projects";
    const PROJECT: &str = "/apis/kubermatic.k8c.io/v1/projects/p2c4b6d8f9";
    const CLUSTERS: &str = "/apis/kubermatic.k8c.io/v1/clusters";
    const CLUSTER: &str = "/apis/kubermatic.k8c.io/v1/clusters/c7d5b3x9k2";
    const SECRET: &str = "/api/v1/namespaces/cluster-c7d5b3x9k2/secrets/admin-kubeconfig";
    const MACHINE_DEPLOYMENTS: &str =
        "/apis/cluster.k8s.io/v1alpha1/namespaces/kube-system/machinedeployments";
    const PODS: &str = "/api/v1/namespaces/default/pods";

    fn config(readiness: ClusterReadiness) -> ProvisionConfig {
        ProvisionConfig {
            project_name: "sample-project".to_string(),
            cluster_name: "sample-cluster".to_string(),
            machine_name: "sample-machines".to_string(),
            k8s_version: "1.23.9".to_string(),
            datacenter: "gcp-westeurope-2".to_string(),
            gcp: GcpSettings {
                service_account: "{\"type\":\"service_account\"}".to_string(),
                network: "global/networks/default".to_string(),
                subnetwork: "regions/europe-west2/subnetworks/default".to_string(),
            },
            owner_email: "owner@example.com".to_string(),
            cluster_readiness: readiness,
            kubermatic_version: None,
            polls: PollProfile::default(),
        }
    }

    fn project(phase: &str) -> (u16, String) {
        (200, project_json("p2c4b6d8f9", "sample-project", Some(phase)))
    }

    fn cluster(phase: &str) -> (u16, String) {
        (200, cluster_json("c7d5b3x9k2", "p2c4b6d8f9", Some(phase)))
    }

    fn secret() -> (u16, String) {
        (
            200,
            secret_json(
                "cluster-c7d5b3x9k2",
                "admin-kubeconfig",
                &[(
                    "kubeconfig",
                    kubeconfig_yaml("https://c7d5b3x9k2.example.com:6443").as_bytes(),
                )],
            ),
        )
    }

    fn secret_missing() -> (u16, String) {
        (404, not_found_json("secrets", "admin-kubeconfig"))
    }

    fn seed_with_project() -> MockService {
        MockService::new()
            .on_post(
                PROJECTS,
                201,
                &project_json("p2c4b6d8f9", "sample-project", None),
            )
            .on_get_sequence(
                PROJECT,
                vec![project("Pending"), project("Pending"), project("Active")],
            )
    }

    fn seed_with_cluster(cluster_gets: Vec<(u16, String)>) -> MockService {
        seed_with_project()
            .on_post(
                CLUSTERS,
                201,
                &cluster_json("c7d5b3x9k2", "p2c4b6d8f9", None),
            )
            .on_get_sequence(CLUSTER, cluster_gets)
            .on_patch(
                &format!("{}/status", CLUSTER),
                200,
                &cluster_json("c7d5b3x9k2", "p2c4b6d8f9", Some("Pending")),
            )
    }

    fn user_cluster() -> MockService {
        let owner: Cluster =
            serde_json::from_str(&cluster_json("c7d5b3x9k2", "p2c4b6d8f9", None)).unwrap();
        let deployment = build_machine_deployment("sample-machines", "", "", &owner);

        MockService::new()
            .on_post(
                MACHINE_DEPLOYMENTS,
                201,
                &serde_json::to_string(&deployment).unwrap(),
            )
            .on_post(PODS, 201, &serde_json::to_string(&build_sample_pod()).unwrap())
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_provisions_everything() {
        let seed = seed_with_cluster(vec![
            cluster("Pending"),
            cluster("Pending"),
            cluster("Creating"),
            cluster("Creating"),
            cluster("Running"),
        ])
        .on_get_sequence(SECRET, vec![secret_missing(), secret_missing(), secret()]);
        let user = user_cluster();
        let connector = MockConnector::new(user.clone());

        let provisioned = Provisioner::with_connector(
            seed.client(),
            config(ClusterReadiness::Running),
            connector.clone(),
            CancellationToken::new(),
        )
        .run()
        .await
        .unwrap();

        assert_eq!(
            provisioned,
            Provisioned {
                project_id: "p2c4b6d8f9".to_string(),
                cluster_id: "c7d5b3x9k2".to_string(),
                machine_deployment: "sample-machines".to_string(),
            }
        );
        assert_eq!(seed.count("GET", PROJECT), 3);
        assert_eq!(seed.count("GET", CLUSTER), 5);
        assert_eq!(seed.count("PATCH", CLUSTER), 1);
        assert_eq!(seed.count("GET", SECRET), 3);
        assert_eq!(
            connector.servers(),
            vec!["https://c7d5b3x9k2.example.com:6443".to_string()]
        );

        let cluster_post = seed
            .requests()
            .into_iter()
            .find(|r| r.method == "POST" && r.path == CLUSTERS)
            .unwrap();
        let submitted: serde_json::Value = serde_json::from_str(&cluster_post.body).unwrap();
        assert_eq!(submitted["metadata"]["labels"]["project-id"], "p2c4b6d8f9");

        let user_requests = user.requests();
        assert_eq!(user_requests.len(), 2);
        assert_eq!(user_requests[0].path, MACHINE_DEPLOYMENTS);
        assert_eq!(user_requests[1].path, PODS);

        let machines: serde_json::Value = serde_json::from_str(&user_requests[0].body).unwrap();
        assert_eq!(machines["spec"]["template"]["spec"]["versions"]["kubelet"], "1.23.9");
        assert_eq!(
            machines["spec"]["template"]["spec"]["providerSpec"]["value"]["cloudProviderSpec"]
                ["network"],
            "global/networks/default"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_waits_for_initialized_cluster() {
        let mut initialized: serde_json::Value =
            serde_json::from_str(&cluster_json("c7d5b3x9k2", "p2c4b6d8f9", Some("Running")))
                .unwrap();
        initialized["status"]["conditions"] = serde_json::json!({
            "ClusterInitialized": { "status": "True" }
        });

        let seed = seed_with_cluster(vec![
            cluster("Pending"),
            cluster("Running"),
            (200, initialized.to_string()),
        ])
        .on_get_sequence(SECRET, vec![secret()]);
        let connector = MockConnector::new(user_cluster());

        let provisioned = Provisioner::with_connector(
            seed.client(),
            config(ClusterReadiness::Initialized),
            connector,
            CancellationToken::new(),
        )
        .run()
        .await
        .unwrap();

        assert_eq!(provisioned.cluster_id, "c7d5b3x9k2");
        assert_eq!(seed.count("GET", CLUSTER), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_times_out_waiting_for_kubeconfig() {
        let seed = seed_with_cluster(vec![cluster("Running")])
            .on_get_sequence(SECRET, vec![secret_missing()]);
        let user = user_cluster();
        let connector = MockConnector::new(user.clone());

        let err = Provisioner::with_connector(
            seed.client(),
            config(ClusterReadiness::Running),
            connector.clone(),
            CancellationToken::new(),
        )
        .run()
        .await
        .unwrap_err();

        assert!(err.is_timeout());
        assert!(err.to_string().contains("admin-kubeconfig"));
        assert!(connector.servers().is_empty());
        assert!(user.requests().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_when_cluster_rejected() {
        let seed = seed_with_project().on_post(
            CLUSTERS,
            422,
            &status_json(422, "Invalid", "spec.version: Unsupported value"),
        );
        let connector = MockConnector::new(user_cluster());

        let err = Provisioner::with_connector(
            seed.client(),
            config(ClusterReadiness::Running),
            connector.clone(),
            CancellationToken::new(),
        )
        .run()
        .await
        .unwrap_err();

        assert!(matches!(err, OutpostError::Submission { ref kind, .. } if kind == "Cluster"));
        assert_eq!(seed.count("GET", SECRET), 0);
        assert_eq!(seed.count("PATCH", CLUSTERS), 0);
        assert!(connector.servers().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_cancelled_before_start() {
        let seed = seed_with_project();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = Provisioner::with_connector(
            seed.client(),
            config(ClusterReadiness::Running),
            MockConnector::new(MockService::new()),
            cancel,
        )
        .run()
        .await
        .unwrap_err();

        assert!(matches!(err, OutpostError::Cancelled));
        assert!(seed.requests().is_empty());
    }
}
