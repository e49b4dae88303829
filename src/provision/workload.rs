// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use super::{submit, UserClusterClient};
use crate::error::Result;
use k8s_openapi::api::core::v1::{Container, ContainerPort, Pod, PodSpec};
use kube::api::ObjectMeta;
use kube::ResourceExt;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

const NAMESPACE: &str = "default";

pub fn build_sample_pod() -> Pod {
    Pod {
        metadata: ObjectMeta {
            name: Some("nginx".to_string()),
            namespace: Some(NAMESPACE.to_string()),
            ..Default::default()
        },
        spec: Some(PodSpec {
            containers: vec![Container {
                name: "nginx".to_string(),
                image: Some("nginx:1.14.2".to_string()),
                ports: Some(vec![ContainerPort {
                    container_port: 80,
                    ..Default::default()
                }]),
                ..Default::default()
            }],
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Run a sample nginx pod on the user cluster
#[instrument(skip_all)]
pub async fn create_sample_workload(
    user: &UserClusterClient,
    cancel: &CancellationToken,
) -> Result<Pod> {
    let pod = submit(&user.pods(NAMESPACE), &build_sample_pod(), cancel).await?;
    info!("Created pod {}/{}", NAMESPACE, pod.name_any());
    Ok(pod)
}
