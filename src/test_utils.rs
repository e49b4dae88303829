// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for scripting Kubernetes API responses.

use crate::kubernetes::Connector;
use futures::future::BoxFuture;
use http::{Request, Response};
use http_body_util::BodyExt;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::api::ObjectMeta;
use kube::client::Body;
use kube::config::Kubeconfig;
use kube::Client;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

type Route = (String, String);

/// A request the mock received, in arrival order
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

/// A mock HTTP service that replays scripted responses per method and path.
///
/// Each route holds a queue of responses; every request consumes the head of
/// the queue except the last response, which repeats forever. Routes match on
/// exact path first and then on the longest registered prefix.
#[derive(Clone, Default)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<Route, VecDeque<(u16, String)>>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self::default()
    }

    fn on(self, method: &str, path: &str, responses: Vec<(u16, String)>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), responses.into());
        self
    }

    /// Add a response for GET requests matching the path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, vec![(status, body.to_string())])
    }

    /// Add responses returned in order for successive GET requests
    pub fn on_get_sequence(self, path: &str, responses: Vec<(u16, String)>) -> Self {
        self.on("GET", path, responses)
    }

    /// Add a response for POST requests matching the path
    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.on("POST", path, vec![(status, body.to_string())])
    }

    /// Add a response for PATCH requests matching the path
    pub fn on_patch(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PATCH", path, vec![(status, body.to_string())])
    }

    /// Build a kube Client backed by this mock; the mock keeps recording
    pub fn client(&self) -> Client {
        Client::new(self.clone(), "default")
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Count requests with the given method whose path starts with `path`
    pub fn count(&self, method: &str, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path.starts_with(path))
            .count()
    }

    fn next_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let mut responses = self.responses.lock().unwrap();

        let route = if responses.contains_key(&(method.to_string(), path.to_string())) {
            Some((method.to_string(), path.to_string()))
        } else {
            responses
                .keys()
                .filter(|(m, p)| m == method && path.starts_with(p.as_str()))
                .max_by_key(|(_, p)| p.len())
                .cloned()
        }?;

        let queue = responses.get_mut(&route)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();
        let response = self.next_response(&method, &path);
        let requests = self.requests.clone();

        Box::pin(async move {
            let body = req.into_body().collect().await?.to_bytes();
            requests.lock().unwrap().push(RecordedRequest {
                method,
                path: path.clone(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });

            let (status, body) = response.unwrap_or_else(|| (404, not_found_json("path", &path)));
            Ok::<_, tower::BoxError>(
                Response::builder()
                    .status(status)
                    .header("content-type", "application/json")
                    .body(Body::from(body.into_bytes()))
                    .unwrap(),
            )
        })
    }
}

/// Create an API status response
pub fn status_json(code: u16, reason: &str, message: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code
    })
    .to_string()
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    status_json(
        404,
        "NotFound",
        &format!("{} \"{}\" not found", resource, name),
    )
}

/// Create a mock Project JSON response
pub fn project_json(id: &str, display_name: &str, phase: Option<&str>) -> String {
    let mut project = serde_json::json!({
        "apiVersion": "kubermatic.k8c.io/v1",
        "kind": "Project",
        "metadata": { "name": id, "uid": "test-uid" },
        "spec": { "name": display_name }
    });
    if let Some(phase) = phase {
        project["status"] = serde_json::json!({ "phase": phase });
    }
    project.to_string()
}

/// Create a mock Cluster JSON response
pub fn cluster_json(id: &str, project_id: &str, phase: Option<&str>) -> String {
    let mut cluster = serde_json::json!({
        "apiVersion": "kubermatic.k8c.io/v1",
        "kind": "Cluster",
        "metadata": {
            "name": id,
            "uid": "test-uid",
            "labels": { "project-id": project_id }
        },
        "spec": {
            "humanReadableName": "sample-cluster",
            "version": "1.23.9",
            "cloud": { "dc": "gcp-westeurope-2" },
            "clusterNetwork": {
                "ipFamily": "IPv4",
                "proxyMode": "ipvs",
                "pods": { "cidrBlocks": ["172.25.0.0/16"] },
                "services": { "cidrBlocks": ["10.240.16.0/20"] }
            },
            "containerRuntime": "containerd"
        }
    });
    if let Some(phase) = phase {
        cluster["status"] = serde_json::json!({ "phase": phase });
    }
    cluster.to_string()
}

/// Create a kubeconfig document pointing at `server`
pub fn kubeconfig_yaml(server: &str) -> String {
    format!(
        r#"apiVersion: v1
kind: Config
clusters:
- name: user-cluster
  cluster:
    server: {server}
contexts:
- name: default
  context:
    cluster: user-cluster
    user: admin
current-context: default
users:
- name: admin
  user:
    token: test-token
"#
    )
}

/// Create a mock Secret JSON response with the given data entries
pub fn secret_json(namespace: &str, name: &str, data: &[(&str, &[u8])]) -> String {
    let secret = Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        data: Some(
            data.iter()
                .map(|(k, v)| (k.to_string(), ByteString(v.to_vec())))
                .collect::<BTreeMap<_, _>>(),
        ),
        ..Default::default()
    };
    serde_json::to_string(&secret).unwrap()
}

/// A connector that hands out clients backed by a mock user cluster
#[derive(Clone)]
pub struct MockConnector {
    user: MockService,
    servers: Arc<Mutex<Vec<String>>>,
}

impl MockConnector {
    pub fn new(user: MockService) -> Self {
        Self {
            user,
            servers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Server URLs of every kubeconfig this connector was asked to connect to
    pub fn servers(&self) -> Vec<String> {
        self.servers.lock().unwrap().clone()
    }
}

impl Connector for MockConnector {
    async fn connect(&self, kubeconfig: Kubeconfig) -> crate::error::Result<Client> {
        let server = kubeconfig
            .clusters
            .first()
            .and_then(|c| c.cluster.as_ref())
            .and_then(|c| c.server.clone())
            .unwrap_or_default();
        self.servers.lock().unwrap().push(server);
        Ok(self.user.client())
    }
}
