// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Provisioning stages, from project to sample workload.

pub mod bootstrap;
pub mod cluster;
pub mod machines;
pub mod orchestrator;
pub mod project;
pub mod workload;

pub use bootstrap::{CredentialBootstrapper, UserClusterClient};
pub use orchestrator::{Provisioned, Provisioner};

use crate::constants::ID_LENGTH;
use crate::error::{OutpostError, Result};
use kube::api::PostParams;
use kube::{Api, Resource, ResourceExt};
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use tokio_util::sync::CancellationToken;

const ID_ALPHABET: &[u8] = b"bcdfghjklmnpqrstvwxz2456789";

/// Generate a random object name in the control plane's ID format
pub fn generate_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LENGTH)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

/// Create an object, failing without retry if the API rejects it
pub(crate) async fn submit<K>(api: &Api<K>, object: &K, cancel: &CancellationToken) -> Result<K>
where
    K: Resource<DynamicType = ()> + Clone + Serialize + DeserializeOwned + Debug,
{
    let params = PostParams::default();
    let created = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(OutpostError::Cancelled),
        created = api.create(&params, object) => created,
    };

    created.map_err(|source| OutpostError::Submission {
        kind: K::kind(&()).into_owned(),
        name: object.name_any(),
        source,
    })
}
