// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Readiness probes for control plane objects.
//!
//! Whether "not found" is transient depends on the probe: objects we expect
//! to show up eventually are polled through 404s, while objects we already
//! know exist treat a 404 as a failure.

use crate::error::{OutpostError, Result};
use crate::kubernetes::wait::{self, PollSettings};
use crate::types::HasPhase;
use kube::{Api, Resource};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::cell::Cell;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

/// Bounds every kind handled by the probes
pub trait Probed: Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug {}

impl<K> Probed for K where K: Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug {}

fn kind_of<K: Probed>() -> String {
    K::kind(&()).into_owned()
}

/// Get an object that is expected to exist
pub async fn fetch<K: Probed>(api: &Api<K>, name: &str) -> Result<K> {
    api.get(name).await.map_err(|source| OutpostError::Fetch {
        kind: kind_of::<K>(),
        name: name.to_string(),
        source,
    })
}

/// Get an object that may not exist yet
async fn fetch_opt<K: Probed>(api: &Api<K>, name: &str) -> Result<Option<K>> {
    api.get_opt(name).await.map_err(|source| OutpostError::Fetch {
        kind: kind_of::<K>(),
        name: name.to_string(),
        source,
    })
}

/// Wait for a freshly created object to be readable back from the API.
///
/// Only covers the short window until the write reaches the read path, so
/// the first check happens after one interval.
#[instrument(skip(api, cancel))]
pub async fn wait_until_visible<K: Probed>(
    api: &Api<K>,
    name: &str,
    settings: PollSettings,
    cancel: &CancellationToken,
) -> Result<K> {
    let what = format!("{} '{}' to appear in the cache", kind_of::<K>(), name);
    let object = wait::poll(settings, cancel, &what, move || fetch_opt(api, name)).await?;
    debug!("{} '{}' is visible", kind_of::<K>(), name);
    Ok(object)
}

/// Wait for an object that some controller will create, checking right away.
#[instrument(skip(api, cancel))]
pub async fn wait_for_existence<K: Probed>(
    api: &Api<K>,
    name: &str,
    settings: PollSettings,
    cancel: &CancellationToken,
) -> Result<K> {
    let what = format!("{} '{}' to exist", kind_of::<K>(), name);
    wait::poll_immediate(settings, cancel, &what, move || fetch_opt(api, name)).await
}

/// Wait for an existing object to reach `target` phase.
///
/// Any fetch error, including not found, is fatal. Phases only move forward,
/// so observing a phase below one seen earlier fails the wait as well.
#[instrument(skip(api, cancel))]
pub async fn wait_for_phase<K>(
    api: &Api<K>,
    name: &str,
    target: K::Phase,
    settings: PollSettings,
    cancel: &CancellationToken,
) -> Result<K>
where
    K: Probed + HasPhase,
{
    let what = format!("{} '{}' to become {}", kind_of::<K>(), name, target);
    let highest: Cell<Option<K::Phase>> = Cell::new(None);
    let highest = &highest;

    let object = wait::poll_immediate(settings, cancel, &what, move || async move {
        let object = fetch(api, name).await?;
        let Some(observed) = object.phase() else {
            return Ok(None);
        };

        if let Some(previous) = highest.get() {
            if observed < previous {
                return Err(OutpostError::PhaseRegression {
                    kind: kind_of::<K>(),
                    name: name.to_string(),
                    from: previous.to_string(),
                    to: observed.to_string(),
                });
            }
        }
        highest.set(Some(observed));

        debug!("{} '{}' is in phase {}", kind_of::<K>(), name, observed);
        Ok((observed == target).then_some(object))
    })
    .await?;

    info!("{} '{}' reached phase {}", kind_of::<K>(), name, target);
    Ok(object)
}

/// Wait for an existing object to satisfy `check`, for readiness that is not
/// captured by a single phase value.
#[instrument(skip(api, cancel, check))]
pub async fn wait_until<K, F>(
    api: &Api<K>,
    name: &str,
    waiting_for: &str,
    settings: PollSettings,
    cancel: &CancellationToken,
    check: F,
) -> Result<K>
where
    K: Probed,
    F: Fn(&K) -> bool,
{
    let what = format!("{} '{}' to be {}", kind_of::<K>(), name, waiting_for);
    let check = &check;

    let object = wait::poll_immediate(settings, cancel, &what, move || async move {
        let object = fetch(api, name).await?;
        Ok(check(&object).then_some(object))
    })
    .await?;

    info!("{} '{}' is {}", kind_of::<K>(), name, waiting_for);
    Ok(object)
}
