// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Bounded polling of readiness conditions.
//!
//! A condition resolves to `Ok(Some(value))` once satisfied, `Ok(None)` while
//! it is not yet satisfied, and `Err(_)` on a failure that must not be retried.

use crate::error::{OutpostError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Sampling interval and overall budget of a single wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollSettings {
    pub const fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }
}

/// Wait one interval, then evaluate `condition` until it is satisfied.
pub async fn poll<T, F, Fut>(
    settings: PollSettings,
    cancel: &CancellationToken,
    waiting_for: &str,
    condition: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    sleep(settings.interval, cancel).await?;
    poll_immediate(settings, cancel, waiting_for, condition).await
}

/// Evaluate `condition` right away, then once per interval until it is satisfied.
///
/// Gives up with [`OutpostError::Timeout`] once `settings.timeout` has passed
/// since the first evaluation. An evaluation that is still running when
/// `timeout + interval` has passed is abandoned, so the call never outlives
/// that bound.
pub async fn poll_immediate<T, F, Fut>(
    settings: PollSettings,
    cancel: &CancellationToken,
    waiting_for: &str,
    mut condition: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let start = Instant::now();
    let hard_deadline = start + settings.timeout + settings.interval;
    let timed_out = || OutpostError::Timeout {
        waiting_for: waiting_for.to_string(),
        timeout: settings.timeout,
    };

    loop {
        if cancel.is_cancelled() {
            return Err(OutpostError::Cancelled);
        }

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(OutpostError::Cancelled),
            outcome = time::timeout_at(hard_deadline, condition()) => match outcome {
                Ok(outcome) => outcome?,
                Err(_) => return Err(timed_out()),
            },
        };

        if let Some(value) = outcome {
            return Ok(value);
        }

        if start.elapsed() >= settings.timeout {
            return Err(timed_out());
        }

        trace!("Still waiting for {}, retrying in {:?}", waiting_for, settings.interval);
        sleep(settings.interval, cancel).await?;
    }
}

async fn sleep(interval: Duration, cancel: &CancellationToken) -> Result<()> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(OutpostError::Cancelled),
        _ = time::sleep(interval) => Ok(()),
    }
}
