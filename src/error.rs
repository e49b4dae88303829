// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutpostError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Failed to submit {kind} '{name}': {source}")]
    Submission {
        kind: String,
        name: String,
        #[source]
        source: kube::Error,
    },

    #[error("Failed to get {kind} '{name}': {source}")]
    Fetch {
        kind: String,
        name: String,
        #[source]
        source: kube::Error,
    },

    #[error("Timed out after {timeout:?} waiting for {waiting_for}")]
    Timeout {
        waiting_for: String,
        timeout: Duration,
    },

    #[error("{kind} '{name}' regressed from phase {from} to {to}")]
    PhaseRegression {
        kind: String,
        name: String,
        from: String,
        to: String,
    },

    #[error("Failed to parse kubeconfig: {0}")]
    KubeconfigError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Provisioning cancelled")]
    Cancelled,
}

impl OutpostError {
    /// True when the control plane answered but did not converge in time
    pub fn is_timeout(&self) -> bool {
        matches!(self, OutpostError::Timeout { .. })
    }
}

pub type Result<T> = std::result::Result<T, OutpostError>;
