// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for client creation, bounded polling and readiness probes.

pub mod client;
pub mod probes;
pub mod wait;

pub use client::{create_client_from_kubeconfig, parse_kubeconfig, Connector, KubeconfigConnector};
pub use wait::PollSettings;
