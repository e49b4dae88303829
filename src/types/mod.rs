// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Declarative resource kinds submitted to the seed and user clusters.

pub mod cluster;
pub mod machine_deployment;
pub mod project;

use std::fmt::{Debug, Display};

pub use cluster::{Cluster, ClusterPhase};
pub use machine_deployment::MachineDeployment;
pub use project::{Project, ProjectPhase};

/// A resource whose status carries a lifecycle phase that only moves forward.
pub trait HasPhase {
    type Phase: PartialOrd + Copy + Debug + Display + Send + Sync;

    /// Observed phase, `None` until the control plane has set one
    fn phase(&self) -> Option<Self::Phase>;
}
