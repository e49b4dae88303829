// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use super::HasPhase;
use kube::CustomResource;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[kube(group = "kubermatic.k8c.io", version = "v1", kind = "Project")]
#[kube(status = "ProjectStatus")]
#[serde(rename_all = "camelCase")]
pub struct ProjectSpec {
    /// Human readable name; the object name is the project ID
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<ProjectPhase>,
}

#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, schemars::JsonSchema,
)]
pub enum ProjectPhase {
    Pending,
    Active,
    Terminating,
    /// Any phase this client does not order, e.g. `Inactive`
    #[serde(other)]
    Unknown,
}

impl fmt::Display for ProjectPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProjectPhase::Pending => "Pending",
            ProjectPhase::Active => "Active",
            ProjectPhase::Terminating => "Terminating",
            ProjectPhase::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

impl HasPhase for Project {
    type Phase = ProjectPhase;

    fn phase(&self) -> Option<ProjectPhase> {
        self.status
            .as_ref()
            .and_then(|s| s.phase)
            .filter(|p| *p != ProjectPhase::Unknown)
    }
}
