// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use super::{generate_id, submit};
use crate::error::Result;
use crate::kubernetes::probes;
use crate::kubernetes::PollSettings;
use crate::types::project::ProjectSpec;
use crate::types::{Project, ProjectPhase};
use kube::{Api, Client, ResourceExt};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

/// Create a project on the seed cluster and wait until it is active
#[instrument(skip(client, settings, cancel))]
pub async fn create_project(
    client: &Client,
    display_name: &str,
    settings: PollSettings,
    cancel: &CancellationToken,
) -> Result<Project> {
    let projects: Api<Project> = Api::all(client.clone());
    let project = Project::new(
        &generate_id(),
        ProjectSpec {
            name: display_name.to_string(),
        },
    );

    let created = submit(&projects, &project, cancel).await?;
    let id = created.name_any();
    info!("Created project '{}' with ID {}", display_name, id);

    probes::wait_for_phase(&projects, &id, ProjectPhase::Active, settings, cancel).await
}
