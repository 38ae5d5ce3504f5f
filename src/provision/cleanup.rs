//! Guaranteed deletion of the resource group created for a run.

use super::executor::{execute, StepFailure};
use crate::azure::{ResourceManager, Response};
use crate::models::ResourceGroup;
use crate::output::Narrator;
use tokio_util::sync::CancellationToken;

/// Release obligation for a created resource group.
///
/// Only obtainable once the group exists. [`CleanupGuard::release`] consumes the
/// guard, so deletion is requested at most once. A guard dropped without release
/// (a panic that escaped the run) is logged with the group name so it can be
/// removed by hand.
#[must_use = "the resource group is only deleted by CleanupGuard::release"]
#[derive(Debug)]
pub struct CleanupGuard {
    group: ResourceGroup,
    released: bool,
}

impl CleanupGuard {
    pub(crate) fn new(group: ResourceGroup) -> Self {
        log::debug!("cleanup registered for resource group '{}'", group.name);
        CleanupGuard {
            group,
            released: false,
        }
    }

    pub fn group(&self) -> &ResourceGroup {
        &self.group
    }

    /// Delete the resource group, narrating the result.
    ///
    /// Errors are returned for reporting only; deletion is never retried.
    pub async fn release<M>(
        mut self,
        client: &M,
        narrator: &Narrator,
        cancel: &CancellationToken,
    ) -> Result<Response, StepFailure>
    where
        M: ResourceManager + ?Sized,
    {
        self.released = true;
        let name = self.group.name.clone();
        execute(
            narrator,
            &release_label(&name),
            client.delete_resource_group(&name, cancel),
        )
        .await
    }
}

pub(crate) fn release_label(name: &str) -> String {
    format!("Deleting Resource Group '{name}'")
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        if !self.released {
            log::error!(
                "resource group '{}' was never deleted, remove it manually",
                self.group.name
            );
        }
    }
}
