//! Ordered creation of the network resources, followed by guaranteed cleanup.
//!
//! Stages run one at a time:
//! resource group, virtual network, security groups, subnets, security rules.
//! The first failing stage stops creation. Once the resource group exists its
//! deletion always runs, after every other stage has settled.

use super::cleanup::{release_label, CleanupGuard};
use super::context::{Cancellation, RunContext};
use super::executor::{execute, StepFailure};
use super::hold::{hold_for_inspection, read_stdin_line};
use super::name::unique_resource_group_name;
use super::outcome::{RunOutcome, Stage, StepRecord};
use crate::azure::{Reply, ResourceManager, Response};
use crate::models::{ResourceGroup, SecurityGroupRef};
use crate::output::Narrator;
use futures::FutureExt;
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;

pub struct Provisioner<'a, M: ResourceManager + ?Sized> {
    client: &'a M,
    context: &'a RunContext,
    narrator: &'a Narrator,
    cancel: &'a Cancellation,
    outcome: RunOutcome,
}

impl<'a, M: ResourceManager + ?Sized> Provisioner<'a, M> {
    pub fn new(
        client: &'a M,
        context: &'a RunContext,
        narrator: &'a Narrator,
        cancel: &'a Cancellation,
    ) -> Self {
        Provisioner {
            client,
            context,
            narrator,
            cancel,
            outcome: RunOutcome::new(),
        }
    }

    /// Continue recording into an outcome that already holds earlier steps.
    pub fn with_outcome(mut self, outcome: RunOutcome) -> Self {
        self.outcome = outcome;
        self
    }

    /// Create everything, optionally wait, then delete the resource group.
    pub async fn run(mut self) -> RunOutcome {
        log::info!(
            "#Start provisioning location={} prefix={}",
            self.context.location,
            self.context.name_prefix
        );

        let Some(guard) = self.create_resource_group().await else {
            return self.outcome;
        };

        let stages = AssertUnwindSafe(self.provision_inside(guard.group()))
            .catch_unwind()
            .await;

        let label = release_label(&guard.group().name);
        let released = guard
            .release(self.client, self.narrator, &self.cancel.cleanup)
            .await;
        self.record(Stage::Cleanup, label, released.map(|r| Some(r.status)));

        if let Err(panic) = stages {
            std::panic::resume_unwind(panic);
        }
        log::info!("#End provisioning exit={:?}", self.outcome.exit_status());
        self.outcome
    }

    /// Allocate a name and create the resource group. `None` when either failed.
    async fn create_resource_group(&mut self) -> Option<CleanupGuard> {
        let client = self.client;
        let cancellation = self.cancel;
        let cancel = &cancellation.provision;

        let name = match unique_resource_group_name(client, &self.context.name_prefix, cancel).await
        {
            Ok(name) => name,
            Err(e) => {
                self.narrator.detail(&format!("{e}\n"));
                self.outcome.record(StepRecord::failed(
                    Stage::ResourceGroup,
                    "Allocating Resource Group name",
                    None,
                    Some(e.to_string()),
                ));
                return None;
            }
        };

        let group = ResourceGroup {
            name,
            location: self.context.location.clone(),
        };
        let label = format!("Creating Resource Group '{}'", group.name);
        // Cleanup token: after a first interrupt the group is still created and guarded.
        self.step(
            Stage::ResourceGroup,
            label,
            client.create_resource_group(&group, &cancellation.cleanup),
        )
        .await?;
        Some(CleanupGuard::new(group))
    }

    /// Network stages plus the optional inspection wait.
    async fn provision_inside(&mut self, group: &ResourceGroup) {
        match self.provision_network(group).await {
            Ok(()) => {
                hold_for_inspection(
                    self.context.hold,
                    self.narrator,
                    read_stdin_line(),
                    &self.cancel.provision,
                )
                .await;
            }
            Err(stage) => log::warn!("stopped at {stage:?}, skipping remaining stages"),
        }
    }

    async fn provision_network(&mut self, group: &ResourceGroup) -> Result<(), Stage> {
        let client = self.client;
        let context = self.context;
        let cancellation = self.cancel;
        let cancel = &cancellation.provision;
        let blueprint = &context.blueprint;
        let network = &blueprint.virtual_network;

        self.step(
            Stage::VirtualNetwork,
            format!("Creating Virtual Network '{}'", network.name),
            client.create_virtual_network(group, network, cancel),
        )
        .await
        .ok_or(Stage::VirtualNetwork)?;

        let mut security_groups: HashMap<&str, SecurityGroupRef> = HashMap::new();
        for security_group in &blueprint.security_groups {
            let created = self
                .step(
                    Stage::SecurityGroup,
                    format!("Creating Network Security Group '{}'", security_group.name),
                    client.create_security_group(group, security_group, cancel),
                )
                .await
                .ok_or(Stage::SecurityGroup)?;
            security_groups.insert(&security_group.name, created);
        }

        for subnet in &blueprint.subnets {
            let label = format!("Creating Subnet '{}'", subnet.name);
            let Some(security_group) = security_groups.get(subnet.security_group.as_str()) else {
                // Ruled out by blueprint validation; kept as a stage failure all the same.
                self.outcome.record(StepRecord::failed(
                    Stage::Subnet,
                    label,
                    None,
                    Some(format!("unknown security group '{}'", subnet.security_group)),
                ));
                return Err(Stage::Subnet);
            };
            self.step(
                Stage::Subnet,
                label,
                client.create_subnet(group, &network.name, subnet, security_group, cancel),
            )
            .await
            .ok_or(Stage::Subnet)?;
        }

        for security_group in &blueprint.security_groups {
            for rule in &security_group.rules {
                self.step(
                    Stage::SecurityRule,
                    format!("Creating Security Rule '{}'", rule.description),
                    client.create_security_rule(group, &security_group.name, rule, cancel),
                )
                .await
                .ok_or(Stage::SecurityRule)?;
            }
        }

        Ok(())
    }

    /// Run one remote operation through the executor and record the outcome.
    async fn step<T, F>(&mut self, stage: Stage, label: String, operation: F) -> Option<T>
    where
        F: Future<Output = Reply<T>>,
    {
        let result = execute(self.narrator, &label, operation).await;
        let (recorded, body) = match result {
            Ok(Response { status, body }) => (Ok(Some(status)), Some(body)),
            Err(failure) => (Err(failure), None),
        };
        self.record(stage, label, recorded);
        body
    }

    fn record(
        &mut self,
        stage: Stage,
        label: String,
        result: Result<Option<reqwest::StatusCode>, StepFailure>,
    ) {
        let step = match result {
            Ok(status) => StepRecord::succeeded(stage, label, status),
            Err(failure) => {
                StepRecord::failed(stage, label, failure.status, Some(failure.to_string()))
            }
        };
        self.outcome.record(step);
    }
}
