//! Recording in-memory Resource Manager for the workflow tests.

#![allow(dead_code)]

use async_trait::async_trait;
use azure_nsg_provision::azure::{Reply, ResourceManager, Response};
use azure_nsg_provision::cli::Args;
use azure_nsg_provision::error::RemoteError;
use azure_nsg_provision::models::{
    ResourceGroup, SecurityGroup, SecurityGroupRef, SecurityRule, Subnet, VirtualNetwork,
};
use azure_nsg_provision::output::{MemorySink, Narrator};
use clap::Parser;
use reqwest::StatusCode;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

pub const SUBSCRIPTION: &str = "00000000-0000-0000-0000-000000000001";

/// The remote operations, used to target faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    List,
    CreateGroup,
    DeleteGroup,
    Network,
    SecurityGroup,
    Subnet,
    Rule,
}

/// One recorded call with the name of the resource it touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub op: Op,
    pub name: String,
}

/// What a targeted operation does instead of succeeding.
#[derive(Debug, Clone)]
pub enum Fault {
    /// Reply without error but with this status.
    Status(StatusCode),
    /// Raise this error.
    Error(RemoteError),
    /// Cancel the token, then report the cancellation.
    Trip(CancellationToken),
    /// Cancel the token while the call is in flight; the call then fails only if
    /// its own token was the one cancelled.
    InterruptDuring(CancellationToken),
    Panic,
}

/// Succeeds at everything unless told otherwise; records every call in order.
#[derive(Default)]
pub struct FakeManager {
    existing: Vec<String>,
    faults: HashMap<Op, Fault>,
    /// Fail only the n-th (0-based) call of the operation, instead of every call.
    nth: HashMap<Op, usize>,
    calls: CallLog,
}

/// Shared view of the calls, still readable after the fake was moved into a run.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    pub fn ops(&self) -> Vec<Op> {
        self.calls().into_iter().map(|c| c.op).collect()
    }

    pub fn count(&self, op: Op) -> usize {
        self.calls().iter().filter(|c| c.op == op).count()
    }

    pub fn names(&self, op: Op) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.op == op)
            .map(|c| c.name)
            .collect()
    }

    fn push(&self, op: Op, name: &str) -> usize {
        let mut calls = self.0.lock().unwrap();
        let seen = calls.iter().filter(|c| c.op == op).count();
        calls.push(Call {
            op,
            name: name.to_string(),
        });
        seen
    }
}

impl FakeManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_existing(mut self, names: &[&str]) -> Self {
        self.existing = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn failing(mut self, op: Op, fault: Fault) -> Self {
        self.faults.insert(op, fault);
        self
    }

    pub fn failing_nth(mut self, op: Op, n: usize, fault: Fault) -> Self {
        self.faults.insert(op, fault);
        self.nth.insert(op, n);
        self
    }

    pub fn log(&self) -> CallLog {
        self.calls.clone()
    }

    fn call<T>(&self, op: Op, name: &str, cancel: &CancellationToken, ok: Response<T>) -> Reply<T> {
        let seen = self.calls.push(op, name);
        if cancel.is_cancelled() {
            return Err(RemoteError::Cancelled);
        }
        let targeted = self.nth.get(&op).map_or(true, |n| *n == seen);
        match self.faults.get(&op) {
            Some(fault) if targeted => match fault {
                Fault::Status(status) => Ok(Response::new(*status, ok.body)),
                Fault::Error(error) => Err(error.clone()),
                Fault::Trip(token) => {
                    token.cancel();
                    Err(RemoteError::Cancelled)
                }
                Fault::InterruptDuring(token) => {
                    token.cancel();
                    if cancel.is_cancelled() {
                        Err(RemoteError::Cancelled)
                    } else {
                        Ok(ok)
                    }
                }
                Fault::Panic => panic!("injected panic in {op:?}"),
            },
            _ => Ok(ok),
        }
    }
}

#[async_trait]
impl ResourceManager for FakeManager {
    async fn list_resource_groups(&self, cancel: &CancellationToken) -> Reply<Vec<String>> {
        let existing = self.existing.clone();
        self.call(Op::List, SUBSCRIPTION, cancel, Response::new(StatusCode::OK, existing))
    }

    async fn create_resource_group(
        &self,
        group: &ResourceGroup,
        cancel: &CancellationToken,
    ) -> Reply {
        self.call(
            Op::CreateGroup,
            &group.name,
            cancel,
            Response::empty(StatusCode::CREATED),
        )
    }

    async fn delete_resource_group(&self, name: &str, cancel: &CancellationToken) -> Reply {
        self.call(Op::DeleteGroup, name, cancel, Response::empty(StatusCode::OK))
    }

    async fn create_virtual_network(
        &self,
        _group: &ResourceGroup,
        network: &VirtualNetwork,
        cancel: &CancellationToken,
    ) -> Reply {
        self.call(
            Op::Network,
            &network.name,
            cancel,
            Response::empty(StatusCode::CREATED),
        )
    }

    async fn create_security_group(
        &self,
        group: &ResourceGroup,
        security_group: &SecurityGroup,
        cancel: &CancellationToken,
    ) -> Reply<SecurityGroupRef> {
        let created = SecurityGroupRef {
            name: security_group.name.clone(),
            id: format!(
                "/subscriptions/{SUBSCRIPTION}/resourceGroups/{}/providers/Microsoft.Network/networkSecurityGroups/{}",
                group.name, security_group.name
            ),
        };
        self.call(
            Op::SecurityGroup,
            &security_group.name,
            cancel,
            Response::new(StatusCode::CREATED, created),
        )
    }

    async fn create_subnet(
        &self,
        _group: &ResourceGroup,
        _network: &str,
        subnet: &Subnet,
        _security_group: &SecurityGroupRef,
        cancel: &CancellationToken,
    ) -> Reply {
        self.call(
            Op::Subnet,
            &subnet.name,
            cancel,
            Response::empty(StatusCode::CREATED),
        )
    }

    async fn create_security_rule(
        &self,
        _group: &ResourceGroup,
        _security_group: &str,
        rule: &SecurityRule,
        cancel: &CancellationToken,
    ) -> Reply {
        self.call(
            Op::Rule,
            &rule.name,
            cancel,
            Response::empty(StatusCode::CREATED),
        )
    }
}

/// Environment with all four credential values set.
pub fn valid_env(var: &str) -> Option<String> {
    let value = match var {
        "AZURE_SUBSCRIPTION_ID" => SUBSCRIPTION,
        "AZURE_TENANT_ID" => "00000000-0000-0000-0000-000000000002",
        "AZURE_CLIENT_ID" => "00000000-0000-0000-0000-000000000003",
        "AZURE_CLIENT_SECRET" => "not-a-real-secret",
        _ => return None,
    };
    Some(value.to_string())
}

pub fn args(extra: &[&str]) -> Args {
    let mut argv = vec!["azure-nsg-provision", "--location", "westus2"];
    argv.extend_from_slice(extra);
    Args::parse_from(argv)
}

/// Narrator writing into memory: (narrator, status, detail).
pub fn narrator() -> (Narrator, MemorySink, MemorySink) {
    let (status, detail) = (MemorySink::new(), MemorySink::new());
    (
        Narrator::new(status.clone(), detail.clone(), MemorySink::new()),
        status,
        detail,
    )
}
