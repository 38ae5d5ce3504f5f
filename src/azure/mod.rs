//! Azure Resource Manager interaction.
//!
//! - [`ResourceManager`] - the remote operations the workflow depends on
//! - [`auth`] - service principal token acquisition
//! - [`arm`] - REST implementation of [`ResourceManager`]

mod arm;
mod auth;
mod payload;

pub use arm::ArmClient;
pub use auth::{acquire_token, AccessToken};

use crate::error::RemoteError;
use crate::models::{
    ResourceGroup, SecurityGroup, SecurityGroupRef, SecurityRule, Subnet, VirtualNetwork,
};
use async_trait::async_trait;
use reqwest::StatusCode;
use tokio_util::sync::CancellationToken;

/// A reply from the service: its status plus whatever the call yields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response<T = ()> {
    pub status: StatusCode,
    pub body: T,
}

impl<T> Response<T> {
    pub fn new(status: StatusCode, body: T) -> Self {
        Response { status, body }
    }
}

impl Response<()> {
    pub fn empty(status: StatusCode) -> Self {
        Response { status, body: () }
    }
}

/// Result of one remote call.
pub type Reply<T = ()> = Result<Response<T>, RemoteError>;

/// Remote list/create/delete operations for the resources in a subscription.
///
/// Every call observes `cancel` and returns [`RemoteError::Cancelled`] once it fires.
/// Long-running operations resolve only after the service reports a terminal state.
#[async_trait]
pub trait ResourceManager: Send + Sync {
    /// Names of every resource group in the subscription.
    async fn list_resource_groups(&self, cancel: &CancellationToken) -> Reply<Vec<String>>;

    async fn create_resource_group(
        &self,
        group: &ResourceGroup,
        cancel: &CancellationToken,
    ) -> Reply;

    async fn delete_resource_group(&self, name: &str, cancel: &CancellationToken) -> Reply;

    async fn create_virtual_network(
        &self,
        group: &ResourceGroup,
        network: &VirtualNetwork,
        cancel: &CancellationToken,
    ) -> Reply;

    /// Create an empty security group; the reply carries its resource id.
    async fn create_security_group(
        &self,
        group: &ResourceGroup,
        security_group: &SecurityGroup,
        cancel: &CancellationToken,
    ) -> Reply<SecurityGroupRef>;

    async fn create_subnet(
        &self,
        group: &ResourceGroup,
        network: &str,
        subnet: &Subnet,
        security_group: &SecurityGroupRef,
        cancel: &CancellationToken,
    ) -> Reply;

    async fn create_security_rule(
        &self,
        group: &ResourceGroup,
        security_group: &str,
        rule: &SecurityRule,
        cancel: &CancellationToken,
    ) -> Reply;
}
