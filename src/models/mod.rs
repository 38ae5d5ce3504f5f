//! Domain models for the network security group workflow.
//!
//! - [`Cidr`] - IPv4 block with containment and overlap checks
//! - [`ResourceGroup`], [`VirtualNetwork`], [`SecurityGroup`], [`Subnet`], [`SecurityRule`]
//! - [`Blueprint`] - the fixed topology created inside the resource group

mod blueprint;
mod cidr;
mod network;

pub use blueprint::Blueprint;
pub use cidr::{get_cidr_mask, Cidr, MAX_LENGTH};
pub use network::{
    Access, Direction, Protocol, ResourceGroup, SecurityGroup, SecurityGroupRef, SecurityRule,
    Subnet, VirtualNetwork,
};
