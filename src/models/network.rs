//! Resources created by the workflow.

use super::Cidr;
use serde::Serialize;
use std::fmt;

/// Container scoping the lifetime of everything else; deleting it cascades.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceGroup {
    pub name: String,
    pub location: String,
}

/// Virtual network owned by one resource group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualNetwork {
    pub name: String,
    pub address_space: Vec<Cidr>,
}

/// Network security group, created empty and filled with rules afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityGroup {
    pub name: String,
    pub rules: Vec<SecurityRule>,
}

/// A security group as it exists remotely, identified by its resource id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityGroupRef {
    pub name: String,
    pub id: String,
}

/// Subnet of the virtual network, enforced by the named security group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subnet {
    pub name: String,
    pub address_prefix: Cidr,
    /// Name of the [`SecurityGroup`] applied to this subnet.
    pub security_group: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    Inbound,
    Outbound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Access {
    Allow,
    Deny,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Protocol {
    Tcp,
    #[serde(rename = "*")]
    Any,
}

/// One allow/deny directive. Lower priority values are evaluated first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityRule {
    pub name: String,
    pub description: String,
    pub direction: Direction,
    pub access: Access,
    pub protocol: Protocol,
    pub source_address_prefix: String,
    pub source_port_range: String,
    pub destination_address_prefix: String,
    pub destination_port_range: String,
    pub priority: i32,
}

impl SecurityRule {
    /// Inbound TCP allow from anywhere to `port`.
    pub fn allow_inbound_tcp(name: &str, description: &str, port: &str, priority: i32) -> Self {
        SecurityRule {
            name: name.to_string(),
            description: description.to_string(),
            direction: Direction::Inbound,
            access: Access::Allow,
            protocol: Protocol::Tcp,
            source_address_prefix: "*".to_string(),
            source_port_range: "*".to_string(),
            destination_address_prefix: "*".to_string(),
            destination_port_range: port.to_string(),
            priority,
        }
    }

    pub fn from_source(mut self, prefix: &str) -> Self {
        self.source_address_prefix = prefix.to_string();
        self
    }
}

impl fmt::Display for SecurityRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:?} {:?} {:?} {}:{} -> {}:{} (priority {})",
            self.name,
            self.direction,
            self.access,
            self.protocol,
            self.source_address_prefix,
            self.source_port_range,
            self.destination_address_prefix,
            self.destination_port_range,
            self.priority
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_wire_names() {
        assert_eq!(serde_json::to_string(&Protocol::Tcp).unwrap(), "\"Tcp\"");
        assert_eq!(serde_json::to_string(&Protocol::Any).unwrap(), "\"*\"");
        assert_eq!(
            serde_json::to_string(&Direction::Outbound).unwrap(),
            "\"Outbound\""
        );
        assert_eq!(serde_json::to_string(&Access::Deny).unwrap(), "\"Deny\"");
    }

    #[test]
    fn test_allow_inbound_tcp_from_source() {
        let rule =
            SecurityRule::allow_inbound_tcp("ALLOW-SQL", "Allow SQL", "1433", 100)
                .from_source("192.168.1.0/24");
        assert_eq!(rule.direction, Direction::Inbound);
        assert_eq!(rule.access, Access::Allow);
        assert_eq!(rule.source_address_prefix, "192.168.1.0/24");
        assert_eq!(rule.destination_address_prefix, "*");
        assert_eq!(
            rule.to_string(),
            "ALLOW-SQL Inbound Allow Tcp 192.168.1.0/24:* -> *:1433 (priority 100)"
        );
    }
}
