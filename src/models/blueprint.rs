//! The fixed network topology provisioned by the workflow.

use super::{Cidr, SecurityGroup, SecurityRule, Subnet, VirtualNetwork};
use crate::config;
use crate::models::{Access, Direction, Protocol};
use itertools::Itertools;
use std::collections::HashSet;
use std::error::Error;

/// Everything created inside the resource group, in creation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blueprint {
    pub virtual_network: VirtualNetwork,
    /// Security groups with their rules, frontend before backend.
    pub security_groups: Vec<SecurityGroup>,
    pub subnets: Vec<Subnet>,
}

impl Blueprint {
    /// Frontend/backend topology: two subnets, two security groups and five rules.
    pub fn sample() -> Result<Blueprint, Box<dyn Error>> {
        let frontend_prefix = config::FRONTEND_SUBNET_CIDR.parse::<Cidr>()?;
        let backend_prefix = config::BACKEND_SUBNET_CIDR.parse::<Cidr>()?;

        let frontend = SecurityGroup {
            name: config::FRONTEND_GROUP.to_string(),
            rules: vec![
                SecurityRule::allow_inbound_tcp("ALLOW-SSH", "Allow SSH", "22", 100),
                SecurityRule::allow_inbound_tcp("ALLOW-HTTP", "Allow HTTP", "80", 101),
                SecurityRule::allow_inbound_tcp("ALLOW-HTTPS", "Allow HTTPS", "443", 102),
            ],
        };
        let backend = SecurityGroup {
            name: config::BACKEND_GROUP.to_string(),
            rules: vec![
                SecurityRule::allow_inbound_tcp("ALLOW-SQL", "Allow SQL", "1433", 100)
                    .from_source(&frontend_prefix.to_string()),
                SecurityRule {
                    name: "DENY-OUT".to_string(),
                    description: "Deny Outbound traffic".to_string(),
                    direction: Direction::Outbound,
                    access: Access::Deny,
                    protocol: Protocol::Any,
                    source_address_prefix: "*".to_string(),
                    source_port_range: "*".to_string(),
                    destination_address_prefix: "*".to_string(),
                    destination_port_range: "*".to_string(),
                    priority: 100,
                },
            ],
        };

        Ok(Blueprint {
            virtual_network: VirtualNetwork {
                name: config::VIRTUAL_NETWORK_NAME.to_string(),
                address_space: vec![config::VIRTUAL_NETWORK_CIDR.parse::<Cidr>()?],
            },
            security_groups: vec![frontend, backend],
            subnets: vec![
                Subnet {
                    name: config::FRONTEND_SUBNET.to_string(),
                    address_prefix: frontend_prefix,
                    security_group: config::FRONTEND_GROUP.to_string(),
                },
                Subnet {
                    name: config::BACKEND_SUBNET.to_string(),
                    address_prefix: backend_prefix,
                    security_group: config::BACKEND_GROUP.to_string(),
                },
            ],
        })
    }

    /// Total number of security rules across all groups.
    pub fn rule_count(&self) -> usize {
        self.security_groups.iter().map(|g| g.rules.len()).sum()
    }

    /// Check the topology is internally consistent before anything is created.
    ///
    /// # Returns
    /// * `Ok(())` - Subnets fit the network, do not overlap, reference known groups,
    ///   and rule priorities are unique per group and direction
    /// * `Err(String)` - Every problem found, separated by `"; "`
    pub fn validate(&self) -> Result<(), String> {
        let mut problems = Vec::new();

        let group_names: HashSet<&str> = self
            .security_groups
            .iter()
            .map(|g| g.name.as_str())
            .collect();
        if group_names.len() != self.security_groups.len() {
            problems.push("security group names are not unique".to_string());
        }

        for subnet in &self.subnets {
            let inside = self
                .virtual_network
                .address_space
                .iter()
                .any(|space| space.contains(&subnet.address_prefix));
            if !inside {
                problems.push(format!(
                    "subnet '{}' {} is outside the address space of '{}'",
                    subnet.name, subnet.address_prefix, self.virtual_network.name
                ));
            }
            if !group_names.contains(subnet.security_group.as_str()) {
                problems.push(format!(
                    "subnet '{}' references unknown security group '{}'",
                    subnet.name, subnet.security_group
                ));
            }
        }

        for (a, b) in self.subnets.iter().tuple_combinations() {
            if a.address_prefix.overlaps(&b.address_prefix) {
                problems.push(format!(
                    "subnets '{}' {} and '{}' {} overlap",
                    a.name, a.address_prefix, b.name, b.address_prefix
                ));
            }
        }

        for group in &self.security_groups {
            let mut seen = HashSet::new();
            for rule in &group.rules {
                if !seen.insert((rule.direction, rule.priority)) {
                    problems.push(format!(
                        "security group '{}' has more than one {:?} rule with priority {}",
                        group.name, rule.direction, rule.priority
                    ));
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems.join("; "))
        }
    }
}
