//! Request and response bodies of the Resource Manager REST API.

use crate::models::{Access, Cidr, Direction, Protocol, SecurityRule, Subnet, VirtualNetwork};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Debug)]
pub struct LocationBody<'a> {
    pub location: &'a str,
}

#[derive(Serialize, Debug)]
pub struct VirtualNetworkBody<'a> {
    pub location: &'a str,
    pub properties: VirtualNetworkProperties<'a>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct VirtualNetworkProperties<'a> {
    pub address_space: AddressSpace<'a>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AddressSpace<'a> {
    pub address_prefixes: &'a [Cidr],
}

impl<'a> VirtualNetworkBody<'a> {
    pub fn new(location: &'a str, network: &'a VirtualNetwork) -> Self {
        VirtualNetworkBody {
            location,
            properties: VirtualNetworkProperties {
                address_space: AddressSpace {
                    address_prefixes: &network.address_space,
                },
            },
        }
    }
}

#[derive(Serialize, Debug)]
pub struct SubnetBody<'a> {
    pub properties: SubnetProperties<'a>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SubnetProperties<'a> {
    pub address_prefix: Cidr,
    pub network_security_group: IdRef<'a>,
}

#[derive(Serialize, Debug)]
pub struct IdRef<'a> {
    pub id: &'a str,
}

impl<'a> SubnetBody<'a> {
    pub fn new(subnet: &Subnet, security_group_id: &'a str) -> Self {
        SubnetBody {
            properties: SubnetProperties {
                address_prefix: subnet.address_prefix,
                network_security_group: IdRef {
                    id: security_group_id,
                },
            },
        }
    }
}

#[derive(Serialize, Debug)]
pub struct SecurityRuleBody<'a> {
    pub properties: SecurityRuleProperties<'a>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SecurityRuleProperties<'a> {
    pub description: &'a str,
    pub access: Access,
    pub direction: Direction,
    pub protocol: Protocol,
    pub priority: i32,
    pub source_address_prefix: &'a str,
    pub source_port_range: &'a str,
    pub destination_address_prefix: &'a str,
    pub destination_port_range: &'a str,
}

impl<'a> From<&'a SecurityRule> for SecurityRuleBody<'a> {
    fn from(rule: &'a SecurityRule) -> Self {
        SecurityRuleBody {
            properties: SecurityRuleProperties {
                description: &rule.description,
                access: rule.access,
                direction: rule.direction,
                protocol: rule.protocol,
                priority: rule.priority,
                source_address_prefix: &rule.source_address_prefix,
                source_port_range: &rule.source_port_range,
                destination_address_prefix: &rule.destination_address_prefix,
                destination_port_range: &rule.destination_port_range,
            },
        }
    }
}

/// One page of `GET /subscriptions/{id}/resourcegroups`.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGroupPage {
    pub value: Vec<NamedResource>,
    pub next_link: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct NamedResource {
    pub name: String,
}

/// Body returned by a PUT; only the identity is used.
#[derive(Deserialize, Debug)]
pub struct CreatedResource {
    pub id: String,
    pub name: String,
}

#[derive(Deserialize, Debug)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

/// Document polled through the `Azure-AsyncOperation` header.
#[derive(Deserialize, Debug)]
pub struct AsyncOperationStatus {
    pub status: String,
    pub error: Option<ErrorDetail>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Blueprint;
    use serde_json::json;

    #[test]
    fn test_virtual_network_body() {
        let bp = Blueprint::sample().unwrap();
        let body = VirtualNetworkBody::new("westus2", &bp.virtual_network);
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "location": "westus2",
                "properties": {"addressSpace": {"addressPrefixes": ["192.168.0.0/16"]}}
            })
        );
    }

    #[test]
    fn test_subnet_body_references_group_id() {
        let bp = Blueprint::sample().unwrap();
        let body = SubnetBody::new(&bp.subnets[0], "/subscriptions/x/nsg/frontend");
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "properties": {
                    "addressPrefix": "192.168.1.0/24",
                    "networkSecurityGroup": {"id": "/subscriptions/x/nsg/frontend"}
                }
            })
        );
    }

    #[test]
    fn test_security_rule_body() {
        let bp = Blueprint::sample().unwrap();
        let deny = &bp.security_groups[1].rules[1];
        let value = serde_json::to_value(SecurityRuleBody::from(deny)).unwrap();
        assert_eq!(
            value,
            json!({
                "properties": {
                    "description": "Deny Outbound traffic",
                    "access": "Deny",
                    "direction": "Outbound",
                    "protocol": "*",
                    "priority": 100,
                    "sourceAddressPrefix": "*",
                    "sourcePortRange": "*",
                    "destinationAddressPrefix": "*",
                    "destinationPortRange": "*"
                }
            })
        );
    }

    #[test]
    fn test_resource_group_page() {
        let page: ResourceGroupPage = serde_json::from_value(json!({
            "value": [{"id": "/subscriptions/x/resourceGroups/a", "name": "a", "location": "westus2"}],
            "nextLink": "https://management.azure.com/next"
        }))
        .unwrap();
        assert_eq!(page.value[0].name, "a");
        assert_eq!(
            page.next_link.as_deref(),
            Some("https://management.azure.com/next")
        );
    }
}
