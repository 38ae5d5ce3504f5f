//! Fixed configuration values for the network security group workflow.

/// Region used when `--location` / `AZURE_LOCATION` is not given.
pub const DEFAULT_LOCATION: &str = "westus2";

/// Every resource group created by this tool starts with this prefix.
pub const RESOURCE_GROUP_PREFIX: &str = "networkSecurityGroupSample";

pub const VIRTUAL_NETWORK_NAME: &str = "sampleVirtualNetwork";
pub const VIRTUAL_NETWORK_CIDR: &str = "192.168.0.0/16";

pub const FRONTEND_GROUP: &str = "frontend";
pub const BACKEND_GROUP: &str = "backend";

pub const FRONTEND_SUBNET: &str = "frontendSubnet";
pub const FRONTEND_SUBNET_CIDR: &str = "192.168.1.0/24";
pub const BACKEND_SUBNET: &str = "backendSubnet";
pub const BACKEND_SUBNET_CIDR: &str = "192.168.2.0/24";

/// Azure Resource Manager endpoint and token scope.
pub const ARM_ENDPOINT: &str = "https://management.azure.com";
pub const ARM_SCOPE: &str = "https://management.azure.com/.default";

pub const RESOURCES_API_VERSION: &str = "2021-04-01";
pub const NETWORK_API_VERSION: &str = "2023-09-01";

/// Wait between long-running operation polls when the service sends no `Retry-After`.
pub const POLL_INTERVAL_MSEC: u64 = 2_000;

/// Upper bound on a service supplied `Retry-After`, in seconds.
pub const MAX_RETRY_AFTER_SEC: u64 = 60;

/// log4rs configuration file, relative to the working directory.
pub const LOG_CONFIG_FILE: &str = "log4rs.yml";
