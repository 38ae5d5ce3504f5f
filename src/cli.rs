//! Command line arguments.

use crate::config;
use clap::Parser;

/// Create a resource group holding a virtual network, two network security groups,
/// two subnets and their security rules, then delete everything again.
///
/// Credentials come from AZURE_SUBSCRIPTION_ID, AZURE_TENANT_ID, AZURE_CLIENT_ID
/// and AZURE_CLIENT_SECRET (a `.env` file is honoured).
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(version, about)]
pub struct Args {
    /// Prevents status messages from being printed to stdout.
    #[arg(long)]
    pub quiet: bool,

    /// After all assets are created, wait for the user to press Enter before removing them.
    #[arg(long)]
    pub pause: bool,

    /// Alternative to --pause: wait this many seconds before removing all assets.
    #[arg(long, value_name = "SECONDS", default_value_t = 0)]
    pub delay: u64,

    /// Azure region for every created resource.
    #[arg(long, env = "AZURE_LOCATION", default_value = config::DEFAULT_LOCATION)]
    pub location: String,
}
