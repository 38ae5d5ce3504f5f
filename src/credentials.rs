//! Service principal credentials read from the environment.

use crate::error::{ConfigError, CredentialProblem};
use std::fmt;
use uuid::Uuid;

pub const ENV_SUBSCRIPTION_ID: &str = "AZURE_SUBSCRIPTION_ID";
pub const ENV_TENANT_ID: &str = "AZURE_TENANT_ID";
pub const ENV_CLIENT_ID: &str = "AZURE_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "AZURE_CLIENT_SECRET";

/// Validated service principal credentials.
///
/// The three identifiers are stored in canonical lowercase hyphenated form.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub subscription_id: String,
    pub tenant_id: String,
    pub client_id: String,
    client_secret: String,
}

impl Credentials {
    /// Read credentials through `lookup`, collecting every problem before failing.
    ///
    /// # Arguments
    /// * `lookup` - Returns the value of an environment variable, if set
    ///
    /// # Returns
    /// * `Ok(Credentials)` - All four values present and the identifiers are GUIDs
    /// * `Err(ConfigError)` - One entry per missing or malformed value
    pub fn from_lookup<F>(lookup: F) -> Result<Credentials, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut problems = Vec::new();

        let tenant_id = read_guid(&lookup, "Azure Tenant ID", ENV_TENANT_ID, &mut problems);
        let subscription_id = read_guid(
            &lookup,
            "Azure Subscription ID",
            ENV_SUBSCRIPTION_ID,
            &mut problems,
        );
        let client_id = read_guid(&lookup, "Azure Client ID", ENV_CLIENT_ID, &mut problems);
        let client_secret = read_present(
            &lookup,
            "Azure Client Secret",
            ENV_CLIENT_SECRET,
            &mut problems,
        );

        match (subscription_id, tenant_id, client_id, client_secret) {
            (Some(subscription_id), Some(tenant_id), Some(client_id), Some(client_secret))
                if problems.is_empty() =>
            {
                Ok(Credentials {
                    subscription_id,
                    tenant_id,
                    client_id,
                    client_secret,
                })
            }
            _ => Err(ConfigError { problems }),
        }
    }

    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("subscription_id", &self.subscription_id)
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

fn read_present<F>(
    lookup: &F,
    pretty: &'static str,
    var: &'static str,
    problems: &mut Vec<CredentialProblem>,
) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        Some(value) if !value.trim().is_empty() => Some(value),
        _ => {
            problems.push(CredentialProblem::Missing { pretty, var });
            None
        }
    }
}

fn read_guid<F>(
    lookup: &F,
    pretty: &'static str,
    var: &'static str,
    problems: &mut Vec<CredentialProblem>,
) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = read_present(lookup, pretty, var, problems)?;
    match normalize_guid(&raw) {
        Some(guid) => Some(guid),
        None => {
            problems.push(CredentialProblem::NotAGuid { var });
            None
        }
    }
}

/// Parse any accepted GUID spelling (plain, hyphenated, braced, urn) into lowercase hyphenated form.
pub fn normalize_guid(raw: &str) -> Option<String> {
    Uuid::parse_str(raw.trim())
        .ok()
        .map(|id| id.hyphenated().to_string())
}
