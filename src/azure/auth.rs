//! Service principal authentication against Azure Active Directory.

use crate::config;
use crate::credentials::Credentials;
use crate::error::AuthError;
use azure_core::auth::TokenCredential;
use azure_identity::{ClientSecretCredential, TokenCredentialOptions};
use std::fmt;

/// Bearer token for Resource Manager, obtained once per process.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Result<AccessToken, AuthError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(AuthError::EmptyToken);
        }
        Ok(AccessToken(token))
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Exchange the client secret for a Resource Manager token.
pub async fn acquire_token(credentials: &Credentials) -> Result<AccessToken, AuthError> {
    log::info!(
        "Requesting token tenant={} client={}",
        credentials.tenant_id,
        credentials.client_id
    );
    let credential = client_secret_credential(credentials);
    let token = credential.get_token(&[config::ARM_SCOPE]).await?;
    log::debug!("Token acquired, expires_on={}", token.expires_on);
    AccessToken::new(token.token.secret())
}

/// Credential against the public cloud authority. Builds without any network traffic.
fn client_secret_credential(credentials: &Credentials) -> ClientSecretCredential {
    ClientSecretCredential::new(
        azure_core::new_http_client(),
        credentials.tenant_id.clone(),
        credentials.client_id.clone(),
        credentials.client_secret().to_string(),
        TokenCredentialOptions::default(),
    )
}
