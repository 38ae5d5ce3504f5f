//! Error types shared across the crate.
//!
//! - [`ConfigError`] - missing or malformed credential values (all collected)
//! - [`AuthError`] - token acquisition or pre-flight failure, fatal before any remote call
//! - [`RemoteError`] - a single Resource Manager call did not succeed
//! - [`NameError`] - the resource group name could not be allocated

use reqwest::StatusCode;
use std::fmt;
use thiserror::Error;

/// One problem with one credential environment variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialProblem {
    /// The variable is unset or empty.
    Missing {
        pretty: &'static str,
        var: &'static str,
    },
    /// The variable is set but is not a well-formed GUID.
    NotAGuid { var: &'static str },
}

impl fmt::Display for CredentialProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialProblem::Missing { pretty, var } => write!(
                f,
                "No value was provided to act as the {pretty}. Set environment variable \"{var}\""
            ),
            CredentialProblem::NotAGuid { var } => {
                write!(f, "argument '{var}' was not of type Uuid as expected")
            }
        }
    }
}

/// Every credential problem found while reading the environment.
#[derive(Debug, Error)]
#[error("{} invalid credential value(s)", problems.len())]
pub struct ConfigError {
    pub problems: Vec<CredentialProblem>,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token acquisition failed: {0}")]
    Token(#[from] azure_core::Error),
    #[error("access token was empty")]
    EmptyToken,
    #[error("http client could not be built: {0}")]
    Client(#[from] reqwest::Error),
    #[error("invalid network blueprint: {0}")]
    Blueprint(String),
}

/// Failure of a single remote call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The request never produced a response.
    #[error("{0}")]
    Transport(String),
    /// The service answered with a non-success status.
    #[error("{code}: {message}")]
    Api {
        status: StatusCode,
        code: String,
        message: String,
    },
    /// The service answered but the body could not be used.
    #[error("unusable response body: {message}")]
    Payload { status: StatusCode, message: String },
    #[error("operation cancelled")]
    Cancelled,
}

impl RemoteError {
    /// Status code carried by the error, when the service answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RemoteError::Api { status, .. } | RemoteError::Payload { status, .. } => Some(*status),
            RemoteError::Transport(_) | RemoteError::Cancelled => None,
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        RemoteError::Transport(e.to_string())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error("Bad response: {}", .0.as_u16())]
    BadResponse(StatusCode),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_message_names_variable() {
        let p = CredentialProblem::Missing {
            pretty: "Azure Tenant ID",
            var: "AZURE_TENANT_ID",
        };
        let msg = p.to_string();
        assert!(msg.contains("Azure Tenant ID"));
        assert!(msg.contains("\"AZURE_TENANT_ID\""));
    }

    #[test]
    fn test_remote_error_status() {
        let e = RemoteError::Api {
            status: StatusCode::CONFLICT,
            code: "Conflict".to_string(),
            message: "exists".to_string(),
        };
        assert_eq!(e.status(), Some(StatusCode::CONFLICT));
        assert_eq!(RemoteError::Cancelled.status(), None);
        assert_eq!(RemoteError::Transport("reset".into()).status(), None);
    }

    #[test]
    fn test_bad_response_message() {
        let e = NameError::BadResponse(StatusCode::ACCEPTED);
        assert_eq!(e.to_string(), "Bad response: 202");
    }
}
