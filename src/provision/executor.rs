//! Run one remote operation with start/success/failure narration.

use crate::azure::{Reply, Response};
use crate::error::RemoteError;
use crate::output::Narrator;
use reqwest::StatusCode;
use std::fmt;
use std::future::Future;

/// Why a step did not succeed: the status the service sent and/or the error raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    pub status: Option<StatusCode>,
    pub error: Option<RemoteError>,
}

impl StepFailure {
    fn from_reply<T>(reply: Reply<T>) -> StepFailure {
        match reply {
            Ok(response) => StepFailure {
                status: Some(response.status),
                error: None,
            },
            Err(error) => StepFailure {
                status: error.status(),
                error: Some(error),
            },
        }
    }

    /// Indented detail block written to the detail stream.
    pub fn detail(&self) -> String {
        failure_detail(self.status, self.error.as_ref())
    }
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.error, self.status) {
            (Some(error), _) => write!(f, "{error}"),
            (None, Some(status)) => write!(f, "unexpected status {status}"),
            (None, None) => f.write_str("unknown error"),
        }
    }
}

/// Status code and text when a status is known, the error when there is one,
/// and an unknown-error marker when neither is available.
pub fn failure_detail(status: Option<StatusCode>, error: Option<&RemoteError>) -> String {
    let mut detail = String::new();
    if let Some(status) = status {
        detail.push_str(&format!(
            "\tStatus Code: {}\n\tStatus: {}\n",
            status.as_u16(),
            status.canonical_reason().unwrap_or("")
        ));
    }
    if let Some(error) = error {
        detail.push_str(&format!("\tError: {error}\n"));
    }
    if detail.is_empty() {
        detail.push_str("An unknown error occurred.\n");
    }
    detail
}

/// Await `operation` once, narrating `"<label>..."` then `SUCCESS` or `FAILED`.
///
/// A reply only counts as success when no error was raised and the status is 2xx.
pub async fn execute<T, F>(
    narrator: &Narrator,
    label: &str,
    operation: F,
) -> Result<Response<T>, StepFailure>
where
    F: Future<Output = Reply<T>>,
{
    narrator.start(label);
    match operation.await {
        Ok(response) if response.status.is_success() => {
            narrator.success();
            log::info!("{label}: status={}", response.status);
            Ok(response)
        }
        reply => {
            let failure = StepFailure::from_reply(reply);
            narrator.failure(&failure.detail());
            log::warn!("{label}: {failure}");
            Err(failure)
        }
    }
}
