// cargo watch -x 'fmt' -x 'run'  // 'run -- --pause'

pub mod azure;
pub mod cli;
pub mod config;
pub mod credentials;
pub mod error;
pub mod models;
pub mod output;
pub mod provision;

use azure::ResourceManager;
use cli::Args;
use credentials::Credentials;
use error::AuthError;
use output::Narrator;
use provision::{Cancellation, Provisioner, RunContext, RunOutcome, Stage, StepRecord};
use std::future::Future;

const AUTH_LABEL: &str = "Authenticating";

/// Run the whole workflow: validate credentials, connect, provision and clean up.
///
/// # Arguments
/// * `args` - Parsed command line
/// * `lookup` - Environment reader used for the `AZURE_*` credential values
/// * `connect` - Builds the remote client from validated credentials and the location
/// * `narrator` - Operator output
/// * `cancel` - Provisioning and cleanup cancellation
///
/// # Returns
/// * `RunOutcome` - Every attempted step; `exit_status()` gives the process exit code
///
/// Nothing remote is attempted unless the credentials and the blueprint are valid
/// and `connect` succeeded.
pub async fn run<L, C, Fut, M>(
    args: &Args,
    lookup: L,
    connect: C,
    narrator: &Narrator,
    cancel: &Cancellation,
) -> RunOutcome
where
    L: Fn(&str) -> Option<String>,
    C: FnOnce(Credentials, String) -> Fut,
    Fut: Future<Output = Result<M, AuthError>>,
    M: ResourceManager,
{
    log::info!("#Start run() location={}", args.location);
    let mut outcome = RunOutcome::new();

    let credentials = match Credentials::from_lookup(lookup) {
        Ok(credentials) => credentials,
        Err(e) => {
            for problem in &e.problems {
                narrator.detail(&format!("Invalid argument. Details: {problem}\n"));
            }
            return authentication_failed(outcome, narrator, e.to_string());
        }
    };
    log::debug!("credentials: {credentials:?}");

    let context = match RunContext::from_args(args) {
        Ok(context) => context,
        Err(e) => {
            narrator.detail(&format!("{e}\n"));
            return authentication_failed(outcome, narrator, e.to_string());
        }
    };

    let client = match connect(credentials, context.location.clone()).await {
        Ok(client) => client,
        Err(e) => {
            log::error!("connect failed: {e}");
            narrator.detail(&format!("{e}\n"));
            return authentication_failed(outcome, narrator, e.to_string());
        }
    };
    outcome.record(StepRecord::succeeded(Stage::Authentication, AUTH_LABEL, None));

    Provisioner::new(&client, &context, narrator, cancel)
        .with_outcome(outcome)
        .run()
        .await
}

fn authentication_failed(mut outcome: RunOutcome, narrator: &Narrator, error: String) -> RunOutcome {
    narrator.detail("Fatal Error: Authentication Failed.\n");
    outcome.record(StepRecord::failed(
        Stage::Authentication,
        AUTH_LABEL,
        None,
        Some(error),
    ));
    outcome
}
