//! Immutable per-run configuration and cancellation handles.

use super::hold::Hold;
use crate::cli::Args;
use crate::config;
use crate::error::AuthError;
use crate::models::Blueprint;
use tokio_util::sync::CancellationToken;

/// Everything the orchestrator needs to know, built once before any remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    pub location: String,
    pub name_prefix: String,
    pub blueprint: Blueprint,
    pub hold: Hold,
}

impl RunContext {
    /// Build the context from the command line, validating the blueprint.
    pub fn from_args(args: &Args) -> Result<RunContext, AuthError> {
        let blueprint = Blueprint::sample().map_err(|e| AuthError::Blueprint(e.to_string()))?;
        RunContext::new(
            &args.location,
            config::RESOURCE_GROUP_PREFIX,
            blueprint,
            Hold::from_flags(args.pause, args.delay),
        )
    }

    pub fn new(
        location: &str,
        name_prefix: &str,
        blueprint: Blueprint,
        hold: Hold,
    ) -> Result<RunContext, AuthError> {
        blueprint.validate().map_err(AuthError::Blueprint)?;
        if location.trim().is_empty() {
            return Err(AuthError::Blueprint("location is empty".to_string()));
        }
        Ok(RunContext {
            location: location.trim().to_string(),
            name_prefix: name_prefix.to_string(),
            blueprint,
            hold,
        })
    }
}

/// Cancellation for the two phases of a run.
///
/// `provision` aborts creation (and the inspection wait); `cleanup` aborts deletion.
/// They are separate so that interrupting creation still lets deletion run.
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    pub provision: CancellationToken,
    pub cleanup: CancellationToken,
}

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    /// First call cancels provisioning, any later call cancels cleanup as well.
    pub fn escalate(&self) {
        if self.provision.is_cancelled() {
            log::warn!("second interrupt, abandoning cleanup");
            self.cleanup.cancel();
        } else {
            log::warn!("interrupt received, stopping provisioning");
            self.provision.cancel();
        }
    }

    /// Escalate on every ctrl_c, and on SIGTERM where supported.
    ///
    /// Must be called inside a tokio runtime.
    pub fn listen_for_signals(&self) {
        let interrupts = self.clone();
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                interrupts.escalate();
            }
        });

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut terminate) => {
                    let interrupts = self.clone();
                    tokio::spawn(async move {
                        while terminate.recv().await.is_some() {
                            interrupts.escalate();
                        }
                    });
                }
                Err(e) => log::error!("Failed to install SIGTERM handler: {e}"),
            }
        }
    }
}
