//! The provisioning workflow.
//!
//! - [`name`] - unique resource group name allocation
//! - [`executor`] - one narrated remote step with success classification
//! - [`cleanup`] - scoped deletion of the resource group
//! - [`orchestrator`] - stage ordering and short-circuit on failure
//! - [`outcome`] - step records and the derived exit status
//! - [`hold`] - optional pause or delay before teardown

mod cleanup;
mod context;
mod executor;
mod hold;
mod name;
mod orchestrator;
mod outcome;

pub use cleanup::CleanupGuard;
pub use context::{Cancellation, RunContext};
pub use executor::{execute, failure_detail, StepFailure};
pub use hold::{hold_for_inspection, read_line_detached, read_stdin_line, Hold};
pub use name::{allocate_name, unique_resource_group_name};
pub use orchestrator::Provisioner;
pub use outcome::{ExitStatus, RunOutcome, Stage, StepRecord};
