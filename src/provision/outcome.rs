//! Record of every attempted step and the exit status derived from it.

use reqwest::StatusCode;
use std::fmt;
use std::process::ExitCode;

/// Where in the run a step belongs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Authentication,
    ResourceGroup,
    VirtualNetwork,
    SecurityGroup,
    Subnet,
    SecurityRule,
    Cleanup,
}

impl Stage {
    /// Exit status of a run whose first failure happened at this stage.
    pub fn failure_status(self) -> ExitStatus {
        match self {
            Stage::Authentication => ExitStatus::AuthenticationFailure,
            Stage::ResourceGroup => ExitStatus::ResourceGroupCreationFailure,
            Stage::VirtualNetwork => ExitStatus::VirtualNetworkCreationFailure,
            Stage::SecurityGroup => ExitStatus::SecurityGroupCreationFailure,
            Stage::SecurityRule => ExitStatus::SecurityRuleCreationFailure,
            Stage::Subnet => ExitStatus::SubnetCreationFailure,
            // Cleanup failures are reported but never change the outcome.
            Stage::Cleanup => ExitStatus::Success,
        }
    }
}

/// Process exit statuses, one per stage that can fail first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitStatus {
    Success = 0,
    AuthenticationFailure = 1,
    ResourceGroupCreationFailure = 2,
    VirtualNetworkCreationFailure = 3,
    SecurityGroupCreationFailure = 4,
    SecurityRuleCreationFailure = 5,
    SubnetCreationFailure = 6,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status.code())
    }
}

/// One attempted step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub stage: Stage,
    pub label: String,
    pub succeeded: bool,
    pub status: Option<StatusCode>,
    pub error: Option<String>,
}

impl StepRecord {
    pub fn succeeded(stage: Stage, label: impl Into<String>, status: Option<StatusCode>) -> Self {
        StepRecord {
            stage,
            label: label.into(),
            succeeded: true,
            status,
            error: None,
        }
    }

    pub fn failed(
        stage: Stage,
        label: impl Into<String>,
        status: Option<StatusCode>,
        error: Option<String>,
    ) -> Self {
        StepRecord {
            stage,
            label: label.into(),
            succeeded: false,
            status,
            error,
        }
    }
}

impl fmt::Display for StepRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = if self.succeeded { "ok" } else { "failed" };
        write!(f, "{:?} '{}' {}", self.stage, self.label, result)?;
        if let Some(status) = self.status {
            write!(f, " status={}", status.as_u16())?;
        }
        if let Some(error) = &self.error {
            write!(f, " error={error}")?;
        }
        Ok(())
    }
}

/// Ordered record of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutcome {
    steps: Vec<StepRecord>,
}

impl RunOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, step: StepRecord) {
        log::info!("step: {step}");
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[StepRecord] {
        &self.steps
    }

    /// First failed step outside cleanup.
    pub fn first_failure(&self) -> Option<&StepRecord> {
        self.steps
            .iter()
            .find(|s| !s.succeeded && s.stage != Stage::Cleanup)
    }

    pub fn exit_status(&self) -> ExitStatus {
        self.first_failure()
            .map(|s| s.stage.failure_status())
            .unwrap_or(ExitStatus::Success)
    }

    /// Number of attempted steps in `stage`.
    pub fn count(&self, stage: Stage) -> usize {
        self.steps.iter().filter(|s| s.stage == stage).count()
    }
}
