//! Outcome reports returned by setup and teardown.

use shared_types::ResourceTopology;

use super::steps::{SetupStep, TeardownStep};
use crate::error::ProvisionError;

/// Result of a setup run.
///
/// Setup never rolls back: resources created before a failing step are left
/// in place and listed in `completed`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetupReport {
    /// Bucket name used by this run (generated or configured).
    pub bucket_name: String,
    /// Steps that finished, in order.
    pub completed: Vec<SetupStep>,
    /// First failure; no later step ran.
    pub failure: Option<ProvisionError>,
    /// The finished topology; present only on success.
    pub topology: Option<ResourceTopology>,
}

impl SetupReport {
    pub(crate) fn new(bucket_name: impl Into<String>) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            completed: Vec::new(),
            failure: None,
            topology: None,
        }
    }

    /// Whether every step succeeded.
    pub fn succeeded(&self) -> bool {
        self.failure.is_none() && self.topology.is_some()
    }

    /// The step that failed, if any.
    pub fn failed_step(&self) -> Option<SetupStep> {
        match &self.failure {
            Some(ProvisionError::SetupStep { step, .. }) => Some(*step),
            _ => None,
        }
    }
}

/// What one teardown step did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The resource existed and was deleted.
    Removed,
    /// The resource did not exist; nothing to do.
    AlreadyAbsent,
    /// The step failed; later steps still ran.
    Failed(ProvisionError),
}

impl StepOutcome {
    /// Removed or already absent.
    pub fn is_satisfied(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }

    /// Stable label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Removed => "removed",
            Self::AlreadyAbsent => "already_absent",
            Self::Failed(_) => "failed",
        }
    }
}

/// Result of a teardown run: one outcome per step, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TeardownReport {
    pub bucket_name: String,
    pub steps: Vec<(TeardownStep, StepOutcome)>,
    /// Objects deleted while emptying the bucket.
    pub objects_deleted: usize,
}

impl TeardownReport {
    pub(crate) fn new(bucket_name: impl Into<String>) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            steps: Vec::with_capacity(TeardownStep::ALL.len()),
            objects_deleted: 0,
        }
    }

    pub(crate) fn record(&mut self, step: TeardownStep, outcome: StepOutcome) {
        self.steps.push((step, outcome));
    }

    /// Whether every step removed its resource or found it absent.
    pub fn succeeded(&self) -> bool {
        self.steps.iter().all(|(_, o)| o.is_satisfied())
    }

    /// Outcome of one step.
    pub fn outcome(&self, step: TeardownStep) -> Option<&StepOutcome> {
        self.steps.iter().find(|(s, _)| *s == step).map(|(_, o)| o)
    }
}
