//! Typed failures for the fan-out engine.
//!
//! Per-target failures never cross the task boundary as panics or early
//! returns; they fan in after the join barrier and are merged into a single
//! [`AggregatedError`] that keeps every constituent failure.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::status::Status;

/// What went wrong on one target.
///
/// Collaborator detail is carried as rendered text, verbatim — the engine
/// does not interpret it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureKind {
    /// The target's descriptor could not produce a usable client.
    #[error("failed to construct client: {0}")]
    ClientConstruction(String),
    /// The remote operation itself failed.
    #[error("{0}")]
    Apply(String),
    /// The per-target deadline elapsed before the operation finished.
    #[error("did not complete within {0:?}")]
    TimedOut(Duration),
}

/// One target's failure, attributed by label.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{target}: {kind}")]
pub struct TargetFailure {
    /// Label of the failing target (name or positional fallback).
    pub target: String,
    /// The failure itself.
    pub kind: FailureKind,
}

impl TargetFailure {
    pub fn new(target: impl Into<String>, kind: FailureKind) -> Self {
        Self {
            target: target.into(),
            kind,
        }
    }
}

/// Union of every per-target failure from one fan-out call.
///
/// Always non-empty: [`AggregatedError::from_failures`] returns `None` for a
/// failure-free run. Equality is order-independent, since the join barrier
/// guarantees nothing about completion order.
#[derive(Debug, Clone, Error)]
pub struct AggregatedError {
    failures: Vec<TargetFailure>,
}

impl AggregatedError {
    /// Merge collected failures, or `None` when there are none.
    pub fn from_failures(failures: Vec<TargetFailure>) -> Option<Self> {
        if failures.is_empty() {
            None
        } else {
            Some(Self { failures })
        }
    }

    /// Every constituent failure, in completion order.
    pub fn failures(&self) -> &[TargetFailure] {
        &self.failures
    }

    /// Number of failed targets.
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// Always false: the collection is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl fmt::Display for AggregatedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} target(s) failed: ", self.failures.len())?;
        for (i, failure) in self.failures.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "[{failure}]")?;
        }
        Ok(())
    }
}

impl PartialEq for AggregatedError {
    fn eq(&self, other: &Self) -> bool {
        if self.failures.len() != other.failures.len() {
            return false;
        }
        let mut left: Vec<String> = self.failures.iter().map(|f| f.to_string()).collect();
        let mut right: Vec<String> = other.failures.iter().map(|f| f.to_string()).collect();
        left.sort();
        right.sort();
        left == right
    }
}

impl Eq for AggregatedError {}

/// The only error the engine's caller observes.
///
/// Carries the in-flight status the run never left, alongside the merged
/// per-target failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("apply stalled at status '{status}': {error}")]
pub struct DeployError {
    /// The in-flight status (Installing or Removing) at the time of failure.
    pub status: Status,
    /// Union of all per-target failures.
    #[source]
    pub error: AggregatedError,
}
