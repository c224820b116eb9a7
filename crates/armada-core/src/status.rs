//! Coarse lifecycle status for one apply call.
//!
//! Status is derived, never stored: the engine computes the in-flight value
//! before dispatch and the terminal value only after every target has
//! finished. A failed run reports the in-flight value alongside the error.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a fleet-wide apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    /// Install/apply dispatched, not yet known to have finished.
    Installing,
    /// Install/apply finished on every target.
    Installed,
    /// Removal dispatched, not yet known to have finished.
    Removing,
    /// Removal finished on every target.
    Removed,
}

impl Status {
    /// The "operation accepted, in flight" value for a run.
    pub fn in_flight(is_delete: bool) -> Self {
        if is_delete {
            Status::Removing
        } else {
            Status::Installing
        }
    }

    /// The value reported once every target finished without failure.
    pub fn terminal(is_delete: bool) -> Self {
        if is_delete {
            Status::Removed
        } else {
            Status::Installed
        }
    }

    /// Whether this is an absorbing end state.
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Installed | Status::Removed)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Installing => "installing",
            Status::Installed => "installed",
            Status::Removing => "removing",
            Status::Removed => "removed",
        };
        f.write_str(s)
    }
}
