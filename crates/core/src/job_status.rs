//! Job lifecycle state machine.
//!
//! ```text
//! pending ──▶ processing ──▶ completed
//!                  │
//!                  └───────▶ failed
//! ```
//!
//! Every status mutation must go through [`JobStatus::transition_to`]; it is
//! the single place where transition legality is decided.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Lifecycle status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Stored and wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    /// Completed and failed jobs never change again.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Statuses reachable from `self` in one step.
    pub fn valid_transitions(self) -> &'static [JobStatus] {
        match self {
            JobStatus::Pending => &[JobStatus::Processing],
            JobStatus::Processing => &[JobStatus::Completed, JobStatus::Failed],
            JobStatus::Completed | JobStatus::Failed => &[],
        }
    }

    pub fn can_transition_to(self, next: JobStatus) -> bool {
        self.valid_transitions().contains(&next)
    }

    /// Validate a move to `next`, returning `next` on success.
    pub fn transition_to(self, next: JobStatus) -> Result<JobStatus, CoreError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CoreError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "processing" => Ok(JobStatus::Processing),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            _ => Err(format!("unknown job status: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const ALL: [JobStatus; 4] = [
        JobStatus::Pending,
        JobStatus::Processing,
        JobStatus::Completed,
        JobStatus::Failed,
    ];

    // -----------------------------------------------------------------------
    // Valid transitions
    // -----------------------------------------------------------------------

    #[test]
    fn pending_to_processing() {
        assert!(JobStatus::Pending.can_transition_to(JobStatus::Processing));
    }

    #[test]
    fn processing_to_completed() {
        assert!(JobStatus::Processing.can_transition_to(JobStatus::Completed));
    }

    #[test]
    fn processing_to_failed() {
        assert!(JobStatus::Processing.can_transition_to(JobStatus::Failed));
    }

    // -----------------------------------------------------------------------
    // Terminal states have no outgoing transitions
    // -----------------------------------------------------------------------

    #[test]
    fn terminal_states_have_no_transitions() {
        for status in ALL.into_iter().filter(|s| s.is_terminal()) {
            assert!(status.valid_transitions().is_empty(), "{status}");
            for next in ALL {
                assert!(!status.can_transition_to(next), "{status} -> {next}");
            }
        }
    }

    // -----------------------------------------------------------------------
    // Invalid transitions
    // -----------------------------------------------------------------------

    #[test]
    fn pending_cannot_skip_processing() {
        assert!(!JobStatus::Pending.can_transition_to(JobStatus::Completed));
        assert!(!JobStatus::Pending.can_transition_to(JobStatus::Failed));
    }

    #[test]
    fn processing_cannot_revert_to_pending() {
        assert!(!JobStatus::Processing.can_transition_to(JobStatus::Pending));
    }

    #[test]
    fn self_transitions_are_rejected() {
        for status in ALL {
            assert!(!status.can_transition_to(status), "{status}");
        }
    }

    #[test]
    fn transition_to_reports_both_ends() {
        let err = JobStatus::Completed
            .transition_to(JobStatus::Processing)
            .unwrap_err();
        assert_matches!(
            err,
            CoreError::InvalidTransition {
                from: JobStatus::Completed,
                to: JobStatus::Processing,
            }
        );
        assert_eq!(err.to_string(), "Invalid transition: completed -> processing");
    }

    #[test]
    fn transition_to_returns_next_on_success() {
        assert_eq!(
            JobStatus::Pending.transition_to(JobStatus::Processing).unwrap(),
            JobStatus::Processing
        );
    }

    // -----------------------------------------------------------------------
    // String representation
    // -----------------------------------------------------------------------

    #[test]
    fn as_str_round_trips_through_from_str() {
        for status in ALL {
            assert_eq!(status.as_str().parse::<JobStatus>().unwrap(), status);
        }
        assert!("running".parse::<JobStatus>().is_err());
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&JobStatus::Processing).unwrap();
        assert_eq!(json, "\"processing\"");
    }
}
