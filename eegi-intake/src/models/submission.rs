//! Submission workflow state machine
//!
//! One `Submission` tracks a single run of the orchestrator from the moment
//! submit is accepted until it reaches a terminal state.

use chrono::{DateTime, Utc};
use eegi_common::events::SubmissionState;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// State transition record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub submission_id: Uuid,
    pub old_state: SubmissionState,
    pub new_state: SubmissionState,
    pub transitioned_at: DateTime<Utc>,
}

/// A single submission run (in-memory only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    /// Unique submission identifier, used to correlate log lines and events
    pub submission_id: Uuid,

    /// Current workflow state
    pub state: SubmissionState,

    /// File names in intake order at the time of submit
    pub file_names: Vec<String>,

    pub started_at: DateTime<Utc>,

    /// Set when a terminal state is reached
    pub ended_at: Option<DateTime<Utc>>,
}

impl Submission {
    pub fn new(file_names: Vec<String>) -> Self {
        Self {
            submission_id: Uuid::new_v4(),
            state: SubmissionState::Idle,
            file_names,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Transition to new state
    pub fn transition_to(&mut self, new_state: SubmissionState) -> StateTransition {
        let transition = StateTransition {
            submission_id: self.submission_id,
            old_state: self.state,
            new_state,
            transitioned_at: Utc::now(),
        };
        self.state = new_state;

        if new_state.is_terminal() {
            self.ended_at = Some(transition.transitioned_at);
        }

        transition
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Elapsed time in milliseconds (to end time if finished)
    pub fn elapsed_ms(&self) -> i64 {
        let end = self.ended_at.unwrap_or_else(Utc::now);
        (end - self.started_at).num_milliseconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_submission_is_idle() {
        let submission = Submission::new(vec!["a_restEO.vhdr".to_string()]);
        assert_eq!(submission.state, SubmissionState::Idle);
        assert!(submission.ended_at.is_none());
        assert!(!submission.is_terminal());
    }

    #[test]
    fn test_terminal_transition_sets_end_time() {
        let mut submission = Submission::new(Vec::new());
        submission.transition_to(SubmissionState::Validating);
        assert!(submission.ended_at.is_none());

        let transition = submission.transition_to(SubmissionState::Failed);
        assert_eq!(transition.old_state, SubmissionState::Validating);
        assert_eq!(transition.new_state, SubmissionState::Failed);
        assert_eq!(submission.ended_at, Some(transition.transitioned_at));
        assert!(submission.elapsed_ms() >= 0);
    }
}
