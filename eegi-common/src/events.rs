//! Event types for the intake event system
//!
//! Provides shared event definitions and the EventBus that carries them from
//! the intake core to renderers and downstream views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Submission workflow state
///
/// Idle → Validating → Classifying → Uploading → Predicting → Succeeded → Idle.
/// Any step before Succeeded may drop to Failed, which also returns to Idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    /// No submission in flight
    Idle,
    /// Checking extension presence
    Validating,
    /// Assigning files to the six roles
    Classifying,
    /// Multipart upload in flight
    Uploading,
    /// Prediction request in flight
    Predicting,
    /// Prediction received and published
    Succeeded,
    /// Submission aborted (validation or network)
    Failed,
}

impl SubmissionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SubmissionState::Succeeded | SubmissionState::Failed)
    }
}

/// How a renderer should present a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// File-type problem (missing extension); rendered as a warning
    Validation,
    /// Anything else (capacity, missing role, network); rendered as an error
    General,
}

/// Intake event types
///
/// Events are broadcast via EventBus and can be serialized for transmission
/// to out-of-process renderers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum IntakeEvent {
    /// Intake list changed (add, remove or clear)
    FilesChanged {
        /// File names in list order
        names: Vec<String>,
        timestamp: DateTime<Utc>,
    },

    /// A notice replaced whatever was shown before
    NoticeShown {
        message: String,
        kind: NoticeKind,
        timestamp: DateTime<Utc>,
    },

    /// The visible notice was cleared (expired or dismissed)
    NoticeCleared { timestamp: DateTime<Utc> },

    /// Submission workflow moved between states
    SubmissionStateChanged {
        submission_id: Uuid,
        old_state: SubmissionState,
        new_state: SubmissionState,
        timestamp: DateTime<Utc>,
    },

    /// A prediction payload was written to the result store
    PredictionPublished {
        submission_id: Uuid,
        timestamp: DateTime<Utc>,
    },

    /// The downstream view should be shown
    NavigationRequested {
        route: String,
        timestamp: DateTime<Utc>,
    },
}

/// Broadcast bus for intake events
///
/// Cloning the bus yields another handle on the same channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<IntakeEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// * `capacity` - Number of events to buffer before lagging receivers
    ///   start dropping the oldest ones
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<IntakeEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: IntakeEvent,
    ) -> Result<usize, broadcast::error::SendError<IntakeEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: IntakeEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
