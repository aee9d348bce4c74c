//! Error types for the intake core
//!
//! Every core error is recoverable: it becomes a user-visible notice and the
//! widget returns to Idle. `IntakeError::notice` is the single place that maps
//! an error to the text and kind shown to the user.

use crate::models::{NoticeKind, Role};
use thiserror::Error;

/// Maximum number of files the intake list may hold
pub const MAX_FILES: usize = 6;

pub const MISSING_ROLE_MESSAGE: &str = "Missing required files. Please upload all six files.";
pub const NETWORK_FAILURE_MESSAGE: &str =
    "An error occurred while uploading files. Please try again.";

/// Intake error type
#[derive(Debug, Error)]
pub enum IntakeError {
    /// Adding the batch would push the list past `MAX_FILES`
    #[error("Adding {attempted} file(s) to {current} would exceed the limit of {max}", max = MAX_FILES)]
    CapacityExceeded { current: usize, attempted: usize },

    /// One or more required extensions are absent
    #[error("Missing required extensions: {}", .0.join(", "))]
    MissingExtension(Vec<&'static str>),

    /// Extensions are present but at least one role is unfilled
    #[error("Missing roles: {}", format_roles(.0))]
    MissingRole(Vec<Role>),

    /// Upload or prediction request failed, or returned an unexpected shape
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    /// A submission is already in flight
    #[error("A submission is already in progress")]
    Busy,

    /// The widget was torn down while a request was in flight
    #[error("Submission cancelled")]
    Cancelled,

    /// No file at the requested position
    #[error("No file at index {index} (list has {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// IO error (loading or saving files)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Common error: {0}")]
    Common(#[from] eegi_common::Error),
}

fn format_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(|r| r.key())
        .collect::<Vec<_>>()
        .join(", ")
}

impl IntakeError {
    /// Text and kind of the notice this error produces, if any
    ///
    /// `Busy` and `Cancelled` are silent: the first is a no-op at the
    /// renderer, the second happens after the renderer is gone.
    pub fn notice(&self) -> Option<(String, NoticeKind)> {
        match self {
            IntakeError::CapacityExceeded { .. } => Some((
                format!(
                    "Please remove some files in the queue. Only {} files are allowed.",
                    MAX_FILES
                ),
                NoticeKind::General,
            )),
            IntakeError::MissingExtension(missing) => Some((
                format!("Missing required files: {}", missing.join(", ")),
                NoticeKind::Validation,
            )),
            IntakeError::MissingRole(_) => {
                Some((MISSING_ROLE_MESSAGE.to_string(), NoticeKind::General))
            }
            IntakeError::NetworkFailure(_) => {
                Some((NETWORK_FAILURE_MESSAGE.to_string(), NoticeKind::General))
            }
            IntakeError::IndexOutOfRange { .. } | IntakeError::Io(_) => {
                Some((self.to_string(), NoticeKind::General))
            }
            IntakeError::Busy | IntakeError::Cancelled | IntakeError::Common(_) => None,
        }
    }
}

impl From<reqwest::Error> for IntakeError {
    fn from(err: reqwest::Error) -> Self {
        IntakeError::NetworkFailure(err.to_string())
    }
}

/// Result type for intake operations
pub type IntakeResult<T> = Result<T, IntakeError>;
