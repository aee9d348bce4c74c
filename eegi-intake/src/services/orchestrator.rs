//! Submission orchestrator
//!
//! Drives one submission through validation, classification, upload and
//! prediction:
//!
//! ```text
//! Idle → Validating → Classifying → Uploading → Predicting → Succeeded → Idle
//!            │             │            │            │
//!            └─────────────┴────────────┴────────────┴──→ Failed → Idle
//! ```
//!
//! Validation failures never touch the network. The prediction request is
//! only issued after the upload was acknowledged. A busy flag admits one run
//! at a time and is released on every exit path, including the submit future
//! being dropped.

use crate::error::{IntakeError, IntakeResult};
use crate::models::{CandidateFile, NamedBlob, Prediction, Submission};
use crate::services::analysis_client::AnalysisService;
use crate::services::classifier::{classify_by_role, missing_extensions};
use crate::services::notice_board::NoticeBoard;
use crate::services::shared_store::PredictionStore;
use chrono::Utc;
use eegi_common::events::{EventBus, IntakeEvent, SubmissionState};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Holds the busy flag for the lifetime of one run
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

pub struct SubmissionOrchestrator {
    service: Arc<dyn AnalysisService>,
    notices: Arc<NoticeBoard>,
    predictions: Arc<PredictionStore>,
    event_bus: EventBus,
    results_route: String,
    busy: AtomicBool,
    state_tx: watch::Sender<SubmissionState>,
    shutdown: CancellationToken,
}

impl SubmissionOrchestrator {
    pub fn new(
        service: Arc<dyn AnalysisService>,
        notices: Arc<NoticeBoard>,
        predictions: Arc<PredictionStore>,
        event_bus: EventBus,
        results_route: impl Into<String>,
        shutdown: CancellationToken,
    ) -> Self {
        let (state_tx, _) = watch::channel(SubmissionState::Idle);
        Self {
            service,
            notices,
            predictions,
            event_bus,
            results_route: results_route.into(),
            busy: AtomicBool::new(false),
            state_tx,
            shutdown,
        }
    }

    /// Validate, upload and fetch a prediction for `files`
    ///
    /// Rejected with `Busy` (no side effects) while another run is in
    /// flight. Every other failure shows a notice and returns the system to
    /// Idle with the intake list untouched.
    pub async fn submit(&self, files: &[CandidateFile]) -> IntakeResult<Prediction> {
        let _guard = match BusyGuard::acquire(&self.busy) {
            Some(guard) => guard,
            None => {
                warn!("Submit ignored, a submission is already in flight");
                return Err(IntakeError::Busy);
            }
        };

        let mut submission =
            Submission::new(files.iter().map(|f| f.name().to_string()).collect());
        info!(
            submission_id = %submission.submission_id,
            files = submission.file_names.len(),
            "Submission started"
        );

        let result = self.run(&mut submission, files).await;

        if let Err(err) = &result {
            self.transition(&mut submission, SubmissionState::Failed);
            match err {
                IntakeError::Cancelled => {
                    info!(submission_id = %submission.submission_id, "Submission abandoned on teardown");
                }
                _ => {
                    warn!(
                        submission_id = %submission.submission_id,
                        error = %err,
                        elapsed_ms = submission.elapsed_ms(),
                        "Submission failed"
                    );
                    if let Some((message, kind)) = err.notice() {
                        self.notices.show(message, kind);
                    }
                }
            }
        }

        self.transition(&mut submission, SubmissionState::Idle);
        result
    }

    async fn run(
        &self,
        submission: &mut Submission,
        files: &[CandidateFile],
    ) -> IntakeResult<Prediction> {
        self.transition(submission, SubmissionState::Validating);
        if let Some(missing) = missing_extensions(files) {
            return Err(IntakeError::MissingExtension(missing));
        }

        self.transition(submission, SubmissionState::Classifying);
        let form = classify_by_role(files).upload_form(files)?;

        self.transition(submission, SubmissionState::Uploading);
        let ack = self.unless_shut_down(self.service.upload(&form)).await?;
        info!(
            submission_id = %submission.submission_id,
            accepted = ack.file_paths.len(),
            "Upload acknowledged"
        );

        self.transition(submission, SubmissionState::Predicting);
        let prediction = self
            .unless_shut_down(self.service.predict(&form.role_names()))
            .await?;

        // Response arrived, but the view that asked for it may be gone
        if self.shutdown.is_cancelled() {
            return Err(IntakeError::Cancelled);
        }

        self.transition(submission, SubmissionState::Succeeded);
        self.predictions.publish(Some(prediction.clone()));
        self.event_bus.emit_lossy(IntakeEvent::PredictionPublished {
            submission_id: submission.submission_id,
            timestamp: Utc::now(),
        });
        self.event_bus.emit_lossy(IntakeEvent::NavigationRequested {
            route: self.results_route.clone(),
            timestamp: Utc::now(),
        });

        info!(
            submission_id = %submission.submission_id,
            elapsed_ms = submission.elapsed_ms(),
            route = %self.results_route,
            "Submission succeeded"
        );
        Ok(prediction)
    }

    /// Race a network step against teardown
    async fn unless_shut_down<T>(
        &self,
        step: impl Future<Output = IntakeResult<T>>,
    ) -> IntakeResult<T> {
        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => Err(IntakeError::Cancelled),
            result = step => result,
        }
    }

    fn transition(&self, submission: &mut Submission, new_state: SubmissionState) {
        let transition = submission.transition_to(new_state);
        self.state_tx.send_replace(new_state);
        self.event_bus.emit_lossy(IntakeEvent::SubmissionStateChanged {
            submission_id: transition.submission_id,
            old_state: transition.old_state,
            new_state: transition.new_state,
            timestamp: transition.transitioned_at,
        });
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn state(&self) -> SubmissionState {
        *self.state_tx.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<SubmissionState> {
        self.state_tx.subscribe()
    }
}
