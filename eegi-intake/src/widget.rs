//! Intake widget
//!
//! The surface a renderer talks to. Composes the intake store, the notice
//! board and the submission orchestrator around explicitly owned shared
//! stores, and owns the teardown token that stops timers and discards late
//! network responses.

use crate::error::{IntakeError, IntakeResult};
use crate::models::{CandidateFile, NamedBlob, Notice, Prediction};
use crate::services::{
    AnalysisService, FileMirror, HttpAnalysisClient, IntakeStore, NoticeBoard, PredictionStore,
    SharedStore, StoreReader, SubmissionOrchestrator, DEFAULT_DISMISS_AFTER,
};
use eegi_common::config::TomlConfig;
use eegi_common::events::{EventBus, IntakeEvent, SubmissionState};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Widget tuning
#[derive(Debug, Clone)]
pub struct WidgetSettings {
    /// How long a notice stays visible
    pub dismiss_after: Duration,
    /// Route signalled after a successful prediction
    pub results_route: String,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            dismiss_after: DEFAULT_DISMISS_AFTER,
            results_route: "/prediction".to_string(),
        }
    }
}

impl From<&TomlConfig> for WidgetSettings {
    fn from(config: &TomlConfig) -> Self {
        Self {
            dismiss_after: config.notice.dismiss_after(),
            results_route: config.results_route.clone(),
        }
    }
}

pub struct IntakeWidget {
    store: IntakeStore,
    notices: Arc<NoticeBoard>,
    orchestrator: SubmissionOrchestrator,
    file_mirror: Arc<FileMirror>,
    predictions: Arc<PredictionStore>,
    event_bus: EventBus,
    shutdown: CancellationToken,
}

impl IntakeWidget {
    pub fn new(
        service: Arc<dyn AnalysisService>,
        settings: WidgetSettings,
        event_bus: EventBus,
    ) -> Self {
        let shutdown = CancellationToken::new();
        let file_mirror = Arc::new(SharedStore::new(Vec::new()));
        let predictions = Arc::new(SharedStore::new(None));
        let notices = Arc::new(NoticeBoard::new(settings.dismiss_after, event_bus.clone()));

        let store = IntakeStore::new(
            Arc::clone(&file_mirror),
            Arc::clone(&notices),
            event_bus.clone(),
        );
        let orchestrator = SubmissionOrchestrator::new(
            service,
            Arc::clone(&notices),
            Arc::clone(&predictions),
            event_bus.clone(),
            settings.results_route,
            shutdown.child_token(),
        );

        Self {
            store,
            notices,
            orchestrator,
            file_mirror,
            predictions,
            event_bus,
            shutdown,
        }
    }

    /// Build a widget talking to the HTTP service described by `config`
    pub fn from_config(config: &TomlConfig, event_bus: EventBus) -> IntakeResult<Self> {
        let client = HttpAnalysisClient::new(&config.service)?;
        info!(
            upload_url = client.upload_url(),
            predict_url = client.predict_url(),
            "Analysis service configured"
        );
        Ok(Self::new(
            Arc::new(client),
            WidgetSettings::from(config),
            event_bus,
        ))
    }

    pub async fn add_files(&self, files: Vec<CandidateFile>) -> IntakeResult<usize> {
        self.store.add(files).await
    }

    pub async fn remove_file(&self, index: usize) -> IntakeResult<CandidateFile> {
        self.store.remove(index).await
    }

    pub async fn clear(&self) {
        self.store.clear().await
    }

    /// Submit the current intake list
    pub async fn submit(&self) -> IntakeResult<Prediction> {
        if self.shutdown.is_cancelled() {
            return Err(IntakeError::Cancelled);
        }
        let files = self.store.files().await;
        self.orchestrator.submit(&files).await
    }

    /// Save the file at `index` to `dest`
    pub async fn download_file(&self, index: usize, dest: &Path) -> IntakeResult<()> {
        let Some(file) = self.store.get(index).await else {
            return Err(IntakeError::IndexOutOfRange {
                index,
                len: self.store.len().await,
            });
        };
        file.save_to(dest).await?;
        info!(name = %file.name(), dest = %dest.display(), "File saved");
        Ok(())
    }

    pub async fn files(&self) -> Vec<CandidateFile> {
        self.store.files().await
    }

    pub fn notice(&self) -> Option<Notice> {
        self.notices.current()
    }

    pub fn subscribe_notice(&self) -> watch::Receiver<Option<Notice>> {
        self.notices.subscribe()
    }

    /// Read handle on the mirrored intake list
    pub fn file_mirror(&self) -> StoreReader<Vec<CandidateFile>> {
        self.file_mirror.reader()
    }

    /// Read handle on the latest prediction
    pub fn predictions(&self) -> StoreReader<Option<Prediction>> {
        self.predictions.reader()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<IntakeEvent> {
        self.event_bus.subscribe()
    }

    /// Whether submit would currently be rejected
    pub fn is_busy(&self) -> bool {
        self.orchestrator.is_busy()
    }

    pub fn submission_state(&self) -> SubmissionState {
        self.orchestrator.state()
    }

    /// Stop pending notice timers and discard any in-flight response
    pub fn teardown(&self) {
        info!("Intake widget torn down");
        self.shutdown.cancel();
        self.notices.shutdown();
    }

    pub fn is_torn_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

impl Drop for IntakeWidget {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
