//! Shared test helpers: file fixtures and a scripted analysis service

#![allow(dead_code)]

use async_trait::async_trait;
use eegi_common::events::{EventBus, IntakeEvent};
use eegi_intake::models::{CandidateFile, NamedBlob, Prediction, RoleNames, UploadAck, UploadForm};
use eegi_intake::services::AnalysisService;
use eegi_intake::{IntakeError, IntakeResult, IntakeWidget, WidgetSettings};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, Notify};

pub const FULL_SET: [&str; 6] = [
    "sub1_restEO.vhdr",
    "sub1_restEO.vmrk",
    "sub1_restEO.eeg",
    "sub1_restEC.vhdr",
    "sub1_restEC.vmrk",
    "sub1_restEC.eeg",
];

pub fn named(names: &[&str]) -> Vec<CandidateFile> {
    names
        .iter()
        .map(|n| CandidateFile::new(*n, format!("content of {n}").into_bytes()))
        .collect()
}

pub fn full_set() -> Vec<CandidateFile> {
    named(&FULL_SET)
}

/// How the scripted service answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    Succeed,
    FailUpload,
    FailPredict,
}

/// Analysis service double that records every call
pub struct ScriptedService {
    script: Script,
    /// `(field, file name)` pairs per upload call
    pub uploads: Mutex<Vec<Vec<(String, String)>>>,
    /// `(key, value)` query pairs per predict call
    pub predictions: Mutex<Vec<Vec<(String, String)>>>,
    /// Signalled when an upload starts
    pub upload_started: Notify,
    /// Signalled when a prediction request starts
    pub predict_started: Notify,
    /// When set, the gated step waits for a permit before answering
    gate: Option<(Step, Notify)>,
}

/// Network step held back by a gated service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Upload,
    Predict,
}

impl ScriptedService {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            uploads: Mutex::new(Vec::new()),
            predictions: Mutex::new(Vec::new()),
            upload_started: Notify::new(),
            predict_started: Notify::new(),
            gate: None,
        }
    }

    /// Uploads block until `release` is called
    pub fn gated(script: Script) -> Self {
        Self::gated_at(Step::Upload, script)
    }

    /// `step` blocks until `release` is called
    pub fn gated_at(step: Step, script: Script) -> Self {
        Self {
            gate: Some((step, Notify::new())),
            ..Self::new(script)
        }
    }

    pub fn release(&self) {
        if let Some((_, gate)) = &self.gate {
            gate.notify_one();
        }
    }

    async fn pass_gate(&self, step: Step) {
        if let Some((gated, gate)) = &self.gate {
            if *gated == step {
                gate.notified().await;
            }
        }
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    pub fn predict_count(&self) -> usize {
        self.predictions.lock().unwrap().len()
    }

    pub fn network_calls(&self) -> usize {
        self.upload_count() + self.predict_count()
    }
}

pub fn sample_prediction() -> Prediction {
    Prediction(serde_json::json!({
        "prediction": "responder",
        "probability": 0.87
    }))
}

#[async_trait]
impl AnalysisService for ScriptedService {
    async fn upload(&self, form: &UploadForm) -> IntakeResult<UploadAck> {
        self.uploads.lock().unwrap().push(
            form.parts()
                .map(|(role, file)| (role.key().to_string(), file.name().to_string()))
                .collect(),
        );
        self.upload_started.notify_one();
        self.pass_gate(Step::Upload).await;

        match self.script {
            Script::FailUpload => Err(IntakeError::NetworkFailure("upload returned 500".into())),
            _ => Ok(UploadAck {
                file_paths: form
                    .parts()
                    .map(|(_, f)| format!("uploads/{}", f.name()))
                    .collect(),
            }),
        }
    }

    async fn predict(&self, names: &RoleNames) -> IntakeResult<Prediction> {
        self.predictions.lock().unwrap().push(
            names
                .query_pairs()
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        self.predict_started.notify_one();
        self.pass_gate(Step::Predict).await;

        match self.script {
            Script::FailPredict => Err(IntakeError::NetworkFailure("connection reset".into())),
            _ => Ok(sample_prediction()),
        }
    }
}

/// Widget wired to `service` with a 5 s notice delay
pub fn widget_with(service: Arc<ScriptedService>) -> (IntakeWidget, broadcast::Receiver<IntakeEvent>) {
    let bus = EventBus::new(256);
    let events = bus.subscribe();
    let widget = IntakeWidget::new(
        service,
        WidgetSettings {
            dismiss_after: Duration::from_secs(5),
            results_route: "/prediction".to_string(),
        },
        bus,
    );
    (widget, events)
}

/// Drain every event currently buffered
pub fn drain(events: &mut broadcast::Receiver<IntakeEvent>) -> Vec<IntakeEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}

pub fn navigation_count(events: &[IntakeEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, IntakeEvent::NavigationRequested { .. }))
        .count()
}
