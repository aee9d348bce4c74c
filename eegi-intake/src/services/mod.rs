//! Intake services

pub mod analysis_client;
pub mod classifier;
pub mod intake_store;
pub mod notice_board;
pub mod orchestrator;
pub mod shared_store;

pub use analysis_client::{AnalysisService, HttpAnalysisClient};
pub use classifier::{
    classify_by_role, missing_extensions, required_extensions, role_for_name, RoleAssignment,
};
pub use intake_store::IntakeStore;
pub use notice_board::{NoticeBoard, DEFAULT_DISMISS_AFTER};
pub use orchestrator::SubmissionOrchestrator;
pub use shared_store::{FileMirror, PredictionStore, SharedStore, StoreReader};
