//! eegi-intake library interface
//!
//! Client-side intake for paired resting-state EEG recordings: collects the
//! six BrainVision files (header, marker and data for eyes open and eyes
//! closed), validates names and extensions, uploads them to the analysis
//! service and hands the prediction to a downstream view.

pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod widget;

pub use crate::error::{IntakeError, IntakeResult, MAX_FILES};
pub use crate::widget::{IntakeWidget, WidgetSettings};
