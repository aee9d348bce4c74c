//! # EEG Intake Common Library
//!
//! Shared code for the EEG intake client:
//! - Error and result types
//! - Configuration loading (TOML + environment + compiled defaults)
//! - Event types (IntakeEvent enum) and the broadcast EventBus

pub mod config;
pub mod error;
pub mod events;

pub use error::{Error, Result};
