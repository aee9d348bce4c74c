//! User-facing notice value

pub use eegi_common::events::NoticeKind;
use serde::{Deserialize, Serialize};

/// A message currently shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
    /// Increases with every `show`; lets a stale auto-clear recognise it
    /// has been superseded
    pub sequence: u64,
}
