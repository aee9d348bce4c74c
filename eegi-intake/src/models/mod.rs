//! Data models for the intake client

pub mod candidate_file;
pub mod exchange;
pub mod notice;
pub mod role;
pub mod submission;

pub use candidate_file::{CandidateFile, NamedBlob};
pub use exchange::{Prediction, RoleNames, UploadAck, UploadForm};
pub use notice::{Notice, NoticeKind};
pub use role::{Condition, FilePart, Role};
pub use submission::{StateTransition, Submission};
