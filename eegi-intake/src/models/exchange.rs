//! Payloads exchanged with the analysis service

use crate::models::{CandidateFile, NamedBlob, Role};
use serde::{Deserialize, Serialize};

/// Acknowledgment returned by the upload endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadAck {
    /// Paths under which the service stored the accepted files
    pub file_paths: Vec<String>,
}

/// Prediction payload, forwarded downstream without interpretation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Prediction(pub serde_json::Value);

impl Prediction {
    /// The `prediction` field, if the service included one
    pub fn label(&self) -> Option<&serde_json::Value> {
        self.0.get("prediction")
    }

    pub fn into_inner(self) -> serde_json::Value {
        self.0
    }
}

/// The six role-assigned files, ready to send as one multipart request
#[derive(Debug, Clone)]
pub struct UploadForm {
    parts: [CandidateFile; 6],
}

impl UploadForm {
    /// `parts` must be in `Role::ALL` order
    pub(crate) fn new(parts: [CandidateFile; 6]) -> Self {
        Self { parts }
    }

    /// Parts paired with their field names, in wire order
    pub fn parts(&self) -> impl Iterator<Item = (Role, &CandidateFile)> {
        Role::ALL.iter().copied().zip(self.parts.iter())
    }

    /// Original file names keyed by role, for the prediction request
    pub fn role_names(&self) -> RoleNames {
        RoleNames {
            names: self.parts.clone().map(|f| f.name().to_string()),
        }
    }

    pub fn total_bytes(&self) -> usize {
        self.parts.iter().map(|f| f.size()).sum()
    }
}

/// The six original file names keyed by role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleNames {
    names: [String; 6],
}

impl RoleNames {
    pub fn get(&self, role: Role) -> &str {
        &self.names[role.index()]
    }

    /// `(key, name)` pairs in wire order, suitable for a query string
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        Role::ALL
            .iter()
            .map(|role| (role.key(), self.get(*role)))
            .collect()
    }
}
