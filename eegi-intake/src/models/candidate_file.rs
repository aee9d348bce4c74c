//! Candidate files held by the intake list
//!
//! The intake core only ever needs two things from a file: its name and its
//! bytes. `NamedBlob` captures that capability so classification and
//! validation work on anything that can provide it.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// A named binary blob
pub trait NamedBlob {
    /// File name as shown to the user (no directory component)
    fn name(&self) -> &str;

    /// Raw file content
    fn content(&self) -> &[u8];

    fn size(&self) -> usize {
        self.content().len()
    }

    /// Lower-cased last dot-segment including the dot, e.g. `.vhdr`
    ///
    /// A name without any dot is taken whole, so `eeg` yields `.eeg`.
    /// Returns `None` only when the name ends with a dot or is empty.
    fn extension(&self) -> Option<String> {
        let name = self.name();
        let ext = name.rsplit_once('.').map_or(name, |(_, ext)| ext);
        if ext.is_empty() {
            return None;
        }
        Some(format!(".{}", ext.to_lowercase()))
    }
}

/// A file selected for upload
///
/// Content is shared, so cloning a candidate (into the file mirror or an
/// upload form) never copies the recording.
#[derive(Clone, PartialEq, Eq)]
pub struct CandidateFile {
    name: String,
    content: Arc<[u8]>,
}

impl CandidateFile {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: Arc::from(content.into()),
        }
    }

    /// Read a file from disk; the name is the final path component
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("Not a file path: {}", path.display()),
                )
            })?;

        let content = tokio::fs::read(path).await?;

        tracing::debug!(name = %name, bytes = content.len(), "Loaded candidate file");

        Ok(Self::new(name, content))
    }

    /// Write the content back out to `dest`
    pub async fn save_to(&self, dest: &Path) -> std::io::Result<()> {
        tokio::fs::write(dest, &self.content).await
    }
}

impl NamedBlob for CandidateFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn content(&self) -> &[u8] {
        &self.content
    }
}

impl fmt::Debug for CandidateFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CandidateFile")
            .field("name", &self.name)
            .field("size", &self.content.len())
            .finish()
    }
}
