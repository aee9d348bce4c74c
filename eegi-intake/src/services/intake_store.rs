//! Intake store
//!
//! Ordered list of candidate files with a hard capacity of `MAX_FILES`.
//! Every mutation republishes the list to the file mirror before the write
//! lock is released, so the mirror never diverges from the store.

use crate::error::{IntakeError, IntakeResult, MAX_FILES};
use crate::models::{CandidateFile, NamedBlob};
use crate::services::classifier::{classify_by_role, missing_extensions};
use crate::services::notice_board::NoticeBoard;
use crate::services::shared_store::FileMirror;
use chrono::Utc;
use eegi_common::events::{EventBus, IntakeEvent};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

pub struct IntakeStore {
    files: RwLock<Vec<CandidateFile>>,
    mirror: Arc<FileMirror>,
    notices: Arc<NoticeBoard>,
    event_bus: EventBus,
}

impl IntakeStore {
    pub fn new(mirror: Arc<FileMirror>, notices: Arc<NoticeBoard>, event_bus: EventBus) -> Self {
        Self {
            files: RwLock::new(Vec::new()),
            mirror,
            notices,
            event_bus,
        }
    }

    /// Append a batch of files
    ///
    /// The batch is accepted or rejected as a whole. Returns the new length.
    pub async fn add(&self, new_files: Vec<CandidateFile>) -> IntakeResult<usize> {
        let mut files = self.files.write().await;

        if files.len() + new_files.len() > MAX_FILES {
            let err = IntakeError::CapacityExceeded {
                current: files.len(),
                attempted: new_files.len(),
            };
            self.report(&err);
            return Err(err);
        }

        files.extend(new_files);
        info!(count = files.len(), "Files added to intake list");
        self.publish(&files);
        Ok(files.len())
    }

    /// Remove the file at `index`, keeping the order of the rest
    ///
    /// Re-validates what remains: an empty list clears any notice, an
    /// incomplete one raises a missing-extension or missing-role notice.
    pub async fn remove(&self, index: usize) -> IntakeResult<CandidateFile> {
        let mut files = self.files.write().await;

        if index >= files.len() {
            return Err(IntakeError::IndexOutOfRange {
                index,
                len: files.len(),
            });
        }

        let removed = files.remove(index);
        debug!(name = %removed.name(), index, "File removed from intake list");
        self.publish(&files);

        if files.is_empty() {
            self.notices.clear();
        } else if let Some(missing) = missing_extensions(&files) {
            self.report(&IntakeError::MissingExtension(missing));
        } else {
            let missing_roles = classify_by_role(&files).missing_roles();
            if !missing_roles.is_empty() {
                self.report(&IntakeError::MissingRole(missing_roles));
            }
        }

        Ok(removed)
    }

    /// Empty the list and dismiss any notice
    pub async fn clear(&self) {
        let mut files = self.files.write().await;
        files.clear();
        self.publish(&files);
        self.notices.clear();
        info!("Intake list cleared");
    }

    /// Snapshot of the list in insertion order
    pub async fn files(&self) -> Vec<CandidateFile> {
        self.files.read().await.clone()
    }

    pub async fn get(&self, index: usize) -> Option<CandidateFile> {
        self.files.read().await.get(index).cloned()
    }

    pub async fn len(&self) -> usize {
        self.files.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.files.read().await.is_empty()
    }

    fn publish(&self, files: &[CandidateFile]) {
        self.mirror.publish(files.to_vec());
        self.event_bus.emit_lossy(IntakeEvent::FilesChanged {
            names: files.iter().map(|f| f.name().to_string()).collect(),
            timestamp: Utc::now(),
        });
    }

    fn report(&self, err: &IntakeError) {
        if let Some((message, kind)) = err.notice() {
            self.notices.show(message, kind);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MISSING_ROLE_MESSAGE;
    use crate::models::NoticeKind;
    use crate::services::notice_board::DEFAULT_DISMISS_AFTER;
    use crate::services::shared_store::SharedStore;

    struct Fixture {
        store: IntakeStore,
        mirror: Arc<FileMirror>,
        notices: Arc<NoticeBoard>,
    }

    fn fixture() -> Fixture {
        let bus = EventBus::new(64);
        let mirror = Arc::new(SharedStore::new(Vec::new()));
        let notices = Arc::new(NoticeBoard::new(DEFAULT_DISMISS_AFTER, bus.clone()));
        let store = IntakeStore::new(Arc::clone(&mirror), Arc::clone(&notices), bus);
        Fixture {
            store,
            mirror,
            notices,
        }
    }

    fn named(names: &[&str]) -> Vec<CandidateFile> {
        names.iter().map(|n| CandidateFile::new(*n, vec![0u8; 4])).collect()
    }

    fn names(files: &[CandidateFile]) -> Vec<String> {
        files.iter().map(|f| f.name().to_string()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_add_preserves_insertion_order_and_mirrors() {
        let f = fixture();
        f.store.add(named(&["a.vhdr", "b.vmrk"])).await.unwrap();
        let len = f.store.add(named(&["c.eeg"])).await.unwrap();

        assert_eq!(len, 3);
        assert_eq!(names(&f.store.files().await), ["a.vhdr", "b.vmrk", "c.eeg"]);
        assert_eq!(f.mirror.snapshot(), f.store.files().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_add_over_capacity_rejects_whole_batch() {
        let f = fixture();
        f.store.add(named(&["1", "2", "3", "4"])).await.unwrap();

        let result = f.store.add(named(&["5", "6", "7"])).await;

        assert!(matches!(
            result,
            Err(IntakeError::CapacityExceeded {
                current: 4,
                attempted: 3
            })
        ));
        assert_eq!(f.store.len().await, 4);
        assert_eq!(f.mirror.snapshot().len(), 4);
        let notice = f.notices.current().unwrap();
        assert!(notice.message.contains("Only 6 files are allowed"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_add_exactly_to_capacity() {
        let f = fixture();
        assert_eq!(
            f.store.add(named(&["1", "2", "3", "4", "5", "6"])).await.unwrap(),
            6
        );
        assert!(f.store.add(named(&["7"])).await.is_err());
        assert!(f.notices.current().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_keeps_relative_order() {
        let f = fixture();
        f.store
            .add(named(&["x_restEO.vhdr", "x_restEO.vmrk", "x_restEO.eeg", "x_restEC.vhdr"]))
            .await
            .unwrap();

        let removed = f.store.remove(1).await.unwrap();

        assert_eq!(removed.name(), "x_restEO.vmrk");
        assert_eq!(
            names(&f.store.files().await),
            ["x_restEO.vhdr", "x_restEO.eeg", "x_restEC.vhdr"]
        );
        assert_eq!(f.mirror.snapshot().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_leaving_missing_extension_warns() {
        let f = fixture();
        f.store
            .add(named(&["x_restEO.vhdr", "x_restEO.vmrk", "x_restEO.eeg"]))
            .await
            .unwrap();

        f.store.remove(2).await.unwrap();

        let notice = f.notices.current().unwrap();
        assert_eq!(notice.message, "Missing required files: .eeg");
        assert_eq!(notice.kind, NoticeKind::Validation);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_leaving_missing_role_warns() {
        let f = fixture();
        f.store
            .add(named(&[
                "x_restEO.vhdr",
                "x_restEO.vmrk",
                "x_restEO.eeg",
                "x_restEC.eeg",
            ]))
            .await
            .unwrap();

        f.store.remove(3).await.unwrap();

        assert_eq!(f.notices.current().unwrap().message, MISSING_ROLE_MESSAGE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_last_file_clears_notice() {
        let f = fixture();
        f.store.add(named(&["x_restEO.vhdr"])).await.unwrap();
        f.notices.show("stale", NoticeKind::General);

        f.store.remove(0).await.unwrap();

        assert!(f.store.is_empty().await);
        assert!(f.notices.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_out_of_range() {
        let f = fixture();
        f.store.add(named(&["a.eeg"])).await.unwrap();

        let result = f.store.remove(3).await;

        assert!(matches!(
            result,
            Err(IntakeError::IndexOutOfRange { index: 3, len: 1 })
        ));
        assert_eq!(f.store.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_empties_and_dismisses() {
        let f = fixture();
        f.store.add(named(&["a.eeg", "b.vhdr"])).await.unwrap();
        f.notices.show("something", NoticeKind::Validation);

        f.store.clear().await;

        assert!(f.store.is_empty().await);
        assert!(f.mirror.snapshot().is_empty());
        assert!(f.notices.current().is_none());

        // Clearing an empty store is still fine
        f.store.clear().await;
        assert!(f.store.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_by_index() {
        let f = fixture();
        f.store.add(named(&["a.eeg", "b.vhdr"])).await.unwrap();
        assert_eq!(f.store.get(1).await.unwrap().name(), "b.vhdr");
        assert!(f.store.get(2).await.is_none());
    }
}
