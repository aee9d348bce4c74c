//! Shared stores handed to sibling views
//!
//! A store has exactly one writer (the component that owns the
//! `SharedStore`) and any number of readers obtained through `reader()`.

use crate::models::{CandidateFile, Prediction};
use tokio::sync::watch;

/// Single-writer value store with change notification
#[derive(Debug)]
pub struct SharedStore<T> {
    tx: watch::Sender<T>,
}

/// Read-only handle on a `SharedStore`
#[derive(Debug, Clone)]
pub struct StoreReader<T> {
    rx: watch::Receiver<T>,
}

impl<T: Clone> SharedStore<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    /// Replace the stored value and wake readers
    pub fn publish(&self, value: T) {
        self.tx.send_replace(value);
    }

    pub fn snapshot(&self) -> T {
        self.tx.borrow().clone()
    }

    pub fn reader(&self) -> StoreReader<T> {
        StoreReader {
            rx: self.tx.subscribe(),
        }
    }
}

impl<T: Clone> StoreReader<T> {
    pub fn snapshot(&self) -> T {
        self.rx.borrow().clone()
    }

    /// Wait for the next published value
    ///
    /// Returns `None` once the writer is gone.
    pub async fn changed(&mut self) -> Option<T> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

/// Mirror of the intake list for views that need the selected files
pub type FileMirror = SharedStore<Vec<CandidateFile>>;

/// Latest prediction, overwritten by each successful submission
pub type PredictionStore = SharedStore<Option<Prediction>>;
