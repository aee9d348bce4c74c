//! Ephemeral notice
//!
//! Holds at most one user-facing message. Every `show` replaces the current
//! message and schedules its automatic removal; a later `show` or an explicit
//! `clear` cancels the earlier schedule. Must be used from within a Tokio
//! runtime (the auto-clear runs as a spawned task).

use crate::models::{Notice, NoticeKind};
use chrono::Utc;
use eegi_common::events::{EventBus, IntakeEvent};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Default delay before a notice clears itself
pub const DEFAULT_DISMISS_AFTER: Duration = Duration::from_secs(5);

pub struct NoticeBoard {
    tx: Arc<watch::Sender<Option<Notice>>>,
    next_sequence: AtomicU64,
    pending_clear: Mutex<Option<JoinHandle<()>>>,
    dismiss_after: Duration,
    event_bus: EventBus,
    closed: AtomicBool,
}

impl NoticeBoard {
    pub fn new(dismiss_after: Duration, event_bus: EventBus) -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            tx: Arc::new(tx),
            next_sequence: AtomicU64::new(1),
            pending_clear: Mutex::new(None),
            dismiss_after,
            event_bus,
            closed: AtomicBool::new(false),
        }
    }

    /// Replace the current notice and schedule its removal
    pub fn show(&self, message: impl Into<String>, kind: NoticeKind) {
        let message = message.into();

        // Publishing and swapping the timer happen under one lock so the
        // visible notice always owns the pending timer.
        let mut pending = self.lock_pending();
        if self.closed.load(Ordering::Acquire) {
            tracing::debug!("Notice board shut down, dropping notice");
            return;
        }

        let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
        match kind {
            NoticeKind::Validation => tracing::warn!(sequence, "{}", message),
            NoticeKind::General => tracing::error!(sequence, "{}", message),
        }

        self.tx.send_replace(Some(Notice {
            message: message.clone(),
            kind,
            sequence,
        }));
        self.event_bus.emit_lossy(IntakeEvent::NoticeShown {
            message,
            kind,
            timestamp: Utc::now(),
        });

        let tx = Arc::clone(&self.tx);
        let event_bus = self.event_bus.clone();
        let delay = self.dismiss_after;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Only clear if nothing newer has been shown meanwhile
            let cleared = tx.send_if_modified(|current| {
                if current.as_ref().map(|n| n.sequence) == Some(sequence) {
                    *current = None;
                    true
                } else {
                    false
                }
            });
            if cleared {
                tracing::debug!(sequence, "Notice expired");
                event_bus.emit_lossy(IntakeEvent::NoticeCleared {
                    timestamp: Utc::now(),
                });
            }
        });

        if let Some(previous) = pending.replace(handle) {
            previous.abort();
        }
    }

    /// Remove the current notice now and cancel any pending auto-clear
    pub fn clear(&self) {
        let mut pending = self.lock_pending();
        if let Some(previous) = pending.take() {
            previous.abort();
        }

        let cleared = self.tx.send_if_modified(|current| current.take().is_some());
        if cleared {
            self.event_bus.emit_lossy(IntakeEvent::NoticeCleared {
                timestamp: Utc::now(),
            });
        }
    }

    /// Stop all scheduled work; later `show` calls are ignored
    pub fn shutdown(&self) {
        {
            let _pending = self.lock_pending();
            self.closed.store(true, Ordering::Release);
        }
        self.clear();
    }

    pub fn current(&self) -> Option<Notice> {
        self.tx.borrow().clone()
    }

    /// Receiver that observes every change to the visible notice
    pub fn subscribe(&self) -> watch::Receiver<Option<Notice>> {
        self.tx.subscribe()
    }

    pub fn dismiss_after(&self) -> Duration {
        self.dismiss_after
    }

    fn lock_pending(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending_clear
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for NoticeBoard {
    fn drop(&mut self) {
        if let Some(handle) = self.lock_pending().take() {
            handle.abort();
        }
    }
}
