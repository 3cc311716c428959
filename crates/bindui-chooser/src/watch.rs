//! Debounced directory change notifications.
//!
//! The watcher runs on a background thread but only ever signals
//! "something changed" over a channel; the re-list and row
//! reconciliation run on the caller's thread in [`DirWatcher::pump`].
//! A mutex-guarded pending flag coalesces an event storm into a single
//! queued refresh.

use crate::state::ChooserState;
use bindui_widget::ReconcileStats;
use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{DebounceEventResult, Debouncer, new_debouncer};
use std::path::Path;
use std::sync::mpsc;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Request sent from the watcher thread to the UI thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchMsg {
    /// The watched directory changed; re-list and reconcile.
    Refresh,
}

/// A debounced filesystem watcher over one directory.
pub struct DirWatcher {
    _debouncer: Debouncer<RecommendedWatcher>,
    tx: mpsc::Sender<WatchMsg>,
    rx: mpsc::Receiver<WatchMsg>,
    pending: Arc<Mutex<bool>>,
}

impl DirWatcher {
    /// Debounce window used by [`watch`](Self::watch).
    pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

    /// Watch `path` with the default debounce window.
    pub fn watch(path: &Path) -> notify::Result<Self> {
        Self::with_debounce(path, Self::DEFAULT_DEBOUNCE)
    }

    /// Watch `path`, coalescing filesystem events over `debounce`.
    pub fn with_debounce(path: &Path, debounce: Duration) -> notify::Result<Self> {
        let (tx, rx) = mpsc::channel();
        let pending = Arc::new(Mutex::new(false));

        let flag = Arc::clone(&pending);
        let sender = tx.clone();
        let mut debouncer =
            new_debouncer(debounce, move |result: DebounceEventResult| match result {
                Ok(events) => {
                    if events.is_empty() {
                        return;
                    }
                    // A bool flag stays valid across a poisoning panic.
                    let mut queued = flag.lock().unwrap_or_else(PoisonError::into_inner);
                    if *queued {
                        // A refresh is already waiting; this batch
                        // folds into it.
                        return;
                    }
                    *queued = true;
                    drop(queued);
                    let _ = sender.send(WatchMsg::Refresh);
                }
                Err(err) => {
                    tracing::warn!(error = %err, "directory watcher error");
                }
            })?;
        debouncer.watcher().watch(path, RecursiveMode::NonRecursive)?;

        Ok(Self {
            _debouncer: debouncer,
            tx,
            rx,
            pending,
        })
    }

    /// Queue a refresh as if the watcher had fired. Coalesced with any
    /// already-queued request.
    pub fn request_refresh(&self) {
        let mut queued = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if *queued {
            return;
        }
        *queued = true;
        drop(queued);
        let _ = self.tx.send(WatchMsg::Refresh);
    }

    /// Drain queued refresh requests and, if any arrived, re-list the
    /// chooser's current directory on this thread.
    ///
    /// Returns `Ok(None)` when nothing was queued. The pending flag
    /// clears before the re-list, so events arriving during the pass
    /// queue a fresh one instead of being lost.
    pub fn pump(&self, state: &mut ChooserState) -> std::io::Result<Option<ReconcileStats>> {
        let mut requested = false;
        while let Ok(WatchMsg::Refresh) = self.rx.try_recv() {
            requested = true;
        }
        if !requested {
            return Ok(None);
        }

        *self.pending.lock().unwrap_or_else(PoisonError::into_inner) = false;
        let stats = state.refresh()?;
        Ok(Some(stats))
    }
}
