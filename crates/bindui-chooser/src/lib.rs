#![forbid(unsafe_code)]

//! File chooser boundary for bindui.
//!
//! Directory listing and navigation over the same row-reconciliation
//! primitive the binding views use, plus a debounced filesystem watcher
//! that hands refresh requests back to the caller's thread.
//!
//! # Architecture
//!
//! - [`DirEntry`] / [`read_directory`] — sorted directory listings
//! - [`ChooserState`] — cursor, navigation, widget rows
//! - [`DirWatcher`] — background change signal, foreground re-list
//!
//! The watcher never mutates chooser state from its own thread: it
//! queues a [`WatchMsg::Refresh`] and the owner drains it with
//! [`DirWatcher::pump`].

pub mod entries;
pub mod state;
pub mod watch;

pub use entries::{DirEntry, read_directory};
pub use state::ChooserState;
pub use watch::{DirWatcher, WatchMsg};
