#![forbid(unsafe_code)]

//! Tree synchronization for bindui.
//!
//! An externally-owned source tree ([`SourceNode`]) is mirrored into
//! view nodes ([`SyncNode`]) by a name-stable synchronization pass that
//! preserves node identity across source renames. Structural operations
//! (insert, delete, cut/copy/paste, drag-drop) mutate the source first,
//! resync, reindex globally, and fire one change notification; the root
//! is protected from anything that would detach it.
//!
//! # Example
//!
//! ```
//! use bindui_tree::{SourceNode, TreeSync};
//!
//! let source = SourceNode::with_children("root", vec![SourceNode::new("a")]);
//! let mut tree = TreeSync::new(source.clone());
//!
//! source.borrow().children[0].borrow_mut().name = "renamed".into();
//! let stats = tree.sync_to_source();
//! assert!(stats.is_clean()); // rename reuses the node
//! assert_eq!(tree.root().children()[0].name(), "renamed");
//! ```

pub mod ops;
pub mod source;
pub mod state;
pub mod sync;

pub use ops::{DropAction, TreeOpError};
pub use source::{SourceNode, SourceRef, clone_subtree, unique_name};
pub use state::TreeSyncState;
pub use sync::{DEFAULT_AUTO_OPEN_DEPTH, NodeId, SyncNode, TreeSync};
