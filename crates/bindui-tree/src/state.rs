//! Open/selection snapshots.
//!
//! Identity-preserving resync makes disclosure and selection state
//! survivable; this module makes it persistable. Paths are the
//! slash-joined node names from the root, so a snapshot survives
//! process restarts as long as names do.

use crate::sync::{SyncNode, TreeSync};
use std::collections::HashSet;

/// Persistable open/selection state for a [`TreeSync`].
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "state-persistence",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct TreeSyncState {
    /// Slash-joined paths of open nodes (e.g. `"root/src"`).
    pub open_paths: HashSet<String>,
    /// Slash-joined paths of selected nodes.
    pub selected_paths: HashSet<String>,
}

fn collect(node: &SyncNode, prefix: &str, state: &mut TreeSyncState) {
    let path = if prefix.is_empty() {
        node.name().to_string()
    } else {
        format!("{prefix}/{}", node.name())
    };
    if node.is_open() {
        state.open_paths.insert(path.clone());
    }
    if node.is_selected() {
        state.selected_paths.insert(path.clone());
    }
    for child in node.children() {
        collect(child, &path, state);
    }
}

fn apply(node: &mut SyncNode, prefix: &str, state: &TreeSyncState) {
    let path = if prefix.is_empty() {
        node.name.clone()
    } else {
        format!("{prefix}/{}", node.name)
    };
    node.open = node.has_children && state.open_paths.contains(&path);
    node.selected = state.selected_paths.contains(&path);
    for child in &mut node.children {
        apply(child, &path, state);
    }
}

impl TreeSync {
    /// Snapshot the current open/selection state. A pure read.
    #[must_use]
    pub fn save_state(&self) -> TreeSyncState {
        let mut state = TreeSyncState::default();
        collect(self.root(), "", &mut state);
        state
    }

    /// Restore a snapshot. Paths that no longer resolve are ignored;
    /// nodes absent from the snapshot close and deselect.
    pub fn restore_state(&mut self, state: &TreeSyncState) {
        apply(&mut self.root, "", state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceNode;

    fn tree() -> TreeSync {
        TreeSync::new(SourceNode::with_children(
            "root",
            vec![
                SourceNode::with_children("a", vec![SourceNode::new("a1")]),
                SourceNode::new("b"),
            ],
        ))
    }

    #[test]
    fn round_trip_restores_open_and_selection() {
        let mut t = tree();
        t.set_open(1, false);
        t.select_only(3);
        let saved = t.save_state();

        t.expand_all();
        t.select_only(1);
        t.restore_state(&saved);

        assert!(!t.find(1).unwrap().is_open());
        assert!(t.find(3).unwrap().is_selected());
        assert!(!t.find(1).unwrap().is_selected());
    }

    #[test]
    fn stale_paths_are_ignored() {
        let mut t = tree();
        let mut saved = t.save_state();
        saved.open_paths.insert("root/gone".to_string());
        t.restore_state(&saved);
        assert!(t.root().is_open());
    }

    #[test]
    fn restore_survives_source_rename_of_unrelated_nodes() {
        let mut t = tree();
        t.select_only(2);
        let saved = t.save_state();
        t.restore_state(&saved);
        assert!(t.find(2).unwrap().is_selected());
    }

    #[cfg(feature = "state-persistence")]
    #[test]
    fn state_serializes() {
        let t = tree();
        let state = t.save_state();
        let json = serde_json::to_string(&state).unwrap();
        let back: TreeSyncState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, back);
    }
}
