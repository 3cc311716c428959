//! The externally-owned source tree.
//!
//! The engine mirrors this tree but never owns it: structural operations
//! detach and re-attach nodes, and a detached subtree stays alive for as
//! long as someone holds its handle (clipboard, undo, the caller).

use std::cell::RefCell;
use std::rc::Rc;

/// Shared handle to a source node.
pub type SourceRef = Rc<RefCell<SourceNode>>;

/// One node of the externally-owned tree.
#[derive(Debug)]
pub struct SourceNode {
    /// Node name; unique among siblings is the caller's responsibility,
    /// the engine disambiguates on its own insertions.
    pub name: String,
    /// Child nodes, in order.
    pub children: Vec<SourceRef>,
}

impl SourceNode {
    /// Create a leaf node.
    #[must_use]
    pub fn new(name: impl Into<String>) -> SourceRef {
        Rc::new(RefCell::new(Self {
            name: name.into(),
            children: Vec::new(),
        }))
    }

    /// Create a node with children.
    #[must_use]
    pub fn with_children(name: impl Into<String>, children: Vec<SourceRef>) -> SourceRef {
        Rc::new(RefCell::new(Self {
            name: name.into(),
            children,
        }))
    }
}

/// Deep-clone a subtree into fresh handles.
#[must_use]
pub fn clone_subtree(node: &SourceRef) -> SourceRef {
    let n = node.borrow();
    Rc::new(RefCell::new(SourceNode {
        name: n.name.clone(),
        children: n.children.iter().map(clone_subtree).collect(),
    }))
}

/// Pick a sibling-unique name by appending a numeric suffix.
///
/// `base` itself is used when free; otherwise `base_2`, `base_3`, ...
#[must_use]
pub fn unique_name(base: &str, siblings: &[SourceRef]) -> String {
    let taken: Vec<String> = siblings.iter().map(|s| s.borrow().name.clone()).collect();
    if !taken.iter().any(|n| n == base) {
        return base.to_string();
    }
    let mut i = 2;
    loop {
        let candidate = format!("{base}_{i}");
        if !taken.iter().any(|n| n == &candidate) {
            return candidate;
        }
        i += 1;
    }
}
