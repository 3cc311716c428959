//! The synchronization pass: mirror the source tree into view nodes.
//!
//! One pass per node, in pre-order: pull the current name off the source
//! (a source rename must reuse the node, not rebuild it), assign the
//! global flat index from a shared counter, build the child descriptor
//! list from the source children, reconcile name-stably, then recurse.
//! Nodes discovered on the initial build auto-open down to a configured
//! depth; later arrivals and nodes with no children start closed.

use crate::source::SourceRef;
use bindui_widget::{ChildSpec, Reconcile, ReconcileStats, WidgetKind, reconcile_children};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-unique view-node identity, preserved across passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Allocate the next identity.
    #[must_use]
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// One view node mirroring a source node.
pub struct SyncNode {
    pub(crate) id: NodeId,
    pub(crate) name: String,
    pub(crate) open: bool,
    pub(crate) selected: bool,
    pub(crate) has_children: bool,
    pub(crate) index: usize,
    pub(crate) source: SourceRef,
    pub(crate) children: Vec<SyncNode>,
}

impl SyncNode {
    /// Stable identity, preserved when the node survives a pass.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The mirrored source name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Disclosure state.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Selection state.
    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Whether the source node has children.
    #[must_use]
    pub fn has_children(&self) -> bool {
        self.has_children
    }

    /// Position in the global pre-order flat index.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The mirrored source node.
    #[must_use]
    pub fn source(&self) -> SourceRef {
        Rc::clone(&self.source)
    }

    /// Mirrored children, in source order.
    #[must_use]
    pub fn children(&self) -> &[SyncNode] {
        &self.children
    }

    fn find(&self, index: usize) -> Option<&SyncNode> {
        if self.index == index {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(index))
    }

    fn find_mut(&mut self, index: usize) -> Option<&mut SyncNode> {
        if self.index == index {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(index))
    }

    fn path_of(&self, index: usize, path: &mut Vec<usize>) -> bool {
        if self.index == index {
            return true;
        }
        for (i, child) in self.children.iter().enumerate() {
            path.push(i);
            if child.path_of(index, path) {
                return true;
            }
            path.pop();
        }
        false
    }

    fn for_each_mut(&mut self, f: &mut impl FnMut(&mut SyncNode)) {
        f(self);
        for child in &mut self.children {
            child.for_each_mut(f);
        }
    }
}

impl Reconcile for SyncNode {
    fn spec(&self) -> ChildSpec {
        ChildSpec::new(WidgetKind::TreeRow, self.name.clone())
    }
}

/// Depth down to which newly built nodes start open.
pub const DEFAULT_AUTO_OPEN_DEPTH: usize = 2;

/// The engine: a view tree kept in sync with an external source tree.
pub struct TreeSync {
    pub(crate) root: SyncNode,
    pub(crate) auto_open_depth: usize,
    pub(crate) built: bool,
    pub(crate) on_change: Option<Rc<dyn Fn()>>,
    pub(crate) clipboard: Option<crate::ops::Clipboard>,
}

impl TreeSync {
    /// Mirror a source tree, auto-opening to the default depth.
    #[must_use]
    pub fn new(source: SourceRef) -> Self {
        Self::with_auto_open_depth(source, DEFAULT_AUTO_OPEN_DEPTH)
    }

    /// Mirror a source tree with an explicit initial-open depth.
    #[must_use]
    pub fn with_auto_open_depth(source: SourceRef, depth: usize) -> Self {
        let has_children = !source.borrow().children.is_empty();
        let name = source.borrow().name.clone();
        let root = SyncNode {
            id: NodeId::next(),
            name,
            open: has_children && depth > 0,
            selected: false,
            has_children,
            index: 0,
            source,
            children: Vec::new(),
        };
        let mut tree = Self {
            root,
            auto_open_depth: depth,
            built: false,
            on_change: None,
            clipboard: None,
        };
        tree.sync_to_source();
        tree
    }

    /// Register the single change observer fired after structural ops.
    pub fn set_on_change(&mut self, f: Rc<dyn Fn()>) {
        self.on_change = Some(f);
    }

    pub(crate) fn notify(&self) {
        if let Some(f) = &self.on_change {
            f();
        }
    }

    /// The mirrored root.
    #[must_use]
    pub fn root(&self) -> &SyncNode {
        &self.root
    }

    /// Look up a node by global flat index.
    #[must_use]
    pub fn find(&self, index: usize) -> Option<&SyncNode> {
        self.root.find(index)
    }

    /// The child-position path from the root to a node.
    #[must_use]
    pub fn path_of(&self, index: usize) -> Option<Vec<usize>> {
        let mut path = Vec::new();
        self.root.path_of(index, &mut path).then_some(path)
    }

    /// Run one full synchronization pass, reindexing globally.
    ///
    /// Auto-open applies only to the initial build; nodes arriving on
    /// later passes start closed.
    pub fn sync_to_source(&mut self) -> ReconcileStats {
        let open_depth = if self.built { 0 } else { self.auto_open_depth };
        self.built = true;
        let mut counter = 0;
        sync_node(&mut self.root, 0, open_depth, &mut counter)
    }

    /// Set a node's disclosure state.
    pub fn set_open(&mut self, index: usize, open: bool) -> bool {
        match self.root.find_mut(index) {
            Some(node) => {
                node.open = open && node.has_children;
                true
            }
            None => false,
        }
    }

    /// Select exactly one node, clearing any previous selection.
    pub fn select_only(&mut self, index: usize) -> bool {
        if self.root.find(index).is_none() {
            return false;
        }
        self.root
            .for_each_mut(&mut |n| n.selected = n.index == index);
        true
    }

    /// Open every node that has children.
    pub fn expand_all(&mut self) {
        self.root.for_each_mut(&mut |n| n.open = n.has_children);
    }

    /// Close every node below the root.
    pub fn collapse_all(&mut self) {
        let root_index = self.root.index;
        self.root
            .for_each_mut(&mut |n| n.open = n.index == root_index && n.has_children);
    }

    /// Visit every node in pre-order.
    pub fn for_each(&self, mut f: impl FnMut(&SyncNode)) {
        fn walk(node: &SyncNode, f: &mut impl FnMut(&SyncNode)) {
            f(node);
            for child in &node.children {
                walk(child, f);
            }
        }
        walk(&self.root, &mut f);
    }
}

fn sync_node(
    node: &mut SyncNode,
    depth: usize,
    auto_open_depth: usize,
    counter: &mut usize,
) -> ReconcileStats {
    node.name = node.source.borrow().name.clone();
    node.index = *counter;
    *counter += 1;

    let src_children: Vec<SourceRef> = node
        .source
        .borrow()
        .children
        .iter()
        .map(Rc::clone)
        .collect();
    node.has_children = !src_children.is_empty();
    if !node.has_children {
        node.open = false;
    }

    // A renamed source child must reuse its view node: nodes still
    // pointing at a live source child take its current name before the
    // name-stable diff runs.
    for child in &mut node.children {
        if let Some(src) = src_children
            .iter()
            .find(|s| Rc::ptr_eq(s, &child.source))
        {
            child.name = src.borrow().name.clone();
        }
    }

    let plan: Vec<ChildSpec> = src_children
        .iter()
        .map(|s| ChildSpec::new(WidgetKind::TreeRow, s.borrow().name.clone()))
        .collect();
    let mut stats = reconcile_children(&mut node.children, &plan, |i, spec| {
        let source = Rc::clone(&src_children[i]);
        let has_children = !source.borrow().children.is_empty();
        Some(SyncNode {
            id: NodeId::next(),
            name: spec.name.clone(),
            open: has_children && depth + 1 < auto_open_depth,
            selected: false,
            has_children,
            index: 0,
            source,
            children: Vec::new(),
        })
    });

    for (child, src) in node.children.iter_mut().zip(&src_children) {
        child.source = Rc::clone(src);
        stats.absorb(sync_node(child, depth + 1, auto_open_depth, counter));
    }
    stats
}
