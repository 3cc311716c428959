//! Structural operations on the mirrored tree.
//!
//! Every operation follows the same discipline: mutate the source tree
//! first, then run a full synchronization pass (which reindexes
//! globally), then fire exactly one change notification. The root is
//! protected: operations that would detach or displace it return
//! [`TreeOpError::RootForbidden`] and change nothing.

use crate::source::{SourceRef, SourceNode, clone_subtree, unique_name};
use crate::sync::TreeSync;
use std::fmt;
use std::rc::Rc;

/// What a drag/paste intends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropAction {
    /// Insert a duplicate; the insertion gets a sibling-unique name.
    Copy,
    /// Relocate the original; the node keeps its name.
    Move,
}

/// Clipboard payload of a cut or copy.
pub struct Clipboard {
    pub(crate) node: SourceRef,
    pub(crate) cut: bool,
}

/// Structural-operation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeOpError {
    /// The operation would detach or displace the tree root.
    RootForbidden,
    /// No node carries the given flat index.
    NotFound {
        /// The requested flat index.
        index: usize,
    },
    /// Paste with nothing cut or copied.
    EmptyClipboard,
    /// A move would place a node inside its own subtree.
    CycleForbidden,
}

impl fmt::Display for TreeOpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootForbidden => write!(f, "this operation is not allowed on the tree root"),
            Self::NotFound { index } => write!(f, "no tree node at index {index}"),
            Self::EmptyClipboard => write!(f, "nothing has been cut or copied"),
            Self::CycleForbidden => write!(f, "cannot move a node into its own subtree"),
        }
    }
}

impl std::error::Error for TreeOpError {}

/// Name given to freshly inserted nodes, before disambiguation.
const NEW_NODE_NAME: &str = "new";

impl TreeSync {
    fn located(&self, index: usize) -> Result<Vec<usize>, TreeOpError> {
        self.path_of(index).ok_or(TreeOpError::NotFound { index })
    }

    fn non_root(&self, index: usize) -> Result<Vec<usize>, TreeOpError> {
        let path = self.located(index)?;
        if path.is_empty() {
            return Err(TreeOpError::RootForbidden);
        }
        Ok(path)
    }

    fn source_at(&self, path: &[usize]) -> Result<SourceRef, TreeOpError> {
        let mut cur = self.root().source();
        for &i in path {
            let next = cur
                .borrow()
                .children
                .get(i)
                .map(Rc::clone)
                .ok_or(TreeOpError::NotFound { index: i })?;
            cur = next;
        }
        Ok(cur)
    }

    fn finish(&mut self) {
        self.sync_to_source();
        self.notify();
    }

    fn insert_at(&mut self, parent_path: &[usize], pos: usize) -> Result<(), TreeOpError> {
        let parent = self.source_at(parent_path)?;
        {
            let mut p = parent.borrow_mut();
            let name = unique_name(NEW_NODE_NAME, &p.children);
            let pos = pos.min(p.children.len());
            p.children.insert(pos, SourceNode::new(name));
        }
        self.finish();
        Ok(())
    }

    /// Insert a fresh node before the indexed one.
    pub fn insert_before(&mut self, index: usize) -> Result<(), TreeOpError> {
        let path = self.non_root(index)?;
        let (pos, parent_path) = path.split_last().expect("non-root path");
        self.insert_at(parent_path, *pos)
    }

    /// Insert a fresh node after the indexed one.
    pub fn insert_after(&mut self, index: usize) -> Result<(), TreeOpError> {
        let path = self.non_root(index)?;
        let (pos, parent_path) = path.split_last().expect("non-root path");
        self.insert_at(parent_path, *pos + 1)
    }

    /// Append a fresh child under the indexed node (root allowed).
    pub fn add_child(&mut self, index: usize) -> Result<(), TreeOpError> {
        let path = self.located(index)?;
        let len = self.source_at(&path)?.borrow().children.len();
        self.insert_at(&path, len)
    }

    /// Detach the indexed node from the source tree.
    ///
    /// The source node itself is not destroyed; the engine only drops
    /// its handle.
    pub fn delete(&mut self, index: usize) -> Result<(), TreeOpError> {
        let path = self.non_root(index)?;
        let (pos, parent_path) = path.split_last().expect("non-root path");
        let parent = self.source_at(parent_path)?;
        parent.borrow_mut().children.remove(*pos);
        self.finish();
        Ok(())
    }

    /// Insert a deep copy right after the indexed node, renamed to a
    /// sibling-unique name.
    pub fn duplicate(&mut self, index: usize) -> Result<(), TreeOpError> {
        let path = self.non_root(index)?;
        let (pos, parent_path) = path.split_last().expect("non-root path");
        let parent = self.source_at(parent_path)?;
        {
            let mut p = parent.borrow_mut();
            let copy = clone_subtree(&p.children[*pos]);
            let base = copy.borrow().name.clone();
            copy.borrow_mut().name = unique_name(&base, &p.children);
            p.children.insert(*pos + 1, copy);
        }
        self.finish();
        Ok(())
    }

    /// Detach the indexed node into the clipboard.
    pub fn cut(&mut self, index: usize) -> Result<(), TreeOpError> {
        let path = self.non_root(index)?;
        let (pos, parent_path) = path.split_last().expect("non-root path");
        let parent = self.source_at(parent_path)?;
        let node = parent.borrow_mut().children.remove(*pos);
        self.clipboard = Some(Clipboard { node, cut: true });
        self.finish();
        Ok(())
    }

    /// Copy the indexed subtree into the clipboard. No structural change.
    pub fn copy(&mut self, index: usize) -> Result<(), TreeOpError> {
        let path = self.located(index)?;
        let node = clone_subtree(&self.source_at(&path)?);
        self.clipboard = Some(Clipboard { node, cut: false });
        Ok(())
    }

    /// Paste the clipboard after the indexed node (under the root when
    /// the root itself is the target).
    ///
    /// A cut pastes as a move and keeps its name; a copy pastes as a
    /// duplicate and is renamed to a sibling-unique name. A copied
    /// clipboard survives for repeated pastes, a cut one is consumed.
    pub fn paste(&mut self, index: usize) -> Result<(), TreeOpError> {
        let clip = self.clipboard.take().ok_or(TreeOpError::EmptyClipboard)?;
        let action = if clip.cut { DropAction::Move } else { DropAction::Copy };
        let result = self.insert_payload(index, &clip.node, action);
        if !clip.cut {
            self.clipboard = Some(clip);
        }
        result
    }

    /// Drag-drop: place the node at `src_index` after `dst_index`.
    ///
    /// A move detaches the original first; dropping a node into its own
    /// subtree is rejected before anything is touched.
    pub fn drop_node(
        &mut self,
        src_index: usize,
        dst_index: usize,
        action: DropAction,
    ) -> Result<(), TreeOpError> {
        match action {
            DropAction::Copy => {
                let src_path = self.located(src_index)?;
                let payload = clone_subtree(&self.source_at(&src_path)?);
                self.insert_payload(dst_index, &payload, DropAction::Copy)
            }
            DropAction::Move => {
                let src_path = self.non_root(src_index)?;
                let dst_path = self.located(dst_index)?;
                if dst_path.starts_with(&src_path) {
                    return Err(TreeOpError::CycleForbidden);
                }
                let (src_pos, src_parent_path) = src_path.split_last().expect("non-root path");
                let src_parent = self.source_at(src_parent_path)?;
                let (dst_parent, mut dst_pos) = self.insertion_point(&dst_path)?;

                let node = src_parent.borrow_mut().children.remove(*src_pos);
                if Rc::ptr_eq(&src_parent, &dst_parent) && *src_pos < dst_pos {
                    dst_pos -= 1;
                }
                self.place(&dst_parent, dst_pos, &node, DropAction::Move);
                self.finish();
                Ok(())
            }
        }
    }

    /// Destination parent and position: after the addressed node, or as
    /// the last child when the root itself is the target.
    fn insertion_point(&self, path: &[usize]) -> Result<(SourceRef, usize), TreeOpError> {
        if path.is_empty() {
            let root = self.root().source();
            let len = root.borrow().children.len();
            return Ok((root, len));
        }
        let (pos, parent_path) = path.split_last().expect("non-empty path");
        Ok((self.source_at(parent_path)?, *pos + 1))
    }

    fn insert_payload(
        &mut self,
        index: usize,
        payload: &SourceRef,
        action: DropAction,
    ) -> Result<(), TreeOpError> {
        let path = self.located(index)?;
        let (parent, pos) = self.insertion_point(&path)?;
        self.place(&parent, pos, payload, action);
        self.finish();
        Ok(())
    }

    fn place(&self, parent: &SourceRef, pos: usize, payload: &SourceRef, action: DropAction) {
        let mut p = parent.borrow_mut();
        let node = match action {
            DropAction::Copy => {
                let copy = clone_subtree(payload);
                let base = copy.borrow().name.clone();
                copy.borrow_mut().name = unique_name(&base, &p.children);
                copy
            }
            DropAction::Move => {
                let name = payload.borrow().name.clone();
                if p.children.iter().any(|c| c.borrow().name == name) {
                    let renamed = unique_name(&name, &p.children);
                    tracing::warn!(
                        name = %name,
                        renamed = %renamed,
                        "moved node collides with a sibling"
                    );
                    payload.borrow_mut().name = renamed;
                }
                Rc::clone(payload)
            }
        };
        let idx = pos.min(p.children.len());
        p.children.insert(idx, node);
    }
}
