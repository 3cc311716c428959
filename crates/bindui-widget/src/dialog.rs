//! Modal dialog primitive.
//!
//! The toolkit's dialog chrome is out of scope; the contract is only
//! that a dialog embeds an arbitrary widget subtree and reports accept
//! or cancel. Cancel must discard edits without any write-back, which
//! the views layer guarantees by only committing on the accept path.

use crate::Widget;

/// Outcome of a modal interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogOutcome {
    /// The user confirmed; edits are committed.
    Accepted,
    /// The user backed out; transient state is discarded.
    Cancelled,
}

/// A modal dialog embedding a widget subtree.
#[derive(Debug, Clone)]
pub struct Dialog {
    /// Title line.
    pub title: String,
    /// Embedded content.
    pub content: Widget,
}

impl Dialog {
    /// Create a dialog around a widget subtree.
    #[must_use]
    pub fn new(title: impl Into<String>, content: Widget) -> Self {
        Self {
            title: title.into(),
            content,
        }
    }
}
