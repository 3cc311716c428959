#![forbid(unsafe_code)]

//! Widget-toolkit contract for bindui.
//!
//! The real toolkit (layout, rendering, input) is an external
//! collaborator; this crate is the slice of it the binding layer needs:
//! a widget node with a stable identity, a child-reconciliation
//! primitive, native edit payloads, and a modal dialog outcome. The
//! in-memory [`Widget`] doubles as the headless stand-in that tests
//! drive.

pub mod dialog;
pub mod reconcile;

pub use dialog::{Dialog, DialogOutcome};
pub use reconcile::{ChildSpec, Reconcile, ReconcileStats, reconcile_children};

use bitflags::bitflags;
use std::sync::atomic::{AtomicU64, Ordering};

/// Widget kinds the binding layer can request from the toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    /// Static text.
    Label,
    /// Boolean toggle.
    Checkbox,
    /// Numeric editor with optional min/max/step.
    Spinner,
    /// Free text editor.
    TextField,
    /// One-of-N chooser.
    Select,
    /// Push button (launchers, actions).
    Button,
    /// Container for child widgets.
    Frame,
    /// One row of a tree presentation.
    TreeRow,
}

bitflags! {
    /// Per-widget state flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct WidgetFlags: u8 {
        /// Disclosure state for tree rows and frames.
        const OPEN = 1 << 0;
        /// Selection state.
        const SELECTED = 1 << 1;
        /// Visual "differs from declared default" indicator.
        const MODIFIED = 1 << 2;
        /// Interaction disabled.
        const DISABLED = 1 << 3;
    }
}

/// Process-unique widget identity.
///
/// Assigned once at construction and preserved by reconciliation, so
/// "same widget survived the pass" is observable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(u64);

impl WidgetId {
    /// Allocate the next identity.
    #[must_use]
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// A widget's native edit payload, as reported by the toolkit.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetValue {
    /// Checkbox state.
    Bool(bool),
    /// Spinner value.
    Number(f64),
    /// Text field content.
    Text(String),
    /// Select choice.
    Choice(String),
}

/// Numeric display constraints, usually sourced from field tags.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NumberProps {
    /// Lower bound.
    pub min: Option<f64>,
    /// Upper bound.
    pub max: Option<f64>,
    /// Increment.
    pub step: Option<f64>,
}

/// An in-memory widget node.
#[derive(Debug, Clone)]
pub struct Widget {
    id: WidgetId,
    /// Widget kind.
    pub kind: WidgetKind,
    /// Stable name within the parent, used by reconciliation.
    pub name: String,
    /// Displayed text / current content.
    pub text: String,
    /// Tooltip / description.
    pub desc: String,
    /// Numeric constraints for spinners.
    pub number: NumberProps,
    /// Choices for selects.
    pub options: Vec<String>,
    /// State flags.
    pub flags: WidgetFlags,
    /// Ordered children.
    pub children: Vec<Widget>,
}

impl Widget {
    /// Create a widget of the given kind and stable name.
    #[must_use]
    pub fn new(kind: WidgetKind, name: impl Into<String>) -> Self {
        Self {
            id: WidgetId::next(),
            kind,
            name: name.into(),
            text: String::new(),
            desc: String::new(),
            number: NumberProps::default(),
            options: Vec::new(),
            flags: WidgetFlags::empty(),
            children: Vec::new(),
        }
    }

    /// Set the displayed text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// This widget's identity.
    #[must_use]
    pub fn id(&self) -> WidgetId {
        self.id
    }

    /// The `(kind, name)` descriptor of this widget.
    #[must_use]
    pub fn spec(&self) -> ChildSpec {
        ChildSpec::new(self.kind, self.name.clone())
    }

    /// Find a direct child by name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Widget> {
        self.children.iter().find(|c| c.name == name)
    }
}

impl Reconcile for Widget {
    fn spec(&self) -> ChildSpec {
        Widget::spec(self)
    }
}
