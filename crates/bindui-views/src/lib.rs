#![forbid(unsafe_code)]

//! Value-bound views for bindui.
//!
//! A [`View`] adapts one value shape to one widget: it knows how to push
//! the bound value into the widget, pull an edited widget payload back
//! through the binding, and (for compounds) keep a child list in sync
//! with the value's members via name-stable reconciliation.
//!
//! Edits are delivered from the root with [`View::dispatch_edit`]; the
//! recursion's return path is the change bubble — each ancestor compound
//! re-evaluates its derived state (conditional visibility, at-default
//! indicators) before reporting the change upward. Propagation is
//! synchronous and depth-bounded by the value's actual nesting.
//!
//! # Example
//!
//! ```
//! use bindui_value::{Binding, FieldType, StructType, TypeTag, Value};
//! use bindui_views::{ViewCtx, dispatch};
//! use bindui_widget::WidgetValue;
//!
//! let ty = StructType::new("Point", vec![
//!     FieldType::new("X", TypeTag::Int),
//!     FieldType::new("Y", TypeTag::Int),
//! ]);
//! let binding = Binding::standalone(Value::struct_of(&ty, &[("X", Value::Int(3))]));
//! let mut view = dispatch(binding.clone(), Some("inline"), &ViewCtx::new()).unwrap();
//!
//! assert!(view.dispatch_edit(&["X"], WidgetValue::Number(4.0)).changed());
//! ```

pub mod edit_dialog;
pub mod invoke;
pub mod leaf;
pub mod list_view;
pub mod map_view;
pub mod members;
pub mod ref_view;
pub mod registry;
pub mod struct_view;

pub use edit_dialog::EditDialog;
pub use invoke::{CallError, CallFlow, CallState, MethodImpl, MethodSpec, ParamSpec};
pub use leaf::{BoolView, EnumView, FloatView, IntView, StrView};
pub use list_view::{ListLayout, ListView};
pub use map_view::{MapView, SortMode};
pub use ref_view::RefView;
pub use registry::{Factory, ViewRegistry, dispatch};
pub use struct_view::StructView;

use bindui_value::WriteBack;
use bindui_widget::{ReconcileStats, Widget, WidgetValue};
use std::rc::Rc;

/// How the members of a compound view are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompoundMode {
    /// Members embedded directly in the parent.
    Inline,
    /// A launcher button that opens the members in a modal editor.
    ///
    /// The default for structs, lists, and maps: it bounds inline
    /// nesting depth for arbitrarily deep values.
    Launcher,
}

impl CompoundMode {
    /// Resolve a `view` tag hint into a mode.
    #[must_use]
    pub fn from_hint(hint: Option<&str>) -> Self {
        match hint {
            Some("inline") | Some("show-name") => Self::Inline,
            _ => Self::Launcher,
        }
    }
}

/// Outcome of delivering one edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The underlying value changed; ancestors re-evaluated.
    Changed,
    /// The edit produced the value already present.
    Unchanged,
    /// The edit could not be applied (wrong payload, unknown member).
    Rejected,
}

impl EditOutcome {
    /// Whether the underlying value changed.
    #[must_use]
    pub fn changed(self) -> bool {
        matches!(self, Self::Changed)
    }
}

/// Shared construction context for a view tree.
///
/// Carries the persistence collaborator: the write-back handed to
/// non-addressable member bindings (map entries). The default context
/// uses a no-op write-back, which still satisfies the binder-creation
/// invariant; callers that persist supply their own.
#[derive(Clone)]
pub struct ViewCtx {
    save: WriteBack,
}

impl ViewCtx {
    /// Context with a no-op persistence callback.
    #[must_use]
    pub fn new() -> Self {
        Self {
            save: Rc::new(|| {}),
        }
    }

    /// Context with an explicit persistence callback.
    #[must_use]
    pub fn with_save(save: WriteBack) -> Self {
        Self { save }
    }

    /// The persistence callback for non-addressable members.
    #[must_use]
    pub fn save(&self) -> WriteBack {
        Rc::clone(&self.save)
    }
}

impl Default for ViewCtx {
    fn default() -> Self {
        Self::new()
    }
}

/// A widget-producing, value-bound adapter for one value shape.
pub trait View {
    /// The widget this view produced.
    fn widget(&self) -> &Widget;

    /// Mutable access to the widget.
    fn widget_mut(&mut self) -> &mut Widget;

    /// Push the bound value into the widget.
    ///
    /// Must be idempotent: with no underlying change, a second call
    /// performs no child creations or destructions. Must never mutate
    /// the bound value.
    fn refresh(&mut self) -> ReconcileStats;

    /// Apply an edited widget payload to the bound value.
    fn handle_edit(&mut self, input: WidgetValue) -> EditOutcome;

    /// Route an edit along a member-name path, bubbling the outcome.
    ///
    /// An empty path addresses this view itself. Compounds re-evaluate
    /// their derived state on the return path of a changed edit.
    fn dispatch_edit(&mut self, path: &[&str], input: WidgetValue) -> EditOutcome {
        if path.is_empty() {
            self.handle_edit(input)
        } else {
            tracing::warn!(path = ?path, "edit path into a leaf view");
            EditOutcome::Rejected
        }
    }

    /// Whether the bound value equals its declared default, if one exists.
    fn is_default(&self) -> Option<bool> {
        None
    }

    /// Whether this view supplies its own activation UI (its own modal)
    /// instead of sitting in a generic grid.
    fn owns_activation(&self) -> bool {
        false
    }
}

/// A root view plus its change observer.
///
/// The observer fires once per accepted edit, after the bubble has run
/// to the root — the single notification a dialog or window reacts to.
pub struct ViewHost {
    view: Box<dyn View>,
    on_change: Option<Rc<dyn Fn()>>,
}

impl ViewHost {
    /// Host a root view.
    #[must_use]
    pub fn new(view: Box<dyn View>) -> Self {
        Self {
            view,
            on_change: None,
        }
    }

    /// Register the root change observer.
    #[must_use]
    pub fn on_change(mut self, f: Rc<dyn Fn()>) -> Self {
        self.on_change = Some(f);
        self
    }

    /// The hosted root view.
    #[must_use]
    pub fn view(&self) -> &dyn View {
        &*self.view
    }

    /// Mutable access to the hosted root view.
    pub fn view_mut(&mut self) -> &mut dyn View {
        &mut *self.view
    }

    /// Deliver an edit and fire the root observer if it changed.
    pub fn dispatch_edit(&mut self, path: &[&str], input: WidgetValue) -> EditOutcome {
        let outcome = self.view.dispatch_edit(path, input);
        if outcome.changed()
            && let Some(f) = &self.on_change
        {
            f();
        }
        outcome
    }
}
