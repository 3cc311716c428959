//! List view: one member editor per element, positionally named.
//!
//! The presentation layout is decided once at construction: a list of
//! struct elements becomes a table (one column per flat field), anything
//! else a plain row list. Element insertion and deletion go through the
//! whole-list binding so a list nested in a map entry still triggers the
//! owning entry's write-back.

use crate::members::{MemberPlan, Members};
use crate::{CompoundMode, EditOutcome, View, ViewCtx};
use bindui_value::{Binding, ListValue, TypeTag, Value};
use bindui_widget::{ReconcileStats, Widget, WidgetKind, WidgetValue};

/// Presentation layout, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListLayout {
    /// One row per element.
    Rows,
    /// Struct elements: one column per flat field.
    Table(Vec<String>),
}

/// Compound editor for a list value.
pub struct ListView {
    widget: Widget,
    binding: Binding,
    ctx: ViewCtx,
    mode: CompoundMode,
    layout: ListLayout,
    members: Members,
}

impl ListView {
    /// Build over a list binding; `None` when the binding is not a list.
    #[must_use]
    pub fn new(binding: Binding, ctx: ViewCtx, hint: Option<&str>) -> Option<Self> {
        let Value::List(lv) = binding.get() else {
            tracing::warn!(binding = ?binding, "list view over a non-list value");
            return None;
        };
        let layout = match &lv.elem_ty {
            TypeTag::Struct(ty) => ListLayout::Table(
                ty.flat_fields()
                    .iter()
                    .map(|f| f.field.name.clone())
                    .collect(),
            ),
            _ => ListLayout::Rows,
        };
        let mode = CompoundMode::from_hint(hint);
        let kind = match mode {
            CompoundMode::Inline => WidgetKind::Frame,
            CompoundMode::Launcher => WidgetKind::Button,
        };
        let mut widget = Widget::new(kind, binding.field_name().unwrap_or("list"));
        if let Some(desc) = binding.tag("desc") {
            widget.desc = desc.to_string();
        }
        let mut view = Self {
            widget,
            binding,
            ctx,
            mode,
            layout,
            members: Members::new(),
        };
        view.refresh();
        Some(view)
    }

    /// The layout decided at construction.
    #[must_use]
    pub fn layout(&self) -> &ListLayout {
        &self.layout
    }

    fn list_value(&self) -> Option<ListValue> {
        match self.binding.get() {
            Value::List(lv) => Some(lv),
            other => {
                tracing::warn!(kind = %other.kind(), "list value replaced by another shape");
                None
            }
        }
    }

    /// Insert a zero element at `index` (clamped to the end).
    ///
    /// Returns whether the list changed.
    pub fn insert(&mut self, index: usize) -> bool {
        let Some(mut lv) = self.list_value() else {
            return false;
        };
        let at = index.min(lv.items.len());
        lv.items.insert(at, lv.elem_ty.zero());
        let changed = self.binding.set(Value::List(lv));
        if changed {
            self.refresh();
        }
        changed
    }

    /// Append a zero element.
    ///
    /// The position comes from the list value itself; the member list
    /// can be shorter when elements are undisplayable.
    pub fn push(&mut self) -> bool {
        match self.list_value() {
            Some(lv) => self.insert(lv.items.len()),
            None => false,
        }
    }

    /// Remove the element at `index`.
    pub fn remove(&mut self, index: usize) -> bool {
        let Some(mut lv) = self.list_value() else {
            return false;
        };
        if index >= lv.items.len() {
            tracing::warn!(index, len = lv.items.len(), "remove out of range");
            return false;
        }
        lv.items.remove(index);
        let changed = self.binding.set(Value::List(lv));
        if changed {
            self.refresh();
        }
        changed
    }

    fn plan(&self, lv: &ListValue) -> Vec<MemberPlan> {
        let elem_hint = match self.layout {
            // Table rows embed their columns.
            ListLayout::Table(_) => Some("inline"),
            ListLayout::Rows => None,
        };
        (0..lv.items.len())
            .map(|i| MemberPlan::new(i.to_string(), self.binding.elem(i), elem_hint))
            .collect()
    }
}

impl View for ListView {
    fn widget(&self) -> &Widget {
        &self.widget
    }

    fn widget_mut(&mut self) -> &mut Widget {
        &mut self.widget
    }

    fn refresh(&mut self) -> ReconcileStats {
        let Some(lv) = self.list_value() else {
            return ReconcileStats::default();
        };
        let plans = self.plan(&lv);
        let stats = self.members.reconcile(&plans, &self.ctx);
        match self.mode {
            CompoundMode::Inline => self.members.sync_into(&mut self.widget),
            CompoundMode::Launcher => {
                self.widget.text = Value::List(lv).display();
            }
        }
        stats
    }

    fn handle_edit(&mut self, input: WidgetValue) -> EditOutcome {
        tracing::warn!(input = ?input, "a list has no direct edit payload");
        EditOutcome::Rejected
    }

    fn dispatch_edit(&mut self, path: &[&str], input: WidgetValue) -> EditOutcome {
        if path.is_empty() {
            return self.handle_edit(input);
        }
        let outcome = self.members.dispatch_edit(path, input);
        if outcome.changed() {
            self.refresh();
        }
        outcome
    }

    fn owns_activation(&self) -> bool {
        self.mode == CompoundMode::Launcher
    }
}
