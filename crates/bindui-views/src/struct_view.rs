//! Struct view: one member editor per visible flat field.
//!
//! The member list comes from the type's embedding-flattened fields,
//! filtered by conditional visibility, then reconciled positionally.
//! Visibility is re-evaluated on every refresh, so a member whose
//! `viewif` condition flips appears or disappears on the next pass
//! without disturbing the members before it.

use crate::members::{MemberPlan, Members};
use crate::{CompoundMode, EditOutcome, View, ViewCtx};
use bindui_value::{Binding, StructValue, Value};
use bindui_widget::{ReconcileStats, Widget, WidgetKind, WidgetValue};

/// Whether a flat field is currently visible.
///
/// A `viewif` tag names a sibling flat field whose truthiness gates the
/// member; a leading `!` negates. A type-level visibility hook, when
/// present, is consulted as well. An unknown sibling is logged and the
/// member stays visible.
fn field_visible(sv: &StructValue, field_name: &str, viewif: Option<&str>) -> bool {
    if let Some(hook) = sv.ty.show_if
        && !hook(sv, field_name)
    {
        return false;
    }
    let Some(cond) = viewif else {
        return true;
    };
    let (negated, sibling) = match cond.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, cond),
    };
    let Some(value) = sv.flat_value(sibling) else {
        tracing::warn!(field = %field_name, condition = %cond, "viewif names an unknown sibling");
        return true;
    };
    value.truthy() != negated
}

/// Compound editor for a struct value.
pub struct StructView {
    widget: Widget,
    binding: Binding,
    ctx: ViewCtx,
    mode: CompoundMode,
    members: Members,
}

impl StructView {
    /// Build over a struct binding; `None` when the binding is not a
    /// struct.
    #[must_use]
    pub fn new(binding: Binding, ctx: ViewCtx, hint: Option<&str>) -> Option<Self> {
        let Value::Struct(sv) = binding.get() else {
            tracing::warn!(binding = ?binding, "struct view over a non-struct value");
            return None;
        };
        let mode = CompoundMode::from_hint(hint);
        let kind = match mode {
            CompoundMode::Inline => WidgetKind::Frame,
            CompoundMode::Launcher => WidgetKind::Button,
        };
        let mut widget = Widget::new(kind, binding.field_name().unwrap_or(sv.ty.name.as_str()));
        if let Some(desc) = binding.tag("desc") {
            widget.desc = desc.to_string();
        }
        let mut view = Self {
            widget,
            binding,
            ctx,
            mode,
            members: Members::new(),
        };
        view.refresh();
        Some(view)
    }

    fn plan(&self, sv: &StructValue) -> Vec<MemberPlan> {
        sv.ty
            .flat_fields()
            .iter()
            .filter(|flat| {
                field_visible(
                    sv,
                    &flat.field.name,
                    flat.field.tags.get("viewif").map(String::as_str),
                )
            })
            .map(|flat| {
                MemberPlan::new(
                    flat.field.name.clone(),
                    self.binding.child_field(flat),
                    flat.field.tags.get("view").map(String::as_str),
                )
            })
            .collect()
    }
}

impl View for StructView {
    fn widget(&self) -> &Widget {
        &self.widget
    }

    fn widget_mut(&mut self) -> &mut Widget {
        &mut self.widget
    }

    fn refresh(&mut self) -> ReconcileStats {
        let Value::Struct(sv) = self.binding.get() else {
            tracing::warn!(binding = ?self.binding, "struct value replaced by another shape");
            return ReconcileStats::default();
        };
        let plans = self.plan(&sv);
        let stats = self.members.reconcile(&plans, &self.ctx);
        match self.mode {
            CompoundMode::Inline => self.members.sync_into(&mut self.widget),
            CompoundMode::Launcher => {
                self.widget.text = Value::Struct(sv).display();
            }
        }
        stats
    }

    fn handle_edit(&mut self, input: WidgetValue) -> EditOutcome {
        tracing::warn!(input = ?input, "a struct has no direct edit payload");
        EditOutcome::Rejected
    }

    fn dispatch_edit(&mut self, path: &[&str], input: WidgetValue) -> EditOutcome {
        if path.is_empty() {
            return self.handle_edit(input);
        }
        let outcome = self.members.dispatch_edit(path, input);
        if outcome.changed() {
            // Return path of the bubble: visibility and derived state
            // are re-evaluated before the change is reported upward.
            self.refresh();
        }
        outcome
    }

    fn owns_activation(&self) -> bool {
        self.mode == CompoundMode::Launcher
    }
}
