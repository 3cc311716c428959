//! Reference view: a nullable pointer slot.
//!
//! A nil reference shows a single "create" button; activating it
//! allocates the zero target value and swaps in the target's own view.
//! A live reference is transparent in edit routing: paths address the
//! target's members directly.

use crate::registry;
use crate::{EditOutcome, View, ViewCtx};
use bindui_value::{Binding, Value};
use bindui_widget::{ReconcileStats, Widget, WidgetKind, WidgetValue};

/// View for a nullable reference value.
pub struct RefView {
    widget: Widget,
    binding: Binding,
    ctx: ViewCtx,
    hint: Option<String>,
    inner: Option<Box<dyn View>>,
    create_button: Widget,
}

impl RefView {
    /// Build over a reference binding; `None` when the slot is not a
    /// reference.
    #[must_use]
    pub fn new(binding: Binding, ctx: ViewCtx, hint: Option<&str>) -> Option<Self> {
        let Some(Value::Ref(_)) = binding.try_get_raw() else {
            tracing::warn!(binding = ?binding, "reference view over a non-reference slot");
            return None;
        };
        let widget = Widget::new(WidgetKind::Frame, binding.field_name().unwrap_or("ref"));
        let create_button = Widget::new(WidgetKind::Button, "create").with_text("create");
        let mut view = Self {
            widget,
            binding,
            ctx,
            hint: hint.map(str::to_string),
            inner: None,
            create_button,
        };
        view.refresh();
        Some(view)
    }

    /// Whether the reference currently has a target.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.inner.is_some()
    }

    /// Allocate the zero target for a nil reference.
    ///
    /// Returns `Changed` on allocation, `Unchanged` when already live.
    pub fn create(&mut self) -> EditOutcome {
        if self.binding.ensure_target() {
            self.refresh();
            EditOutcome::Changed
        } else {
            EditOutcome::Unchanged
        }
    }
}

impl View for RefView {
    fn widget(&self) -> &Widget {
        &self.widget
    }

    fn widget_mut(&mut self) -> &mut Widget {
        &mut self.widget
    }

    fn refresh(&mut self) -> ReconcileStats {
        let live = matches!(
            self.binding.try_get_raw(),
            Some(Value::Ref(rv)) if rv.target.is_some()
        );
        let mut stats = ReconcileStats::default();
        if live {
            if self.inner.is_none() {
                self.inner = registry::dispatch(
                    self.binding.deref(),
                    self.hint.as_deref(),
                    &self.ctx,
                );
                if self.inner.is_some() {
                    stats.created += 1;
                }
            }
            if let Some(inner) = &mut self.inner {
                stats.absorb(inner.refresh());
                self.widget.children = vec![inner.widget().clone()];
            }
        } else {
            if self.inner.take().is_some() {
                stats.dropped += 1;
            }
            self.widget.children = vec![self.create_button.clone()];
        }
        stats
    }

    fn handle_edit(&mut self, input: WidgetValue) -> EditOutcome {
        tracing::warn!(input = ?input, "a reference has no direct edit payload");
        EditOutcome::Rejected
    }

    fn dispatch_edit(&mut self, path: &[&str], input: WidgetValue) -> EditOutcome {
        match path.split_first() {
            None => self.handle_edit(input),
            Some((&"create", [])) if self.inner.is_none() => self.create(),
            Some(_) => {
                let Some(inner) = &mut self.inner else {
                    tracing::warn!(path = ?path, "edit into a nil reference");
                    return EditOutcome::Rejected;
                };
                let outcome = inner.dispatch_edit(path, input);
                if outcome.changed() {
                    self.widget.children = vec![inner.widget().clone()];
                }
                outcome
            }
        }
    }
}
