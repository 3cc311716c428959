//! Leaf views: one scalar value, one editor widget.
//!
//! Each leaf pushes the bound value into its widget on refresh and maps
//! the widget's native payload back through the binding on edit. The
//! binding does conversion and equality short-circuiting; a leaf only
//! translates payload shapes. A payload of the wrong shape is rejected
//! and logged, never applied partially.

use crate::{EditOutcome, View};
use bindui_value::{Binding, Value};
use bindui_widget::{ReconcileStats, Widget, WidgetFlags, WidgetKind, WidgetValue};

fn leaf_widget(kind: WidgetKind, binding: &Binding) -> Widget {
    let mut w = Widget::new(kind, binding.field_name().unwrap_or("value"));
    if let Some(desc) = binding.tag("desc") {
        w.desc = desc.to_string();
    }
    w
}

fn refresh_leaf(widget: &mut Widget, binding: &Binding) -> ReconcileStats {
    widget.text = binding.get().display();
    widget
        .flags
        .set(WidgetFlags::MODIFIED, binding.is_default() == Some(false));
    ReconcileStats::default()
}

fn apply(binding: &mut Binding, value: Value) -> EditOutcome {
    if binding.set(value) {
        EditOutcome::Changed
    } else {
        EditOutcome::Unchanged
    }
}

/// Checkbox over a boolean.
pub struct BoolView {
    widget: Widget,
    binding: Binding,
}

impl BoolView {
    #[must_use]
    pub fn new(binding: Binding) -> Self {
        let mut v = Self {
            widget: leaf_widget(WidgetKind::Checkbox, &binding),
            binding,
        };
        v.refresh();
        v
    }
}

impl View for BoolView {
    fn widget(&self) -> &Widget {
        &self.widget
    }

    fn widget_mut(&mut self) -> &mut Widget {
        &mut self.widget
    }

    fn refresh(&mut self) -> ReconcileStats {
        refresh_leaf(&mut self.widget, &self.binding)
    }

    fn handle_edit(&mut self, input: WidgetValue) -> EditOutcome {
        let WidgetValue::Bool(b) = input else {
            tracing::warn!(input = ?input, "checkbox expects a boolean payload");
            return EditOutcome::Rejected;
        };
        let outcome = apply(&mut self.binding, Value::Bool(b));
        self.refresh();
        outcome
    }

    fn is_default(&self) -> Option<bool> {
        self.binding.is_default()
    }
}

/// Spinner over an integer.
///
/// The spinner reports floats; the binding's conversion makes them land
/// as integers. Display constraints come from `min`/`max`/`step` tags.
pub struct IntView {
    widget: Widget,
    binding: Binding,
}

impl IntView {
    #[must_use]
    pub fn new(binding: Binding) -> Self {
        let mut widget = leaf_widget(WidgetKind::Spinner, &binding);
        widget.number = number_props(&binding);
        let mut v = Self { widget, binding };
        v.refresh();
        v
    }
}

impl View for IntView {
    fn widget(&self) -> &Widget {
        &self.widget
    }

    fn widget_mut(&mut self) -> &mut Widget {
        &mut self.widget
    }

    fn refresh(&mut self) -> ReconcileStats {
        refresh_leaf(&mut self.widget, &self.binding)
    }

    fn handle_edit(&mut self, input: WidgetValue) -> EditOutcome {
        let WidgetValue::Number(n) = input else {
            tracing::warn!(input = ?input, "spinner expects a numeric payload");
            return EditOutcome::Rejected;
        };
        let outcome = apply(&mut self.binding, Value::Float(n));
        self.refresh();
        outcome
    }

    fn is_default(&self) -> Option<bool> {
        self.binding.is_default()
    }
}

/// Spinner over a float.
pub struct FloatView {
    widget: Widget,
    binding: Binding,
}

impl FloatView {
    #[must_use]
    pub fn new(binding: Binding) -> Self {
        let mut widget = leaf_widget(WidgetKind::Spinner, &binding);
        widget.number = number_props(&binding);
        let mut v = Self { widget, binding };
        v.refresh();
        v
    }
}

impl View for FloatView {
    fn widget(&self) -> &Widget {
        &self.widget
    }

    fn widget_mut(&mut self) -> &mut Widget {
        &mut self.widget
    }

    fn refresh(&mut self) -> ReconcileStats {
        refresh_leaf(&mut self.widget, &self.binding)
    }

    fn handle_edit(&mut self, input: WidgetValue) -> EditOutcome {
        let WidgetValue::Number(n) = input else {
            tracing::warn!(input = ?input, "spinner expects a numeric payload");
            return EditOutcome::Rejected;
        };
        let outcome = apply(&mut self.binding, Value::Float(n));
        self.refresh();
        outcome
    }

    fn is_default(&self) -> Option<bool> {
        self.binding.is_default()
    }
}

/// Text field over a string.
pub struct StrView {
    widget: Widget,
    binding: Binding,
}

impl StrView {
    #[must_use]
    pub fn new(binding: Binding) -> Self {
        let mut v = Self {
            widget: leaf_widget(WidgetKind::TextField, &binding),
            binding,
        };
        v.refresh();
        v
    }
}

impl View for StrView {
    fn widget(&self) -> &Widget {
        &self.widget
    }

    fn widget_mut(&mut self) -> &mut Widget {
        &mut self.widget
    }

    fn refresh(&mut self) -> ReconcileStats {
        refresh_leaf(&mut self.widget, &self.binding)
    }

    fn handle_edit(&mut self, input: WidgetValue) -> EditOutcome {
        let WidgetValue::Text(s) = input else {
            tracing::warn!(input = ?input, "text field expects a text payload");
            return EditOutcome::Rejected;
        };
        let outcome = apply(&mut self.binding, Value::Str(s));
        self.refresh();
        outcome
    }

    fn is_default(&self) -> Option<bool> {
        self.binding.is_default()
    }
}

/// Select over a closed enum.
pub struct EnumView {
    widget: Widget,
    binding: Binding,
}

impl EnumView {
    #[must_use]
    pub fn new(binding: Binding) -> Self {
        let mut widget = leaf_widget(WidgetKind::Select, &binding);
        if let Value::Enum(ev) = binding.get() {
            widget.options = ev.ty.variants.clone();
        }
        let mut v = Self { widget, binding };
        v.refresh();
        v
    }
}

impl View for EnumView {
    fn widget(&self) -> &Widget {
        &self.widget
    }

    fn widget_mut(&mut self) -> &mut Widget {
        &mut self.widget
    }

    fn refresh(&mut self) -> ReconcileStats {
        refresh_leaf(&mut self.widget, &self.binding)
    }

    fn handle_edit(&mut self, input: WidgetValue) -> EditOutcome {
        let choice = match input {
            WidgetValue::Choice(c) | WidgetValue::Text(c) => c,
            other => {
                tracing::warn!(input = ?other, "select expects a choice payload");
                return EditOutcome::Rejected;
            }
        };
        // Str-to-enum conversion validates the variant name.
        let outcome = apply(&mut self.binding, Value::Str(choice));
        self.refresh();
        outcome
    }

    fn is_default(&self) -> Option<bool> {
        self.binding.is_default()
    }
}

fn number_props(binding: &Binding) -> bindui_widget::NumberProps {
    let parse = |key: &str| binding.tag(key).and_then(|raw| raw.parse::<f64>().ok());
    bindui_widget::NumberProps {
        min: parse("min"),
        max: parse("max"),
        step: parse("step"),
    }
}
