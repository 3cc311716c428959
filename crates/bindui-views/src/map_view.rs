//! Map view: per-entry key and value editors over a string-keyed map.
//!
//! Map entries are not independently addressable, so every entry binding
//! carries the context's write-back; an accepted edit is a
//! read-modify-replace into the map followed by exactly one write-back.
//! Keys edit through `map_key` bindings (re-keying, collision-rejected).
//! A map whose declared value type is open gets a per-entry type
//! selector; switching the concrete type converts the old payload
//! best-effort and replaces the entry.

use crate::members::{MemberPlan, Members};
use crate::{CompoundMode, EditOutcome, View, ViewCtx};
use bindui_value::{Binding, MapValue, TypeTag, Value, convert_or_zero};
use bindui_widget::{
    ChildSpec, ReconcileStats, Widget, WidgetKind, WidgetValue, reconcile_children,
};

/// Entry enumeration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    /// Key-sorted (the map's natural order).
    #[default]
    ByKey,
    /// Sorted by the value's display form, key as tie-break.
    ByValue,
}

/// Concrete types offered by the open-map type selector.
const OPEN_TYPE_CHOICES: &[(&str, TypeTag)] = &[
    ("bool", TypeTag::Bool),
    ("int", TypeTag::Int),
    ("float", TypeTag::Float),
    ("str", TypeTag::Str),
];

/// Compound editor for a string-keyed map value.
pub struct MapView {
    widget: Widget,
    binding: Binding,
    ctx: ViewCtx,
    mode: CompoundMode,
    sort: SortMode,
    open_typed: bool,
    members: Members,
    selectors: Vec<Widget>,
}

impl MapView {
    /// Build over a map binding; `None` when the binding is not a map.
    #[must_use]
    pub fn new(binding: Binding, ctx: ViewCtx, hint: Option<&str>) -> Option<Self> {
        let Value::Map(mv) = binding.get() else {
            tracing::warn!(binding = ?binding, "map view over a non-map value");
            return None;
        };
        let mode = CompoundMode::from_hint(hint);
        let kind = match mode {
            CompoundMode::Inline => WidgetKind::Frame,
            CompoundMode::Launcher => WidgetKind::Button,
        };
        let mut widget = Widget::new(kind, binding.field_name().unwrap_or("map"));
        if let Some(desc) = binding.tag("desc") {
            widget.desc = desc.to_string();
        }
        let mut view = Self {
            widget,
            binding,
            ctx,
            mode,
            sort: SortMode::ByKey,
            open_typed: mv.value_ty == TypeTag::Any,
            members: Members::new(),
            selectors: Vec::new(),
        };
        view.refresh();
        Some(view)
    }

    /// Current enumeration order.
    #[must_use]
    pub fn sort_mode(&self) -> SortMode {
        self.sort
    }

    /// Switch enumeration order and re-run the pass.
    pub fn set_sort_mode(&mut self, sort: SortMode) {
        if self.sort != sort {
            self.sort = sort;
            self.refresh();
        }
    }

    fn map_value(&self) -> Option<MapValue> {
        match self.binding.get() {
            Value::Map(mv) => Some(mv),
            other => {
                tracing::warn!(kind = %other.kind(), "map value replaced by another shape");
                None
            }
        }
    }

    fn ordered_keys(&self, mv: &MapValue) -> Vec<String> {
        let mut keys: Vec<String> = mv.entries.keys().cloned().collect();
        if self.sort == SortMode::ByValue {
            keys.sort_by(|a, b| {
                let da = mv.entries[a].display();
                let db = mv.entries[b].display();
                da.cmp(&db).then_with(|| a.cmp(b))
            });
        }
        keys
    }

    /// Insert an entry with the zero value of the declared type.
    ///
    /// Rejected (logged) when the key already exists.
    pub fn insert(&mut self, key: &str) -> bool {
        let Some(mut mv) = self.map_value() else {
            return false;
        };
        if mv.entries.contains_key(key) {
            tracing::warn!(key, "insert collides with an existing entry");
            return false;
        }
        mv.entries.insert(key.to_string(), mv.value_ty.zero());
        let changed = self.binding.set(Value::Map(mv));
        if changed {
            self.refresh();
        }
        changed
    }

    /// Remove an entry by key.
    pub fn remove(&mut self, key: &str) -> bool {
        let Some(mut mv) = self.map_value() else {
            return false;
        };
        if mv.entries.remove(key).is_none() {
            tracing::warn!(key, "remove of an absent entry");
            return false;
        }
        let changed = self.binding.set(Value::Map(mv));
        if changed {
            self.refresh();
        }
        changed
    }

    /// Switch an open-typed entry to the named concrete type.
    ///
    /// The old payload carries over where a conversion exists, otherwise
    /// the new type's zero value is used. The replacement goes through
    /// the entry binding, so it counts as one accepted edit.
    pub fn set_entry_type(&mut self, key: &str, type_name: &str) -> EditOutcome {
        if !self.open_typed {
            tracing::warn!(key, "type switch on a closed-typed map");
            return EditOutcome::Rejected;
        }
        let Some((_, tag)) = OPEN_TYPE_CHOICES.iter().find(|(n, _)| *n == type_name) else {
            tracing::warn!(key, ty = %type_name, "unknown concrete type");
            return EditOutcome::Rejected;
        };
        let Some(mv) = self.map_value() else {
            return EditOutcome::Rejected;
        };
        let Some(current) = mv.entries.get(key) else {
            tracing::warn!(key, "type switch on an absent entry");
            return EditOutcome::Rejected;
        };
        let inner = match current {
            Value::Any(Some(inner)) => (**inner).clone(),
            Value::Any(None) => tag.zero(),
            other => other.clone(),
        };
        let replacement = convert_or_zero(&inner, tag);
        let mut entry = match self.binding.map_value(key, Some(self.ctx.save())) {
            Ok(b) => b,
            Err(err) => {
                tracing::warn!(key, %err, "entry binding construction failed");
                return EditOutcome::Rejected;
            }
        };
        let outcome = if entry.set(replacement) {
            EditOutcome::Changed
        } else {
            EditOutcome::Unchanged
        };
        if outcome.changed() {
            self.refresh();
        }
        outcome
    }

    fn plan(&self, keys: &[String]) -> Vec<MemberPlan> {
        let mut plans = Vec::with_capacity(keys.len() * 2);
        for key in keys {
            match self.binding.map_key(key, Some(self.ctx.save())) {
                Ok(b) => plans.push(MemberPlan::new(format!("key-{key}"), b, None)),
                Err(err) => {
                    tracing::warn!(key = %key, %err, "key binding construction failed");
                    continue;
                }
            }
            match self.binding.map_value(key, Some(self.ctx.save())) {
                Ok(b) => plans.push(MemberPlan::new(format!("value-{key}"), b, None)),
                Err(err) => {
                    tracing::warn!(key = %key, %err, "value binding construction failed");
                }
            }
        }
        plans
    }

    fn sync_selectors(&mut self, mv: &MapValue, keys: &[String]) -> ReconcileStats {
        if !self.open_typed {
            return ReconcileStats::default();
        }
        let plan: Vec<ChildSpec> = keys
            .iter()
            .map(|k| ChildSpec::new(WidgetKind::Select, format!("type-{k}")))
            .collect();
        let stats = reconcile_children(&mut self.selectors, &plan, |_, spec| {
            let mut w = Widget::new(spec.kind, spec.name.clone());
            w.options = OPEN_TYPE_CHOICES.iter().map(|(n, _)| (*n).to_string()).collect();
            Some(w)
        });
        for (selector, key) in self.selectors.iter_mut().zip(keys) {
            selector.text = match mv.entries.get(key) {
                Some(Value::Any(Some(inner))) => inner.kind().to_string(),
                _ => "nil".to_string(),
            };
        }
        stats
    }
}

impl View for MapView {
    fn widget(&self) -> &Widget {
        &self.widget
    }

    fn widget_mut(&mut self) -> &mut Widget {
        &mut self.widget
    }

    fn refresh(&mut self) -> ReconcileStats {
        let Some(mv) = self.map_value() else {
            return ReconcileStats::default();
        };
        let keys = self.ordered_keys(&mv);
        let plans = self.plan(&keys);
        let mut stats = self.members.reconcile(&plans, &self.ctx);
        stats.absorb(self.sync_selectors(&mv, &keys));
        match self.mode {
            CompoundMode::Inline => {
                self.members.sync_into(&mut self.widget);
                self.widget.children.extend(self.selectors.iter().cloned());
            }
            CompoundMode::Launcher => {
                self.widget.text = Value::Map(mv).display();
            }
        }
        stats
    }

    fn handle_edit(&mut self, input: WidgetValue) -> EditOutcome {
        tracing::warn!(input = ?input, "a map has no direct edit payload");
        EditOutcome::Rejected
    }

    fn dispatch_edit(&mut self, path: &[&str], input: WidgetValue) -> EditOutcome {
        let Some((head, rest)) = path.split_first() else {
            return self.handle_edit(input);
        };
        if let Some(key) = head.strip_prefix("type-") {
            if !rest.is_empty() {
                tracing::warn!(path = ?path, "type selector takes no sub-path");
                return EditOutcome::Rejected;
            }
            let choice = match input {
                WidgetValue::Choice(c) => c,
                other => {
                    tracing::warn!(input = ?other, "type selector expects a choice payload");
                    return EditOutcome::Rejected;
                }
            };
            let key = key.to_string();
            return self.set_entry_type(&key, &choice);
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn bool_map(pairs: &[(&str, bool)]) -> (Binding, Rc<Cell<u32>>) {
        let pairs: Vec<(&str, Value)> = pairs.iter().map(|(k, v)| (*k, Value::Bool(*v))).collect();
        let binding = Binding::standalone(Value::map_of(TypeTag::Bool, &pairs));
        (binding, Rc::new(Cell::new(0)))
    }

    fn counting_ctx(count: &Rc<Cell<u32>>) -> ViewCtx {
        let c = Rc::clone(count);
        ViewCtx::with_save(Rc::new(move || c.set(c.get() + 1)))
    }

    #[test]
    fn entries_get_key_and_value_members() {
        let (binding, count) = bool_map(&[("a", true), ("b", false)]);
        let v = MapView::new(binding, counting_ctx(&count), Some("inline")).unwrap();
        let names: Vec<&str> = v.widget().children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["key-a", "value-a", "key-b", "value-b"]);
    }

    #[test]
    fn value_edit_writes_back_exactly_once() {
        let (binding, count) = bool_map(&[("x", true)]);
        let mut v = MapView::new(binding.clone(), counting_ctx(&count), Some("inline")).unwrap();

        assert!(v.dispatch_edit(&["value-x"], WidgetValue::Bool(false)).changed());
        assert_eq!(count.get(), 1);

        // Same value again: no mutation, no write-back.
        assert_eq!(
            v.dispatch_edit(&["value-x"], WidgetValue::Bool(false)),
            EditOutcome::Unchanged
        );
        assert_eq!(count.get(), 1);

        let Value::Map(mv) = binding.get() else {
            panic!("map");
        };
        assert_eq!(mv.entries.get("x"), Some(&Value::Bool(false)));
    }

    #[test]
    fn key_edit_rekeys_entry() {
        let (binding, count) = bool_map(&[("old", true)]);
        let mut v = MapView::new(binding.clone(), counting_ctx(&count), Some("inline")).unwrap();

        assert!(
            v.dispatch_edit(&["key-old"], WidgetValue::Text("new".into()))
                .changed()
        );
        assert_eq!(count.get(), 1);
        let Value::Map(mv) = binding.get() else {
            panic!("map");
        };
        assert!(mv.entries.contains_key("new"));
        assert!(!mv.entries.contains_key("old"));
        assert!(v.widget().child("key-new").is_some());
    }

    #[test]
    fn key_collision_is_rejected_without_write_back() {
        let (binding, count) = bool_map(&[("a", true), ("b", false)]);
        let mut v = MapView::new(binding, counting_ctx(&count), Some("inline")).unwrap();
        assert_eq!(
            v.dispatch_edit(&["key-a"], WidgetValue::Text("b".into())),
            EditOutcome::Unchanged
        );
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn insert_and_remove_entries() {
        let (binding, count) = bool_map(&[]);
        let mut v = MapView::new(binding, counting_ctx(&count), Some("inline")).unwrap();
        assert!(v.insert("k"));
        assert!(!v.insert("k"), "duplicate insert must be rejected");
        assert_eq!(v.widget().child("value-k").map(|c| c.text.as_str()), Some("false"));
        assert!(v.remove("k"));
        assert!(!v.remove("k"));
        assert!(v.widget().children.is_empty());
    }

    #[test]
    fn by_value_sort_reorders_members() {
        let binding = Binding::standalone(Value::map_of(
            TypeTag::Str,
            &[
                ("a", Value::Str("zzz".into())),
                ("b", Value::Str("aaa".into())),
            ],
        ));
        let mut v = MapView::new(binding, ViewCtx::new(), Some("inline")).unwrap();
        v.set_sort_mode(SortMode::ByValue);
        let names: Vec<&str> = v.widget().children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["key-b", "value-b", "key-a", "value-a"]);
    }

    #[test]
    fn open_map_gets_type_selectors() {
        let binding = Binding::standalone(Value::map_of(
            TypeTag::Any,
            &[("n", Value::Any(Some(Box::new(Value::Int(3)))))],
        ));
        let v = MapView::new(binding, ViewCtx::new(), Some("inline")).unwrap();
        let selector = v.widget().child("type-n").unwrap();
        assert_eq!(selector.kind, WidgetKind::Select);
        assert_eq!(selector.text, "int");
    }

    #[test]
    fn type_switch_converts_best_effort() {
        let tx_count = Rc::new(Cell::new(0u32));
        let binding = Binding::standalone(Value::map_of(
            TypeTag::Any,
            &[("n", Value::Any(Some(Box::new(Value::Int(3)))))],
        ));
        let mut v = MapView::new(binding.clone(), counting_ctx(&tx_count), Some("inline")).unwrap();

        assert!(
            v.dispatch_edit(&["type-n"], WidgetValue::Choice("float".into()))
                .changed()
        );
        assert_eq!(tx_count.get(), 1);
        let Value::Map(mv) = binding.get() else {
            panic!("map");
        };
        assert_eq!(
            mv.entries.get("n"),
            Some(&Value::Any(Some(Box::new(Value::Float(3.0)))))
        );
    }

    #[test]
    fn type_switch_zero_fallback() {
        let binding = Binding::standalone(Value::map_of(
            TypeTag::Any,
            &[("s", Value::Any(Some(Box::new(Value::Str("abc".into())))))],
        ));
        let mut v = MapView::new(binding.clone(), ViewCtx::new(), Some("inline")).unwrap();
        assert!(v.set_entry_type("s", "float").changed());
        let Value::Map(mv) = binding.get() else {
            panic!("map");
        };
        assert_eq!(
            mv.entries.get("s"),
            Some(&Value::Any(Some(Box::new(Value::Float(0.0)))))
        );
    }
}
