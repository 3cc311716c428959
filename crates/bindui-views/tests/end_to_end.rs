//! End-to-end: a person form with a direct field, a constrained number,
//! and a non-addressable tag map, driven through root dispatch.

use bindui_value::{Binding, FieldType, StructType, TypeTag, Value};
use bindui_views::{EditOutcome, ViewCtx, ViewHost, dispatch};
use bindui_widget::{WidgetFlags, WidgetKind, WidgetValue};
use std::cell::Cell;
use std::rc::Rc;

fn person_ty() -> Rc<StructType> {
    StructType::new(
        "Person",
        vec![
            FieldType::new("Name", TypeTag::Str),
            FieldType::new("Age", TypeTag::Int).tag("min", "0"),
            FieldType::new("Tags", TypeTag::Map(Box::new(TypeTag::Bool))).tag("view", "inline"),
        ],
    )
}

fn person_binding() -> Binding {
    let ty = person_ty();
    Binding::standalone(Value::struct_of(
        &ty,
        &[
            ("Name", Value::Str("Ada".into())),
            ("Age", Value::Int(30)),
            ("Tags", Value::map_of(TypeTag::Bool, &[("home", Value::Bool(true))])),
        ],
    ))
}

struct Harness {
    host: ViewHost,
    binding: Binding,
    saves: Rc<Cell<u32>>,
    notifications: Rc<Cell<u32>>,
}

fn harness() -> Harness {
    let binding = person_binding();
    let saves = Rc::new(Cell::new(0u32));
    let s = Rc::clone(&saves);
    let ctx = ViewCtx::with_save(Rc::new(move || s.set(s.get() + 1)));

    let view = dispatch(binding.clone(), Some("inline"), &ctx).expect("person view");
    let notifications = Rc::new(Cell::new(0u32));
    let n = Rc::clone(&notifications);
    let host = ViewHost::new(view).on_change(Rc::new(move || n.set(n.get() + 1)));
    Harness {
        host,
        binding,
        saves,
        notifications,
    }
}

#[test]
fn form_mirrors_the_value() {
    let h = harness();
    let w = h.host.view().widget();
    assert_eq!(w.kind, WidgetKind::Frame);
    assert_eq!(w.child("Name").map(|c| c.text.as_str()), Some("Ada"));
    assert_eq!(w.child("Age").map(|c| c.text.as_str()), Some("30"));
    assert_eq!(w.child("Age").map(|c| c.number.min), Some(Some(0.0)));
    let tags = w.child("Tags").expect("tags frame");
    assert_eq!(tags.child("value-home").map(|c| c.text.as_str()), Some("true"));
}

#[test]
fn direct_field_edit_skips_write_back() {
    let mut h = harness();
    let outcome = h.host.dispatch_edit(&["Age"], WidgetValue::Number(31.0));
    assert_eq!(outcome, EditOutcome::Changed);
    assert_eq!(h.saves.get(), 0, "an addressable field needs no write-back");
    assert_eq!(h.notifications.get(), 1);

    let Value::Struct(sv) = h.binding.get() else {
        panic!("struct");
    };
    assert_eq!(sv.field("Age"), Some(&Value::Int(31)));
}

#[test]
fn map_entry_edit_writes_back_exactly_once() {
    let mut h = harness();
    let outcome = h
        .host
        .dispatch_edit(&["Tags", "value-home"], WidgetValue::Bool(false));
    assert_eq!(outcome, EditOutcome::Changed);
    assert_eq!(h.saves.get(), 1);
    assert_eq!(h.notifications.get(), 1);

    let Value::Struct(sv) = h.binding.get() else {
        panic!("struct");
    };
    let Some(Value::Map(mv)) = sv.field("Tags") else {
        panic!("tags map");
    };
    assert_eq!(mv.entries.get("home"), Some(&Value::Bool(false)));
}

#[test]
fn redundant_edit_neither_saves_nor_notifies() {
    let mut h = harness();
    let outcome = h
        .host
        .dispatch_edit(&["Tags", "value-home"], WidgetValue::Bool(true));
    assert_eq!(outcome, EditOutcome::Unchanged);
    assert_eq!(h.saves.get(), 0);
    assert_eq!(h.notifications.get(), 0);
}

#[test]
fn rekeying_a_tag_is_one_accepted_edit() {
    let mut h = harness();
    let outcome = h
        .host
        .dispatch_edit(&["Tags", "key-home"], WidgetValue::Text("work".into()));
    assert_eq!(outcome, EditOutcome::Changed);
    assert_eq!(h.saves.get(), 1);
    assert_eq!(h.notifications.get(), 1);

    let Value::Struct(sv) = h.binding.get() else {
        panic!("struct");
    };
    let Some(Value::Map(mv)) = sv.field("Tags") else {
        panic!("tags map");
    };
    assert!(mv.entries.contains_key("work"));
    assert!(!mv.entries.contains_key("home"));
}

#[test]
fn passes_stay_idempotent_after_edits() {
    let mut h = harness();
    h.host.dispatch_edit(&["Name"], WidgetValue::Text("Grace".into()));
    h.host.dispatch_edit(&["Age"], WidgetValue::Number(40.0));

    let before: Vec<_> = h.host.view().widget().children.iter().map(|c| c.id()).collect();
    let stats = h.host.view_mut().refresh();
    assert!(stats.is_clean());
    let after: Vec<_> = h.host.view().widget().children.iter().map(|c| c.id()).collect();
    assert_eq!(before, after);
}

#[test]
fn rejected_edit_does_not_notify() {
    let mut h = harness();
    let outcome = h.host.dispatch_edit(&["NoSuchField"], WidgetValue::Bool(true));
    assert_eq!(outcome, EditOutcome::Rejected);
    assert_eq!(h.notifications.get(), 0);
}

#[test]
fn construction_does_not_mutate_the_value() {
    let binding = person_binding();
    let snapshot = binding.get();
    let _view = dispatch(binding.clone(), Some("inline"), &ViewCtx::new()).expect("view");
    assert_eq!(binding.get(), snapshot);
}

#[test]
fn age_modified_flag_appears_after_divergence_from_default() {
    let ty = StructType::new(
        "Prefs",
        vec![FieldType::new("Volume", TypeTag::Int).tag("default", "50")],
    );
    let binding = Binding::standalone(Value::struct_of(&ty, &[("Volume", Value::Int(50))]));
    let ctx = ViewCtx::new();
    let mut view = dispatch(binding, Some("inline"), &ctx).expect("view");
    assert!(
        !view
            .widget()
            .child("Volume")
            .unwrap()
            .flags
            .contains(WidgetFlags::MODIFIED)
    );
    view.dispatch_edit(&["Volume"], WidgetValue::Number(80.0));
    assert!(
        view.widget()
            .child("Volume")
            .unwrap()
            .flags
            .contains(WidgetFlags::MODIFIED)
    );
}
