//! View registry and dispatch.
//!
//! Dispatch maps a bound value's shape to a view constructor. The
//! registry is process-wide with an init-once lifecycle: installed at
//! program start, read-only thereafter. Precedence:
//!
//! 1. a `view` tag of `"-"` skips the member entirely;
//! 2. the type's own factory name (the "pick your own view" escape
//!    hatch on struct and enum types);
//! 3. a named-type override registered for the type's name;
//! 4. a custom factory named by the `view` tag;
//! 5. the built-in constructor for the value's kind.
//!
//! An untyped nil (an empty open slot) has no shape to dispatch on; the
//! result is `None`, logged, and the caller shows nothing.

use crate::leaf::{BoolView, EnumView, FloatView, IntView, StrView};
use crate::list_view::ListView;
use crate::map_view::MapView;
use crate::ref_view::RefView;
use crate::struct_view::StructView;
use crate::{CompoundMode, View, ViewCtx};
use bindui_value::{Binding, Kind, Value};
use bindui_widget::WidgetKind;
use std::collections::HashMap;
use std::sync::OnceLock;

/// A view constructor.
///
/// Returns `None` when the binding's current shape cannot be displayed
/// by this factory; dispatch treats that as "nothing to show".
pub type Factory = fn(Binding, &ViewCtx, Option<&str>) -> Option<Box<dyn View>>;

static GLOBAL: OnceLock<ViewRegistry> = OnceLock::new();

/// The type-to-constructor registry.
///
/// Registered factories carry the widget kind they produce so compound
/// planning can predict child descriptors without constructing views.
pub struct ViewRegistry {
    by_type: HashMap<String, (Factory, WidgetKind)>,
    custom: HashMap<String, (Factory, WidgetKind)>,
}

impl ViewRegistry {
    /// An empty registry (built-in kind dispatch only).
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_type: HashMap::new(),
            custom: HashMap::new(),
        }
    }

    /// Override dispatch for a named type (e.g. a tree-node reference
    /// type that wants its own chooser instead of the generic view).
    #[must_use]
    pub fn register_type(
        mut self,
        type_name: impl Into<String>,
        factory: Factory,
        kind: WidgetKind,
    ) -> Self {
        self.by_type.insert(type_name.into(), (factory, kind));
        self
    }

    /// Register a custom factory addressable from `view` tags and from
    /// a type's own factory name.
    #[must_use]
    pub fn register_custom(
        mut self,
        name: impl Into<String>,
        factory: Factory,
        kind: WidgetKind,
    ) -> Self {
        self.custom.insert(name.into(), (factory, kind));
        self
    }

    /// Install this registry as the process-wide one.
    ///
    /// Returns `false` if a registry was already installed (the first
    /// installation wins; later calls are logged and ignored).
    pub fn install(self) -> bool {
        let ok = GLOBAL.set(self).is_ok();
        if !ok {
            tracing::warn!("view registry already installed; ignoring reinstall");
        }
        ok
    }

    /// The process-wide registry, defaulting to built-ins only.
    #[must_use]
    pub fn global() -> &'static ViewRegistry {
        GLOBAL.get_or_init(ViewRegistry::new)
    }

    fn lookup(&self, value: &Value, hint: Option<&str>) -> Option<&(Factory, WidgetKind)> {
        let own = match value {
            Value::Struct(sv) => sv.ty.custom_view.as_deref(),
            Value::Enum(ev) => ev.ty.custom_view.as_deref(),
            _ => None,
        };
        if let Some(name) = own
            && let Some(entry) = self.custom.get(name)
        {
            return Some(entry);
        }
        if let Some(entry) = self.by_type.get(&value.type_tag().name()) {
            return Some(entry);
        }
        if let Some(h) = hint
            && !matches!(h, "inline" | "show-name")
            && let Some(entry) = self.custom.get(h)
        {
            return Some(entry);
        }
        None
    }

    /// The widget kind a member of this shape would get, or `None` when
    /// the member cannot be displayed. Used for descriptor planning.
    #[must_use]
    pub fn predict_kind(&self, raw: &Value, hint: Option<&str>) -> Option<WidgetKind> {
        if hint == Some("-") {
            return None;
        }
        if let Some((_, kind)) = self.lookup(raw, hint) {
            return Some(*kind);
        }
        let kind = match raw.kind() {
            Kind::Bool => WidgetKind::Checkbox,
            Kind::Int | Kind::Float => WidgetKind::Spinner,
            Kind::Str => WidgetKind::TextField,
            Kind::Enum => WidgetKind::Select,
            Kind::Struct | Kind::List | Kind::Map => match CompoundMode::from_hint(hint) {
                CompoundMode::Inline => WidgetKind::Frame,
                CompoundMode::Launcher => WidgetKind::Button,
            },
            Kind::Ref => WidgetKind::Frame,
            Kind::Any => match raw {
                Value::Any(Some(inner)) => return self.predict_kind(inner, hint),
                _ => return None,
            },
        };
        Some(kind)
    }

    /// Produce the view for a binding.
    #[must_use]
    pub fn dispatch(
        &self,
        binding: Binding,
        hint: Option<&str>,
        ctx: &ViewCtx,
    ) -> Option<Box<dyn View>> {
        if hint == Some("-") {
            return None;
        }
        let Some(raw) = binding.try_get_raw() else {
            tracing::warn!(binding = ?binding, "dispatch on a binding that no longer resolves");
            return None;
        };
        if let Value::Any(inner) = &raw {
            if inner.is_none() {
                tracing::warn!(
                    field = binding.field_name(),
                    "untyped nil has no static type; nothing to show"
                );
                return None;
            }
            return self.dispatch(binding.deref(), hint, ctx);
        }
        if let Some((factory, _)) = self.lookup(&raw, hint) {
            return factory(binding, ctx, hint);
        }
        match raw.kind() {
            Kind::Bool => Some(Box::new(BoolView::new(binding))),
            Kind::Int => Some(Box::new(IntView::new(binding))),
            Kind::Float => Some(Box::new(FloatView::new(binding))),
            Kind::Str => Some(Box::new(StrView::new(binding))),
            Kind::Enum => Some(Box::new(EnumView::new(binding))),
            Kind::Struct => {
                StructView::new(binding, ctx.clone(), hint).map(|v| Box::new(v) as Box<dyn View>)
            }
            Kind::List => {
                ListView::new(binding, ctx.clone(), hint).map(|v| Box::new(v) as Box<dyn View>)
            }
            Kind::Map => {
                MapView::new(binding, ctx.clone(), hint).map(|v| Box::new(v) as Box<dyn View>)
            }
            Kind::Ref => {
                RefView::new(binding, ctx.clone(), hint).map(|v| Box::new(v) as Box<dyn View>)
            }
            Kind::Any => unreachable!("open slots handled above"),
        }
    }
}

impl Default for ViewRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Dispatch through the process-wide registry.
#[must_use]
pub fn dispatch(binding: Binding, hint: Option<&str>, ctx: &ViewCtx) -> Option<Box<dyn View>> {
    ViewRegistry::global().dispatch(binding, hint, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bindui_value::{EnumType, FieldType, StructType, TypeTag};

    fn reg() -> ViewRegistry {
        ViewRegistry::new()
    }

    #[test]
    fn skip_hint_dispatches_nothing() {
        let b = Binding::standalone(Value::Int(1));
        assert!(reg().dispatch(b, Some("-"), &ViewCtx::new()).is_none());
    }

    #[test]
    fn untyped_nil_dispatches_nothing() {
        let b = Binding::standalone(Value::Any(None));
        assert!(reg().dispatch(b, None, &ViewCtx::new()).is_none());
    }

    #[test]
    fn open_slot_with_payload_dispatches_inner() {
        let b = Binding::standalone(Value::Any(Some(Box::new(Value::Bool(true)))));
        let v = reg().dispatch(b, None, &ViewCtx::new()).unwrap();
        assert_eq!(v.widget().kind, WidgetKind::Checkbox);
    }

    #[test]
    fn kind_dispatch_produces_expected_widgets() {
        let ctx = ViewCtx::new();
        let cases = [
            (Value::Bool(true), WidgetKind::Checkbox),
            (Value::Int(1), WidgetKind::Spinner),
            (Value::Float(1.0), WidgetKind::Spinner),
            (Value::Str("x".into()), WidgetKind::TextField),
        ];
        for (value, kind) in cases {
            let v = reg().dispatch(Binding::standalone(value), None, &ctx).unwrap();
            assert_eq!(v.widget().kind, kind);
        }
    }

    #[test]
    fn enum_dispatch_is_a_select() {
        let ty = EnumType::new("Align", &["Left", "Right"]);
        let b = Binding::standalone(TypeTag::Enum(ty).zero());
        let v = reg().dispatch(b, None, &ViewCtx::new()).unwrap();
        assert_eq!(v.widget().kind, WidgetKind::Select);
    }

    #[test]
    fn struct_defaults_to_launcher() {
        let ty = StructType::new("S", vec![FieldType::new("A", TypeTag::Int)]);
        let b = Binding::standalone(TypeTag::Struct(ty).zero());
        let v = reg().dispatch(b, None, &ViewCtx::new()).unwrap();
        assert_eq!(v.widget().kind, WidgetKind::Button);
    }

    #[test]
    fn inline_hint_embeds_struct() {
        let ty = StructType::new("S", vec![FieldType::new("A", TypeTag::Int)]);
        let b = Binding::standalone(TypeTag::Struct(ty).zero());
        let v = reg().dispatch(b, Some("inline"), &ViewCtx::new()).unwrap();
        assert_eq!(v.widget().kind, WidgetKind::Frame);
    }

    #[test]
    fn custom_view_escape_hatch_wins() {
        fn chooser(binding: Binding, _: &ViewCtx, _: Option<&str>) -> Option<Box<dyn View>> {
            Some(Box::new(StrView::new(binding)))
        }
        let registry = reg().register_custom("color-map-name", chooser, WidgetKind::TextField);
        let ty = StructType::with_custom_view(
            "ColorMap",
            vec![FieldType::new("Name", TypeTag::Str)],
            "color-map-name",
        );
        let b = Binding::standalone(TypeTag::Struct(ty).zero());
        let v = registry.dispatch(b, None, &ViewCtx::new()).unwrap();
        assert_eq!(v.widget().kind, WidgetKind::TextField);
    }

    #[test]
    fn named_type_override_wins_over_kind() {
        fn node_view(binding: Binding, _: &ViewCtx, _: Option<&str>) -> Option<Box<dyn View>> {
            Some(Box::new(StrView::new(binding)))
        }
        let registry = reg().register_type("TreeNodeRef", node_view, WidgetKind::TextField);
        let ty = StructType::new("TreeNodeRef", vec![FieldType::new("Path", TypeTag::Str)]);
        let b = Binding::standalone(TypeTag::Struct(ty).zero());
        let v = registry.dispatch(b, None, &ViewCtx::new()).unwrap();
        assert_eq!(v.widget().kind, WidgetKind::TextField);
    }

    #[test]
    fn predict_kind_matches_dispatch() {
        let ctx = ViewCtx::new();
        let registry = reg();
        for value in [
            Value::Bool(false),
            Value::Int(0),
            Value::Float(0.0),
            Value::Str(String::new()),
        ] {
            let predicted = registry.predict_kind(&value, None).unwrap();
            let produced = registry
                .dispatch(Binding::standalone(value), None, &ctx)
                .unwrap()
                .widget()
                .kind;
            assert_eq!(predicted, produced);
        }
    }

    #[test]
    fn predict_kind_skip_and_nil() {
        let registry = reg();
        assert!(registry.predict_kind(&Value::Int(1), Some("-")).is_none());
        assert!(registry.predict_kind(&Value::Any(None), None).is_none());
    }
}
