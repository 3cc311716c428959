//! Best-effort value conversion.
//!
//! Conversions exist to absorb the gap between a widget's native payload
//! and the bound field's static type, and to rebuild a map entry when its
//! concrete type is switched. Inconvertible inputs yield `None`; the
//! caller logs and degrades rather than surfacing an error, because a
//! type-specific widget should never produce a mismatched value.

use crate::types::TypeTag;
use crate::value::Value;

/// Convert `value` to the shape described by `to`.
///
/// Same-shape values pass through (struct/enum additionally require the
/// same type name). Numeric conversions widen `Int` to `Float` and
/// truncate `Float` to `Int`. Strings parse into enum variants, and any
/// value boxes into an open slot. Everything else is `None`.
#[must_use]
pub fn convert(value: &Value, to: &TypeTag) -> Option<Value> {
    match (value, to) {
        (Value::Bool(_), TypeTag::Bool)
        | (Value::Int(_), TypeTag::Int)
        | (Value::Float(_), TypeTag::Float)
        | (Value::Str(_), TypeTag::Str) => Some(value.clone()),

        (Value::Int(i), TypeTag::Float) => Some(Value::Float(*i as f64)),
        (Value::Float(x), TypeTag::Int) => Some(Value::Int(*x as i64)),
        (Value::Bool(b), TypeTag::Int) => Some(Value::Int(i64::from(*b))),
        (Value::Int(i), TypeTag::Bool) => Some(Value::Bool(*i != 0)),

        (Value::Str(s), TypeTag::Enum(ty)) => {
            if ty.variants.iter().any(|v| v == s) {
                Some(Value::Enum(crate::value::EnumValue {
                    ty: std::rc::Rc::clone(ty),
                    variant: s.clone(),
                }))
            } else {
                None
            }
        }
        (Value::Enum(ev), TypeTag::Enum(ty)) if ev.ty.name == ty.name => Some(value.clone()),
        (Value::Enum(ev), TypeTag::Str) => Some(Value::Str(ev.variant.clone())),

        (Value::Struct(sv), TypeTag::Struct(ty)) if sv.ty.name == ty.name => Some(value.clone()),
        (Value::List(lv), TypeTag::List(elem)) if lv.elem_ty == **elem => Some(value.clone()),
        (Value::Map(mv), TypeTag::Map(val)) if mv.value_ty == **val => Some(value.clone()),
        (Value::Ref(rv), TypeTag::Ref(target)) if rv.target_ty == **target => Some(value.clone()),

        // Open slots: box in, or convert out of the current payload.
        (_, TypeTag::Any) => Some(Value::Any(Some(Box::new(value.clone())))),
        (Value::Any(Some(inner)), _) => convert(inner, to),

        _ => None,
    }
}

/// Convert with a zero-value fallback.
///
/// Used when switching a map entry's concrete type: the old value is
/// carried over where a conversion exists, otherwise the new type's zero
/// value is used.
#[must_use]
pub fn convert_or_zero(value: &Value, to: &TypeTag) -> Value {
    convert(value, to).unwrap_or_else(|| to.zero())
}
