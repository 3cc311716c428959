//! The dynamic value tree.
//!
//! [`Value`] is the closed tagged union of editable shapes. Compound
//! variants carry enough static type information ([`TypeTag`]) to
//! allocate zero members and to drive editor dispatch without the
//! concrete Rust type being known.

use crate::types::{EnumType, StructType, TypeTag};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Value shape, used as the dispatch key for editor selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Boolean.
    Bool,
    /// Signed integer.
    Int,
    /// Floating point.
    Float,
    /// String.
    Str,
    /// Closed enum.
    Enum,
    /// Struct.
    Struct,
    /// Ordered list.
    List,
    /// String-keyed map.
    Map,
    /// Nullable reference.
    Ref,
    /// Open slot.
    Any,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "str",
            Self::Enum => "enum",
            Self::Struct => "struct",
            Self::List => "list",
            Self::Map => "map",
            Self::Ref => "ref",
            Self::Any => "any",
        };
        f.write_str(s)
    }
}

/// An enum value: selected variant plus its type.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    /// The enum type.
    pub ty: Rc<EnumType>,
    /// Currently selected variant name.
    pub variant: String,
}

/// A struct value: type descriptor plus field values in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct StructValue {
    /// The struct type.
    pub ty: Rc<StructType>,
    /// Field values, parallel to `ty.fields`.
    pub fields: Vec<Value>,
}

impl StructValue {
    /// Read the value of a declared (top-level) field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        let idx = self.ty.fields.iter().position(|f| f.name == name)?;
        self.fields.get(idx)
    }

    /// Read a flat (embedding-promoted) field by name.
    #[must_use]
    pub fn flat_value(&self, name: &str) -> Option<&Value> {
        let flat = self.ty.flat_field(name)?;
        let mut cur = self.fields.get(*flat.path.first()?)?;
        for idx in &flat.path[1..] {
            match cur {
                Value::Struct(sv) => cur = sv.fields.get(*idx)?,
                _ => return None,
            }
        }
        Some(cur)
    }
}

/// A list value with a fixed element type.
#[derive(Debug, Clone, PartialEq)]
pub struct ListValue {
    /// Element type, used when inserting new elements.
    pub elem_ty: TypeTag,
    /// Elements in order.
    pub items: Vec<Value>,
}

/// A string-keyed map value.
///
/// Keys are stringified and therefore distinct by definition; the map is
/// ordered so member enumeration is deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct MapValue {
    /// Declared value type; [`TypeTag::Any`] makes the map open-typed.
    pub value_ty: TypeTag,
    /// Entries, key-sorted.
    pub entries: BTreeMap<String, Value>,
}

/// A nullable reference to an owned target value.
#[derive(Debug, Clone, PartialEq)]
pub struct RefValue {
    /// Static target type, needed to allocate on first edit.
    pub target_ty: TypeTag,
    /// The target, if allocated.
    pub target: Option<Box<Value>>,
}

/// The dynamic value tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point.
    Float(f64),
    /// String.
    Str(String),
    /// Closed enum.
    Enum(EnumValue),
    /// Struct.
    Struct(StructValue),
    /// Ordered list.
    List(ListValue),
    /// String-keyed map.
    Map(MapValue),
    /// Nullable reference.
    Ref(RefValue),
    /// Open slot; `None` is the untyped nil.
    Any(Option<Box<Value>>),
}

impl Value {
    /// The shape of this value.
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Self::Bool(_) => Kind::Bool,
            Self::Int(_) => Kind::Int,
            Self::Float(_) => Kind::Float,
            Self::Str(_) => Kind::Str,
            Self::Enum(_) => Kind::Enum,
            Self::Struct(_) => Kind::Struct,
            Self::List(_) => Kind::List,
            Self::Map(_) => Kind::Map,
            Self::Ref(_) => Kind::Ref,
            Self::Any(_) => Kind::Any,
        }
    }

    /// The static type of this value, reconstructed from its shape.
    #[must_use]
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Self::Bool(_) => TypeTag::Bool,
            Self::Int(_) => TypeTag::Int,
            Self::Float(_) => TypeTag::Float,
            Self::Str(_) => TypeTag::Str,
            Self::Enum(ev) => TypeTag::Enum(Rc::clone(&ev.ty)),
            Self::Struct(sv) => TypeTag::Struct(Rc::clone(&sv.ty)),
            Self::List(lv) => TypeTag::List(Box::new(lv.elem_ty.clone())),
            Self::Map(mv) => TypeTag::Map(Box::new(mv.value_ty.clone())),
            Self::Ref(rv) => TypeTag::Ref(Box::new(rv.target_ty.clone())),
            Self::Any(_) => TypeTag::Any,
        }
    }

    /// Short display form used for labels and by-value map sorting.
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(x) => x.to_string(),
            Self::Str(s) => s.clone(),
            Self::Enum(ev) => ev.variant.clone(),
            Self::Struct(sv) => sv.ty.name.clone(),
            Self::List(lv) => format!("[{}]", lv.items.len()),
            Self::Map(mv) => format!("{{{}}}", mv.entries.len()),
            Self::Ref(rv) => match &rv.target {
                Some(t) => format!("*{}", t.display()),
                None => "nil".into(),
            },
            Self::Any(v) => match v {
                Some(inner) => inner.display(),
                None => "nil".into(),
            },
        }
    }

    /// Whether this value reads as true for `viewif` checks.
    ///
    /// Kind-appropriate truthiness: `Bool` true, non-zero numbers,
    /// non-empty strings, non-nil references.
    #[must_use]
    pub fn truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(x) => *x != 0.0,
            Self::Str(s) => !s.is_empty(),
            Self::Enum(ev) => !ev.variant.is_empty(),
            Self::Struct(_) | Self::List(_) | Self::Map(_) => true,
            Self::Ref(rv) => rv.target.is_some(),
            Self::Any(v) => v.is_some(),
        }
    }

    /// Build a struct value from its type, zeroed then selectively set.
    #[must_use]
    pub fn struct_of(ty: &Rc<StructType>, values: &[(&str, Value)]) -> Value {
        let mut sv = match TypeTag::Struct(Rc::clone(ty)).zero() {
            Value::Struct(sv) => sv,
            _ => unreachable!("struct zero is a struct"),
        };
        for (name, value) in values {
            if let Some(idx) = ty.fields.iter().position(|f| f.name == *name) {
                sv.fields[idx] = value.clone();
            } else {
                tracing::warn!(ty = %ty.name, field = %name, "unknown field in struct_of");
            }
        }
        Value::Struct(sv)
    }

    /// Build a map value from pairs.
    #[must_use]
    pub fn map_of(value_ty: TypeTag, pairs: &[(&str, Value)]) -> Value {
        let mut entries = BTreeMap::new();
        for (k, v) in pairs {
            entries.insert((*k).to_string(), v.clone());
        }
        Value::Map(MapValue { value_ty, entries })
    }

    /// Build a list value from items.
    #[must_use]
    pub fn list_of(elem_ty: TypeTag, items: Vec<Value>) -> Value {
        Value::List(ListValue { elem_ty, items })
    }
}
