//! Static type descriptors for the dynamic value model.
//!
//! A [`TypeTag`] describes the shape of a value well enough to allocate a
//! zero value, pick an editor, and drive the open-typed-map case. Struct
//! and enum shapes carry their own descriptor ([`StructType`],
//! [`EnumType`]) with per-field tag metadata.

use crate::value::{EnumValue, ListValue, MapValue, RefValue, StructValue, Value};
use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Recognized field-tag keys.
///
/// Tags are free-form string pairs; these are the keys the view layer
/// interprets: `view` (`"-"`, `"inline"`, `"show-name"`, or a custom
/// factory name), `desc`, `default`, `default-field`, `min`, `max`,
/// `step`, `viewif`.
pub const TAG_VIEW: &str = "view";

/// Static type descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeTag {
    /// Boolean.
    Bool,
    /// Signed integer.
    Int,
    /// Floating point.
    Float,
    /// String.
    Str,
    /// Closed string-valued enum.
    Enum(Rc<EnumType>),
    /// Struct with named fields.
    Struct(Rc<StructType>),
    /// Ordered list with a fixed element type.
    List(Box<TypeTag>),
    /// String-keyed map with a fixed (possibly open) value type.
    Map(Box<TypeTag>),
    /// Nullable reference to a value of the target type.
    Ref(Box<TypeTag>),
    /// Open slot: may hold any concrete value, or nothing.
    Any,
}

impl TypeTag {
    /// Produce the zero value of this type.
    ///
    /// Used for pointer allocation-on-first-edit, method argument
    /// construction, and the zero-fallback of best-effort conversion.
    #[must_use]
    pub fn zero(&self) -> Value {
        match self {
            Self::Bool => Value::Bool(false),
            Self::Int => Value::Int(0),
            Self::Float => Value::Float(0.0),
            Self::Str => Value::Str(String::new()),
            Self::Enum(ty) => Value::Enum(EnumValue {
                ty: Rc::clone(ty),
                variant: ty.variants.first().cloned().unwrap_or_default(),
            }),
            Self::Struct(ty) => Value::Struct(StructValue {
                ty: Rc::clone(ty),
                fields: ty.fields.iter().map(|f| f.ty.zero()).collect(),
            }),
            Self::List(elem) => Value::List(ListValue {
                elem_ty: (**elem).clone(),
                items: Vec::new(),
            }),
            Self::Map(val) => Value::Map(MapValue {
                value_ty: (**val).clone(),
                entries: BTreeMap::new(),
            }),
            Self::Ref(target) => Value::Ref(RefValue {
                target_ty: (**target).clone(),
                target: None,
            }),
            Self::Any => Value::Any(None),
        }
    }

    /// Type name for diagnostics and named-override dispatch.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Bool => "bool".into(),
            Self::Int => "int".into(),
            Self::Float => "float".into(),
            Self::Str => "str".into(),
            Self::Enum(ty) => ty.name.clone(),
            Self::Struct(ty) => ty.name.clone(),
            Self::List(elem) => format!("[]{}", elem.name()),
            Self::Map(val) => format!("map[str]{}", val.name()),
            Self::Ref(target) => format!("*{}", target.name()),
            Self::Any => "any".into(),
        }
    }
}

/// A closed string-valued enum type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    /// Type name.
    pub name: String,
    /// Ordered variant names.
    pub variants: Vec<String>,
    /// Optional custom view factory name (the "pick your own view" hook).
    pub custom_view: Option<String>,
}

impl EnumType {
    /// Create an enum type from a name and variant list.
    #[must_use]
    pub fn new(name: impl Into<String>, variants: &[&str]) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            variants: variants.iter().map(|v| (*v).to_string()).collect(),
            custom_view: None,
        })
    }
}

/// One declared struct field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldType {
    /// Stable field name.
    pub name: String,
    /// Field type.
    pub ty: TypeTag,
    /// Open string-keyed tag map.
    pub tags: BTreeMap<String, String>,
    /// Whether this field is embedded (its fields promote into the owner).
    pub embedded: bool,
}

impl FieldType {
    /// Create a plain field.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: TypeTag) -> Self {
        Self {
            name: name.into(),
            ty,
            tags: BTreeMap::new(),
            embedded: false,
        }
    }

    /// Add a tag.
    #[must_use]
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Mark the field as embedded.
    ///
    /// Embedded fields must be of struct type; their flat fields are
    /// promoted into the owning struct's logical field list.
    #[must_use]
    pub fn embedded(mut self) -> Self {
        self.embedded = true;
        self
    }
}

/// A promoted field in the flattened logical field list.
///
/// `path` is the chain of field indices from the owning struct down
/// through embedded structs to the concrete field.
#[derive(Debug, Clone)]
pub struct FlatField {
    /// Field-index path from the owning struct.
    pub path: Vec<usize>,
    /// The concrete field descriptor.
    pub field: Rc<FieldType>,
}

/// Per-field visibility predicate, checked on every reconciliation pass.
pub type ShowIf = fn(&StructValue, &str) -> bool;

/// A struct type: name plus ordered field descriptors.
///
/// The embedding-flattened field list is computed once per type and
/// cached; embedding is a declaration-time relationship, not a live one.
pub struct StructType {
    /// Type name.
    pub name: String,
    /// Declared fields, in order.
    pub fields: Vec<Rc<FieldType>>,
    /// Optional custom view factory name.
    pub custom_view: Option<String>,
    /// Optional conditional-visibility hook, consulted per flat field name.
    pub show_if: Option<ShowIf>,
    flat: OnceCell<Vec<FlatField>>,
}

impl StructType {
    /// Create a struct type.
    #[must_use]
    pub fn new(name: impl Into<String>, fields: Vec<FieldType>) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            fields: fields.into_iter().map(Rc::new).collect(),
            custom_view: None,
            show_if: None,
            flat: OnceCell::new(),
        })
    }

    /// Create a struct type with a visibility hook.
    #[must_use]
    pub fn with_show_if(name: impl Into<String>, fields: Vec<FieldType>, hook: ShowIf) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            fields: fields.into_iter().map(Rc::new).collect(),
            custom_view: None,
            show_if: Some(hook),
            flat: OnceCell::new(),
        })
    }

    /// Create a struct type that selects its own view factory by name.
    #[must_use]
    pub fn with_custom_view(
        name: impl Into<String>,
        fields: Vec<FieldType>,
        factory: impl Into<String>,
    ) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            fields: fields.into_iter().map(Rc::new).collect(),
            custom_view: Some(factory.into()),
            show_if: None,
            flat: OnceCell::new(),
        })
    }

    /// The embedding-flattened logical field list, cached per type.
    ///
    /// Non-embedded fields appear as themselves; embedded struct fields
    /// contribute their own flat fields with extended index paths.
    pub fn flat_fields(&self) -> &[FlatField] {
        self.flat.get_or_init(|| {
            let mut out = Vec::new();
            for (i, field) in self.fields.iter().enumerate() {
                if field.embedded {
                    if let TypeTag::Struct(inner) = &field.ty {
                        for flat in inner.flat_fields() {
                            let mut path = Vec::with_capacity(flat.path.len() + 1);
                            path.push(i);
                            path.extend_from_slice(&flat.path);
                            out.push(FlatField {
                                path,
                                field: Rc::clone(&flat.field),
                            });
                        }
                        continue;
                    }
                    tracing::warn!(
                        ty = %self.name,
                        field = %field.name,
                        "embedded field is not a struct; treating as plain"
                    );
                }
                out.push(FlatField {
                    path: vec![i],
                    field: Rc::clone(field),
                });
            }
            out
        })
    }

    /// Look up a flat field by name.
    #[must_use]
    pub fn flat_field(&self, name: &str) -> Option<&FlatField> {
        self.flat_fields().iter().find(|f| f.field.name == name)
    }
}

impl fmt::Debug for StructType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructType")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("custom_view", &self.custom_view)
            .finish_non_exhaustive()
    }
}

impl PartialEq for StructType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.fields == other.fields
    }
}
