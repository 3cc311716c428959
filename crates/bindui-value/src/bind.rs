//! Bindings: addressable-or-write-back-guarded handles into a value tree.
//!
//! A [`Binding`] pairs a shared root cell with a path of navigation steps
//! and an ownership description ([`Origin`]). Direct fields and list
//! elements write in place; map entries are not independently addressable
//! and therefore carry a [`WriteBack`] callback that re-persists the
//! owning container after every accepted edit. Constructing a map-entry
//! binding without a write-back is a construction-time error, not a
//! runtime no-op.

use crate::convert::convert;
use crate::types::{FieldType, FlatField, TypeTag};
use crate::value::{Kind, Value};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Shared root storage for a bound value tree.
pub type ValueCell = Rc<RefCell<Value>>;

/// Persistence callback for non-addressable values ("TmpSave").
///
/// Invoked exactly once per accepted edit, before any change
/// notification, so observers see consistent state.
pub type WriteBack = Rc<dyn Fn()>;

/// One navigation step from the root cell toward the bound value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Struct field by declaration index.
    Field(usize),
    /// List element by position.
    Index(usize),
    /// Map entry by key.
    Key(String),
    /// Through a reference or open slot.
    Deref,
}

/// How the bound value is owned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Freestanding value fully owned by the binding.
    Standalone,
    /// Field of a parent struct; addressable.
    DirectField,
    /// Element of a backing list; addressable.
    ListElem,
    /// Map entry; mutation is read-modify-replace into the map.
    MapEntry,
    /// The key of a map entry; mutation re-keys the entry.
    MapKey {
        /// The entry's current key.
        key: String,
    },
    /// Target of a reference; may require allocation on first edit.
    RefTarget,
}

/// Binder construction errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// A non-addressable binding was requested without a write-back.
    MissingWriteBack {
        /// Map key or other member identification.
        member: String,
    },
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingWriteBack { member } => {
                write!(f, "binding for non-addressable member {member:?} requires a write-back")
            }
        }
    }
}

impl std::error::Error for BindError {}

fn resolve<'a>(mut value: &'a Value, path: &[Step]) -> Option<&'a Value> {
    for step in path {
        value = match (step, value) {
            (Step::Field(i), Value::Struct(sv)) => sv.fields.get(*i)?,
            (Step::Index(i), Value::List(lv)) => lv.items.get(*i)?,
            (Step::Key(k), Value::Map(mv)) => mv.entries.get(k)?,
            (Step::Deref, Value::Ref(rv)) => rv.target.as_deref()?,
            (Step::Deref, Value::Any(v)) => v.as_deref()?,
            _ => return None,
        };
    }
    Some(value)
}

fn resolve_mut<'a>(mut value: &'a mut Value, path: &[Step]) -> Option<&'a mut Value> {
    for step in path {
        value = match (step, value) {
            (Step::Field(i), Value::Struct(sv)) => sv.fields.get_mut(*i)?,
            (Step::Index(i), Value::List(lv)) => lv.items.get_mut(*i)?,
            (Step::Key(k), Value::Map(mv)) => mv.entries.get_mut(k)?,
            (Step::Deref, Value::Ref(rv)) => rv.target.as_deref_mut()?,
            (Step::Deref, Value::Any(v)) => v.as_deref_mut()?,
            _ => return None,
        };
    }
    Some(value)
}

/// A handle to one piece of a value tree.
#[derive(Clone)]
pub struct Binding {
    cell: ValueCell,
    path: Vec<Step>,
    origin: Origin,
    write_back: Option<WriteBack>,
    field: Option<Rc<FieldType>>,
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("path", &self.path)
            .field("origin", &self.origin)
            .field("has_write_back", &self.write_back.is_some())
            .field("field", &self.field.as_ref().map(|fi| fi.name.clone()))
            .finish()
    }
}

impl Binding {
    /// Bind a freestanding value, fully owned by this binding.
    #[must_use]
    pub fn standalone(value: Value) -> Self {
        Self {
            cell: Rc::new(RefCell::new(value)),
            path: Vec::new(),
            origin: Origin::Standalone,
            write_back: None,
            field: None,
        }
    }

    /// Bind the root of a shared cell.
    #[must_use]
    pub fn root(cell: ValueCell) -> Self {
        Self {
            cell,
            path: Vec::new(),
            origin: Origin::Standalone,
            write_back: None,
            field: None,
        }
    }

    /// The shared cell this binding reads from.
    #[must_use]
    pub fn cell(&self) -> ValueCell {
        Rc::clone(&self.cell)
    }

    /// The ownership description.
    #[must_use]
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// The write-back callback, if any.
    #[must_use]
    pub fn write_back(&self) -> Option<WriteBack> {
        self.write_back.clone()
    }

    /// Bind a flat (possibly embedding-promoted) field of this struct.
    #[must_use]
    pub fn child_field(&self, flat: &FlatField) -> Self {
        let mut path = self.path.clone();
        path.extend(flat.path.iter().map(|i| Step::Field(*i)));
        Self {
            cell: Rc::clone(&self.cell),
            path,
            origin: Origin::DirectField,
            write_back: self.write_back.clone(),
            field: Some(Rc::clone(&flat.field)),
        }
    }

    /// Bind a list element by position.
    #[must_use]
    pub fn elem(&self, index: usize) -> Self {
        let mut path = self.path.clone();
        path.push(Step::Index(index));
        Self {
            cell: Rc::clone(&self.cell),
            path,
            origin: Origin::ListElem,
            write_back: self.write_back.clone(),
            field: None,
        }
    }

    /// Bind a map entry's value.
    ///
    /// Map entries are not independently addressable: every accepted edit
    /// is a read-modify-replace into the map followed by the write-back.
    /// `write_back` may be inherited from this binding; if neither is
    /// present the construction fails.
    pub fn map_value(&self, key: &str, write_back: Option<WriteBack>) -> Result<Self, BindError> {
        let wb = write_back.or_else(|| self.write_back.clone());
        let Some(wb) = wb else {
            return Err(BindError::MissingWriteBack {
                member: key.to_string(),
            });
        };
        let mut path = self.path.clone();
        path.push(Step::Key(key.to_string()));
        Ok(Self {
            cell: Rc::clone(&self.cell),
            path,
            origin: Origin::MapEntry,
            write_back: Some(wb),
            field: None,
        })
    }

    /// Bind a map entry's key.
    ///
    /// Setting re-keys the entry, keeping its value. Re-keying onto an
    /// existing key is rejected (keys are distinct by definition).
    pub fn map_key(&self, key: &str, write_back: Option<WriteBack>) -> Result<Self, BindError> {
        let wb = write_back.or_else(|| self.write_back.clone());
        let Some(wb) = wb else {
            return Err(BindError::MissingWriteBack {
                member: key.to_string(),
            });
        };
        Ok(Self {
            cell: Rc::clone(&self.cell),
            path: self.path.clone(),
            origin: Origin::MapKey {
                key: key.to_string(),
            },
            write_back: Some(wb),
            field: None,
        })
    }

    /// Bind through this reference to its target.
    #[must_use]
    pub fn deref(&self) -> Self {
        let mut path = self.path.clone();
        path.push(Step::Deref);
        Self {
            cell: Rc::clone(&self.cell),
            path,
            origin: Origin::RefTarget,
            write_back: self.write_back.clone(),
            field: self.field.clone(),
        }
    }

    /// Read the bound value, dereferencing one reference level.
    ///
    /// A stale path (a structural edit removed the member) reads as the
    /// untyped nil; the caller treats it as nothing to show.
    #[must_use]
    pub fn get(&self) -> Value {
        self.try_get().unwrap_or_else(|| {
            tracing::warn!(binding = ?self, "binding path no longer resolves");
            Value::Any(None)
        })
    }

    /// Read the bound value without the nil fallback.
    #[must_use]
    pub fn try_get(&self) -> Option<Value> {
        if let Origin::MapKey { key } = &self.origin {
            return Some(Value::Str(key.clone()));
        }
        let root = self.cell.borrow();
        let v = resolve(&root, &self.path)?;
        Some(match v {
            Value::Ref(rv) => match &rv.target {
                Some(target) => (**target).clone(),
                None => v.clone(),
            },
            other => other.clone(),
        })
    }

    /// Read the bound slot without dereferencing.
    ///
    /// Dispatch uses this to distinguish a reference from its target.
    #[must_use]
    pub fn try_get_raw(&self) -> Option<Value> {
        if let Origin::MapKey { key } = &self.origin {
            return Some(Value::Str(key.clone()));
        }
        let root = self.cell.borrow();
        resolve(&root, &self.path).cloned()
    }

    /// The kind of the bound value (after one dereference).
    #[must_use]
    pub fn kind(&self) -> Kind {
        self.get().kind()
    }

    /// Write a value into the bound storage.
    ///
    /// The input is converted to the slot's static type; an equal value
    /// returns `false` without mutation so no redundant notification is
    /// emitted. Inconvertible input logs and returns `false` — a
    /// type-specific widget cannot produce one, so this only happens on
    /// programmatic sets. On a real change to a non-addressable value the
    /// write-back runs before this method returns.
    pub fn set(&mut self, input: Value) -> bool {
        let changed = match &self.origin {
            Origin::MapKey { .. } => self.set_map_key(&input),
            _ => self.set_in_place(&input),
        };
        if changed && let Some(wb) = &self.write_back {
            wb();
        }
        changed
    }

    fn set_in_place(&self, input: &Value) -> bool {
        let mut root = self.cell.borrow_mut();
        let Some(slot) = resolve_mut(&mut root, &self.path) else {
            tracing::warn!(binding = ?self, "set on a binding whose path no longer resolves");
            return false;
        };

        // Writes through a reference land on the allocated target.
        let slot = match slot {
            Value::Ref(rv) if rv.target.is_some() && input.kind() != Kind::Ref => {
                rv.target.as_deref_mut().expect("checked some")
            }
            other => other,
        };

        let target_ty = slot.type_tag();
        let Some(converted) = convert(input, &target_ty) else {
            tracing::warn!(
                from = %input.kind(),
                to = %target_ty.name(),
                field = self.field.as_deref().map(|f| f.name.as_str()),
                "inconvertible set ignored"
            );
            return false;
        };
        if *slot == converted {
            return false;
        }
        *slot = converted;
        true
    }

    fn set_map_key(&mut self, input: &Value) -> bool {
        let Value::Str(new_key) = input else {
            tracing::warn!(from = %input.kind(), "map key must be a string");
            return false;
        };
        let Origin::MapKey { key } = &self.origin else {
            unreachable!("set_map_key requires a MapKey origin");
        };
        if new_key == key {
            return false;
        }
        let old_key = key.clone();
        {
            let mut root = self.cell.borrow_mut();
            let Some(Value::Map(mv)) = resolve_mut(&mut root, &self.path) else {
                tracing::warn!(binding = ?self, "map key binding no longer resolves to a map");
                return false;
            };
            if mv.entries.contains_key(new_key) {
                tracing::warn!(key = %new_key, "re-key collides with an existing entry");
                return false;
            }
            let Some(value) = mv.entries.remove(&old_key) else {
                tracing::warn!(key = %old_key, "re-key source entry is gone");
                return false;
            };
            mv.entries.insert(new_key.clone(), value);
        }
        self.origin = Origin::MapKey {
            key: new_key.clone(),
        };
        true
    }

    /// Allocate the zero target for a nil reference, so sub-views have
    /// something to point into. No-op for non-references and live refs.
    ///
    /// Returns whether an allocation happened.
    pub fn ensure_target(&self) -> bool {
        let mut root = self.cell.borrow_mut();
        let Some(slot) = resolve_mut(&mut root, &self.path) else {
            return false;
        };
        match slot {
            Value::Ref(rv) if rv.target.is_none() => {
                rv.target = Some(Box::new(rv.target_ty.zero()));
                true
            }
            _ => false,
        }
    }

    /// Look up a field tag by key.
    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.field.as_ref()?.tags.get(key).map(String::as_str)
    }

    /// The bound field's name, if this binding came from a struct field.
    #[must_use]
    pub fn field_name(&self) -> Option<&str> {
        self.field.as_ref().map(|f| f.name.as_str())
    }

    /// Parse a tag into a value of the bound slot's type.
    #[must_use]
    pub fn tag_value(&self, key: &str) -> Option<Value> {
        let raw = self.tag(key)?;
        parse_literal(raw, &self.get().type_tag())
    }

    /// Whether the field declares a `default` tag.
    #[must_use]
    pub fn has_default(&self) -> bool {
        self.tag("default").is_some()
    }

    /// Whether the current value equals the declared default.
    ///
    /// `None` when no default tag is declared or it does not parse.
    #[must_use]
    pub fn is_default(&self) -> Option<bool> {
        let default = self.tag_value("default")?;
        Some(self.get() == default)
    }

    /// Set the value to its declared default. Returns whether it changed.
    pub fn apply_default(&mut self) -> bool {
        match self.tag_value("default") {
            Some(v) => self.set(v),
            None => false,
        }
    }
}

/// Parse a tag literal into a value of the given type.
#[must_use]
pub fn parse_literal(raw: &str, ty: &TypeTag) -> Option<Value> {
    match ty {
        TypeTag::Bool => raw.parse::<bool>().ok().map(Value::Bool),
        TypeTag::Int => raw.parse::<i64>().ok().map(Value::Int),
        TypeTag::Float => raw.parse::<f64>().ok().map(Value::Float),
        TypeTag::Str => Some(Value::Str(raw.to_string())),
        TypeTag::Enum(_) => convert(&Value::Str(raw.to_string()), ty),
        TypeTag::Ref(target) => parse_literal(raw, target),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldType, StructType};
    use crate::value::{MapValue, RefValue};
    use std::cell::Cell;
    use std::collections::BTreeMap;

    fn person() -> Binding {
        let ty = StructType::new(
            "Person",
            vec![
                FieldType::new("Name", TypeTag::Str),
                FieldType::new("Age", TypeTag::Int)
                    .tag("min", "0")
                    .tag("default", "21"),
            ],
        );
        Binding::standalone(Value::struct_of(
            &ty,
            &[("Name", Value::Str("Ada".into())), ("Age", Value::Int(30))],
        ))
    }

    fn age_binding(person: &Binding) -> Binding {
        let Value::Struct(sv) = person.get() else {
            panic!("person is a struct");
        };
        person.child_field(sv.ty.flat_field("Age").unwrap())
    }

    #[test]
    fn get_set_round_trip() {
        let mut b = Binding::standalone(Value::Int(30));
        assert_eq!(b.get(), Value::Int(30));
        assert!(b.set(Value::Int(31)));
        assert_eq!(b.get(), Value::Int(31));
    }

    #[test]
    fn set_equal_value_reports_unchanged() {
        let mut b = Binding::standalone(Value::Str("x".into()));
        assert!(!b.set(Value::Str("x".into())));
    }

    #[test]
    fn set_inconvertible_is_logged_noop() {
        let mut b = Binding::standalone(Value::Int(1));
        assert!(!b.set(Value::Str("nope".into())));
        assert_eq!(b.get(), Value::Int(1));
    }

    #[test]
    fn set_converts_to_slot_type() {
        let mut b = Binding::standalone(Value::Float(1.0));
        assert!(b.set(Value::Int(2)));
        assert_eq!(b.get(), Value::Float(2.0));
    }

    #[test]
    fn field_binding_writes_in_place() {
        let p = person();
        let mut age = age_binding(&p);
        assert_eq!(age.get(), Value::Int(30));
        assert!(age.set(Value::Int(31)));
        let Value::Struct(sv) = p.get() else {
            panic!("struct");
        };
        assert_eq!(sv.field("Age"), Some(&Value::Int(31)));
    }

    #[test]
    fn field_tags_and_default() {
        let p = person();
        let mut age = age_binding(&p);
        assert_eq!(age.tag("min"), Some("0"));
        assert_eq!(age.is_default(), Some(false));
        assert!(age.apply_default());
        assert_eq!(age.get(), Value::Int(21));
        assert_eq!(age.is_default(), Some(true));
    }

    #[test]
    fn map_value_requires_write_back() {
        let map = Binding::standalone(Value::map_of(TypeTag::Bool, &[("x", Value::Bool(true))]));
        let err = map.map_value("x", None).unwrap_err();
        assert!(matches!(err, BindError::MissingWriteBack { .. }));
    }

    #[test]
    fn map_value_write_back_fires_once_per_accepted_edit() {
        let map = Binding::standalone(Value::map_of(TypeTag::Bool, &[("x", Value::Bool(true))]));
        let count = Rc::new(Cell::new(0u32));
        let c = Rc::clone(&count);
        let wb: WriteBack = Rc::new(move || c.set(c.get() + 1));
        let mut entry = map.map_value("x", Some(wb)).unwrap();

        assert!(entry.set(Value::Bool(false)));
        assert_eq!(count.get(), 1);

        // Unchanged edit: no mutation, no write-back.
        assert!(!entry.set(Value::Bool(false)));
        assert_eq!(count.get(), 1);

        let Value::Map(mv) = map.get() else {
            panic!("map");
        };
        assert_eq!(mv.entries.get("x"), Some(&Value::Bool(false)));
    }

    #[test]
    fn map_key_rekeys_entry() {
        let map = Binding::standalone(Value::map_of(TypeTag::Int, &[("a", Value::Int(1))]));
        let wb: WriteBack = Rc::new(|| {});
        let mut key = map.map_key("a", Some(wb)).unwrap();
        assert_eq!(key.get(), Value::Str("a".into()));
        assert!(key.set(Value::Str("b".into())));
        let Value::Map(mv) = map.get() else {
            panic!("map");
        };
        assert!(!mv.entries.contains_key("a"));
        assert_eq!(mv.entries.get("b"), Some(&Value::Int(1)));
        // Subsequent reads see the new key.
        assert_eq!(key.get(), Value::Str("b".into()));
    }

    #[test]
    fn map_key_collision_rejected() {
        let map = Binding::standalone(Value::map_of(
            TypeTag::Int,
            &[("a", Value::Int(1)), ("b", Value::Int(2))],
        ));
        let wb: WriteBack = Rc::new(|| {});
        let mut key = map.map_key("a", Some(wb)).unwrap();
        assert!(!key.set(Value::Str("b".into())));
        let Value::Map(mv) = map.get() else {
            panic!("map");
        };
        assert_eq!(mv.entries.len(), 2);
    }

    #[test]
    fn descendants_of_map_entries_inherit_write_back() {
        let inner_ty = StructType::new("Inner", vec![FieldType::new("N", TypeTag::Int)]);
        let mut entries = BTreeMap::new();
        entries.insert("k".to_string(), TypeTag::Struct(inner_ty.clone()).zero());
        let map = Binding::standalone(Value::Map(MapValue {
            value_ty: TypeTag::Struct(inner_ty.clone()),
            entries,
        }));

        let count = Rc::new(Cell::new(0u32));
        let c = Rc::clone(&count);
        let wb: WriteBack = Rc::new(move || c.set(c.get() + 1));
        let entry = map.map_value("k", Some(wb)).unwrap();
        let mut n = entry.child_field(inner_ty.flat_field("N").unwrap());
        assert!(n.set(Value::Int(9)));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn ensure_target_allocates_once() {
        let b = Binding::standalone(Value::Ref(RefValue {
            target_ty: TypeTag::Int,
            target: None,
        }));
        assert_eq!(b.get(), Value::Ref(RefValue {
            target_ty: TypeTag::Int,
            target: None,
        }));
        assert!(b.ensure_target());
        assert_eq!(b.get(), Value::Int(0));
        assert!(!b.ensure_target());
    }

    #[test]
    fn get_derefs_one_level() {
        let b = Binding::standalone(Value::Ref(RefValue {
            target_ty: TypeTag::Int,
            target: Some(Box::new(Value::Int(5))),
        }));
        assert_eq!(b.get(), Value::Int(5));
    }

    #[test]
    fn set_through_live_ref_hits_target() {
        let mut b = Binding::standalone(Value::Ref(RefValue {
            target_ty: TypeTag::Int,
            target: Some(Box::new(Value::Int(5))),
        }));
        assert!(b.set(Value::Int(6)));
        assert_eq!(b.get(), Value::Int(6));
    }

    #[test]
    fn stale_path_reads_as_nil() {
        let list = Binding::standalone(Value::list_of(TypeTag::Int, vec![Value::Int(1)]));
        let elem = list.elem(3);
        assert_eq!(elem.try_get(), None);
        assert_eq!(elem.get(), Value::Any(None));
    }

    #[test]
    fn elem_binding_addresses_backing_list() {
        let list = Binding::standalone(Value::list_of(
            TypeTag::Int,
            vec![Value::Int(1), Value::Int(2)],
        ));
        let mut e1 = list.elem(1);
        assert!(e1.set(Value::Int(20)));
        let Value::List(lv) = list.get() else {
            panic!("list");
        };
        assert_eq!(lv.items, vec![Value::Int(1), Value::Int(20)]);
    }
}
