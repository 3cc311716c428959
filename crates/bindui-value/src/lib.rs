#![forbid(unsafe_code)]

//! Dynamic value model and bindings for bindui.
//!
//! The editing layer works over a closed tagged union of value shapes
//! rather than compile-time types: a [`Value`] tree described by
//! [`TypeTag`] descriptors, reached through a [`Binding`] that knows how
//! the value is owned (direct field, list element, map entry, pointer
//! target) and whether mutation needs a write-back callback.
//!
//! # Example
//!
//! ```
//! use bindui_value::{Binding, Value};
//!
//! let mut b = Binding::standalone(Value::Int(30));
//! assert_eq!(b.get(), Value::Int(30));
//! assert!(b.set(Value::Int(31)));
//! assert!(!b.set(Value::Int(31))); // unchanged, no redundant notification
//! ```

pub mod bind;
pub mod convert;
pub mod types;
pub mod value;

pub use bind::{BindError, Binding, Origin, Step, ValueCell, WriteBack, parse_literal};
pub use convert::{convert, convert_or_zero};
pub use types::{EnumType, FieldType, FlatField, StructType, TypeTag};
pub use value::{EnumValue, Kind, ListValue, MapValue, RefValue, StructValue, Value};
