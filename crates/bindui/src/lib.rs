#![forbid(unsafe_code)]

//! bindui public facade crate.
//!
//! Re-exports the common types from the internal crates and offers a
//! lightweight prelude for day-to-day usage: build a typed value, bind
//! it, dispatch a view, route edits.

// --- Value re-exports -------------------------------------------------------

pub use bindui_value::{
    BindError, Binding, EnumType, EnumValue, FieldType, FlatField, Kind, ListValue, MapValue,
    Origin, RefValue, Step, StructType, StructValue, TypeTag, Value, WriteBack, convert,
    convert_or_zero, parse_literal,
};

// --- Widget re-exports -------------------------------------------------------

pub use bindui_widget::{
    ChildSpec, Dialog, DialogOutcome, NumberProps, Reconcile, ReconcileStats, Widget, WidgetFlags,
    WidgetId, WidgetKind, WidgetValue, reconcile_children,
};

// --- View re-exports ---------------------------------------------------------

pub use bindui_views::{
    CallError, CallFlow, CallState, CompoundMode, EditDialog, EditOutcome, Factory, ListLayout,
    ListView, MapView, MethodImpl, MethodSpec, ParamSpec, SortMode, StructView, View, ViewCtx,
    ViewHost, ViewRegistry, dispatch,
};

// --- Tree re-exports ---------------------------------------------------------

pub use bindui_tree::{
    DropAction, SourceNode, SourceRef, SyncNode, TreeOpError, TreeSync, TreeSyncState,
};

// --- Chooser re-exports ------------------------------------------------------

#[cfg(feature = "chooser")]
pub use bindui_chooser::{ChooserState, DirEntry, DirWatcher, WatchMsg, read_directory};

// --- Prelude ------------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Binding, EditOutcome, FieldType, StructType, TypeTag, Value, View, ViewCtx, ViewHost,
        ViewRegistry, Widget, WidgetValue, dispatch,
    };

    pub use crate::{tree, value, views, widget};
}

pub use bindui_tree as tree;
pub use bindui_value as value;
pub use bindui_views as views;
pub use bindui_widget as widget;

#[cfg(feature = "chooser")]
pub use bindui_chooser as chooser;
