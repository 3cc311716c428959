//! Modal value editing with accept/cancel semantics.
//!
//! The dialog edits a standalone scratch copy of the target value;
//! nothing reaches the target (and no write-back fires) until the accept
//! path commits the scratch through the target binding as one edit.
//! Cancelling discards the scratch outright.

use crate::{EditOutcome, View, ViewCtx, registry};
use bindui_value::Binding;
use bindui_widget::{Dialog, DialogOutcome, WidgetValue};

/// A modal editor over a scratch copy of one bound value.
pub struct EditDialog {
    target: Binding,
    scratch: Binding,
    view: Box<dyn View>,
}

impl EditDialog {
    /// Open an editor for the target binding.
    ///
    /// `None` when the target's shape has no view (untyped nil, skip
    /// hint) — the launcher should have been omitted in that case.
    #[must_use]
    pub fn open(target: Binding, ctx: &ViewCtx, hint: Option<&str>) -> Option<Self> {
        let scratch = Binding::standalone(target.get());
        // Scratch edits are inline and local; the real write-back runs
        // on commit, as part of the single accepted edit.
        let view = registry::dispatch(scratch.clone(), hint.or(Some("inline")), ctx)?;
        Some(Self {
            target,
            scratch,
            view,
        })
    }

    /// The modal presentation of the current scratch state.
    #[must_use]
    pub fn dialog(&self) -> Dialog {
        let title = self
            .target
            .field_name()
            .unwrap_or("Edit")
            .to_string();
        Dialog::new(title, self.view.widget().clone())
    }

    /// The view over the scratch copy.
    #[must_use]
    pub fn view(&self) -> &dyn View {
        &*self.view
    }

    /// Deliver an edit to the scratch copy.
    pub fn dispatch_edit(&mut self, path: &[&str], input: WidgetValue) -> EditOutcome {
        self.view.dispatch_edit(path, input)
    }

    /// Close the dialog.
    ///
    /// Accept commits the scratch value through the target binding (one
    /// edit, one write-back if the target needs one) and reports whether
    /// the target actually changed. Cancel discards the scratch and
    /// never touches the target.
    pub fn close(self, outcome: DialogOutcome) -> bool {
        match outcome {
            DialogOutcome::Accepted => {
                let mut target = self.target;
                target.set(self.scratch.get())
            }
            DialogOutcome::Cancelled => false,
        }
    }
}
