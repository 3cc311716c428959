//! Method invocation: declared actions with typed arguments.
//!
//! A [`MethodSpec`] pairs a parameter declaration list with the callable
//! behind it. The [`CallFlow`] state machine runs the interaction:
//! with no parameters the call happens immediately (after an optional
//! confirmation), otherwise an argument dialog opens over freshly
//! allocated zero values, pre-populated from `default` and
//! `default-field` tags. The call itself is not guarded: a panicking
//! callable panics.

use crate::{EditOutcome, View, ViewCtx, registry};
use bindui_value::{Binding, StructValue, TypeTag, Value, convert, parse_literal};
use bindui_widget::WidgetValue;
use std::collections::BTreeMap;
use std::fmt;

/// One declared parameter.
pub struct ParamSpec {
    /// Parameter name, used as the member name in the argument dialog.
    pub name: String,
    /// Parameter type; the dialog edits its zero value.
    pub ty: TypeTag,
    /// Tag map (`default`, `default-field`, `view`, `desc`, ...).
    pub tags: BTreeMap<String, String>,
}

impl ParamSpec {
    /// Declare a parameter.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: TypeTag) -> Self {
        Self {
            name: name.into(),
            ty,
            tags: BTreeMap::new(),
        }
    }

    /// Add a tag.
    #[must_use]
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }
}

/// The callable side of a method: its real arity plus the function.
pub struct MethodImpl {
    arity: usize,
    f: Box<dyn Fn(&[Value]) -> Option<Value>>,
}

impl MethodImpl {
    /// Wrap a callable taking `arity` arguments.
    #[must_use]
    pub fn new(arity: usize, f: impl Fn(&[Value]) -> Option<Value> + 'static) -> Self {
        Self {
            arity,
            f: Box::new(f),
        }
    }
}

/// A declared method: name, parameters, interaction flags, callable.
///
/// A parameter count that disagrees with the callable's arity is a
/// configuration defect: it is logged at construction and the action is
/// disabled rather than invoked with garbage.
pub struct MethodSpec {
    /// Method name (action label).
    pub name: String,
    /// Declared parameters.
    pub params: Vec<ParamSpec>,
    /// Ask before invoking.
    pub confirm: bool,
    /// Present the returned value after invoking.
    pub show_result: bool,
    call: MethodImpl,
    enabled: bool,
}

impl MethodSpec {
    /// Declare a method.
    #[must_use]
    pub fn new(name: impl Into<String>, params: Vec<ParamSpec>, call: MethodImpl) -> Self {
        let name = name.into();
        let enabled = params.len() == call.arity;
        if !enabled {
            tracing::warn!(
                method = %name,
                declared = params.len(),
                arity = call.arity,
                "parameter count disagrees with the callable; action disabled"
            );
        }
        Self {
            name,
            params,
            confirm: false,
            show_result: false,
            call,
            enabled,
        }
    }

    /// Ask for confirmation before invoking.
    #[must_use]
    pub fn with_confirm(mut self) -> Self {
        self.confirm = true;
        self
    }

    /// Present the result after invoking.
    #[must_use]
    pub fn with_show_result(mut self) -> Self {
        self.show_result = true;
        self
    }

    /// Whether the action is invocable at all.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }
}

/// Invocation-flow errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    /// The action was disabled at construction.
    Disabled,
    /// A transition was requested out of order.
    InvalidState {
        /// The state the transition expects.
        expected: &'static str,
    },
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "action is disabled by a configuration defect"),
            Self::InvalidState { expected } => {
                write!(f, "call flow transition expects state {expected}")
            }
        }
    }
}

impl std::error::Error for CallError {}

/// Where one invocation currently stands.
pub enum CallState {
    /// The argument dialog is open.
    ArgDialog,
    /// Awaiting user confirmation.
    Confirm,
    /// Invoked; carries the result when `show_result` is set.
    Done {
        /// The returned value, if any is to be shown.
        result: Option<Value>,
    },
    /// The user backed out.
    Cancelled,
    /// Disabled by a configuration defect.
    Disabled,
}

/// One run of a method invocation.
pub struct CallFlow {
    spec: MethodSpec,
    args: Vec<Binding>,
    views: Vec<Box<dyn View>>,
    state: CallState,
}

impl CallFlow {
    /// Start an invocation.
    ///
    /// `receiver` feeds `default-field` pre-population: the named flat
    /// field is read once, now, off the receiver value.
    #[must_use]
    pub fn start(spec: MethodSpec, receiver: Option<&StructValue>, ctx: &ViewCtx) -> Self {
        if !spec.enabled {
            return Self {
                spec,
                args: Vec::new(),
                views: Vec::new(),
                state: CallState::Disabled,
            };
        }

        let mut args = Vec::with_capacity(spec.params.len());
        let mut views = Vec::with_capacity(spec.params.len());
        for param in &spec.params {
            let mut binding = Binding::standalone(param.ty.zero());
            prefill(&mut binding, param, receiver);
            if let Some(mut view) =
                registry::dispatch(binding.clone(), param.tags.get("view").map(String::as_str), ctx)
            {
                view.widget_mut().name = param.name.clone();
                views.push(view);
                args.push(binding);
            } else {
                tracing::warn!(
                    method = %spec.name,
                    param = %param.name,
                    "parameter has no view; action disabled"
                );
                return Self {
                    spec,
                    args: Vec::new(),
                    views: Vec::new(),
                    state: CallState::Disabled,
                };
            }
        }

        let mut flow = Self {
            spec,
            args,
            views,
            state: CallState::ArgDialog,
        };
        if flow.spec.params.is_empty() {
            flow.advance_past_args();
        }
        flow
    }

    /// The current state.
    #[must_use]
    pub fn state(&self) -> &CallState {
        &self.state
    }

    /// The argument editor views, in parameter order.
    #[must_use]
    pub fn arg_views(&self) -> &[Box<dyn View>] {
        &self.views
    }

    /// Whether the dialog should skip the generic argument grid:
    /// exactly one parameter whose view brings its own modal UI.
    #[must_use]
    pub fn skip_grid(&self) -> bool {
        self.views.len() == 1 && self.views[0].owns_activation()
    }

    /// Deliver an edit to a named argument.
    pub fn dispatch_edit(&mut self, path: &[&str], input: WidgetValue) -> EditOutcome {
        let Some((head, rest)) = path.split_first() else {
            return EditOutcome::Rejected;
        };
        let Some(idx) = self.spec.params.iter().position(|p| p.name == *head) else {
            tracing::warn!(param = %head, "edit for an unknown parameter");
            return EditOutcome::Rejected;
        };
        self.views[idx].dispatch_edit(rest, input)
    }

    /// Accept the argument dialog.
    pub fn accept_args(&mut self) -> Result<(), CallError> {
        match self.state {
            CallState::ArgDialog => {
                self.advance_past_args();
                Ok(())
            }
            CallState::Disabled => Err(CallError::Disabled),
            _ => Err(CallError::InvalidState {
                expected: "ArgDialog",
            }),
        }
    }

    /// Back out of the argument dialog or the confirmation.
    pub fn cancel(&mut self) {
        match self.state {
            CallState::ArgDialog | CallState::Confirm => self.state = CallState::Cancelled,
            _ => {}
        }
    }

    /// Answer the confirmation prompt.
    pub fn confirm(&mut self, confirmed: bool) -> Result<(), CallError> {
        match self.state {
            CallState::Confirm => {
                if confirmed {
                    self.invoke();
                } else {
                    self.state = CallState::Cancelled;
                }
                Ok(())
            }
            CallState::Disabled => Err(CallError::Disabled),
            _ => Err(CallError::InvalidState { expected: "Confirm" }),
        }
    }

    /// A view over the returned value, for result presentation.
    #[must_use]
    pub fn result_view(&self, ctx: &ViewCtx) -> Option<Box<dyn View>> {
        let CallState::Done {
            result: Some(value),
        } = &self.state
        else {
            return None;
        };
        registry::dispatch(Binding::standalone(value.clone()), Some("inline"), ctx)
    }

    fn advance_past_args(&mut self) {
        if self.spec.confirm {
            self.state = CallState::Confirm;
        } else {
            self.invoke();
        }
    }

    fn invoke(&mut self) {
        let values: Vec<Value> = self.args.iter().map(Binding::get).collect();
        let returned = (self.spec.call.f)(&values);
        let result = if self.spec.show_result { returned } else { None };
        self.state = CallState::Done { result };
    }
}

fn prefill(binding: &mut Binding, param: &ParamSpec, receiver: Option<&StructValue>) {
    if let Some(raw) = param.tags.get("default") {
        match parse_literal(raw, &param.ty) {
            Some(v) => {
                binding.set(v);
                return;
            }
            None => {
                tracing::warn!(param = %param.name, raw = %raw, "unparseable default tag");
            }
        }
    }
    if let Some(field) = param.tags.get("default-field") {
        let Some(sv) = receiver else {
            tracing::warn!(param = %param.name, "default-field without a receiver");
            return;
        };
        let Some(value) = sv.flat_value(field) else {
            tracing::warn!(param = %param.name, field = %field, "default-field names an unknown field");
            return;
        };
        match convert(value, &param.ty) {
            Some(v) => {
                binding.set(v);
            }
            None => {
                tracing::warn!(param = %param.name, field = %field, "default-field value is inconvertible");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bindui_value::{FieldType, StructType};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recording_impl(arity: usize, log: &Rc<RefCell<Vec<Vec<Value>>>>) -> MethodImpl {
        let log = Rc::clone(log);
        MethodImpl::new(arity, move |args| {
            log.borrow_mut().push(args.to_vec());
            Some(Value::Int(args.len() as i64))
        })
    }

    #[test]
    fn no_args_invokes_immediately() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let spec = MethodSpec::new("Reload", Vec::new(), recording_impl(0, &log));
        let flow = CallFlow::start(spec, None, &ViewCtx::new());
        assert!(matches!(flow.state(), CallState::Done { result: None }));
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn confirm_gate_before_invoke() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let spec = MethodSpec::new("Wipe", Vec::new(), recording_impl(0, &log)).with_confirm();
        let mut flow = CallFlow::start(spec, None, &ViewCtx::new());
        assert!(matches!(flow.state(), CallState::Confirm));
        assert!(log.borrow().is_empty());

        flow.confirm(true).unwrap();
        assert!(matches!(flow.state(), CallState::Done { .. }));
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn declined_confirmation_cancels() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let spec = MethodSpec::new("Wipe", Vec::new(), recording_impl(0, &log)).with_confirm();
        let mut flow = CallFlow::start(spec, None, &ViewCtx::new());
        flow.confirm(false).unwrap();
        assert!(matches!(flow.state(), CallState::Cancelled));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn arg_dialog_collects_edited_values() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let spec = MethodSpec::new(
            "Resize",
            vec![ParamSpec::new("Width", TypeTag::Int)],
            recording_impl(1, &log),
        );
        let mut flow = CallFlow::start(spec, None, &ViewCtx::new());
        assert!(matches!(flow.state(), CallState::ArgDialog));

        assert!(flow.dispatch_edit(&["Width"], WidgetValue::Number(80.0)).changed());
        flow.accept_args().unwrap();
        assert_eq!(log.borrow()[0], vec![Value::Int(80)]);
    }

    #[test]
    fn cancelled_dialog_never_invokes() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let spec = MethodSpec::new(
            "Resize",
            vec![ParamSpec::new("Width", TypeTag::Int)],
            recording_impl(1, &log),
        );
        let mut flow = CallFlow::start(spec, None, &ViewCtx::new());
        flow.cancel();
        assert!(matches!(flow.state(), CallState::Cancelled));
        assert!(flow.accept_args().is_err());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn default_tag_prefills_argument() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let spec = MethodSpec::new(
            "Resize",
            vec![ParamSpec::new("Width", TypeTag::Int).tag("default", "120")],
            recording_impl(1, &log),
        );
        let mut flow = CallFlow::start(spec, None, &ViewCtx::new());
        flow.accept_args().unwrap();
        assert_eq!(log.borrow()[0], vec![Value::Int(120)]);
    }

    #[test]
    fn default_field_reads_receiver_once() {
        let ty = StructType::new("Doc", vec![FieldType::new("Title", TypeTag::Str)]);
        let receiver = match Value::struct_of(&ty, &[("Title", Value::Str("draft".into()))]) {
            Value::Struct(sv) => sv,
            _ => unreachable!(),
        };
        let log = Rc::new(RefCell::new(Vec::new()));
        let spec = MethodSpec::new(
            "SaveAs",
            vec![ParamSpec::new("Name", TypeTag::Str).tag("default-field", "Title")],
            recording_impl(1, &log),
        );
        let mut flow = CallFlow::start(spec, Some(&receiver), &ViewCtx::new());
        flow.accept_args().unwrap();
        assert_eq!(log.borrow()[0], vec![Value::Str("draft".into())]);
    }

    #[test]
    fn arity_mismatch_disables_action() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let spec = MethodSpec::new(
            "Broken",
            vec![ParamSpec::new("A", TypeTag::Int)],
            recording_impl(2, &log),
        );
        assert!(!spec.enabled());
        let mut flow = CallFlow::start(spec, None, &ViewCtx::new());
        assert!(matches!(flow.state(), CallState::Disabled));
        assert_eq!(flow.accept_args(), Err(CallError::Disabled));
    }

    #[test]
    fn result_view_shows_returned_value() {
        let spec = MethodSpec::new(
            "Count",
            Vec::new(),
            MethodImpl::new(0, |_| Some(Value::Int(7))),
        )
        .with_show_result();
        let flow = CallFlow::start(spec, None, &ViewCtx::new());
        let view = flow.result_view(&ViewCtx::new()).unwrap();
        assert_eq!(view.widget().text, "7");
    }

    #[test]
    fn single_owning_param_skips_the_grid() {
        let ty = StructType::new("Opts", vec![FieldType::new("N", TypeTag::Int)]);
        let spec = MethodSpec::new(
            "Configure",
            vec![ParamSpec::new("Opts", TypeTag::Struct(ty))],
            MethodImpl::new(1, |_| None),
        );
        let flow = CallFlow::start(spec, None, &ViewCtx::new());
        // The struct parameter's launcher brings its own modal.
        assert!(flow.skip_grid());
    }
}
