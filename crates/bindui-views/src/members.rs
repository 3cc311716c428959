//! Member management shared by the compound views.
//!
//! A compound view (struct, list, map) does not hold child views ad hoc;
//! it holds a [`Members`] list that is reconciled against a plan of
//! `(name, binding, hint)` entries each refresh. The plan's widget kinds
//! are predicted through the registry so the reconciliation diff can run
//! before any view is constructed, keeping an unchanged pass free of
//! creations and destructions.

use crate::registry::ViewRegistry;
use crate::{EditOutcome, View, ViewCtx};
use bindui_value::Binding;
use bindui_widget::{
    ChildSpec, Reconcile, ReconcileStats, Widget, WidgetFlags, WidgetKind, WidgetValue,
    reconcile_children,
};

/// One planned member: where it binds and how it wants to be shown.
pub struct MemberPlan {
    /// Stable member name (field name, list position, map key).
    pub name: String,
    /// Binding for the member's value.
    pub binding: Binding,
    /// `view` tag hint, if any.
    pub hint: Option<String>,
}

impl MemberPlan {
    /// Plan a member.
    #[must_use]
    pub fn new(name: impl Into<String>, binding: Binding, hint: Option<&str>) -> Self {
        Self {
            name: name.into(),
            binding,
            hint: hint.map(str::to_string),
        }
    }
}

/// A live member: its identity pair plus the view behind it.
///
/// The `(kind, name)` pair is stored at creation rather than read from
/// the view's widget, so custom factories that produce an unexpected
/// widget kind still reconcile stably.
pub struct Member {
    name: String,
    kind: WidgetKind,
    view: Box<dyn View>,
}

impl Member {
    /// The member's stable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The member's view.
    #[must_use]
    pub fn view(&self) -> &dyn View {
        &*self.view
    }

    /// Mutable access to the member's view.
    pub fn view_mut(&mut self) -> &mut dyn View {
        &mut *self.view
    }
}

impl Reconcile for Member {
    fn spec(&self) -> ChildSpec {
        ChildSpec::new(self.kind, self.name.clone())
    }
}

/// The reconciled member list of one compound view.
#[derive(Default)]
pub struct Members {
    list: Vec<Member>,
}

impl Members {
    /// An empty member list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Whether there are no live members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Iterate live members.
    pub fn iter(&self) -> impl Iterator<Item = &Member> {
        self.list.iter()
    }

    /// Look up a member by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Member> {
        self.list.iter().find(|m| m.name == name)
    }

    /// Reconcile against a plan, then refresh every member.
    ///
    /// Plan entries whose shape cannot be displayed (skip hint, untyped
    /// nil, declined factory) are filtered up front so they do not break
    /// the positional diff for the members after them.
    pub fn reconcile(&mut self, plans: &[MemberPlan], ctx: &ViewCtx) -> ReconcileStats {
        let registry = ViewRegistry::global();
        let mut specs = Vec::with_capacity(plans.len());
        let mut shown: Vec<&MemberPlan> = Vec::with_capacity(plans.len());
        for plan in plans {
            let Some(raw) = plan.binding.try_get_raw() else {
                continue;
            };
            let Some(kind) = registry.predict_kind(&raw, plan.hint.as_deref()) else {
                continue;
            };
            specs.push(ChildSpec::new(kind, plan.name.clone()));
            shown.push(plan);
        }

        let mut stats = reconcile_children(&mut self.list, &specs, |i, spec| {
            let plan = shown[i];
            let mut view = registry.dispatch(plan.binding.clone(), plan.hint.as_deref(), ctx)?;
            view.widget_mut().name = spec.name.clone();
            Some(Member {
                name: spec.name.clone(),
                kind: spec.kind,
                view,
            })
        });

        // Reused members can sit anywhere after the pass, not just in
        // the kept prefix; a freshly built view's refresh is clean.
        for member in &mut self.list {
            stats.absorb(member.view.refresh());
        }
        stats
    }

    /// Route an edit to the named member, bubbling its outcome.
    pub fn dispatch_edit(&mut self, path: &[&str], input: WidgetValue) -> EditOutcome {
        let Some((head, rest)) = path.split_first() else {
            return EditOutcome::Rejected;
        };
        let Some(member) = self.list.iter_mut().find(|m| m.name == *head) else {
            tracing::warn!(member = %head, "edit for an unknown or hidden member");
            return EditOutcome::Rejected;
        };
        member.view.dispatch_edit(rest, input)
    }

    /// Mirror member widgets into the parent container widget.
    ///
    /// Widget identities are preserved (clones keep their id), so "same
    /// widget survived the pass" stays observable from the outside.
    pub fn sync_into(&self, parent: &mut Widget) {
        parent.children = self.list.iter().map(|m| m.view.widget().clone()).collect();
        for (member, child) in self.list.iter().zip(&mut parent.children) {
            if member.view.is_default() == Some(false) {
                child.flags.insert(WidgetFlags::MODIFIED);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bindui_value::{Binding, FieldType, StructType, TypeTag, Value};
    use bindui_widget::WidgetId;

    fn plans_for(root: &Binding) -> Vec<MemberPlan> {
        let Value::Struct(sv) = root.get() else {
            panic!("struct root");
        };
        sv.ty
            .flat_fields()
            .iter()
            .map(|flat| {
                MemberPlan::new(
                    flat.field.name.clone(),
                    root.child_field(flat),
                    flat.field.tags.get("view").map(String::as_str),
                )
            })
            .collect()
    }

    fn sample_root() -> Binding {
        let ty = StructType::new(
            "Sample",
            vec![
                FieldType::new("Flag", TypeTag::Bool),
                FieldType::new("Count", TypeTag::Int),
                FieldType::new("Hidden", TypeTag::Str).tag("view", "-"),
            ],
        );
        Binding::standalone(TypeTag::Struct(ty).zero())
    }

    #[test]
    fn reconcile_builds_displayable_members_only() {
        let root = sample_root();
        let mut members = Members::new();
        let stats = members.reconcile(&plans_for(&root), &ViewCtx::new());
        assert_eq!(stats.created, 2);
        assert!(members.get("Flag").is_some());
        assert!(members.get("Hidden").is_none());
    }

    #[test]
    fn second_reconcile_is_clean_and_keeps_identity() {
        let root = sample_root();
        let mut members = Members::new();
        let ctx = ViewCtx::new();
        members.reconcile(&plans_for(&root), &ctx);
        let ids: Vec<WidgetId> = members.iter().map(|m| m.view().widget().id()).collect();

        let stats = members.reconcile(&plans_for(&root), &ctx);
        assert!(stats.is_clean());
        let after: Vec<WidgetId> = members.iter().map(|m| m.view().widget().id()).collect();
        assert_eq!(ids, after);
    }

    #[test]
    fn dispatch_edit_routes_by_name() {
        let root = sample_root();
        let mut members = Members::new();
        members.reconcile(&plans_for(&root), &ViewCtx::new());

        let outcome = members.dispatch_edit(&["Count"], WidgetValue::Number(5.0));
        assert!(outcome.changed());
        let Value::Struct(sv) = root.get() else {
            panic!("struct");
        };
        assert_eq!(sv.field("Count"), Some(&Value::Int(5)));
    }

    #[test]
    fn dispatch_edit_unknown_member_rejected() {
        let root = sample_root();
        let mut members = Members::new();
        members.reconcile(&plans_for(&root), &ViewCtx::new());
        assert_eq!(
            members.dispatch_edit(&["Hidden"], WidgetValue::Text("x".into())),
            EditOutcome::Rejected
        );
    }

    #[test]
    fn sync_into_mirrors_widgets() {
        let root = sample_root();
        let mut members = Members::new();
        members.reconcile(&plans_for(&root), &ViewCtx::new());
        let mut parent = Widget::new(WidgetKind::Frame, "root");
        members.sync_into(&mut parent);
        assert_eq!(parent.children.len(), 2);
        assert!(parent.child("Flag").is_some());
    }
}
