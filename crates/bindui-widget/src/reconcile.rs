//! Child reconciliation: diff a target descriptor list against actual
//! children, preserving reusable ones.
//!
//! The walk keeps the matching positional prefix, then fills the rest
//! of the plan by reusing surviving children with a matching kind+name
//! pair before constructing new ones. A member appearing mid-list
//! therefore shifts its successors instead of rebuilding them, and a
//! reordering reuses every child; only children absent from the plan
//! are dropped. The all-match path stays O(n) with no allocation.

use crate::WidgetKind;
use std::fmt;

/// One entry of the target child descriptor list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildSpec {
    /// Requested widget kind.
    pub kind: WidgetKind,
    /// Stable name, unique within one pass.
    pub name: String,
}

impl ChildSpec {
    /// Create a descriptor.
    #[must_use]
    pub fn new(kind: WidgetKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

impl fmt::Display for ChildSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}:{}", self.kind, self.name)
    }
}

/// Anything reconcilable: exposes the `(kind, name)` pair it represents.
pub trait Reconcile {
    /// The descriptor this child currently matches.
    fn spec(&self) -> ChildSpec;
}

/// Outcome counters for one reconciliation pass.
///
/// An idempotent pass over an unchanged member list reports
/// `created == 0 && dropped == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconcileStats {
    /// Children kept (matched kind+name at the same position).
    pub kept: usize,
    /// Children newly created.
    pub created: usize,
    /// Children discarded.
    pub dropped: usize,
    /// Plan entries skipped because the factory declined them.
    pub skipped: usize,
}

impl ReconcileStats {
    /// Merge counters from a nested pass.
    pub fn absorb(&mut self, other: ReconcileStats) {
        self.kept += other.kept;
        self.created += other.created;
        self.dropped += other.dropped;
        self.skipped += other.skipped;
    }

    /// Whether the pass changed the child list at all.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.created == 0 && self.dropped == 0
    }
}

/// Mutate `children` to match `plan`, preserving reusable ones.
///
/// Children matching the plan positionally (same kind and name) are
/// kept in place. Past the first divergence, each remaining plan entry
/// first claims a surviving child with the same kind+name, so a
/// mid-list insertion shifts the tail instead of rebuilding it; only
/// unclaimed entries go through `make`, which receives the plan index
/// and descriptor. A `None` from `make` skips that entry (it cannot be
/// displayed) without aborting the rest of the pass. Survivors no plan
/// entry claims are dropped.
pub fn reconcile_children<T: Reconcile>(
    children: &mut Vec<T>,
    plan: &[ChildSpec],
    mut make: impl FnMut(usize, &ChildSpec) -> Option<T>,
) -> ReconcileStats {
    let mut stats = ReconcileStats::default();

    let mut keep = 0;
    while keep < children.len() && keep < plan.len() {
        if children[keep].spec() == plan[keep] {
            keep += 1;
        } else {
            break;
        }
    }
    stats.kept = keep;
    let mut spare: Vec<Option<T>> = children.drain(keep..).map(Some).collect();

    for (i, spec) in plan.iter().enumerate().skip(keep) {
        let reused = spare.iter_mut().find_map(|slot| {
            if slot.as_ref().is_some_and(|child| child.spec() == *spec) {
                slot.take()
            } else {
                None
            }
        });
        if let Some(child) = reused {
            children.push(child);
            stats.kept += 1;
            continue;
        }
        match make(i, spec) {
            Some(child) => {
                debug_assert_eq!(child.spec(), *spec, "factory produced a mismatched child");
                children.push(child);
                stats.created += 1;
            }
            None => {
                tracing::debug!(spec = %spec, "member skipped: no child produced");
                stats.skipped += 1;
            }
        }
    }

    stats.dropped = spare.iter().filter(|slot| slot.is_some()).count();
    stats
}
