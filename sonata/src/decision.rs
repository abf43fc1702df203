//! Decision heuristics.

use partial_ref::{partial, PartialRef};

use sonata_formula::Var;

use crate::context::{parts::*, Context};
use crate::prop::{enqueue_assignment, Reason};

pub mod vsids;

/// Make a decision and enqueue it.
///
/// Branches on the unassigned variable with the highest VSIDS activity. The decision heuristic can
/// hand out variables that are already assigned, those are skipped here. The polarity of the
/// decision is the value the variable was last assigned to (phase saving), defaulting to false for
/// variables that were never assigned.
///
/// Returns `false` if no decision was made because all variables are assigned.
pub fn make_decision(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ImplGraphP,
        mut TrailP,
        mut VsidsP
    ),
) -> bool {
    let decision_var = loop {
        let candidate = match ctx.part_mut(VsidsP).next() {
            Some(var) => var,
            // Every unassigned variable is kept in the heap, so an empty heap means a full
            // assignment.
            None => return false,
        };
        if ctx.part(AssignmentP).var_value(candidate).is_none() {
            break candidate;
        }
    };

    ctx.part_mut(TrailP).new_decision_level();

    let saved_phase = ctx.part(AssignmentP).last_var_value(decision_var);
    let decision = decision_var.lit(saved_phase);

    enqueue_assignment(ctx.borrow(), decision, Reason::Unit);

    true
}

/// Hand a variable back to the decision heuristic.
///
/// Called when backtracking unassigns a variable.
pub fn make_available(mut ctx: partial!(Context, mut VsidsP), var: Var) {
    ctx.part_mut(VsidsP).make_available(var);
}
