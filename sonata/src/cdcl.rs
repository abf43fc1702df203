//! Conflict driven clause learning.

use partial_ref::{partial, PartialRef};

use crate::analyze_conflict::analyze_conflict;
use crate::clause::{assess::assess_learned_clause, db};
use crate::context::{parts::*, Context};
use crate::decision::make_decision;
use crate::prop::{backtrack, enqueue_assignment, propagate, Conflict, Reason};
use crate::state::SatState;

/// Find a conflict, learn a clause and backtrack.
///
/// When propagation and decisions yield a full assignment instead, the state is set to
/// [`SatState::Sat`]. When the learned clause is empty, the formula is contradictory and the state
/// is set to [`SatState::Unsat`].
pub fn conflict_step(
    mut ctx: partial!(
        Context,
        mut AnalyzeConflictP,
        mut AssignmentP,
        mut BinaryClausesP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut ImplGraphP,
        mut SolverStateP,
        mut TmpDataP,
        mut TrailP,
        mut VsidsP,
        mut WatchlistsP,
    ),
) {
    let conflict = match find_conflict(ctx.borrow()) {
        Ok(()) => {
            ctx.part_mut(SolverStateP).sat_state = SatState::Sat;
            return;
        }
        Err(FoundConflict::Interrupted) => return,
        Err(FoundConflict::Conflict(conflict)) => conflict,
    };

    let backtrack_to = analyze_conflict(ctx.borrow(), conflict);

    let (analyze, mut ctx) = ctx.split_part(AnalyzeConflictP);
    let clause = analyze.clause();

    // The learned clause is stored before backtracking. Its watches go to the asserting literal
    // (position 0) and a literal of the backjump level (position 1), which keeps the watchlist
    // invariant intact once the asserting literal is enqueued below.
    let reason = match clause.len() {
        0 => {
            ctx.part_mut(SolverStateP).sat_state = SatState::Unsat;
            return;
        }
        1 => Reason::Unit,
        2 => {
            ctx.part_mut(BinaryClausesP)
                .add_binary_clause([clause[0], clause[1]]);
            Reason::Binary([clause[1]])
        }
        _ => {
            let header = assess_learned_clause(ctx.borrow(), clause);
            let cref = db::add_clause(ctx.borrow(), header, clause);
            Reason::Long(cref)
        }
    };

    backtrack(ctx.borrow(), backtrack_to);

    enqueue_assignment(ctx.borrow(), clause[0], reason);
}

/// Return type of [`find_conflict`].
enum FoundConflict {
    Conflict(Conflict),
    Interrupted,
}

impl From<Conflict> for FoundConflict {
    fn from(conflict: Conflict) -> FoundConflict {
        FoundConflict::Conflict(conflict)
    }
}

/// Propagate and make decisions until a conflict is found.
///
/// Returns `Ok` if a satisfying assignment was found instead. A pending interruption request is
/// observed between a propagation pass and the following decision and aborts the search without
/// changing its state.
fn find_conflict(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ImplGraphP,
        mut TrailP,
        mut VsidsP,
        mut WatchlistsP,
        BinaryClausesP,
        ClauseDbP,
        SolverStateP,
    ),
) -> Result<(), FoundConflict> {
    loop {
        propagate(ctx.borrow())?;

        if ctx.part(SolverStateP).interrupt_requested() {
            return Err(FoundConflict::Interrupted);
        }

        if !make_decision(ctx.borrow()) {
            return Ok(());
        }
    }
}
