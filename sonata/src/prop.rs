//! Unit propagation.
use partial_ref::{partial, PartialRef};

use crate::context::{parts::*, Context};

pub mod assignment;
pub mod binary;
pub mod graph;
pub mod long;
pub mod watch;

pub use assignment::{backtrack, enqueue_assignment, restart, Assignment, Trail};
pub use graph::{Conflict, ImplGraph, ImplNode, Reason};
pub use watch::{enable_watchlists, Watch, Watchlists};

use binary::propagate_binary;
use long::propagate_long;

/// Propagate all enqueued assignments.
///
/// Propagations are discovered in trail order, which is the breadth first order of the implication
/// graph. On conflict the clause that became falsified is returned and the propagation queue is
/// left as is, to be reset by the following backtracking.
pub fn propagate(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ImplGraphP,
        mut TrailP,
        mut WatchlistsP,
        BinaryClausesP,
        ClauseDbP,
    ),
) -> Result<(), Conflict> {
    enable_watchlists(ctx.borrow());

    while let Some(lit) = ctx.part_mut(TrailP).pop_queue() {
        propagate_binary(ctx.borrow(), lit)?;
        propagate_long(ctx.borrow(), lit)?;
    }

    Ok(())
}
