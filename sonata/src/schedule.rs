//! Scheduling of restarts, clause database maintenance and solving steps.
use log::info;

use partial_ref::{partial, PartialRef};

use crate::cdcl::conflict_step;
use crate::clause::gc::collect_garbage;
use crate::clause::reduce::reduce_redundant;
use crate::context::{parts::*, Context};
use crate::prop::restart;
use crate::state::SatState;

mod luby;

use luby::LubySequence;

/// Counters driving restarts and clause database maintenance.
#[derive(Default)]
pub struct Schedule {
    conflicts: u64,
    next_restart: u64,
    restarts: u64,
    luby: LubySequence,
}

/// Perform one step of the schedule.
///
/// Returns `false` when the search is finished or was interrupted.
pub fn schedule_step(
    mut ctx: partial!(
        Context,
        mut AnalyzeConflictP,
        mut AssignmentP,
        mut BinaryClausesP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut ImplGraphP,
        mut ScheduleP,
        mut SolverStateP,
        mut TmpDataP,
        mut TrailP,
        mut VsidsP,
        mut WatchlistsP,
        SolverConfigP,
    ),
) -> bool {
    if ctx.part(SolverStateP).sat_state != SatState::Unknown {
        return false;
    }

    if ctx.part(SolverStateP).interrupt_requested() {
        return false;
    }

    let (schedule, mut ctx) = ctx.split_part_mut(ScheduleP);
    let (config, mut ctx) = ctx.split_part(SolverConfigP);

    if schedule.conflicts > 0 && schedule.conflicts % 5000 == 0 {
        let db = ctx.part(ClauseDbP);
        let units = ctx.part(TrailP).top_level_assignment_count();
        info!(
            "confl: {}k rest: {} vars: {} bin: {} irred: {} red: {}",
            schedule.conflicts / 1000,
            schedule.restarts,
            ctx.part(AssignmentP).assignment().len() - units,
            ctx.part(BinaryClausesP).count(),
            db.irredundant_count(),
            db.redundant_count(),
        );
    }

    if schedule.next_restart == schedule.conflicts {
        restart(ctx.borrow());
        schedule.restarts += 1;
        schedule.next_restart += config.luby_restart_interval_scale * schedule.luby.advance();
    }

    if schedule.conflicts > 0 && schedule.conflicts % config.reduce_interval == 0 {
        reduce_redundant(ctx.borrow());
    }

    collect_garbage(ctx.borrow());

    conflict_step(ctx.borrow());
    schedule.conflicts += 1;

    true
}
