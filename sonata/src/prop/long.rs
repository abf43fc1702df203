//! Propagation of long clauses.
use std::mem::take;

use partial_ref::{partial, PartialRef};

use sonata_formula::Lit;

use crate::context::{parts::*, Context};

use super::enqueue_assignment;
use super::{Conflict, Reason, Watch};

/// Propagate all literals implied by long clauses watched by the given literal.
///
/// On conflict return the clause propagating the conflicting assignment.
///
/// See [`watch`](super::watch) for the invariants that this has to uphold.
pub fn propagate_long(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ImplGraphP,
        mut TrailP,
        mut WatchlistsP,
    ),
    lit: Lit,
) -> Result<(), Conflict> {
    let (watchlists, mut ctx) = ctx.split_part_mut(WatchlistsP);
    let (alloc, mut ctx) = ctx.split_part_mut(ClauseAllocP);

    // The watchlist of lit is taken out, so new watches can be added to other lists while it is
    // scanned. Watches that stay are compacted towards the front and the list is truncated at the
    // end.
    let mut watches = take(watchlists.watched_by_mut(lit));

    let false_lit = !lit;

    let mut read = 0;
    let mut write = 0;
    let mut result = Ok(());

    'watches: while read < watches.len() {
        let watch = watches[read];
        read += 1;

        // If the blocking literal (which is part of the watched clause) is already true, the
        // watched clause is satisfied and the watch can stay where it is.
        if ctx.part(AssignmentP).lit_is_true(watch.blocking) {
            watches[write] = watch;
            write += 1;
            continue;
        }

        let cref = watch.cref;
        let lits = alloc.clause_mut(cref).lits_mut();

        // Move the literal we're propagating into position 1. This makes the other watched
        // literal the propagation candidate of this clause.
        if lits[0] == false_lit {
            lits.swap(0, 1);
        }
        debug_assert_eq!(lits[1], false_lit);

        let first = lits[0];

        // The replacement watch gets the other watched literal as blocking literal, which avoids
        // a clause access whenever that one is true.
        let new_watch = Watch {
            cref,
            blocking: first,
        };

        if first != watch.blocking && ctx.part(AssignmentP).lit_is_true(first) {
            watches[write] = new_watch;
            write += 1;
            continue;
        }

        // Look for a non-false unwatched literal to take over our watch.
        for pos in 2..lits.len() {
            let candidate = lits[pos];
            if !ctx.part(AssignmentP).lit_is_false(candidate) {
                debug_assert_ne!(candidate, false_lit);
                lits[1] = candidate;
                lits[pos] = false_lit;
                watchlists.add_watch(!candidate, new_watch);
                continue 'watches;
            }
        }

        // All unwatched literals are false, so the clause is unit or conflicting and the watch
        // stays.
        watches[write] = new_watch;
        write += 1;

        if ctx.part(AssignmentP).lit_is_false(first) {
            // Keep the unprocessed watches when bailing out on a conflict.
            while read < watches.len() {
                watches[write] = watches[read];
                write += 1;
                read += 1;
            }
            result = Err(Conflict::Long(cref));
            break;
        }

        enqueue_assignment(ctx.borrow(), first, Reason::Long(cref));
    }

    watches.truncate(write);
    *watchlists.watched_by_mut(lit) = watches;

    result
}
