//! Database for long clauses.
use partial_ref::{partial, PartialRef};

use sonata_formula::Lit;

use crate::context::{parts::*, Context};
use crate::prop::Reason;

use super::{header::HEADER_LEN, ClauseHeader, ClauseRef};

/// Database for long clauses.
///
/// Deleted clauses stay in the `clauses` list until the next garbage collection, so the deleted
/// flag of the header needs to be checked when iterating. The counts are always up to date.
#[derive(Default)]
pub struct ClauseDb {
    /// May contain deleted clauses, see above.
    pub(super) clauses: Vec<ClauseRef>,
    /// Number of live clauses loaded from the input formula.
    pub(super) irredundant_count: usize,
    /// Number of live clauses learned during conflict analysis.
    pub(super) redundant_count: usize,
    /// Size of deleted but not yet collected clauses.
    pub(super) garbage_size: usize,
}

impl ClauseDb {
    /// The number of long clauses loaded from the input formula.
    pub fn irredundant_count(&self) -> usize {
        self.irredundant_count
    }

    /// The number of long clauses learned during conflict analysis.
    pub fn redundant_count(&self) -> usize {
        self.redundant_count
    }

    /// All clauses of the database, including deleted ones.
    ///
    /// The deleted flag of the clause header has to be checked when iterating over this.
    pub fn clauses(&self) -> &[ClauseRef] {
        &self.clauses
    }
}

/// Add a long clause to the database.
///
/// When the watchlists are enabled, the first two literals of the clause become its watched
/// literals.
pub fn add_clause(
    mut ctx: partial!(Context, mut ClauseAllocP, mut ClauseDbP, mut WatchlistsP),
    header: ClauseHeader,
    lits: &[Lit],
) -> ClauseRef {
    let redundant = header.redundant();

    let cref = ctx.part_mut(ClauseAllocP).add_clause(header, lits);

    let db = ctx.part_mut(ClauseDbP);
    db.clauses.push(cref);
    if redundant {
        db.redundant_count += 1;
    } else {
        db.irredundant_count += 1;
    }

    if ctx.part(WatchlistsP).enabled() {
        ctx.part_mut(WatchlistsP)
            .watch_clause(cref, [lits[0], lits[1]]);
    }

    cref
}

/// Delete a long clause from the database.
///
/// The clause's storage is reclaimed by the next garbage collection. The caller is responsible for
/// removing the clause's watches, see [`try_delete_clause`] for a variant that handles this.
pub fn delete_clause(
    mut ctx: partial!(Context, mut ClauseAllocP, mut ClauseDbP),
    cref: ClauseRef,
) {
    let (alloc, mut ctx) = ctx.split_part_mut(ClauseAllocP);
    let db = ctx.part_mut(ClauseDbP);

    let header = alloc.header_mut(cref);

    debug_assert!(
        !header.deleted(),
        "delete_clause for already deleted clause"
    );

    header.set_deleted(true);

    if header.redundant() {
        db.redundant_count -= 1;
    } else {
        db.irredundant_count -= 1;
    }

    db.garbage_size += header.len() + HEADER_LEN;
}

/// Delete a long clause unless it is the antecedent of a current assignment.
///
/// Removes the clause's watches when the watchlists are enabled. Returns whether the clause was
/// deleted.
pub fn try_delete_clause(
    mut ctx: partial!(
        Context,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut WatchlistsP,
        AssignmentP,
        ImplGraphP,
    ),
    cref: ClauseRef,
) -> bool {
    // A propagating clause keeps its asserted literal in position 0.
    let lit_0 = ctx.part(ClauseAllocP).clause(cref).lits()[0];
    let asserting = ctx.part(AssignmentP).lit_is_true(lit_0)
        && ctx.part(ImplGraphP).reason(lit_0.var()) == &Reason::Long(cref);

    if asserting {
        return false;
    }

    if ctx.part(WatchlistsP).enabled() {
        let (lit_0, lit_1) = {
            let lits = ctx.part(ClauseAllocP).clause(cref).lits();
            (lits[0], lits[1])
        };
        let watchlists = ctx.part_mut(WatchlistsP);
        watchlists.unwatch_clause(!lit_0, cref);
        watchlists.unwatch_clause(!lit_1, cref);
    }

    delete_clause(ctx.borrow(), cref);

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    use partial_ref::IntoPartialRefMut;

    use sonata_formula::cnf_formula;

    #[test]
    fn counts_track_deletes() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        let clauses = cnf_formula![
            1, 2, 3;
            4, -5, 6;
            -2, 3, -4;
            -3, 5, 2, 7, 5;
        ];

        let mut crefs = vec![];

        for (index, clause) in clauses.iter().enumerate() {
            let mut header = ClauseHeader::new();
            header.set_redundant(index >= 2);
            let cref = add_clause(ctx.borrow(), header, clause);
            crefs.push(cref);
        }

        assert_eq!(ctx.part(ClauseDbP).irredundant_count(), 2);
        assert_eq!(ctx.part(ClauseDbP).redundant_count(), 2);

        delete_clause(ctx.borrow(), crefs[0]);
        delete_clause(ctx.borrow(), crefs[3]);

        assert_eq!(ctx.part(ClauseDbP).irredundant_count(), 1);
        assert_eq!(ctx.part(ClauseDbP).redundant_count(), 1);
        assert!(ctx.part(ClauseDbP).garbage_size > 0);
    }
}
