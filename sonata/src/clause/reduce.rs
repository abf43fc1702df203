//! Learned clause database reduction.
use std::cmp::Reverse;

use log::debug;
use partial_ref::{partial, PartialRef};

use crate::context::{parts::*, Context};

use super::db::try_delete_clause;
use super::ClauseRef;

/// Delete half of the redundant clauses, dropping those with the highest glue level first.
///
/// Clauses that are the antecedent of a current assignment are kept, so slightly less than half of
/// the redundant clauses may be deleted. Irredundant clauses are never deleted.
pub fn reduce_redundant(
    mut ctx: partial!(
        Context,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut WatchlistsP,
        AssignmentP,
        ImplGraphP,
    ),
) {
    let db = ctx.part(ClauseDbP);
    let alloc = ctx.part(ClauseAllocP);

    let mut candidates: Vec<ClauseRef> = db
        .clauses
        .iter()
        .cloned()
        .filter(|&cref| {
            let header = alloc.header(cref);
            header.redundant() && !header.deleted()
        })
        .collect();

    candidates.sort_unstable_by_key(|&cref| Reverse(alloc.header(cref).glue()));

    let mut to_delete = candidates.len() / 2;
    let mut deleted = 0;

    for &cref in candidates.iter() {
        if to_delete == 0 {
            break;
        }
        if try_delete_clause(ctx.borrow(), cref) {
            to_delete -= 1;
            deleted += 1;
        }
    }

    debug!("reduce: deleted {} learned clauses", deleted);
}

#[cfg(test)]
mod tests {
    use super::*;

    use partial_ref::IntoPartialRefMut;

    use sonata_formula::cnf_formula;

    use crate::clause::{db, ClauseHeader};
    use crate::context::set_var_count;
    use crate::prop::{enqueue_assignment, Reason};

    #[test]
    fn reduction_prefers_high_glue() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        let clauses = cnf_formula![
            1, 2, 3;
            2, 3, 4;
            3, 4, 5;
            4, 5, 6;
        ];

        set_var_count(ctx.borrow(), clauses.var_count());

        let mut crefs = vec![];

        for (index, lits) in clauses.iter().enumerate() {
            let mut header = ClauseHeader::new();
            header.set_redundant(true);
            header.set_glue(index + 2);
            crefs.push(db::add_clause(ctx.borrow(), header, lits));
        }

        reduce_redundant(ctx.borrow());

        assert_eq!(ctx.part(ClauseDbP).redundant_count(), 2);

        // The two highest glue clauses are gone
        assert!(ctx.part(ClauseAllocP).header(crefs[2]).deleted());
        assert!(ctx.part(ClauseAllocP).header(crefs[3]).deleted());
        assert!(!ctx.part(ClauseAllocP).header(crefs[0]).deleted());
        assert!(!ctx.part(ClauseAllocP).header(crefs[1]).deleted());
    }

    #[test]
    fn asserting_clauses_survive_reduction() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        let clauses = cnf_formula![
            1, 2, 3;
            2, 3, 4;
        ];

        set_var_count(ctx.borrow(), clauses.var_count());

        let mut crefs = vec![];

        for lits in clauses.iter() {
            let mut header = ClauseHeader::new();
            header.set_redundant(true);
            header.set_glue(7);
            crefs.push(db::add_clause(ctx.borrow(), header, lits));
        }

        // Make both clauses antecedents of an assignment
        enqueue_assignment(ctx.borrow(), sonata_formula::lit!(1), Reason::Long(crefs[0]));
        enqueue_assignment(ctx.borrow(), sonata_formula::lit!(2), Reason::Long(crefs[1]));

        reduce_redundant(ctx.borrow());

        assert_eq!(ctx.part(ClauseDbP).redundant_count(), 2);
    }
}
