//! Clause assessment.
use partial_ref::{partial, PartialRef};

use sonata_formula::Lit;

use crate::context::{parts::*, Context};
use crate::glue::compute_glue;

use super::ClauseHeader;

/// Assess a newly learned clause and generate its clause header.
pub fn assess_learned_clause(
    mut ctx: partial!(Context, mut TmpDataP, ImplGraphP),
    lits: &[Lit],
) -> ClauseHeader {
    // This is called while the clause is still in conflict, thus the computed glue level is one
    // higher than it'll be after backtracking when the clause becomes asserting.
    let glue = compute_glue(ctx.borrow(), lits) - 1;

    let mut header = ClauseHeader::new();

    header.set_glue(glue);
    header.set_redundant(true);

    header
}
