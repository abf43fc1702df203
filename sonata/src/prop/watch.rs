//! Watchlists to detect clauses that became unit.
//!
//! Each long clause has two watches pointing at it, kept in the watchlists of two different
//! literals of the clause. Whenever the watches move to different literals, the literals of the
//! clause are permuted so that the watched literals are in positions 0 and 1.
//!
//! While a clause is not unit under the current assignment, the watched literals are two non-false
//! literals. When a clause is unit and thus propagating, the propagated literal is watched and in
//! position 0, while position 1 holds the falsified literal with the largest decision level. When
//! a clause becomes satisfied before becoming unit, the watches may stay where they are.
//!
//! Assigning a literal false can invalidate this invariant, but only for the clauses in that
//! literal's watchlist. Scanning that list and moving watches as needed restores the invariant and
//! discovers exactly the clauses that became unit or conflicting: those where no second non-false
//! literal can be found. Backtracking cannot invalidate the invariant, so watchlists need no
//! maintenance there.
//!
//! See [Section 4.5.1 of the "Handbook of Satisfiability"][handbook-ch4] for more details and
//! references.
//!
//! Each watch also carries a blocking literal, a literal of the clause different from the watched
//! literal. When the blocking literal is true the clause is satisfied and the watch can be skipped
//! without accessing the clause database. This variant was introduced by [Niklas Sörensson and
//! Niklas Eén in "MINISAT 2.1 and MINISAT++ 1.0 — SAT Race 2008 Editions"][minisat-2.1].
//!
//! After a garbage collection the watchlists refer to stale clause locations. They are invalidated
//! wholesale and rebuilt from the clause database before the next propagation.
//!
//! [handbook-ch4]: https://www.satassociation.org/articles/FAIA185-0131.pdf
//! [minisat-2.1]: https://www.cril.univ-artois.fr/SAT09/solvers/booklet.pdf

use partial_ref::{partial, PartialRef};

use sonata_formula::Lit;

use crate::clause::ClauseRef;
use crate::context::{parts::*, Context};

/// A watch on a long clause.
#[derive(Copy, Clone)]
pub struct Watch {
    /// Clause which has the referring lit in position 0 or 1.
    pub cref: ClauseRef,
    /// A lit of the clause, different from the referring lit.
    pub blocking: Lit,
}

/// Watchlists to detect clauses that became unit.
#[derive(Default)]
pub struct Watchlists {
    /// Contains only valid data for indices of assigned variables.
    watches: Vec<Vec<Watch>>,
    /// Whether the watchlists are up to date with the clause database.
    enabled: bool,
}

impl Watchlists {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.watches.resize(count * 2, vec![]);
    }

    /// Start watching a clause.
    ///
    /// `lits` have to be the first two literals of the given clause.
    pub fn watch_clause(&mut self, cref: ClauseRef, lits: [Lit; 2]) {
        for i in 0..2 {
            let watch = Watch {
                cref,
                blocking: lits[i ^ 1],
            };
            self.watches[(!lits[i]).code()].push(watch);
        }
    }

    /// Stop watching a clause with the given literal.
    pub fn unwatch_clause(&mut self, lit: Lit, cref: ClauseRef) {
        let watches = &mut self.watches[lit.code()];
        let position = watches
            .iter()
            .position(|watch| watch.cref == cref)
            .expect("unwatch_clause for clause that is not watched");
        watches.swap_remove(position);
    }

    /// Return watches for a given literal.
    pub fn watched_by_mut(&mut self, lit: Lit) -> &mut Vec<Watch> {
        &mut self.watches[lit.code()]
    }

    /// Make a literal watch a clause.
    pub fn add_watch(&mut self, lit: Lit, watch: Watch) {
        self.watches[lit.code()].push(watch)
    }

    /// Whether the watchlists are up to date with the clause database.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Invalidate all watchlists.
    ///
    /// They are rebuilt by [`enable_watchlists`] before the next propagation.
    pub fn disable(&mut self) {
        self.enabled = false;
        for watchlist in self.watches.iter_mut() {
            watchlist.clear();
        }
    }
}

/// Rebuild invalidated watchlists from the clause database.
///
/// Watched literals are positional (positions 0 and 1 of each clause), so rebuilding watches from
/// those positions is valid at any point of the search.
pub fn enable_watchlists(mut ctx: partial!(Context, mut WatchlistsP, ClauseAllocP, ClauseDbP)) {
    if ctx.part(WatchlistsP).enabled() {
        return;
    }

    let (watchlists, mut ctx) = ctx.split_part_mut(WatchlistsP);
    let (db, ctx) = ctx.split_part(ClauseDbP);
    let alloc = ctx.part(ClauseAllocP);

    for &cref in db.clauses().iter() {
        let clause = alloc.clause(cref);
        if clause.header().deleted() {
            continue;
        }
        let lits = clause.lits();
        watchlists.watch_clause(cref, [lits[0], lits[1]]);
    }

    watchlists.enabled = true;
}
