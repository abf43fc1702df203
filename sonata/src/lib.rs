//! Sonata is a [CDCL][cdcl] based SAT solver.
//!
//! Given a propositional formula in conjunctive normal form, it either finds a satisfying
//! assignment or determines that none exists.
//!
//! [cdcl]: https://en.wikipedia.org/wiki/Conflict-driven_clause_learning

pub mod config;
pub mod solver;

mod analyze_conflict;
mod binary;
mod cdcl;
mod clause;
mod context;
mod decision;
mod glue;
mod load;
mod prop;
mod schedule;
mod state;
mod tmp;

pub use sonata_dimacs as dimacs;
pub use sonata_formula::{cnf, lit, CnfFormula, Lit, Var};

pub use solver::{InterruptHandle, SolveResult, Solver};
