//! Boolean satisfiability solver.
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use partial_ref::{IntoPartialRef, IntoPartialRefMut, PartialRef};

use anyhow::{ensure, Error};
use log::{info, warn};

use sonata_dimacs::DimacsParser;
use sonata_formula::{CnfFormula, Lit, Var};

use crate::config::SolverConfig;
use crate::context::{config_changed, ensure_var_count, parts::*, Context};
use crate::load::load_clause;
use crate::schedule::schedule_step;
use crate::state::SatState;

/// Result of checking the satisfiability of a formula.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SolveResult {
    /// A satisfying assignment was found, it can be retrieved with
    /// [`model`](Solver::model).
    Sat,
    /// The formula is unsatisfiable.
    Unsat,
    /// The search was aborted by an [`InterruptHandle`] before an answer was found.
    ///
    /// The solver stays in a consistent state and [`solve`](Solver::solve) can be called again to
    /// resume the search.
    Interrupted,
}

/// Handle to interrupt a running solve from another thread or from a signal handler.
#[derive(Clone)]
pub struct InterruptHandle {
    flag: Arc<AtomicBool>,
}

impl InterruptHandle {
    /// Request an interruption of the running solve.
    ///
    /// The interrupt is polled at safe points of the search, so it may take a moment for
    /// [`solve`](Solver::solve) to return.
    pub fn interrupt(&self) {
        self.flag.store(true, Ordering::Relaxed)
    }
}

/// A boolean satisfiability solver.
#[derive(Default)]
pub struct Solver {
    ctx: Box<Context>,
}

impl Solver {
    /// Create a new solver.
    pub fn new() -> Solver {
        Solver::default()
    }

    /// Change the solver configuration.
    pub fn set_config(&mut self, config: SolverConfig) -> Result<(), Error> {
        ensure!(
            config.vsids_decay < 1.0 && config.vsids_decay > 1.0 / 16.0,
            "vsids_decay must be within (1/16, 1)"
        );
        ensure!(
            config.luby_restart_interval_scale > 0,
            "luby_restart_interval_scale must be positive"
        );
        ensure!(
            config.reduce_interval > 0,
            "reduce_interval must be positive"
        );

        let mut ctx = self.ctx.into_partial_ref_mut();
        *ctx.part_mut(SolverConfigP) = config;
        config_changed(ctx.borrow());
        Ok(())
    }

    /// Add a formula to the solver.
    pub fn add_formula(&mut self, formula: &CnfFormula) {
        let mut ctx = self.ctx.into_partial_ref_mut();
        ensure_var_count(ctx.borrow(), formula.var_count());
        for clause in formula.iter() {
            load_clause(ctx.borrow(), clause);
        }
    }

    /// Reads and adds a formula in DIMACS CNF format.
    ///
    /// Using this avoids creating a temporary [`CnfFormula`].
    pub fn add_dimacs_cnf(&mut self, input: impl io::Read) -> Result<(), Error> {
        let parser = DimacsParser::parse_incremental(input, |parser| {
            self.add_formula(&parser.take_formula());
            Ok(())
        })?;

        info!(
            "Parsed formula with {} variables and {} clauses",
            parser.var_count(),
            parser.clause_count()
        );

        if let Some(header) = parser.header() {
            // The header is advisory, a mismatch does not invalidate the formula
            if header.var_count != parser.var_count()
                || header.clause_count != parser.clause_count()
            {
                warn!(
                    "DIMACS header declared {} variables and {} clauses",
                    header.var_count, header.clause_count
                );
            }
        }

        Ok(())
    }

    /// Check the satisfiability of the current formula.
    pub fn solve(&mut self) -> SolveResult {
        let mut ctx = self.ctx.into_partial_ref_mut();

        while schedule_step(ctx.borrow()) {}

        match ctx.part(SolverStateP).sat_state {
            SatState::Sat => SolveResult::Sat,
            SatState::Unsat => SolveResult::Unsat,
            SatState::Unknown => {
                // The schedule only stops in an unknown state on an interruption request
                ctx.part(SolverStateP).clear_interrupt();
                SolveResult::Interrupted
            }
        }
    }

    /// A handle to interrupt a concurrently running solve.
    pub fn interrupter(&self) -> InterruptHandle {
        let mut ctx = self.ctx.into_partial_ref();
        InterruptHandle {
            flag: ctx.part(SolverStateP).interrupt_flag().clone(),
        }
    }

    /// Set of literals that satisfy the formula.
    ///
    /// Contains one literal for every variable of the formula: the positive literal when the
    /// variable is assigned true, the negative one otherwise.
    pub fn model(&self) -> Option<Vec<Lit>> {
        let mut ctx = self.ctx.into_partial_ref();
        if ctx.part(SolverStateP).sat_state == SatState::Sat {
            Some(
                ctx.part(AssignmentP)
                    .assignment()
                    .iter()
                    .enumerate()
                    .map(|(index, assignment)| {
                        Var::from_index(index).lit(assignment.unwrap_or(false))
                    })
                    .collect(),
            )
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    use sonata_dimacs::write_dimacs;
    use sonata_formula::{
        cnf_formula, lits,
        test::{pigeon_hole_formula, sat_formula, sgen_unsat_formula},
        CnfFormula,
    };

    #[test]
    fn simple_sat() {
        let mut solver = Solver::new();

        solver.add_formula(&cnf_formula![
            1;
        ]);

        assert_eq!(solver.solve(), SolveResult::Sat);
        assert_eq!(solver.model().unwrap(), &lits![1]);
    }

    #[test]
    fn contradictory_units() {
        let mut solver = Solver::new();

        solver.add_formula(&cnf_formula![
            1;
            -1;
        ]);

        assert_eq!(solver.solve(), SolveResult::Unsat);
        assert!(solver.model().is_none());
    }

    #[test]
    fn all_polarities_of_two_vars() {
        let mut solver = Solver::new();

        solver.add_formula(&cnf_formula![
            1, 2;
            -1, 2;
            1, -2;
            -1, -2;
        ]);

        assert_eq!(solver.solve(), SolveResult::Unsat);
    }

    #[test]
    fn propagation_trap() {
        let mut solver = Solver::new();

        // All clauses become false under unit propagation alone
        solver.add_formula(&cnf_formula![
            1, 2, 3;
            -1, 2;
            -2, 3;
            -3;
        ]);

        assert_eq!(solver.solve(), SolveResult::Unsat);
    }

    #[test]
    fn pigeon_hole() {
        for holes in 1..6 {
            let mut solver = Solver::new();

            solver.add_formula(&pigeon_hole_formula(holes));

            assert_eq!(solver.solve(), SolveResult::Unsat);
        }
    }

    #[test]
    fn interrupt_and_resume() {
        let mut solver = Solver::new();

        solver.add_formula(&pigeon_hole_formula(6));

        solver.interrupter().interrupt();

        assert_eq!(solver.solve(), SolveResult::Interrupted);

        // The interrupt flag was reset and the search can resume
        assert_eq!(solver.solve(), SolveResult::Unsat);
    }

    #[test]
    fn model_covers_gap_variables() {
        let mut solver = Solver::new();

        let mut formula = CnfFormula::new();
        formula.set_var_count(5);
        formula.add_clause(&lits![4]);

        solver.add_formula(&formula);

        assert_eq!(solver.solve(), SolveResult::Sat);

        let model = solver.model().unwrap();
        assert_eq!(model.len(), 5);
        assert!(model.contains(&sonata_formula::lit!(4)));
    }

    proptest! {
        #[test]
        fn sgen_unsat(formula in sgen_unsat_formula(1..7usize)) {
            let mut solver = Solver::new();

            solver.add_formula(&formula);

            prop_assert_eq!(solver.solve(), SolveResult::Unsat);
        }

        #[test]
        fn sgen_unsat_frequent_restarts(formula in sgen_unsat_formula(1..5usize)) {
            let mut solver = Solver::new();

            // Forcing a restart after (nearly) every conflict must not change the verdict
            let mut config = SolverConfig::default();
            config.luby_restart_interval_scale = 1;
            solver.set_config(config).unwrap();

            solver.add_formula(&formula);

            prop_assert_eq!(solver.solve(), SolveResult::Unsat);
        }

        #[test]
        fn sat(formula in sat_formula(4..20usize, 10..100usize, 0.05..0.2, 0.9..1.0)) {
            let mut solver = Solver::new();

            solver.add_formula(&formula);

            prop_assert_eq!(solver.solve(), SolveResult::Sat);

            let model = solver.model().unwrap();

            for clause in formula.iter() {
                prop_assert!(clause.iter().any(|lit| model.contains(lit)));
            }
        }

        #[test]
        fn sat_via_dimacs(formula in sat_formula(4..20usize, 10..100usize, 0.05..0.2, 0.9..1.0)) {
            let mut solver = Solver::new();

            let mut dimacs = vec![];

            write_dimacs(&mut dimacs, &formula).unwrap();

            solver.add_dimacs_cnf(&mut &dimacs[..]).unwrap();

            prop_assert_eq!(solver.solve(), SolveResult::Sat);

            let model = solver.model().unwrap();

            for clause in formula.iter() {
                prop_assert!(clause.iter().any(|lit| model.contains(lit)));
            }
        }

        #[test]
        fn sgen_unsat_added_clause_by_clause(formula in sgen_unsat_formula(1..7usize)) {
            let mut solver = Solver::new();

            let mut last_state = SolveResult::Sat;

            for clause in formula.iter() {
                let single_clause = CnfFormula::from(Some(clause));
                solver.add_formula(&single_clause);

                let state = solver.solve();
                if state != last_state {
                    prop_assert_eq!(state, SolveResult::Unsat);
                    prop_assert_eq!(last_state, SolveResult::Sat);
                    last_state = state;
                }
            }

            prop_assert_eq!(last_state, SolveResult::Unsat);
        }
    }
}
