//! End-to-end tests on bundled DIMACS files.
//!
//! Each file records its expected status in a `c SATISFIABLE` / `c UNSATISFIABLE` comment, the
//! format produced by the test-instance generator.
use std::collections::HashSet;

use sonata::dimacs::DimacsParser;
use sonata::solver::{SolveResult, Solver};
use sonata::Lit;

macro_rules! test_cnf {
    ($name:ident) => {
        #[test]
        fn $name() {
            let cnf = include_bytes!(concat!("cnfs/", stringify!($name), ".cnf"));

            let mut parser =
                DimacsParser::parse_incremental(&cnf[..], |_| Ok(())).expect("parsing failed");
            let formula = parser.take_formula();
            let expected = parser
                .expected_status()
                .expect("missing expected status comment");

            let mut solver = Solver::new();
            solver.add_formula(&formula);

            match solver.solve() {
                SolveResult::Sat => {
                    assert!(expected, "solver returned SAT on an unsatisfiable instance");
                    let model: HashSet<Lit> = solver.model().unwrap().into_iter().collect();
                    for clause in formula.iter() {
                        assert!(clause.iter().any(|&lit| model.contains(&lit)));
                    }
                }
                SolveResult::Unsat => {
                    assert!(!expected, "solver returned UNSAT on a satisfiable instance");
                }
                SolveResult::Interrupted => panic!("solve interrupted"),
            }
        }
    };
}

test_cnf!(planted_sat_20_85);
test_cnf!(planted_sat_50_210);
test_cnf!(php_4_3);
test_cnf!(php_6_5);
