//! Strategies for generating test formulas.
use proptest::prelude::*;

use rand::distributions::Bernoulli;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::cnf::CnfFormula;
use crate::lit::{Lit, Var};

/// Generate small hard unsat instances.
///
/// Sgen-style instances (http://www.cs.qub.ac.uk/~i.spence/sgen/), but with random partitions
/// instead of the original deterministic ones.
pub fn sgen_unsat_formula(
    blocks: impl Strategy<Value = usize>,
) -> impl Strategy<Value = CnfFormula> {
    blocks.prop_flat_map(|blocks| {
        proptest::collection::vec(proptest::bool::ANY, blocks * 4 + 1).prop_perturb(
            |negate, mut rng| {
                let mut clauses: Vec<Vec<Lit>> = vec![];
                let mut lits = negate
                    .into_iter()
                    .enumerate()
                    .map(|(index, negate)| Lit::from_index(index, negate))
                    .collect::<Vec<_>>();

                for &invert in [false, true].iter() {
                    lits.shuffle(&mut rng);

                    // Requiring a literal of each pair limits every block to a single
                    // unsatisfied literal. Doing this for both polarities over two random
                    // partitions of 4n + 1 literals is contradictory by counting.
                    let mut cover_pairs = |block: &[Lit]| {
                        for a in 0..block.len() {
                            for b in 0..a {
                                let mut clause = vec![block[a] ^ invert, block[b] ^ invert];
                                clause.shuffle(&mut rng);
                                clauses.push(clause);
                            }
                        }
                    };

                    for block in lits.chunks_exact(4) {
                        cover_pairs(block);
                    }

                    // chunks_exact leaves exactly one literal over, tie it to the first block
                    let last_block = [*lits.last().unwrap(), lits[0], lits[1], lits[2], lits[3]];
                    cover_pairs(&last_block[..]);
                }

                clauses.shuffle(&mut rng);
                CnfFormula::from(clauses)
            },
        )
    })
}

/// Generate a satisfiable instance.
///
/// Fixes a random full assignment up front and only generates clauses compatible with it.
pub fn sat_formula(
    vars: impl Strategy<Value = usize>,
    clause_count: impl Strategy<Value = usize>,
    density: impl Strategy<Value = f64>,
    polarity_dist: impl Strategy<Value = f64>,
) -> impl Strategy<Value = CnfFormula> {
    (vars, clause_count, density, polarity_dist).prop_flat_map(
        |(vars, clause_count, density, polarity_dist)| {
            let density = Bernoulli::new(density).unwrap();
            let polarity_dist = Bernoulli::new(polarity_dist).unwrap();

            proptest::collection::vec(proptest::bool::ANY, vars).prop_perturb(
                move |negate, mut rng| {
                    let mut clauses: Vec<Vec<Lit>> = vec![];
                    let lits = negate
                        .into_iter()
                        .enumerate()
                        .map(|(index, negate)| Lit::from_index(index, negate))
                        .collect::<Vec<_>>();

                    for _ in 0..clause_count {
                        let &fixed_lit = lits.choose(&mut rng).unwrap();
                        let mut clause = vec![fixed_lit];
                        for &lit in lits.iter() {
                            if lit != fixed_lit && rng.sample(density) {
                                clause.push(lit ^ rng.sample(polarity_dist));
                            }
                        }
                        clause.shuffle(&mut rng);
                        clauses.push(clause);
                    }

                    clauses.shuffle(&mut rng);
                    CnfFormula::from(clauses)
                },
            )
        },
    )
}

/// Generate a pigeonhole principle instance for `holes + 1` pigeons.
///
/// Unsatisfiable for every `holes >= 1`. Variable `p * holes + h` is pigeon `p` sitting in hole
/// `h`.
pub fn pigeon_hole_formula(holes: usize) -> CnfFormula {
    let pigeons = holes + 1;
    let var = |pigeon: usize, hole: usize| Var::from_index(pigeon * holes + hole);

    let mut formula = CnfFormula::new();

    for pigeon in 0..pigeons {
        let clause: Vec<Lit> = (0..holes).map(|hole| var(pigeon, hole).positive()).collect();
        formula.add_clause(clause);
    }

    for hole in 0..holes {
        for pigeon_a in 0..pigeons {
            for pigeon_b in 0..pigeon_a {
                formula.add_clause(
                    [var(pigeon_a, hole).negative(), var(pigeon_b, hole).negative()].iter(),
                );
            }
        }
    }

    formula
}
