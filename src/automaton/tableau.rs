/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Tableau construction of a [`Gnba`] from an LTL formula.
//!
//! ## States
//!
//! Every state is an *elementary set* of the closure of the normalized formula φ: for each member ψ
//! of the closure it contains exactly one of ψ and ¬ψ, and it is
//! - propositionally consistent: it contains `true` (if `true` is in the closure), and contains
//!   `ψ & χ` iff it contains both `ψ` and `χ`;
//! - locally consistent with respect to until: if it contains `χ` it contains `ψ U χ`, and if it
//!   contains `ψ U χ` but not `χ` it contains `ψ`.
//!
//! Elementary sets are enumerated by deciding the non-negated subformulae of φ children first.
//! `true` and conjunctions are determined by what was decided before them; atomic propositions and
//! `X ψ` are free; `ψ U χ` is free within the local consistency rules above.
//!
//! ## Transitions
//!
//! `B --(B ∩ AP)--> B'` iff, for every `X ψ` in the closure, `X ψ ∈ B ⇔ ψ ∈ B'`, and for every
//! `ψ U χ` in the closure, `ψ U χ ∈ B ⇔ χ ∈ B ∨ (ψ ∈ B ∧ ψ U χ ∈ B')`.
//!
//! ## Acceptance
//!
//! The starting states are the sets containing φ. For every `ψ U χ` in the closure there is one
//! acceptance set made of the states that either do not contain `ψ U χ` or contain `χ`. Requiring
//! every such set to be visited infinitely often forbids runs that postpone `χ` forever.

use std::collections::HashMap;

use crate::ltl::{closure, subformulae, Formula, LtlError, Valuation};
use crate::types::RefId;

use super::gnba::Gnba;
use super::state::{ElementarySet, State, StateId, StateSet};

/// Build the GNBA of `formula`. The formula is normalized first; it must not contain references.
pub fn build(formula: &Formula) -> Result<Gnba, LtlError> {
    let phi = formula.normalize();
    if let Some(reference) = find_reference(&phi) {
        return Err(LtlError::UnresolvedReference { reference });
    }

    let closure = closure(&phi);
    let kernel = Kernel::new(&phi);
    let assignments = kernel.elementary_assignments();
    let alphabet = phi.atomic_propositions();

    let mut gnba = Gnba::new(alphabet.clone());
    let mut labels = Vec::with_capacity(assignments.len());
    for assignment in &assignments {
        let elementary_set: ElementarySet = closure
            .iter()
            .filter(|member| kernel.holds(member, assignment))
            .cloned()
            .collect();
        let id = gnba.add_state(State::new(elementary_set));
        if kernel.holds(&phi, assignment) {
            gnba.starting_states.add(id);
        }

        let label: Valuation = alphabet
            .iter()
            .filter(|ap| kernel.holds(&Formula::Atom((*ap).clone()), assignment))
            .cloned()
            .collect();
        labels.push(label);
    }

    for (source, from) in assignments.iter().enumerate() {
        for (target, to) in assignments.iter().enumerate() {
            if kernel.is_successor(from, to) {
                gnba.state_mut(StateId::new(source))
                    .add_transition(labels[source].clone(), StateId::new(target));
            }
        }
    }

    for until in kernel.untils() {
        let Formula::Until(_, rhs) = until else {
            unreachable!("Kernel::untils only yields until formulas");
        };
        let acceptance_set: StateSet = assignments
            .iter()
            .enumerate()
            .filter(|(_, assignment)| {
                !kernel.holds(until, assignment) || kernel.holds(rhs, assignment)
            })
            .map(|(index, _)| StateId::new(index))
            .collect();
        gnba.final_states.push(acceptance_set);
    }

    log::debug!(
        "Built GNBA for {}: {} states, {} acceptance sets",
        phi,
        gnba.states.len(),
        gnba.final_states.len()
    );

    Ok(gnba)
}

/// Number of free decisions the tableau makes per elementary set, i.e., the number of distinct atomic
/// propositions, `X` and `U` subformulae of the normalized formula. The automaton has at most 2^n
/// states for n free decisions.
pub fn free_atom_count(formula: &Formula) -> usize {
    subformulae(&formula.normalize())
        .iter()
        .filter(|f| matches!(f, Formula::Atom(_) | Formula::Next(_) | Formula::Until(..)))
        .count()
}

fn find_reference(formula: &Formula) -> Option<RefId> {
    if let Formula::Ref(reference) = formula {
        return Some(*reference);
    }
    formula.children().into_iter().find_map(find_reference)
}

/// The non-negated subformulae of a normalized formula, children first, with an index for looking
/// up their position in an assignment.
struct Kernel {
    members: Vec<Formula>,
    index: HashMap<Formula, usize>,
}

impl Kernel {
    fn new(phi: &Formula) -> Kernel {
        let members: Vec<Formula> = subformulae(phi)
            .into_iter()
            .filter(|f| !matches!(f, Formula::Not(_)))
            .collect();
        let index = members
            .iter()
            .enumerate()
            .map(|(i, f)| (f.clone(), i))
            .collect();
        Kernel { members, index }
    }

    /// Truth of a closure member under a (possibly partial) assignment of kernel members.
    ///
    /// # Panics
    ///
    /// If `formula` is not in the closure, or is decided after the prefix `assignment` covers.
    fn holds(&self, formula: &Formula, assignment: &[bool]) -> bool {
        match formula {
            Formula::Not(inner) => !self.holds(inner, assignment),
            other => assignment[self.index[other]],
        }
    }

    fn untils(&self) -> impl Iterator<Item = &Formula> {
        self.members
            .iter()
            .filter(|f| matches!(f, Formula::Until(..)))
    }

    /// Every assignment of the kernel members that corresponds to an elementary set.
    fn elementary_assignments(&self) -> Vec<Vec<bool>> {
        let mut out = Vec::new();
        self.enumerate(&mut Vec::with_capacity(self.members.len()), &mut out);
        out
    }

    fn enumerate(&self, assignment: &mut Vec<bool>, out: &mut Vec<Vec<bool>>) {
        let Some(member) = self.members.get(assignment.len()) else {
            out.push(assignment.clone());
            return;
        };

        let candidates: Vec<bool> = match member {
            Formula::True => vec![true],
            Formula::And(lhs, rhs) => {
                vec![self.holds(lhs, assignment) && self.holds(rhs, assignment)]
            }
            Formula::Atom(_) | Formula::Next(_) => vec![false, true],
            Formula::Until(lhs, rhs) => {
                let lhs = self.holds(lhs, assignment);
                let rhs = self.holds(rhs, assignment);
                if rhs {
                    vec![true]
                } else if lhs {
                    vec![false, true]
                } else {
                    vec![false]
                }
            }
            other => unreachable!("normalized formulas have no kernel member like {}", other),
        };

        for value in candidates {
            assignment.push(value);
            self.enumerate(assignment, out);
            assignment.pop();
        }
    }

    /// Whether the tableau has a transition from the state of `from` to the state of `to`.
    fn is_successor(&self, from: &[bool], to: &[bool]) -> bool {
        self.members.iter().all(|member| match member {
            Formula::Next(inner) => self.holds(member, from) == self.holds(inner, to),
            Formula::Until(lhs, rhs) => {
                self.holds(member, from)
                    == (self.holds(rhs, from)
                        || (self.holds(lhs, from) && self.holds(member, to)))
            }
            _ => true,
        })
    }
}
