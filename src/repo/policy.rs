/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Formulas compiled for evaluation against provenance traces.

use std::fmt::{self, Display, Formatter};

use crate::automaton::tableau::free_atom_count;
use crate::automaton::{BuchiAutomaton, Nba};
use crate::ltl::{Formula, LtlError, RefTable, Valuation};

use super::RepoError;

/// A formula with its references resolved and, unless it is propositional, its Büchi automaton.
#[derive(Clone, Debug)]
pub struct Policy {
    formula: Formula,
    alphabet: Valuation,
    automaton: Option<Nba>,
}

impl Policy {
    /// Resolve the references of `formula` against `refs` and build its automaton.
    ///
    /// Fails with [`RepoError::FormulaTooLarge`] before building anything if the tableau would need
    /// more than `max_atoms` free decisions.
    pub fn compile(formula: &Formula, refs: &RefTable, max_atoms: usize) -> Result<Policy, RepoError> {
        let formula = formula.compile(refs)?;
        let alphabet = formula.atomic_propositions();
        let automaton = if formula.is_propositional() {
            None
        } else {
            let atoms = free_atom_count(&formula);
            if atoms > max_atoms {
                return Err(RepoError::FormulaTooLarge {
                    atoms,
                    limit: max_atoms,
                });
            }
            Some(Nba::from_formula(&formula)?)
        };

        Ok(Policy {
            formula,
            alphabet,
            automaton,
        })
    }

    pub fn formula(&self) -> &Formula {
        &self.formula
    }

    /// The atomic propositions of the formula. Trace valuations are restricted to these.
    pub fn alphabet(&self) -> &Valuation {
        &self.alphabet
    }

    /// `None` for propositional formulas, which are decided on the first valuation alone.
    pub fn automaton(&self) -> Option<&Nba> {
        self.automaton.as_ref()
    }

    /// Whether the policy binds the node it is attached to and the nodes derived from it.
    pub fn is_self_referential(&self) -> bool {
        self.formula.is_self_referential()
    }

    /// Whether the lasso read from `trace` satisfies the policy.
    pub fn holds_on(&self, trace: &[Valuation]) -> Result<bool, LtlError> {
        match &self.automaton {
            Some(automaton) => Ok(automaton.accepts(trace)),
            None => match trace.first() {
                Some(first) => self.formula.satisfied(first),
                None => Ok(false),
            },
        }
    }
}

impl Display for Policy {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.formula, f)
    }
}
