/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Generalized non-deterministic Büchi automata.

use std::fmt::{self, Display, Formatter};

use crate::ltl::{Formula, LtlError, Valuation};

use super::state::{RenameTable, State, StateId, StateSet};
use super::tableau;
use super::BuchiAutomaton;

/// A Büchi automaton with an ordered list of acceptance sets. A run is accepting iff it visits every
/// acceptance set infinitely often.
#[derive(Clone, Debug)]
pub struct Gnba {
    pub(crate) states: Vec<State>,
    pub(crate) starting_states: StateSet,
    pub(crate) final_states: Vec<StateSet>,
    pub(crate) alphabet: Valuation,
}

impl Gnba {
    /// Create an automaton without states over `alphabet`.
    pub fn new(alphabet: Valuation) -> Gnba {
        Gnba {
            states: Vec::new(),
            starting_states: StateSet::new(),
            final_states: Vec::new(),
            alphabet,
        }
    }

    /// Build the automaton accepting exactly the traces that satisfy `formula`, using the
    /// [tableau construction](tableau).
    pub fn from_formula(formula: &Formula) -> Result<Gnba, LtlError> {
        tableau::build(formula)
    }

    pub fn add_state(&mut self, state: State) -> StateId {
        let id = StateId::new(self.states.len());
        self.states.push(state);
        id
    }

    pub fn state(&self, id: StateId) -> &State {
        &self.states[id.index()]
    }

    pub fn state_mut(&mut self, id: StateId) -> &mut State {
        &mut self.states[id.index()]
    }

    pub fn final_states(&self) -> &[StateSet] {
        &self.final_states
    }

    pub fn is_starting_state(&self, state: StateId) -> bool {
        self.starting_states.contains(state)
    }

    /// Indices of every acceptance set `state` belongs to.
    pub fn acceptance_indices(&self, state: StateId) -> Vec<usize> {
        self.final_states
            .iter()
            .enumerate()
            .filter(|(_, set)| set.contains(state))
            .map(|(i, _)| i)
            .collect()
    }

    /// Append a copy of every state to `target` in `round`, returning the mapping from this
    /// automaton's ids to the ids of the copies in `target`.
    ///
    /// The transitions of the copies are left pointing at this automaton's ids; callers
    /// [rename](State::rename) them with the returned table, or with the table of another round.
    pub(crate) fn copy_states_into(&self, target: &mut Vec<State>, round: usize) -> RenameTable {
        let mut table = RenameTable::new();
        for (index, state) in self.states.iter().enumerate() {
            table.insert(StateId::new(index), StateId::new(target.len()));
            target.push(state.copy(round));
        }
        table
    }

    /// A structurally identical automaton that shares no state with this one.
    pub fn copy(&self) -> Gnba {
        let mut states = Vec::with_capacity(self.states.len());
        let table = self.copy_states_into(&mut states, 0);
        for state in &mut states {
            state.rename(&table);
        }

        Gnba {
            states,
            starting_states: self.starting_states.copy(&table),
            final_states: self
                .final_states
                .iter()
                .map(|set| set.copy(&table))
                .collect(),
            alphabet: self.alphabet.clone(),
        }
    }
}

impl BuchiAutomaton for Gnba {
    fn states(&self) -> &[State] {
        &self.states
    }

    fn starting_states(&self) -> &StateSet {
        &self.starting_states
    }

    fn acceptance_sets(&self) -> Vec<&StateSet> {
        self.final_states.iter().collect()
    }

    fn alphabet(&self) -> &Valuation {
        &self.alphabet
    }
}

impl Display for Gnba {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (index, state) in self.states.iter().enumerate() {
            let id = StateId::new(index);
            let prefix = if self.is_starting_state(id) { ">" } else { "" };
            let indices = self.acceptance_indices(id);
            let suffix = if indices.is_empty() {
                String::new()
            } else {
                let indices: Vec<String> = indices.iter().map(|i| i.to_string()).collect();
                format!("{{{}}}", indices.join(","))
            };

            writeln!(f, "{}{}{}", prefix, state.elementary_set, suffix)?;
            for transition in &state.transitions {
                writeln!(
                    f,
                    "\t{}\t-->\t{}",
                    transition.label,
                    self.state(transition.target).elementary_set
                )?;
            }
        }
        Ok(())
    }
}
