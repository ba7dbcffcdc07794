/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Non-deterministic Büchi automata and degeneralization.
//!
//! ## Degeneralization
//!
//! A [`Gnba`] with acceptance sets `F_0, …, F_{k-1}` is turned into an [`Nba`] made of `k` copies
//! ("rounds") of its states. A run in round `i` waits for a visit to `F_i`: a transition leaving a
//! state of `F_i` moves to round `(i + 1) mod k`, every other transition stays in round `i`. The run
//! starts in round 0, and the final states are the round-0 copies of `F_0`. Reaching them infinitely
//! often means completing the round robin through all `k` sets infinitely often.
//!
//! A GNBA without acceptance sets accepts every infinite run, so its NBA is a plain copy whose final
//! set contains every state.

use std::fmt::{self, Display, Formatter};

use crate::ltl::{Formula, LtlError, Valuation};

use super::gnba::Gnba;
use super::state::{RenameTable, State, StateId, StateSet};
use super::BuchiAutomaton;

/// A Büchi automaton with a single acceptance set. A run is accepting iff it visits a final state
/// infinitely often.
#[derive(Clone, Debug)]
pub struct Nba {
    states: Vec<State>,
    starting_states: StateSet,
    final_states: StateSet,
    alphabet: Valuation,
}

impl Nba {
    /// Build the NBA accepting exactly the traces that satisfy `formula`.
    pub fn from_formula(formula: &Formula) -> Result<Nba, LtlError> {
        Ok(Nba::from_gnba(&Gnba::from_formula(formula)?))
    }

    /// Degeneralize `gnba` into an NBA accepting the same language.
    pub fn from_gnba(gnba: &Gnba) -> Nba {
        let rounds = gnba.final_states().len();

        if rounds == 0 {
            let copy = gnba.copy();
            let final_states = (0..copy.states.len()).map(StateId::new).collect();
            return Nba {
                states: copy.states,
                starting_states: copy.starting_states,
                final_states,
                alphabet: copy.alphabet,
            };
        }

        let mut states = Vec::with_capacity(gnba.states().len() * rounds);
        let tables: Vec<RenameTable> = (0..rounds)
            .map(|round| gnba.copy_states_into(&mut states, round))
            .collect();

        for (round, table) in tables.iter().enumerate() {
            for index in 0..gnba.states().len() {
                let original = StateId::new(index);
                let next_round = if gnba.final_states()[round].contains(original) {
                    (round + 1) % rounds
                } else {
                    round
                };
                let copy = table
                    .get(original)
                    .expect("Programming error: every state is copied into every round.");
                states[copy.index()].rename(&tables[next_round]);
            }
        }

        let nba = Nba {
            states,
            starting_states: gnba.starting_states().copy(&tables[0]),
            final_states: gnba.final_states()[0].copy(&tables[0]),
            alphabet: gnba.alphabet().clone(),
        };

        log::debug!(
            "Degeneralized GNBA with {} states and {} acceptance sets into NBA with {} states",
            gnba.states().len(),
            rounds,
            nba.states.len()
        );

        nba
    }

    pub fn state(&self, id: StateId) -> &State {
        &self.states[id.index()]
    }

    pub fn final_states(&self) -> &StateSet {
        &self.final_states
    }

    pub fn is_starting_state(&self, state: StateId) -> bool {
        self.starting_states.contains(state)
    }

    pub fn is_acceptance_state(&self, state: StateId) -> bool {
        self.final_states.contains(state)
    }

    /// A structurally identical automaton that shares no state with this one.
    pub fn copy(&self) -> Nba {
        let mut table = RenameTable::new();
        let mut states = Vec::with_capacity(self.states.len());
        for (index, state) in self.states.iter().enumerate() {
            table.insert(StateId::new(index), StateId::new(states.len()));
            states.push(state.copy(state.round));
        }
        for state in &mut states {
            state.rename(&table);
        }

        Nba {
            states,
            starting_states: self.starting_states.copy(&table),
            final_states: self.final_states.copy(&table),
            alphabet: self.alphabet.clone(),
        }
    }
}

impl BuchiAutomaton for Nba {
    fn states(&self) -> &[State] {
        &self.states
    }

    fn starting_states(&self) -> &StateSet {
        &self.starting_states
    }

    fn acceptance_sets(&self) -> Vec<&StateSet> {
        vec![&self.final_states]
    }

    fn alphabet(&self) -> &Valuation {
        &self.alphabet
    }
}

impl Display for Nba {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (index, state) in self.states.iter().enumerate() {
            let id = StateId::new(index);
            let prefix = if self.is_starting_state(id) { ">" } else { "" };
            let suffix = if self.is_acceptance_state(id) { "*" } else { "" };

            writeln!(
                f,
                "{}{}@{}{}",
                prefix, state.elementary_set, state.round, suffix
            )?;
            for transition in &state.transitions {
                let target = self.state(transition.target);
                writeln!(
                    f,
                    "\t{}\t-->\t{}@{}",
                    transition.label, target.elementary_set, target.round
                )?;
            }
        }
        Ok(())
    }
}
