/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Acceptance of finite traces read as lassos.
//!
//! A provenance trace is finite, but automata accept infinite words. A trace `v_0 … v_n` is read as
//! the lasso `v_0 … v_{n-1} (v_n)^ω`: its last valuation repeats forever.
//!
//! The prefix is simulated on the set of reachable states. In the loop, only the transitions labeled
//! `v_n` can be taken, so the word is accepted iff, in the graph of those transitions, some state
//! reachable from the states left by the prefix lies in a strongly connected component that contains
//! a cycle and meets every acceptance set. With a single acceptance set, this is the classic "an
//! accepting state recurs" condition; with none, any cycle will do.

use std::collections::{BTreeSet, HashMap, VecDeque};

use crate::ltl::Valuation;

use super::state::StateId;
use super::BuchiAutomaton;

/// Whether `automaton` accepts the lasso whose last valuation is `trace`'s last valuation repeated
/// forever. The empty trace is rejected.
pub fn accepts<A: BuchiAutomaton + ?Sized>(automaton: &A, trace: &[Valuation]) -> bool {
    let Some((last, prefix)) = trace.split_last() else {
        return false;
    };

    let alphabet = automaton.alphabet();
    let mut current: BTreeSet<StateId> = automaton.starting_states().iter().collect();
    for valuation in prefix {
        let letter = valuation.restrict(alphabet);
        current = current
            .iter()
            .flat_map(|state| automaton.state(*state).successors(&letter).collect::<Vec<_>>())
            .collect();
        if current.is_empty() {
            return false;
        }
    }

    let letter = last.restrict(alphabet);
    let mut loop_graph = LoopGraph::new(automaton, &letter);
    let acceptance_sets = automaton.acceptance_sets();

    let reachable = loop_graph.reachable(current.iter().copied());
    reachable.into_iter().any(|state| {
        let component = loop_graph.cyclic_component(state);
        !component.is_empty()
            && acceptance_sets
                .iter()
                .all(|set| component.iter().any(|member| set.contains(*member)))
    })
}

/// The transitions of an automaton that read one fixed letter.
struct LoopGraph {
    successors: HashMap<StateId, Vec<StateId>>,
    forward: HashMap<StateId, BTreeSet<StateId>>,
}

impl LoopGraph {
    fn new<A: BuchiAutomaton + ?Sized>(automaton: &A, letter: &Valuation) -> LoopGraph {
        let successors = automaton
            .states()
            .iter()
            .enumerate()
            .map(|(index, state)| (StateId::new(index), state.successors(letter).collect()))
            .collect();
        LoopGraph {
            successors,
            forward: HashMap::new(),
        }
    }

    /// States reachable from `sources` in zero or more steps.
    fn reachable(&self, sources: impl Iterator<Item = StateId>) -> BTreeSet<StateId> {
        let mut seen = BTreeSet::new();
        let mut queue: VecDeque<StateId> = VecDeque::new();
        for source in sources {
            if seen.insert(source) {
                queue.push_back(source);
            }
        }
        while let Some(state) = queue.pop_front() {
            for next in self.successors.get(&state).into_iter().flatten() {
                if seen.insert(*next) {
                    queue.push_back(*next);
                }
            }
        }
        seen
    }

    /// States reachable from `state` in one or more steps.
    fn strictly_reachable(&mut self, state: StateId) -> BTreeSet<StateId> {
        if let Some(cached) = self.forward.get(&state) {
            return cached.clone();
        }
        let successors = self.successors.get(&state).cloned().unwrap_or_default();
        let forward = self.reachable(successors.into_iter());
        self.forward.insert(state, forward.clone());
        forward
    }

    /// The strongly connected component of `state` if it contains a cycle, else the empty set.
    fn cyclic_component(&mut self, state: StateId) -> BTreeSet<StateId> {
        let forward = self.strictly_reachable(state);
        if !forward.contains(&state) {
            return BTreeSet::new();
        }
        forward
            .into_iter()
            .filter(|other| self.strictly_reachable(*other).contains(&state))
            .collect()
    }
}
