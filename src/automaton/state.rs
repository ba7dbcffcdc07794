/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! States, transitions and the bookkeeping types used to copy them between automata.
//!
//! States of an automaton live in an arena owned by that automaton and are addressed by [`StateId`].
//! Copying states into another arena yields a [`RenameTable`] from the old ids to the new ones, which
//! is then used to rewrite transitions and state sets, so that a copy never points back into the
//! arena it was copied from.

use std::collections::{btree_set, BTreeSet, HashMap};
use std::fmt::{self, Display, Formatter};

use crate::ltl::{Formula, Valuation};

/// Index of a state in its automaton's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(usize);

impl StateId {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(&self) -> usize {
        self.0
    }
}

impl Display for StateId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// A maximal, consistent subset of the closure of a formula.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementarySet(BTreeSet<Formula>);

impl ElementarySet {
    pub fn new(members: BTreeSet<Formula>) -> Self {
        Self(members)
    }

    pub fn contains(&self, formula: &Formula) -> bool {
        self.0.contains(formula)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_set::Iter<'_, Formula> {
        self.0.iter()
    }
}

impl FromIterator<Formula> for ElementarySet {
    fn from_iter<T: IntoIterator<Item = Formula>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Display for ElementarySet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, formula) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", formula)?;
        }
        f.write_str("}")
    }
}

/// An edge of an automaton. It can be taken when the current trace position satisfies exactly the
/// atomic propositions of `label` (restricted to the automaton's alphabet).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub label: Valuation,
    pub target: StateId,
}

#[derive(Clone, Debug)]
pub struct State {
    pub elementary_set: ElementarySet,

    /// Which copy of the generalized automaton this state belongs to. Always 0 in a [`Gnba`]; the
    /// acceptance-set counter in an [`Nba`] built by degeneralization.
    ///
    /// [`Gnba`]: super::Gnba
    /// [`Nba`]: super::Nba
    pub round: usize,

    pub transitions: Vec<Transition>,
}

impl State {
    pub fn new(elementary_set: ElementarySet) -> Self {
        State {
            elementary_set,
            round: 0,
            transitions: Vec::new(),
        }
    }

    pub fn add_transition(&mut self, label: Valuation, target: StateId) {
        self.transitions.push(Transition { label, target });
    }

    /// A copy of this state placed in `round`. Its transitions still point into the arena of the
    /// original until they are [renamed](Self::rename).
    pub fn copy(&self, round: usize) -> State {
        State {
            elementary_set: self.elementary_set.clone(),
            round,
            transitions: self.transitions.clone(),
        }
    }

    /// Rewrite every transition target through `table`.
    ///
    /// # Panics
    ///
    /// If a target is missing from `table`. Rename tables are built by copying every state of an
    /// arena, so a missing entry is a programming error.
    pub fn rename(&mut self, table: &RenameTable) {
        for transition in &mut self.transitions {
            transition.target = table
                .get(transition.target)
                .expect("Programming error: transition target missing from the rename table.");
        }
    }

    /// Targets of the transitions that can be taken on `label`.
    pub fn successors<'a>(&'a self, label: &'a Valuation) -> impl Iterator<Item = StateId> + 'a {
        self.transitions
            .iter()
            .filter(move |transition| &transition.label == label)
            .map(|transition| transition.target)
    }
}

/// Mapping from the ids of copied states to the ids of their copies.
#[derive(Clone, Debug, Default)]
pub struct RenameTable(HashMap<StateId, StateId>);

impl RenameTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, old: StateId, new: StateId) {
        self.0.insert(old, new);
    }

    pub fn get(&self, old: StateId) -> Option<StateId> {
        self.0.get(&old).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A set of states of one automaton, e.g., its starting states or one of its acceptance sets.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StateSet(BTreeSet<StateId>);

impl StateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, state: StateId) -> bool {
        self.0.insert(state)
    }

    pub fn contains(&self, state: StateId) -> bool {
        self.0.contains(&state)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = StateId> + '_ {
        self.0.iter().copied()
    }

    /// This set with every member replaced by its copy in `table`.
    ///
    /// # Panics
    ///
    /// If a member is missing from `table`.
    pub fn copy(&self, table: &RenameTable) -> StateSet {
        self.iter()
            .map(|state| {
                table
                    .get(state)
                    .expect("Programming error: state set member missing from the rename table.")
            })
            .collect()
    }
}

impl FromIterator<StateId> for StateSet {
    fn from_iter<T: IntoIterator<Item = StateId>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
