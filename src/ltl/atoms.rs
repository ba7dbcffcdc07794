/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Atomic propositions and the valuations that assign truth to them at a single trace position.

use std::collections::{btree_set, BTreeSet};
use std::fmt::{self, Display, Formatter};

use crate::types::Identity;

use super::parser::write_escaped;

/// A named predicate over a single node of a provenance trace.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AtomicProposition {
    /// `author = user('Name')`: the node was stored by `Name`.
    Author(Identity),

    /// `subject() = user('Name')`: the identity performing the check is `Name`.
    Subject(Identity),

    /// `self`: the node is the owner of the policy being checked, or depends on it.
    SelfRef,

    /// A bare label, e.g., `p`: the node carries the label.
    Named(String),
}

impl AtomicProposition {
    pub fn author(name: impl Into<String>) -> Self {
        AtomicProposition::Author(Identity::new(name))
    }

    pub fn subject(name: impl Into<String>) -> Self {
        AtomicProposition::Subject(Identity::new(name))
    }

    pub fn named(name: impl Into<String>) -> Self {
        AtomicProposition::Named(name.into())
    }

    /// Render the proposition with its comparison operator replaced by `op` (`=` or `!=`). Used to
    /// print negated identity predicates in their natural form.
    pub(crate) fn fmt_with_op(&self, f: &mut Formatter<'_>, op: &str) -> fmt::Result {
        match self {
            AtomicProposition::Author(identity) => {
                write!(f, "author {} user('", op)?;
                write_escaped(f, identity.name())?;
                f.write_str("')")
            }
            AtomicProposition::Subject(identity) => {
                write!(f, "subject() {} user('", op)?;
                write_escaped(f, identity.name())?;
                f.write_str("')")
            }
            AtomicProposition::SelfRef => f.write_str("self"),
            AtomicProposition::Named(name) => f.write_str(name),
        }
    }

    /// Whether the proposition is a comparison that has a `!=` spelling.
    pub(crate) fn is_comparison(&self) -> bool {
        matches!(
            self,
            AtomicProposition::Author(_) | AtomicProposition::Subject(_)
        )
    }
}

impl Display for AtomicProposition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.fmt_with_op(f, "=")
    }
}

/// The set of atomic propositions that hold at one position of a trace. Every proposition not in the
/// set is false at that position.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Valuation(BTreeSet<AtomicProposition>);

impl Valuation {
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    pub fn insert(&mut self, ap: AtomicProposition) -> bool {
        self.0.insert(ap)
    }

    pub fn contains(&self, ap: &AtomicProposition) -> bool {
        self.0.contains(ap)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_set::Iter<'_, AtomicProposition> {
        self.0.iter()
    }

    /// The propositions of this valuation that also belong to `alphabet`.
    pub fn restrict(&self, alphabet: &Valuation) -> Valuation {
        Valuation(self.0.intersection(&alphabet.0).cloned().collect())
    }
}

impl FromIterator<AtomicProposition> for Valuation {
    fn from_iter<T: IntoIterator<Item = AtomicProposition>>(iter: T) -> Self {
        Valuation(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Valuation {
    type Item = &'a AtomicProposition;
    type IntoIter = btree_set::Iter<'a, AtomicProposition>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Display for Valuation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, ap) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", ap)?;
        }
        f.write_str("}")
    }
}
