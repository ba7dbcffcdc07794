/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Arena of formulas that [`Formula::Ref`] nodes point into.
//!
//! Entries are addressed by the stable [`RefId`] assigned when they are pushed and are never removed,
//! so a reference handed out once stays valid for the lifetime of the table. An entry may also carry a
//! name, which lets the [parser](super::parser) resolve `@name` in policy text.

use std::collections::HashMap;

use crate::types::RefId;

use super::formula::Formula;

#[derive(Clone, Debug, Default)]
pub struct RefTable {
    formulas: Vec<Formula>,
    names: HashMap<String, RefId>,
}

impl RefTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `formula` and return a reference node pointing to it.
    pub fn new_ref(&mut self, formula: Formula) -> Formula {
        Formula::Ref(self.push(formula))
    }

    /// Store `formula` and return its id.
    pub fn push(&mut self, formula: Formula) -> RefId {
        let reference = RefId::new(self.formulas.len());
        self.formulas.push(formula);
        reference
    }

    /// Store `formula` under `name`. Returns `None` if the name is already taken, in which case the
    /// table is unchanged.
    pub fn define(&mut self, name: impl Into<String>, formula: Formula) -> Option<RefId> {
        let name = name.into();
        if self.names.contains_key(&name) {
            return None;
        }
        let reference = self.push(formula);
        self.names.insert(name, reference);
        Some(reference)
    }

    pub fn get(&self, reference: RefId) -> Option<&Formula> {
        self.formulas.get(reference.index())
    }

    pub fn lookup(&self, name: &str) -> Option<RefId> {
        self.names.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.formulas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formulas.is_empty()
    }
}
