/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The LTL syntax tree.
//!
//! [`Formula`] is a closed enum. The kernel operators, i.e., those the
//! [tableau construction](crate::automaton::tableau) understands, are `True`, `Atom`, `Not`, `And`,
//! `Next` and `Until`. The remaining operators (`Or`, `Implies`, `Always`, `Eventually`) are derived
//! and are rewritten into the kernel by [`Formula::normalize`]. `Ref` points into a
//! [`RefTable`] and is removed by [`Formula::compile`].

use std::fmt::{self, Display, Formatter};

use crate::types::RefId;

use super::atoms::{AtomicProposition, Valuation};
use super::references::RefTable;

/// A Linear Temporal Logic formula. Equality is structural.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Formula {
    True,
    Atom(AtomicProposition),
    Not(Box<Formula>),
    And(Box<Formula>, Box<Formula>),
    Or(Box<Formula>, Box<Formula>),
    Implies(Box<Formula>, Box<Formula>),
    Next(Box<Formula>),
    Until(Box<Formula>, Box<Formula>),
    Always(Box<Formula>),
    Eventually(Box<Formula>),
    Ref(RefId),
}

impl Formula {
    pub fn atom(ap: AtomicProposition) -> Self {
        Formula::Atom(ap)
    }

    /// Smart negation: negating a negation returns the negated formula instead of wrapping it twice.
    pub fn negate(formula: Formula) -> Self {
        match formula {
            Formula::Not(inner) => *inner,
            other => Formula::Not(Box::new(other)),
        }
    }

    pub fn and(lhs: Formula, rhs: Formula) -> Self {
        Formula::And(Box::new(lhs), Box::new(rhs))
    }

    pub fn or(lhs: Formula, rhs: Formula) -> Self {
        Formula::Or(Box::new(lhs), Box::new(rhs))
    }

    pub fn implies(lhs: Formula, rhs: Formula) -> Self {
        Formula::Implies(Box::new(lhs), Box::new(rhs))
    }

    pub fn next(formula: Formula) -> Self {
        Formula::Next(Box::new(formula))
    }

    pub fn until(lhs: Formula, rhs: Formula) -> Self {
        Formula::Until(Box::new(lhs), Box::new(rhs))
    }

    pub fn always(formula: Formula) -> Self {
        Formula::Always(Box::new(formula))
    }

    pub fn eventually(formula: Formula) -> Self {
        Formula::Eventually(Box::new(formula))
    }

    /// Structural equality, recursing through children.
    pub fn same_as(&self, other: &Formula) -> bool {
        self == other
    }

    /// The children of this node, left to right.
    pub fn children(&self) -> Vec<&Formula> {
        match self {
            Formula::True | Formula::Atom(_) | Formula::Ref(_) => Vec::new(),
            Formula::Not(child)
            | Formula::Next(child)
            | Formula::Always(child)
            | Formula::Eventually(child) => vec![child.as_ref()],
            Formula::And(lhs, rhs)
            | Formula::Or(lhs, rhs)
            | Formula::Implies(lhs, rhs)
            | Formula::Until(lhs, rhs) => vec![lhs.as_ref(), rhs.as_ref()],
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(
            self,
            Formula::And(..) | Formula::Or(..) | Formula::Implies(..) | Formula::Until(..)
        )
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        1 + self.children().iter().map(|child| child.len()).sum::<usize>()
    }

    /// Rewrite the derived operators into the kernel (`True`, `Atom`, `Not`, `And`, `Next`, `Until`).
    ///
    /// The result never contains a double negation, and never contains a negated `Next`: negation is
    /// pushed below `Next`, the only kernel operator it commutes with.
    ///
    /// References are left untouched, so formulas should be [compiled](Self::compile) first.
    pub fn normalize(&self) -> Formula {
        match self {
            Formula::True | Formula::Atom(_) | Formula::Ref(_) => self.clone(),
            Formula::Not(child) => push_negation(child.normalize()),
            Formula::And(lhs, rhs) => Formula::and(lhs.normalize(), rhs.normalize()),
            Formula::Or(lhs, rhs) => push_negation(Formula::and(
                push_negation(lhs.normalize()),
                push_negation(rhs.normalize()),
            )),
            Formula::Implies(lhs, rhs) => push_negation(Formula::and(
                lhs.normalize(),
                push_negation(rhs.normalize()),
            )),
            Formula::Next(child) => Formula::next(child.normalize()),
            Formula::Until(lhs, rhs) => Formula::until(lhs.normalize(), rhs.normalize()),
            Formula::Eventually(child) => Formula::until(Formula::True, child.normalize()),
            Formula::Always(child) => push_negation(Formula::until(
                Formula::True,
                push_negation(child.normalize()),
            )),
        }
    }

    /// Replace every reference by the formula it points to in `table`, recursively.
    pub fn compile(&self, table: &RefTable) -> Result<Formula, LtlError> {
        self.compile_with(table, &mut Vec::new())
    }

    fn compile_with(&self, table: &RefTable, visiting: &mut Vec<RefId>) -> Result<Formula, LtlError> {
        Ok(match self {
            Formula::True | Formula::Atom(_) => self.clone(),
            Formula::Ref(reference) => {
                if visiting.contains(reference) {
                    return Err(LtlError::CyclicReference {
                        reference: *reference,
                    });
                }
                let target = table
                    .get(*reference)
                    .ok_or(LtlError::UnresolvedReference {
                        reference: *reference,
                    })?;
                visiting.push(*reference);
                let compiled = target.compile_with(table, visiting)?;
                visiting.pop();
                compiled
            }
            Formula::Not(child) => Formula::Not(Box::new(child.compile_with(table, visiting)?)),
            Formula::Next(child) => Formula::next(child.compile_with(table, visiting)?),
            Formula::Always(child) => Formula::always(child.compile_with(table, visiting)?),
            Formula::Eventually(child) => Formula::eventually(child.compile_with(table, visiting)?),
            Formula::And(lhs, rhs) => Formula::and(
                lhs.compile_with(table, visiting)?,
                rhs.compile_with(table, visiting)?,
            ),
            Formula::Or(lhs, rhs) => Formula::or(
                lhs.compile_with(table, visiting)?,
                rhs.compile_with(table, visiting)?,
            ),
            Formula::Implies(lhs, rhs) => Formula::implies(
                lhs.compile_with(table, visiting)?,
                rhs.compile_with(table, visiting)?,
            ),
            Formula::Until(lhs, rhs) => Formula::until(
                lhs.compile_with(table, visiting)?,
                rhs.compile_with(table, visiting)?,
            ),
        })
    }

    /// All atomic propositions occurring in the formula. This is the alphabet of its automaton.
    pub fn atomic_propositions(&self) -> Valuation {
        let mut alphabet = Valuation::new();
        self.collect_atomic_propositions(&mut alphabet);
        alphabet
    }

    fn collect_atomic_propositions(&self, acc: &mut Valuation) {
        if let Formula::Atom(ap) = self {
            acc.insert(ap.clone());
        }
        for child in self.children() {
            child.collect_atomic_propositions(acc);
        }
    }

    /// Whether the formula contains no temporal operator and no reference.
    pub fn is_propositional(&self) -> bool {
        match self {
            Formula::True | Formula::Atom(_) => true,
            Formula::Ref(_)
            | Formula::Next(_)
            | Formula::Until(..)
            | Formula::Always(_)
            | Formula::Eventually(_) => false,
            Formula::Not(_) | Formula::And(..) | Formula::Or(..) | Formula::Implies(..) => {
                self.children().iter().all(|child| child.is_propositional())
            }
        }
    }

    /// Whether the formula mentions `self`, i.e., binds the node it is attached to and every node that
    /// depends on it.
    pub fn is_self_referential(&self) -> bool {
        match self {
            Formula::Atom(AtomicProposition::SelfRef) => true,
            _ => self
                .children()
                .iter()
                .any(|child| child.is_self_referential()),
        }
    }

    /// Decide the formula on a single valuation, as in propositional logic.
    pub fn satisfied(&self, valuation: &Valuation) -> Result<bool, LtlError> {
        match self {
            Formula::True => Ok(true),
            Formula::Atom(ap) => Ok(valuation.contains(ap)),
            Formula::Not(child) => Ok(!child.satisfied(valuation)?),
            Formula::And(lhs, rhs) => Ok(lhs.satisfied(valuation)? && rhs.satisfied(valuation)?),
            Formula::Or(lhs, rhs) => Ok(lhs.satisfied(valuation)? || rhs.satisfied(valuation)?),
            Formula::Implies(lhs, rhs) => {
                Ok(!lhs.satisfied(valuation)? || rhs.satisfied(valuation)?)
            }
            Formula::Next(_) | Formula::Until(..) | Formula::Always(_) | Formula::Eventually(_) => {
                Err(LtlError::NotPropositional)
            }
            Formula::Ref(reference) => Err(LtlError::UnresolvedReference {
                reference: *reference,
            }),
        }
    }
}

/// Negate an already normalized formula, keeping it normalized.
fn push_negation(formula: Formula) -> Formula {
    match formula {
        Formula::Not(inner) => *inner,
        Formula::Next(inner) => Formula::next(push_negation(*inner)),
        other => Formula::Not(Box::new(other)),
    }
}

impl Display for Formula {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Formula::True => f.write_str("true"),
            Formula::Atom(ap) => write!(f, "{}", ap),
            Formula::Ref(reference) => write!(f, "@{}", reference.index()),
            Formula::Not(child) => match child.as_ref() {
                Formula::Atom(ap) if ap.is_comparison() => ap.fmt_with_op(f, "!="),
                _ => fmt_unary(f, "!", child),
            },
            Formula::Next(child) => fmt_unary(f, "X ", child),
            Formula::Always(child) => fmt_unary(f, "[] ", child),
            Formula::Eventually(child) => fmt_unary(f, "<> ", child),
            Formula::And(lhs, rhs) => fmt_binary(f, lhs, "&", rhs),
            Formula::Or(lhs, rhs) => fmt_binary(f, lhs, "|", rhs),
            Formula::Implies(lhs, rhs) => fmt_binary(f, lhs, "->", rhs),
            Formula::Until(lhs, rhs) => fmt_binary(f, lhs, "U", rhs),
        }
    }
}

fn fmt_operand(f: &mut Formatter<'_>, operand: &Formula) -> fmt::Result {
    if operand.is_binary() {
        write!(f, "({})", operand)
    } else {
        write!(f, "{}", operand)
    }
}

fn fmt_unary(f: &mut Formatter<'_>, op: &str, child: &Formula) -> fmt::Result {
    f.write_str(op)?;
    fmt_operand(f, child)
}

fn fmt_binary(f: &mut Formatter<'_>, lhs: &Formula, op: &str, rhs: &Formula) -> fmt::Result {
    fmt_operand(f, lhs)?;
    write!(f, " {} ", op)?;
    fmt_operand(f, rhs)
}

/// Errors that may be encountered when compiling or propositionally deciding a [`Formula`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LtlError {
    /// A temporal formula was asked to be decided on a single valuation.
    NotPropositional,

    /// A reference does not point to any formula of the reference table.
    UnresolvedReference { reference: RefId },

    /// A reference (transitively) points to itself.
    CyclicReference { reference: RefId },
}

impl Display for LtlError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LtlError::NotPropositional => f.write_str("not propositional logic"),
            LtlError::UnresolvedReference { reference } => {
                write!(f, "compile error: unresolved reference {}", reference)
            }
            LtlError::CyclicReference { reference } => {
                write!(f, "compile error: reference {} refers to itself", reference)
            }
        }
    }
}

impl std::error::Error for LtlError {}
