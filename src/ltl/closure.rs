/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Subformulae and closure of a formula, the raw material of the
//! [tableau construction](crate::automaton::tableau).

use std::collections::HashSet;

use super::formula::Formula;

/// Every node reachable from `root`, without duplicates. Children are listed before their parents,
/// so `root` itself comes last.
pub fn subformulae(root: &Formula) -> Vec<Formula> {
    let mut seen = HashSet::new();
    let mut acc = Vec::new();
    collect_subformulae(root, &mut seen, &mut acc);
    acc
}

fn collect_subformulae(node: &Formula, seen: &mut HashSet<Formula>, acc: &mut Vec<Formula>) {
    if seen.contains(node) {
        return;
    }
    for child in node.children() {
        collect_subformulae(child, seen, acc);
    }
    seen.insert(node.clone());
    acc.push(node.clone());
}

/// The subformulae of `root` together with their negations. Negation is smart, so the closure of a
/// formula of size n has at most 2n members.
pub fn closure(root: &Formula) -> Vec<Formula> {
    let sub = subformulae(root);
    let mut seen: HashSet<Formula> = sub.iter().cloned().collect();
    let mut acc = sub.clone();
    for formula in sub {
        let negated = Formula::negate(formula);
        if seen.insert(negated.clone()) {
            acc.push(negated);
        }
    }
    acc
}
