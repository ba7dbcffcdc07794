//! Direct evaluation of LTL on a lasso, used as ground truth for the automata.
//!
//! The lasso `v_0 … v_n (v_n)^ω` has only `n + 1` distinct suffixes, since every position past `n` looks
//! like `n`. So each formula can be decided position by position without unrolling anything.

use provenance_ltl::ltl::{Formula, Valuation};

pub(crate) fn holds(formula: &Formula, trace: &[Valuation]) -> bool {
    assert!(!trace.is_empty(), "a lasso needs at least one position");
    holds_at(formula, trace, 0)
}

fn holds_at(formula: &Formula, trace: &[Valuation], position: usize) -> bool {
    let last = trace.len() - 1;
    let position = position.min(last);
    match formula {
        Formula::True => true,
        Formula::Atom(ap) => trace[position].contains(ap),
        Formula::Not(child) => !holds_at(child, trace, position),
        Formula::And(lhs, rhs) => holds_at(lhs, trace, position) && holds_at(rhs, trace, position),
        Formula::Or(lhs, rhs) => holds_at(lhs, trace, position) || holds_at(rhs, trace, position),
        Formula::Implies(lhs, rhs) => {
            !holds_at(lhs, trace, position) || holds_at(rhs, trace, position)
        }
        Formula::Next(child) => holds_at(child, trace, position + 1),
        Formula::Until(lhs, rhs) => {
            for j in position..=last {
                if holds_at(rhs, trace, j) {
                    return true;
                }
                if !holds_at(lhs, trace, j) {
                    return false;
                }
            }
            false
        }
        Formula::Always(child) => (position..=last).all(|j| holds_at(child, trace, j)),
        Formula::Eventually(child) => (position..=last).any(|j| holds_at(child, trace, j)),
        Formula::Ref(reference) => panic!("unresolved reference {}", reference),
    }
}

/// Every trace of length `1..=max_len` over the subsets of `alphabet`.
pub(crate) fn all_traces(alphabet: &Valuation, max_len: usize) -> Vec<Vec<Valuation>> {
    let propositions: Vec<_> = alphabet.iter().cloned().collect();
    let letters: Vec<Valuation> = (0..1usize << propositions.len())
        .map(|mask| {
            propositions
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, ap)| ap.clone())
                .collect()
        })
        .collect();

    let mut traces: Vec<Vec<Valuation>> = Vec::new();
    let mut frontier: Vec<Vec<Valuation>> = vec![Vec::new()];
    for _ in 0..max_len {
        let mut next = Vec::new();
        for prefix in &frontier {
            for letter in &letters {
                let mut trace = prefix.clone();
                trace.push(letter.clone());
                next.push(trace);
            }
        }
        traces.extend(next.iter().cloned());
        frontier = next;
    }
    traces
}
