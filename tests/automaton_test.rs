/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Tests for the tableau construction, degeneralization, and lasso acceptance. Both automata are
//! checked against a direct evaluation of the formula on every short lasso.

mod common;

use common::lasso_semantics::{all_traces, holds};
use common::logging::setup_logger;
use log::LevelFilter;
use provenance_ltl::automaton::tableau::free_atom_count;
use provenance_ltl::automaton::{BuchiAutomaton, Gnba, Nba, StateId};
use provenance_ltl::ltl::{parse, AtomicProposition, Formula, LtlError, Valuation};
use provenance_ltl::types::RefId;

const FORMULAS: [&str; 14] = [
    "a",
    "!a",
    "a & !b",
    "X a",
    "X X b",
    "a U b",
    "!(a U b)",
    "<> a",
    "[] a",
    "[] <> a",
    "<> [] !a",
    "[] (a -> X b)",
    "(a U b) & (b U a)",
    "a U (b U !a)",
];

fn valuation(names: &[&str]) -> Valuation {
    names
        .iter()
        .map(|name| AtomicProposition::named(*name))
        .collect()
}

#[test]
fn atomic_proposition_holds_initially() {
    let nba = Nba::from_formula(&parse("p").unwrap()).unwrap();

    assert!(nba.accepts(&[valuation(&["p"])]));
    assert!(!nba.accepts(&[valuation(&[])]));
    assert!(!nba.accepts(&[]));
}

#[test]
fn until_obligation_must_be_discharged() {
    let formula = parse("a U b").unwrap();
    let gnba = Gnba::from_formula(&formula).unwrap();
    let nba = Nba::from_gnba(&gnba);

    let discharged = [valuation(&["a"]), valuation(&["a"]), valuation(&["b"])];
    let postponed = [valuation(&["a"]), valuation(&["a"]), valuation(&["a"])];
    for automaton in [&gnba as &dyn BuchiAutomaton, &nba as &dyn BuchiAutomaton] {
        assert!(automaton.accepts(&discharged));
        assert!(!automaton.accepts(&postponed));
    }
}

#[test]
fn degeneralization_preserves_the_language() {
    setup_logger(LevelFilter::Debug);

    let alphabet = valuation(&["a", "b"]);
    let traces = all_traces(&alphabet, 4);
    for text in FORMULAS {
        let formula = parse(text).unwrap();
        let gnba = Gnba::from_formula(&formula).unwrap();
        let nba = Nba::from_gnba(&gnba);

        for trace in &traces {
            let expected = holds(&formula, trace);
            assert_eq!(gnba.accepts(trace), expected, "GNBA of {} on {:?}", text, trace);
            assert_eq!(nba.accepts(trace), expected, "NBA of {} on {:?}", text, trace);
        }
    }
}

#[test]
fn nba_has_one_round_per_until() {
    let gnba = Gnba::from_formula(&parse("(a U b) & <> a").unwrap()).unwrap();
    let nba = Nba::from_gnba(&gnba);

    assert_eq!(gnba.final_states().len(), 2);
    assert_eq!(nba.states().len(), 2 * gnba.states().len());
    assert_eq!(nba.acceptance_sets().len(), 1);
    for state in nba.final_states().iter() {
        assert_eq!(nba.state(state).round, 0);
    }

    let gnba = Gnba::from_formula(&parse("a & X b").unwrap()).unwrap();
    let nba = Nba::from_gnba(&gnba);
    assert!(gnba.final_states().is_empty());
    assert_eq!(nba.states().len(), gnba.states().len());
    assert_eq!(nba.final_states().len(), nba.states().len());
}

#[test]
fn elementary_sets_decide_every_closure_member() {
    let formula = parse("a U X b").unwrap();
    let gnba = Gnba::from_formula(&formula).unwrap();
    let phi = formula.normalize();

    // a U X b is forced once X b holds, and needs a otherwise.
    assert_eq!(free_atom_count(&formula), 4);
    assert_eq!(gnba.states().len(), 10);
    for (index, state) in gnba.states().iter().enumerate() {
        let set = &state.elementary_set;
        assert_eq!(set.len(), 4);
        if set.contains(&Formula::next(Formula::atom(AtomicProposition::named("b")))) {
            assert!(set.contains(&phi));
        }
        assert_eq!(
            gnba.is_starting_state(StateId::new(index)),
            set.contains(&phi)
        );
    }
}

#[test]
fn copies_are_equivalent_and_independent() {
    let formula = parse("[] (a -> <> b)").unwrap();
    let gnba = Gnba::from_formula(&formula).unwrap();
    let nba = Nba::from_gnba(&gnba);

    let gnba_copy = gnba.copy();
    let nba_copy = nba.copy();
    assert_eq!(gnba_copy.to_string(), gnba.to_string());
    assert_eq!(nba_copy.to_string(), nba.to_string());

    let traces = all_traces(&valuation(&["a", "b"]), 3);
    for trace in &traces {
        assert_eq!(gnba_copy.accepts(trace), gnba.accepts(trace));
        assert_eq!(nba_copy.accepts(trace), nba.accepts(trace));
    }

    drop(gnba);
    assert!(gnba_copy.accepts(&[valuation(&["b"])]));
}

#[test]
fn dump_lists_states_then_their_transitions() {
    let gnba = Gnba::from_formula(&parse("p").unwrap()).unwrap();
    let dump = gnba.to_string();
    let lines: Vec<&str> = dump.lines().collect();

    // Two states, each with a transition to both.
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[0], "{!p}");
    assert_eq!(lines[1], "\t{}\t-->\t{!p}");
    assert_eq!(lines[2], "\t{}\t-->\t{p}");
    assert_eq!(lines[3], ">{p}");
    assert_eq!(lines[4], "\t{p}\t-->\t{!p}");
    assert_eq!(lines[5], "\t{p}\t-->\t{p}");

    let nba = Nba::from_gnba(&gnba);
    let dump = nba.to_string();
    assert!(dump.starts_with("{!p}@0*\n"));
    assert!(dump.contains("\n>{p}@0*\n"));

    let gnba = Gnba::from_formula(&parse("a U b").unwrap()).unwrap();
    assert!(gnba
        .to_string()
        .lines()
        .filter(|line| !line.starts_with('\t'))
        .any(|line| line.ends_with("{0}")));
}

#[test]
fn automata_need_resolved_references() {
    let formula = Formula::and(
        Formula::atom(AtomicProposition::named("p")),
        Formula::Ref(RefId::new(0)),
    );
    assert_eq!(
        Gnba::from_formula(&formula).err(),
        Some(LtlError::UnresolvedReference {
            reference: RefId::new(0)
        })
    );
}
