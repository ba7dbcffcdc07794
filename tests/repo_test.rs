/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Tests for policy enforcement in the repository. Most of them run on the [exam
//! repository](common::exam), where Charlie combines two answers of Alice, one derived from Mallory's
//! material and one from Bob's.

mod common;

use std::sync::{Arc, Mutex};

use common::exam::{alice, bob, charlie, exam_repo, exam_repo_with, mallory, state_over};
use common::logging::setup_logger;
use log::LevelFilter;
use provenance_ltl::config::{Configuration, TraceSelection};
use provenance_ltl::ltl::{Formula, LtlError, ParseError};
use provenance_ltl::repo::state::State;
use provenance_ltl::repo::{Repo, RepoError};
use provenance_ltl::types::{Identity, NodeId, RefId};

const ALICE_BEFORE_MALLORY: &str = "author != user('Mallory') U author = user('Alice')";

#[test]
fn confidential_node_binds_everything_derived_from_it() {
    setup_logger(LevelFilter::Trace);

    let mut repo = Repo::with_configuration(Configuration::builder().log_events(true).build());
    let r1 = repo.put(&mallory(), State::new()).unwrap();
    let mut confidential = State::new();
    confidential
        .add_policy_string("self -> subject() = user('Alice')")
        .unwrap();
    let r2 = repo.put(&alice(), confidential).unwrap();

    // Anyone may build on r1.
    assert!(repo.put(&bob(), state_over(&[r1])).is_ok());
    assert!(repo.put(&mallory(), state_over(&[r1])).is_ok());

    // Only Alice may build on r2, directly or not.
    let stored = repo.len();
    match repo.put(&bob(), state_over(&[r2])) {
        Err(RepoError::PolicyViolation {
            owner,
            policy,
            subject,
        }) => {
            assert_eq!(owner, r2);
            assert_eq!(policy, "self -> subject() = user('Alice')");
            assert_eq!(subject, bob());
        }
        other => panic!("expected a policy violation, got {:?}", other),
    }
    assert!(matches!(
        repo.put(&bob(), state_over(&[r1, r2])),
        Err(RepoError::PolicyViolation { .. })
    ));
    assert_eq!(repo.len(), stored);

    let r3 = repo.put(&alice(), state_over(&[r2])).unwrap();
    assert!(matches!(
        repo.put(&charlie(), state_over(&[r3])),
        Err(RepoError::PolicyViolation { owner, .. }) if owner == r2
    ));
    assert!(repo.put(&alice(), state_over(&[r3])).is_ok());
}

#[test]
fn until_holds_on_every_chain_of_the_exam() {
    let exam = exam_repo();

    assert_eq!(
        exam.repo
            .query_string(&charlie(), &exam.r5, ALICE_BEFORE_MALLORY)
            .unwrap(),
        true
    );
    assert!(exam
        .repo
        .query_string(&charlie(), &exam.r3, ALICE_BEFORE_MALLORY)
        .unwrap());
    assert!(!exam
        .repo
        .query_string(&charlie(), &exam.r1, ALICE_BEFORE_MALLORY)
        .unwrap());
}

#[test]
fn until_fails_when_mallory_comes_first() {
    let mut exam = exam_repo();
    let shortcut = exam
        .repo
        .put(&charlie(), state_over(&[exam.r1]))
        .unwrap();
    assert!(!exam
        .repo
        .query_string(&charlie(), &shortcut, ALICE_BEFORE_MALLORY)
        .unwrap());

    // One bad chain is enough.
    let combined = exam
        .repo
        .put(&charlie(), state_over(&[exam.r5, exam.r1]))
        .unwrap();
    assert!(!exam
        .repo
        .query_string(&charlie(), &combined, ALICE_BEFORE_MALLORY)
        .unwrap());
}

#[test]
fn trace_selection_picks_the_checked_chains() {
    let mallory_eventually = "<> author = user('Mallory')";

    let exam = exam_repo();
    assert!(!exam
        .repo
        .query_string(&charlie(), &exam.r5, mallory_eventually)
        .unwrap());

    let exam = exam_repo_with(
        Configuration::builder()
            .trace_selection(TraceSelection::FirstChain)
            .build(),
    );
    assert!(exam
        .repo
        .query_string(&charlie(), &exam.r5, mallory_eventually)
        .unwrap());
}

#[test]
fn temporal_policy_is_checked_on_put() {
    let mut repo = Repo::new();
    let mut guarded = State::new();
    guarded
        .add_policy_string("self -> (author != user('Mallory') U author = user('Bob'))")
        .unwrap();
    let r1 = repo.put(&bob(), guarded).unwrap();

    assert!(matches!(
        repo.put(&mallory(), state_over(&[r1])),
        Err(RepoError::PolicyViolation { .. })
    ));
    let r2 = repo.put(&alice(), state_over(&[r1])).unwrap();
    assert!(matches!(
        repo.put(&mallory(), state_over(&[r2])),
        Err(RepoError::PolicyViolation { .. })
    ));
    assert!(repo.put(&charlie(), state_over(&[r2])).is_ok());
}

#[test]
fn self_holds_from_the_owner_onwards() {
    let exam = exam_repo();

    assert!(exam.repo.query_string(&alice(), &exam.r3, "self").unwrap());
    assert!(!exam.repo.query_string(&alice(), &exam.r3, "X self").unwrap());
    assert!(exam
        .repo
        .query_string(&alice(), &exam.r5, "[] (author = user('Bob') -> !self)")
        .unwrap());
}

#[test]
fn labels_hold_at_the_nodes_that_carry_them() {
    let mut exam = exam_repo();
    let mut reviewed = state_over(&[exam.r3]);
    reviewed.add_label("reviewed").unwrap();
    reviewed.add_label("reviewed").unwrap();
    let r6 = exam.repo.put(&bob(), reviewed).unwrap();
    let r7 = exam.repo.put(&alice(), state_over(&[r6])).unwrap();

    assert_eq!(exam.repo.state(&r6).unwrap().labels(), &["reviewed".to_string()]);
    assert!(exam.repo.query_string(&bob(), &r6, "reviewed").unwrap());
    assert!(!exam.repo.query_string(&bob(), &r7, "reviewed").unwrap());
    assert!(exam.repo.query_string(&bob(), &r7, "X reviewed").unwrap());
    assert!(!exam.repo.query_string(&bob(), &exam.r5, "<> reviewed").unwrap());
}

#[test]
fn labels_must_be_readable_from_policy_text() {
    let mut state = State::new();
    for label in ["X", "U", "self", "true", "subject", "", "has space", "it's"] {
        assert_eq!(
            state.add_label(label),
            Err(ParseError::InvalidLabel {
                label: label.to_string()
            })
        );
    }
    state.add_label("x_1").unwrap();
    assert_eq!(state.labels(), &["x_1".to_string()]);
}

#[test]
fn quoted_names_survive_storage_and_queries() {
    let obrien = Identity::new("O'Brien");
    let mut repo = Repo::new();
    let mut guarded = State::new();
    guarded
        .add_policy_string(r"self -> subject() = user('O\'Brien')")
        .unwrap();
    let r1 = repo.put(&obrien, guarded).unwrap();

    let stored = repo.state(&r1).unwrap();
    assert_eq!(
        stored.policies()[0].to_string(),
        r"self -> subject() = user('O\'Brien')"
    );
    assert!(repo.put(&obrien, state_over(&[r1])).is_ok());
    assert!(matches!(
        repo.put(&bob(), state_over(&[r1])),
        Err(RepoError::PolicyViolation { .. })
    ));
    assert!(repo
        .query_string(&bob(), &r1, r"author = user('O\'Brien')")
        .unwrap());
}

#[test]
fn reads_are_guarded_by_the_node_policies() {
    let mut exam = exam_repo();
    let mut confidential = state_over(&[exam.r4]);
    confidential
        .add_policy_string("subject() = user('Alice') | subject() = user('Bob')")
        .unwrap();
    let secret = exam.repo.put(&alice(), confidential).unwrap();

    let stored = exam.repo.get(&bob(), &secret).unwrap();
    assert_eq!(stored.author(), &alice());
    assert_eq!(stored.dependencies(), &[exam.r4]);
    assert_eq!(stored.policies().len(), 1);
    assert!(matches!(
        exam.repo.get(&mallory(), &secret),
        Err(RepoError::PolicyViolation { owner, .. }) if owner == secret
    ));

    assert!(exam.repo.get(&mallory(), &exam.r5).is_ok());
    assert!(matches!(
        exam.repo.get(&mallory(), &NodeId::new([0; 32])),
        Err(RepoError::UnknownNode { .. })
    ));
}

#[test]
fn put_rejects_unknown_dependencies_and_broken_policies() {
    let mut repo = Repo::new();
    let missing = NodeId::new([7; 32]);
    assert!(matches!(
        repo.put(&alice(), state_over(&[missing])),
        Err(RepoError::UnknownDependency { dependency }) if dependency == missing
    ));

    let mut broken = State::new();
    broken.add_policy(Formula::Ref(RefId::new(3)));
    assert!(matches!(
        repo.put(&alice(), broken),
        Err(RepoError::Compile(LtlError::UnresolvedReference { .. }))
    ));
    assert!(repo.is_empty());

    assert!(matches!(
        State::new().add_policy_string("self ->"),
        Err(ParseError::UnexpectedEnd)
    ));
}

#[test]
fn named_definitions_can_be_used_in_queries_and_policies() {
    let mut exam = exam_repo();
    let reference = exam
        .repo
        .define("by_alice", "author = user('Alice')")
        .unwrap();
    assert_eq!(exam.repo.ref_table().lookup("by_alice"), Some(reference));

    assert!(exam
        .repo
        .query_string(&bob(), &exam.r3, "@by_alice")
        .unwrap());
    assert!(exam
        .repo
        .query_string(&bob(), &exam.r5, "X @by_alice")
        .unwrap());

    exam.repo
        .define("alice_only", "self -> subject() = user('Alice')")
        .unwrap();
    let mut guarded = state_over(&[exam.r5]);
    guarded
        .add_policy_string_with("@alice_only", exam.repo.ref_table())
        .unwrap();
    let r6 = exam.repo.put(&charlie(), guarded).unwrap();
    assert!(matches!(
        exam.repo.put(&charlie(), state_over(&[r6])),
        Err(RepoError::PolicyViolation { .. })
    ));

    assert!(matches!(
        exam.repo.define("by_alice", "true"),
        Err(RepoError::DuplicateDefinition { name }) if name == "by_alice"
    ));
    assert!(matches!(
        exam.repo.define("broken", "author ="),
        Err(RepoError::Parse(_))
    ));
    assert!(matches!(
        exam.repo.query_string(&bob(), &exam.r5, "@unknown"),
        Err(RepoError::Parse(ParseError::UnknownReference { .. }))
    ));
}

#[test]
fn ancestors_are_listed_in_insertion_order() {
    let exam = exam_repo();

    assert_eq!(
        exam.repo.ancestors(&exam.r5).unwrap(),
        vec![exam.r1, exam.r2, exam.r3, exam.r4]
    );
    assert!(exam.repo.ancestors(&exam.r2).unwrap().is_empty());
    assert_eq!(exam.repo.len(), 5);

    let ids = [exam.r1, exam.r2, exam.r3, exam.r4, exam.r5];
    for (i, id) in ids.iter().enumerate() {
        assert!(!ids[i + 1..].contains(id));
        assert_eq!(exam.repo.state(id).unwrap().id(), *id);
        assert_eq!(exam.repo.state(id).unwrap().sequence_number().int(), i as u64);
    }
}

#[test]
fn oversized_work_is_refused() {
    let exam = exam_repo_with(Configuration::builder().max_closure_atoms(4).build());
    assert!(matches!(
        exam.repo.query_string(&alice(), &exam.r5, "a U (b U c)"),
        Err(RepoError::FormulaTooLarge { atoms: 5, limit: 4 })
    ));
    // Propositional formulas never build an automaton.
    assert!(exam
        .repo
        .query_string(&alice(), &exam.r5, "a | b | c | d | e")
        .is_ok());

    // Chains are only counted when some ancestor policy has to be checked on them.
    let mut repo = Repo::with_configuration(Configuration::builder().max_chains(1).build());
    let r1 = repo.put(&alice(), State::new()).unwrap();
    let r2 = repo.put(&bob(), State::new()).unwrap();
    assert!(repo.put(&charlie(), state_over(&[r1, r2])).is_ok());

    let mut guarded = State::new();
    guarded.add_policy_string("self -> true").unwrap();
    let r4 = repo.put(&alice(), guarded).unwrap();
    let r5 = repo.put(&alice(), state_over(&[r4])).unwrap();
    let r6 = repo.put(&bob(), state_over(&[r4])).unwrap();
    assert!(matches!(
        repo.put(&charlie(), state_over(&[r5, r6])),
        Err(RepoError::TooManyChains { limit: 1 })
    ));
    assert_eq!(repo.len(), 6);
}

/// Put `count` diamonds on top of `base`, each made of two nodes over the previous tip and a join
/// over both. Returns the last join.
fn stack_diamonds(repo: &mut Repo, acting: &Identity, base: NodeId, count: usize) -> NodeId {
    let mut tip = base;
    for _ in 0..count {
        let left = repo.put(acting, state_over(&[tip])).unwrap();
        let right = repo.put(acting, state_over(&[tip])).unwrap();
        tip = repo.put(acting, state_over(&[left, right])).unwrap();
    }
    tip
}

#[test]
fn unguarded_diamonds_do_not_exhaust_the_chain_limit() {
    let mut repo = Repo::new();
    let base = repo.put(&mallory(), State::new()).unwrap();

    // 2^11 chains run from the last join down to the base.
    let tip = stack_diamonds(&mut repo, &bob(), base, 11);
    assert_eq!(repo.len(), 34);
    assert!(repo.put(&charlie(), state_over(&[tip])).is_ok());

    // Queries still enumerate every chain.
    assert!(matches!(
        repo.query_string(&charlie(), &tip, "true"),
        Err(RepoError::TooManyChains { limit: 1024 })
    ));
}

#[test]
fn only_chains_through_the_owner_are_checked() {
    let mut repo = Repo::new();
    let base = repo.put(&mallory(), State::new()).unwrap();
    let unrelated = stack_diamonds(&mut repo, &bob(), base, 11);

    let mut confidential = State::new();
    confidential
        .add_policy_string("self -> subject() = user('Alice')")
        .unwrap();
    let secret = repo.put(&alice(), confidential).unwrap();
    let derived = stack_diamonds(&mut repo, &alice(), secret, 3);

    // The unrelated diamonds are never walked, only the 8 chains from `derived` to `secret`.
    assert!(matches!(
        repo.put(&bob(), state_over(&[unrelated, derived])),
        Err(RepoError::PolicyViolation { owner, .. }) if owner == secret
    ));
    assert!(repo.put(&alice(), state_over(&[unrelated, derived])).is_ok());
}

#[test]
fn handlers_fire_after_each_action() {
    let inserted = Arc::new(Mutex::new(Vec::new()));
    let rejected = Arc::new(Mutex::new(Vec::new()));
    let queried = Arc::new(Mutex::new(Vec::new()));
    let defined = Arc::new(Mutex::new(Vec::new()));

    let mut repo = Repo::new();
    {
        let inserted = inserted.clone();
        repo.on_insert_state(move |event| inserted.lock().unwrap().push(event.node));
    }
    {
        let rejected = rejected.clone();
        repo.on_reject_state(move |event| rejected.lock().unwrap().push(event.subject.clone()));
    }
    {
        let queried = queried.clone();
        repo.on_query(move |event| queried.lock().unwrap().push(event.satisfied));
    }
    {
        let defined = defined.clone();
        repo.on_define(move |event| defined.lock().unwrap().push(event.name.clone()));
    }

    let mut confidential = State::new();
    confidential
        .add_policy_string("self -> subject() = user('Alice')")
        .unwrap();
    let r1 = repo.put(&alice(), confidential).unwrap();
    assert!(repo.put(&mallory(), state_over(&[r1])).is_err());
    repo.define("mine", "author = user('Alice')").unwrap();
    assert!(repo.query_string(&alice(), &r1, "@mine").unwrap());

    assert_eq!(*inserted.lock().unwrap(), vec![r1]);
    assert_eq!(*rejected.lock().unwrap(), vec![mallory()]);
    assert_eq!(*queried.lock().unwrap(), vec![true]);
    assert_eq!(*defined.lock().unwrap(), vec!["mine".to_string()]);
}
