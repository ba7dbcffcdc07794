//! A small repository modelling an exam: Mallory and Bob publish source material, Alice derives an
//! answer from each, and Charlie combines Alice's answers.
//!
//! ```text
//!   r1 (Mallory)   r2 (Bob)
//!        |            |
//!   r3 (Alice)     r4 (Alice)
//!          \        /
//!          r5 (Charlie)
//! ```

use provenance_ltl::config::Configuration;
use provenance_ltl::repo::state::State;
use provenance_ltl::repo::Repo;
use provenance_ltl::types::{Identity, NodeId};

pub(crate) struct Exam {
    pub(crate) repo: Repo,
    pub(crate) r1: NodeId,
    pub(crate) r2: NodeId,
    pub(crate) r3: NodeId,
    pub(crate) r4: NodeId,
    pub(crate) r5: NodeId,
}

pub(crate) fn alice() -> Identity {
    Identity::new("Alice")
}

pub(crate) fn bob() -> Identity {
    Identity::new("Bob")
}

pub(crate) fn charlie() -> Identity {
    Identity::new("Charlie")
}

pub(crate) fn mallory() -> Identity {
    Identity::new("Mallory")
}

pub(crate) fn state_over(dependencies: &[NodeId]) -> State {
    let mut state = State::new();
    for dependency in dependencies {
        state.add_dependency(*dependency);
    }
    state
}

pub(crate) fn exam_repo() -> Exam {
    exam_repo_with(Configuration::default())
}

pub(crate) fn exam_repo_with(config: Configuration) -> Exam {
    let mut repo = Repo::with_configuration(config);
    let r1 = repo.put(&mallory(), State::new()).unwrap();
    let r2 = repo.put(&bob(), State::new()).unwrap();
    let r3 = repo.put(&alice(), state_over(&[r1])).unwrap();
    let r4 = repo.put(&alice(), state_over(&[r2])).unwrap();
    let r5 = repo.put(&charlie(), state_over(&[r3, r4])).unwrap();

    Exam {
        repo,
        r1,
        r2,
        r3,
        r4,
        r5,
    }
}
