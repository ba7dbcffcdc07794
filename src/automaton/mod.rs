//! Büchi automata for LTL formulas.
//!
//! A formula is compiled in two steps:
//! 1. The [tableau construction](tableau) turns it into a [`Gnba`], a generalized Büchi automaton
//!    with one acceptance set per `U` subformula.
//! 2. [Degeneralization](nba) turns the GNBA into an [`Nba`] with a single acceptance set.
//!
//! Both kinds of automata implement [`BuchiAutomaton`], which is all the [`lasso`] evaluator needs to
//! decide whether a finite provenance trace, read as a lasso, is accepted.

pub mod gnba;

pub mod lasso;

pub mod nba;

pub mod state;

pub mod tableau;

pub use gnba::Gnba;
pub use nba::Nba;
pub use state::{ElementarySet, RenameTable, State, StateId, StateSet, Transition};

use crate::ltl::Valuation;

/// Read access to the parts of a Büchi automaton that acceptance depends on.
pub trait BuchiAutomaton {
    /// The state arena. A [`StateId`] is an index into this slice.
    fn states(&self) -> &[State];

    fn starting_states(&self) -> &StateSet;

    /// The sets that an accepting run must each visit infinitely often.
    fn acceptance_sets(&self) -> Vec<&StateSet>;

    /// The atomic propositions transition labels are drawn from. Valuations are restricted to this
    /// set before being matched against labels.
    fn alphabet(&self) -> &Valuation;

    fn state(&self, id: StateId) -> &State {
        &self.states()[id.index()]
    }

    /// Whether the lasso read from `trace` is accepted. See [`lasso::accepts`].
    fn accepts(&self, trace: &[Valuation]) -> bool {
        lasso::accepts(self, trace)
    }
}
