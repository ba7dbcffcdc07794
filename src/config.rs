/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! User-defined parameters of a [repository](crate::repo::Repo).

use typed_builder::TypedBuilder;

/// Which maximal provenance chains of a node are checked against a formula.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TraceSelection {
    /// Every maximal chain must satisfy the formula.
    #[default]
    AllChains,

    /// Only the chain that follows the first dependency of every node is checked.
    FirstChain,
}

/// Stores the user-defined parameters of a repository, that is:
/// 1. The "Log Events" flag. If set to "true", the default loggers defined in [`crate::logging`] are
///    registered as event handlers.
/// 2. The maximum number of free tableau decisions (atomic propositions, `X` and `U` subformulae)
///    a formula may have before the repository refuses to compile it.
/// 3. The maximum number of maximal provenance chains that a single check may examine.
/// 4. The [trace selection](TraceSelection) policy.
///
/// ## Formula size
///
/// The automaton of a formula with n free tableau decisions may have up to 2^n states, and its
/// degeneralized automaton up to k·2^n, where k is the number of `U` subformulae. The tableau itself is
/// never cut short; oversized formulas are rejected up front with
/// [`RepoError::FormulaTooLarge`](crate::repo::RepoError::FormulaTooLarge).
///
/// ## Log Events
///
/// Events are logged using the [log](https://docs.rs/log/latest/log/) crate. To get these messages
/// printed onto a terminal or to a file, set up a [logging
/// implementation](https://docs.rs/log/latest/log/#available-logging-implementations).
#[derive(Clone, Debug, TypedBuilder)]
#[builder(builder_method(doc = "
    Create a builder for building a [Configuration]. Every parameter is optional:
    - `.log_events(...)`
    - `.max_closure_atoms(...)`
    - `.max_chains(...)`
    - `.trace_selection(...)`
"))]
pub struct Configuration {
    #[builder(default = false, setter(doc = "Enable logging? Defaults to false."))]
    pub log_events: bool,
    #[builder(
        default = 16,
        setter(doc = "Set the maximum number of free tableau decisions of a formula. Defaults to 16.")
    )]
    pub max_closure_atoms: usize,
    #[builder(
        default = 1024,
        setter(doc = "Set the maximum number of provenance chains examined per check. Defaults to 1024.")
    )]
    pub max_chains: usize,
    #[builder(
        default,
        setter(doc = "Set which provenance chains are checked. Defaults to all of them.")
    )]
    pub trace_selection: TraceSelection,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration::builder().build()
    }
}
