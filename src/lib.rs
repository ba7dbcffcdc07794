/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Linear temporal logic policies over provenance graphs.
//!
//! - [`ltl`]: formulas, their surface syntax, and closures.
//! - [`automaton`]: the tableau construction of generalized Büchi automata, degeneralization, and
//!   acceptance of finite traces read as lassos.
//! - [`repo`]: an in-memory repository of nodes whose policies are enforced on their provenance.

pub mod automaton;

pub mod config;

pub(crate) mod event_bus;

pub mod events;

pub mod logging;

pub mod ltl;

pub mod repo;

pub mod types;
