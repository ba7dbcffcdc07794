//! Types that are used across multiple components of the crate.
//!
//! Other types, specific to single components, can be found in the modules of those components, e.g.,
//! [`crate::automaton::state`].

pub mod basic;

pub use basic::{Identity, NodeId, RefId, SequenceNumber};
