/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Definitions of repository events for event handling and logging.
//!
//! Note: an event for a given action indicates that the action has been completed.

use std::time::SystemTime;

use crate::types::{Identity, NodeId, RefId};

pub enum Event {
    InsertState(InsertStateEvent),
    RejectState(RejectStateEvent),
    Query(QueryEvent),
    Define(DefineEvent),
}

/// A node was stored.
pub struct InsertStateEvent {
    pub timestamp: SystemTime,
    pub node: NodeId,
    pub author: Identity,
    pub dependencies: usize,
    pub policies: usize,
}

/// A node was refused because it would violate a policy of one of its ancestors.
pub struct RejectStateEvent {
    pub timestamp: SystemTime,
    pub subject: Identity,
    pub owner: NodeId,
    pub policy: String,
}

/// A formula was checked against a stored node.
pub struct QueryEvent {
    pub timestamp: SystemTime,
    pub subject: Identity,
    pub node: NodeId,
    pub formula: String,
    pub satisfied: bool,
}

/// A named formula was added to the reference table.
pub struct DefineEvent {
    pub timestamp: SystemTime,
    pub name: String,
    pub reference: RefId,
}
