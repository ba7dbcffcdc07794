/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! An in-memory provenance repository that enforces LTL policies.
//!
//! Every stored node records who authored it and which nodes it was derived from. Nodes may carry
//! policies, LTL formulas over [atomic propositions](crate::ltl::AtomicProposition) that are evaluated
//! on the node's provenance traces:
//! - A policy that mentions `self` binds every node derived from its owner. [`Repo::put`] refuses a
//!   state if any such policy of one of its ancestors fails on one of the new node's traces.
//! - Every policy of a node guards reads of that node through [`Repo::get`].
//!
//! The identity that performs an operation is always passed explicitly. It becomes the author of put
//! nodes and the value of `subject()` in every evaluated policy.

pub mod policy;

pub mod state;

pub mod trace;

use std::collections::{BTreeSet, HashMap};
use std::fmt::{self, Display, Formatter};
use std::time::SystemTime;

use crate::config::Configuration;
use crate::event_bus::EventHandlers;
use crate::events::*;
use crate::ltl::{parse_with, Formula, LtlError, ParseError, RefTable};
use crate::types::{Identity, NodeId, RefId, SequenceNumber};

use policy::Policy;
use state::{NodeHeader, State, StoredState};
use trace::{
    maximal_chains, maximal_chains_through, valuations, NodeView, ProvenanceGraph, TraceContext,
};

pub struct Repo {
    nodes: Vec<StoredState>,
    index: HashMap<NodeId, usize>,
    refs: RefTable,
    config: Configuration,
    handlers: EventHandlers,
}

impl Repo {
    pub fn new() -> Repo {
        Repo::with_configuration(Configuration::default())
    }

    pub fn with_configuration(config: Configuration) -> Repo {
        Repo {
            nodes: Vec::new(),
            index: HashMap::new(),
            refs: RefTable::new(),
            handlers: EventHandlers::new(config.log_events),
            config,
        }
    }

    /* ↓↓↓ Event handlers ↓↓↓ */

    pub fn on_insert_state(&mut self, handler: impl Fn(&InsertStateEvent) + Send + 'static) {
        self.handlers.insert_state_handlers.push(Box::new(handler));
    }

    pub fn on_reject_state(&mut self, handler: impl Fn(&RejectStateEvent) + Send + 'static) {
        self.handlers.reject_state_handlers.push(Box::new(handler));
    }

    pub fn on_query(&mut self, handler: impl Fn(&QueryEvent) + Send + 'static) {
        self.handlers.query_handlers.push(Box::new(handler));
    }

    pub fn on_define(&mut self, handler: impl Fn(&DefineEvent) + Send + 'static) {
        self.handlers.define_handlers.push(Box::new(handler));
    }

    /* ↓↓↓ Writes ↓↓↓ */

    /// Store `state` as a node authored by `acting`.
    ///
    /// The state's own policies are compiled first. Then every self-referential policy of every
    /// ancestor is evaluated, with `acting` as the subject, on the traces of the new node that pass
    /// through the policy's owner. Chains are only enumerated if some ancestor has such a policy. The
    /// repository is unchanged if any of this fails.
    pub fn put(&mut self, acting: &Identity, state: State) -> Result<NodeId, RepoError> {
        for dependency in state.dependencies() {
            if !self.index.contains_key(dependency) {
                return Err(RepoError::UnknownDependency {
                    dependency: *dependency,
                });
            }
        }

        let policies = state
            .policies()
            .iter()
            .map(|formula| self.compile(formula))
            .collect::<Result<Vec<Policy>, RepoError>>()?;

        self.check_ancestor_policies(acting, &state)?;

        let (dependencies, labels) = state.into_parts();
        let header = NodeHeader {
            sequence_number: SequenceNumber::new(self.nodes.len() as u64),
            author: acting.clone(),
            dependencies,
            labels,
            policies: policies.iter().map(|policy| policy.to_string()).collect(),
        };
        let id = header.hash().map_err(RepoError::Serialization)?;
        let stored = StoredState::new(header, id, policies);

        let insert_state_event = InsertStateEvent {
            timestamp: SystemTime::now(),
            node: id,
            author: acting.clone(),
            dependencies: stored.dependencies().len(),
            policies: stored.policies().len(),
        };

        self.index.insert(id, self.nodes.len());
        self.nodes.push(stored);
        self.handlers
            .fire_handlers(Event::InsertState(insert_state_event));

        Ok(id)
    }

    fn check_ancestor_policies(&self, acting: &Identity, state: &State) -> Result<(), RepoError> {
        let bound: Vec<(NodeId, &Policy)> = self
            .ancestors_of(state.dependencies())
            .into_iter()
            .flat_map(|ancestor| {
                let owner = &self.nodes[ancestor];
                owner
                    .policies()
                    .iter()
                    .filter(|policy| policy.is_self_referential())
                    .map(move |policy| (owner.id(), policy))
            })
            .collect();
        if bound.is_empty() {
            return Ok(());
        }

        let pending = NodeView {
            id: None,
            author: acting,
            dependencies: state.dependencies(),
            labels: state.labels(),
        };
        for (owner, policy) in bound {
            let chains = maximal_chains_through(
                self,
                pending,
                &owner,
                self.config.trace_selection,
                self.config.max_chains,
            )?;
            let context = TraceContext {
                subject: acting.clone(),
                owner,
            };
            if !self.holds_on_all(policy, &chains, &context)? {
                self.handlers
                    .fire_handlers(Event::RejectState(RejectStateEvent {
                        timestamp: SystemTime::now(),
                        subject: acting.clone(),
                        owner,
                        policy: policy.to_string(),
                    }));
                return Err(RepoError::PolicyViolation {
                    owner,
                    policy: policy.to_string(),
                    subject: acting.clone(),
                });
            }
        }

        Ok(())
    }

    /// Register `text` under `name`, so that later policy and query text can refer to it as `@name`.
    pub fn define(&mut self, name: &str, text: &str) -> Result<RefId, RepoError> {
        if self.refs.lookup(name).is_some() {
            return Err(RepoError::DuplicateDefinition {
                name: name.to_string(),
            });
        }
        let formula = parse_with(text, &self.refs)?;
        formula.compile(&self.refs)?;

        let reference = self
            .refs
            .define(name, formula)
            .ok_or(RepoError::DuplicateDefinition {
                name: name.to_string(),
            })?;
        self.handlers.fire_handlers(Event::Define(DefineEvent {
            timestamp: SystemTime::now(),
            name: name.to_string(),
            reference,
        }));

        Ok(reference)
    }

    /* ↓↓↓ Reads ↓↓↓ */

    /// Get `node` on behalf of `acting`. Every policy attached to the node must hold on its traces,
    /// with `acting` as the subject.
    pub fn get(&self, acting: &Identity, node: &NodeId) -> Result<&StoredState, RepoError> {
        let stored = self
            .state(node)
            .ok_or(RepoError::UnknownNode { node: *node })?;
        if stored.policies().is_empty() {
            return Ok(stored);
        }

        let chains = self.chains_from(node)?;
        let context = TraceContext {
            subject: acting.clone(),
            owner: *node,
        };
        for policy in stored.policies() {
            if !self.holds_on_all(policy, &chains, &context)? {
                return Err(RepoError::PolicyViolation {
                    owner: *node,
                    policy: policy.to_string(),
                    subject: acting.clone(),
                });
            }
        }

        Ok(stored)
    }

    /// Parse `text`, with named definitions available, and [query](Self::query) it.
    pub fn query_string(
        &self,
        acting: &Identity,
        node: &NodeId,
        text: &str,
    ) -> Result<bool, RepoError> {
        let formula = parse_with(text, &self.refs)?;
        self.query(acting, node, &formula)
    }

    /// Whether `formula` holds on the traces of `node`, with `acting` as the subject and `node` as the
    /// owner of `self`.
    pub fn query(
        &self,
        acting: &Identity,
        node: &NodeId,
        formula: &Formula,
    ) -> Result<bool, RepoError> {
        if !self.index.contains_key(node) {
            return Err(RepoError::UnknownNode { node: *node });
        }
        let policy = self.compile(formula)?;
        let chains = self.chains_from(node)?;
        let context = TraceContext {
            subject: acting.clone(),
            owner: *node,
        };
        let satisfied = self.holds_on_all(&policy, &chains, &context)?;

        self.handlers.fire_handlers(Event::Query(QueryEvent {
            timestamp: SystemTime::now(),
            subject: acting.clone(),
            node: *node,
            formula: policy.to_string(),
            satisfied,
        }));

        Ok(satisfied)
    }

    pub fn state(&self, node: &NodeId) -> Option<&StoredState> {
        self.index.get(node).map(|position| &self.nodes[*position])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The transitive dependencies of `node`, in insertion order.
    pub fn ancestors(&self, node: &NodeId) -> Result<Vec<NodeId>, RepoError> {
        let stored = self
            .state(node)
            .ok_or(RepoError::UnknownNode { node: *node })?;
        Ok(self
            .ancestors_of(stored.dependencies())
            .into_iter()
            .map(|position| self.nodes[position].id())
            .collect())
    }

    pub fn ref_table(&self) -> &RefTable {
        &self.refs
    }

    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    /* ↓↓↓ Helpers ↓↓↓ */

    fn compile(&self, formula: &Formula) -> Result<Policy, RepoError> {
        Policy::compile(formula, &self.refs, self.config.max_closure_atoms)
    }

    /// Positions of every node reachable from `dependencies`. Ordered sets of positions are ordered by
    /// insertion.
    fn ancestors_of(&self, dependencies: &[NodeId]) -> BTreeSet<usize> {
        let mut ancestors = BTreeSet::new();
        let mut stack: Vec<usize> = dependencies
            .iter()
            .filter_map(|dependency| self.index.get(dependency).copied())
            .collect();
        while let Some(position) = stack.pop() {
            if ancestors.insert(position) {
                stack.extend(
                    self.nodes[position]
                        .dependencies()
                        .iter()
                        .filter_map(|dependency| self.index.get(dependency).copied()),
                );
            }
        }
        ancestors
    }

    fn chains_from(&self, node: &NodeId) -> Result<Vec<Vec<NodeView<'_>>>, RepoError> {
        let root = self
            .node(node)
            .ok_or(RepoError::UnknownNode { node: *node })?;
        maximal_chains(
            self,
            root,
            self.config.trace_selection,
            self.config.max_chains,
        )
    }

    fn holds_on_all(
        &self,
        policy: &Policy,
        chains: &[Vec<NodeView<'_>>],
        context: &TraceContext,
    ) -> Result<bool, RepoError> {
        for chain in chains {
            let trace = valuations(self, chain, policy.alphabet(), context);
            if !policy.holds_on(&trace)? {
                log::debug!(
                    "policy {} fails on a chain of length {} for {}",
                    policy,
                    chain.len(),
                    context.subject
                );
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl Default for Repo {
    fn default() -> Self {
        Repo::new()
    }
}

impl ProvenanceGraph for Repo {
    fn node(&self, id: &NodeId) -> Option<NodeView<'_>> {
        self.state(id).map(|stored| NodeView {
            id: Some(stored.id()),
            author: stored.author(),
            dependencies: stored.dependencies(),
            labels: stored.labels(),
        })
    }
}

#[derive(Debug)]
pub enum RepoError {
    /// A dependency of a state that is being put is not stored.
    UnknownDependency { dependency: NodeId },

    /// The requested node is not stored.
    UnknownNode { node: NodeId },

    /// `policy`, attached to `owner`, does not hold for `subject`.
    PolicyViolation {
        owner: NodeId,
        policy: String,
        subject: Identity,
    },

    Parse(ParseError),

    Compile(LtlError),

    /// The formula's tableau would need `atoms` free decisions, more than the configured `limit`.
    FormulaTooLarge { atoms: usize, limit: usize },

    /// The node has more maximal provenance chains than the configured `limit`.
    TooManyChains { limit: usize },

    DuplicateDefinition { name: String },

    /// The node header could not be serialized for hashing.
    Serialization(std::io::Error),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            RepoError::UnknownDependency { dependency } => {
                write!(f, "unknown dependency {}", dependency)
            }
            RepoError::UnknownNode { node } => write!(f, "unknown node {}", node),
            RepoError::PolicyViolation {
                owner,
                policy,
                subject,
            } => write!(
                f,
                "policy '{}' of node {} is violated for {}",
                policy, owner, subject
            ),
            RepoError::Parse(error) => write!(f, "parse error: {}", error),
            RepoError::Compile(error) => write!(f, "{}", error),
            RepoError::FormulaTooLarge { atoms, limit } => write!(
                f,
                "formula needs {} tableau atoms, the limit is {}",
                atoms, limit
            ),
            RepoError::TooManyChains { limit } => {
                write!(f, "more than {} provenance chains", limit)
            }
            RepoError::DuplicateDefinition { name } => {
                write!(f, "'{}' is already defined", name)
            }
            RepoError::Serialization(error) => write!(f, "serialization error: {}", error),
        }
    }
}

impl std::error::Error for RepoError {}

impl From<ParseError> for RepoError {
    fn from(value: ParseError) -> Self {
        RepoError::Parse(value)
    }
}

impl From<LtlError> for RepoError {
    fn from(value: LtlError) -> Self {
        RepoError::Compile(value)
    }
}
