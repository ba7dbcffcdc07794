/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Nodes of the provenance graph, before and after they are stored.

use borsh::BorshSerialize;
use sha2::{Digest, Sha256 as CryptoHasher};

use crate::ltl::{is_label, parse, parse_with, Formula, ParseError, RefTable};
use crate::types::{Identity, NodeId, SequenceNumber};

use super::policy::Policy;

/// A node that has not been [put](super::Repo::put) into a repository yet.
///
/// The author is not part of a pending state: it is the identity that puts it.
#[derive(Clone, Debug, Default)]
pub struct State {
    dependencies: Vec<NodeId>,
    labels: Vec<String>,
    policies: Vec<Formula>,
}

impl State {
    pub fn new() -> State {
        State::default()
    }

    /// Record that this state was derived from `node`. The order of dependencies is the order in which
    /// provenance chains are enumerated.
    pub fn add_dependency(&mut self, node: NodeId) {
        if !self.dependencies.contains(&node) {
            self.dependencies.push(node);
        }
    }

    /// Attach a named label, which holds as an atomic proposition at this node. Fails if policy text
    /// could not mention the label, see [`is_label`].
    pub fn add_label(&mut self, label: impl Into<String>) -> Result<(), ParseError> {
        let label = label.into();
        if !is_label(&label) {
            return Err(ParseError::InvalidLabel { label });
        }
        if !self.labels.contains(&label) {
            self.labels.push(label);
        }
        Ok(())
    }

    pub fn add_policy(&mut self, policy: Formula) {
        self.policies.push(policy);
    }

    /// Parse `text` and attach it as a policy. Named references are not available; use
    /// [`add_policy_string_with`](Self::add_policy_string_with) for those.
    pub fn add_policy_string(&mut self, text: &str) -> Result<(), ParseError> {
        self.policies.push(parse(text)?);
        Ok(())
    }

    /// Parse `text`, resolving `@name` against `refs`, and attach it as a policy.
    pub fn add_policy_string_with(&mut self, text: &str, refs: &RefTable) -> Result<(), ParseError> {
        self.policies.push(parse_with(text, refs)?);
        Ok(())
    }

    pub fn dependencies(&self) -> &[NodeId] {
        &self.dependencies
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn policies(&self) -> &[Formula] {
        &self.policies
    }

    pub(crate) fn into_parts(self) -> (Vec<NodeId>, Vec<String>) {
        (self.dependencies, self.labels)
    }
}

/// A node stored in a repository, together with its compiled policies.
#[derive(Clone, Debug)]
pub struct StoredState {
    id: NodeId,
    sequence_number: SequenceNumber,
    author: Identity,
    dependencies: Vec<NodeId>,
    labels: Vec<String>,
    policies: Vec<Policy>,
}

impl StoredState {
    pub(crate) fn new(
        header: NodeHeader,
        id: NodeId,
        policies: Vec<Policy>,
    ) -> StoredState {
        StoredState {
            id,
            sequence_number: header.sequence_number,
            author: header.author,
            dependencies: header.dependencies,
            labels: header.labels,
            policies,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Position of the node in the repository's insertion order.
    pub fn sequence_number(&self) -> SequenceNumber {
        self.sequence_number
    }

    pub fn author(&self) -> &Identity {
        &self.author
    }

    pub fn dependencies(&self) -> &[NodeId] {
        &self.dependencies
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn policies(&self) -> &[Policy] {
        &self.policies
    }
}

/// The part of a node that its [`NodeId`] commits to.
#[derive(Clone, BorshSerialize)]
pub struct NodeHeader {
    pub sequence_number: SequenceNumber,
    pub author: Identity,
    pub dependencies: Vec<NodeId>,
    pub labels: Vec<String>,
    /// Rendered text of the compiled policies.
    pub policies: Vec<String>,
}

impl NodeHeader {
    /// SHA256 over the borsh serialization of the header.
    pub fn hash(&self) -> std::io::Result<NodeId> {
        let mut hasher = CryptoHasher::new();
        hasher.update(&self.try_to_vec()?);
        let digest: [u8; 32] = hasher.finalize().into();
        Ok(NodeId::new(digest))
    }
}
