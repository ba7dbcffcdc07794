/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Extraction of provenance traces.
//!
//! A node's provenance is a DAG. Every path from the node down its dependency edges to a node with no
//! dependencies is a maximal chain, and each chain is read as a trace: position 0 is the node itself,
//! the last position is the origin. Each position is turned into a [`Valuation`] that records who
//! authored the node, who is acting, whether the node is bound by the policy owner (`self`), and the
//! node's labels.

use std::collections::HashSet;

use crate::config::TraceSelection;
use crate::ltl::{AtomicProposition, Valuation};
use crate::types::{Identity, NodeId};

use super::RepoError;

/// The read-only slice of a node that traces are built from.
#[derive(Clone, Copy, Debug)]
pub struct NodeView<'a> {
    /// `None` for a node that is being put and has no id yet.
    pub id: Option<NodeId>,
    pub author: &'a Identity,
    pub dependencies: &'a [NodeId],
    pub labels: &'a [String],
}

/// A DAG of nodes addressed by id.
pub trait ProvenanceGraph {
    fn node(&self, id: &NodeId) -> Option<NodeView<'_>>;

    /// Whether `ancestor` is reachable from `dependencies` along dependency edges (inclusive).
    fn reaches(&self, dependencies: &[NodeId], ancestor: &NodeId) -> bool {
        let mut visited = HashSet::new();
        let mut stack: Vec<NodeId> = dependencies.to_vec();
        while let Some(current) = stack.pop() {
            if current == *ancestor {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(view) = self.node(&current) {
                stack.extend(view.dependencies.iter().copied());
            }
        }
        false
    }
}

/// Who is acting, and which node's policy is being evaluated.
#[derive(Clone, Debug)]
pub struct TraceContext {
    pub subject: Identity,
    pub owner: NodeId,
}

/// The maximal chains from `root`, in dependency order. Fails if a dependency is missing from `graph`,
/// or if more than `max_chains` chains would be returned.
pub fn maximal_chains<'a, G: ProvenanceGraph + ?Sized>(
    graph: &'a G,
    root: NodeView<'a>,
    selection: TraceSelection,
    max_chains: usize,
) -> Result<Vec<Vec<NodeView<'a>>>, RepoError> {
    chains_with(graph, root, None, selection, max_chains)
}

/// The maximal chains from `root` that pass through `owner`. Branches that cannot reach `owner` are
/// never explored, so they do not count towards `max_chains`. With [`TraceSelection::FirstChain`],
/// the first dependency that leads to `owner` is followed until `owner` is passed.
pub fn maximal_chains_through<'a, G: ProvenanceGraph + ?Sized>(
    graph: &'a G,
    root: NodeView<'a>,
    owner: &NodeId,
    selection: TraceSelection,
    max_chains: usize,
) -> Result<Vec<Vec<NodeView<'a>>>, RepoError> {
    chains_with(graph, root, Some(owner), selection, max_chains)
}

fn chains_with<'a, G: ProvenanceGraph + ?Sized>(
    graph: &'a G,
    root: NodeView<'a>,
    through: Option<&NodeId>,
    selection: TraceSelection,
    max_chains: usize,
) -> Result<Vec<Vec<NodeView<'a>>>, RepoError> {
    let mut chains = Vec::new();
    let passed = match through {
        Some(owner) => root.id.as_ref() == Some(owner),
        None => true,
    };
    let mut stack = vec![(vec![root], passed)];

    while let Some((chain, passed)) = stack.pop() {
        let Some(last) = chain.last().copied() else {
            continue;
        };

        let mut next = Vec::new();
        for dependency in last.dependencies {
            let view = graph
                .node(dependency)
                .ok_or(RepoError::UnknownNode { node: *dependency })?;
            let passes = match through {
                Some(owner) if !passed => {
                    if dependency == owner {
                        true
                    } else if graph.reaches(view.dependencies, owner) {
                        false
                    } else {
                        continue;
                    }
                }
                _ => true,
            };
            next.push((view, passes));
            if selection == TraceSelection::FirstChain {
                break;
            }
        }

        if next.is_empty() {
            // A dead end before the owner means `root` cannot reach it at all.
            if passed {
                if chains.len() == max_chains {
                    return Err(RepoError::TooManyChains { limit: max_chains });
                }
                chains.push(chain);
            }
            continue;
        }

        // Pushed in reverse so that the first dependency is explored first.
        for (view, passes) in next.into_iter().rev() {
            let mut extended = chain.clone();
            extended.push(view);
            stack.push((extended, passed || passes));
        }
    }

    Ok(chains)
}

/// One valuation per position of `chain`, restricted to `alphabet`.
///
/// `self` holds at a node iff it is the owner or derived from the owner.
pub fn valuations<G: ProvenanceGraph + ?Sized>(
    graph: &G,
    chain: &[NodeView<'_>],
    alphabet: &Valuation,
    context: &TraceContext,
) -> Vec<Valuation> {
    chain
        .iter()
        .map(|view| {
            let mut valuation = Valuation::new();
            valuation.insert(AtomicProposition::Author(view.author.clone()));
            valuation.insert(AtomicProposition::Subject(context.subject.clone()));
            if view.id == Some(context.owner) || graph.reaches(view.dependencies, &context.owner) {
                valuation.insert(AtomicProposition::SelfRef);
            }
            for label in view.labels {
                valuation.insert(AtomicProposition::Named(label.clone()));
            }
            valuation.restrict(alphabet)
        })
        .collect()
}
