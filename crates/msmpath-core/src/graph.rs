use crate::{TptError, F, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A state of the chain: equilibrium occupancy plus the cumulative reactive
/// flux routed through it by pathway extraction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StateNode {
    pub eq_prob: F,
    pub flux: F,
}

impl StateNode {
    pub fn new(eq_prob: F) -> Self {
        Self { eq_prob, flux: 0.0 }
    }
}

/// Directed transition with its probability and cumulative reactive flux.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransitionEdge {
    pub source: NodeId,
    pub target: NodeId,
    pub probability: F,
    pub flux: F,
}

impl TransitionEdge {
    pub fn new(source: NodeId, target: NodeId, probability: F) -> Self {
        Self {
            source,
            target,
            probability,
            flux: 0.0,
        }
    }
}

/// Weighted directed graph of chain states.
///
/// States are indexed `0..n`. At most one edge exists per ordered pair;
/// inserting a duplicate overwrites the earlier probability (last write
/// wins). Adjacency lists are kept for per-state row scans and a hash index
/// gives O(1) edge lookup by endpoint pair.
///
/// The `flux` annotations on nodes and edges are cumulative outputs of
/// pathway extraction. They start at zero and are only ever incremented;
/// `TptSession::reset` deliberately does not touch them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StateGraph {
    nodes: Vec<StateNode>,
    edges: Vec<TransitionEdge>,
    adjacency: Vec<Vec<usize>>,
    edge_index: HashMap<(NodeId, NodeId), usize>,
}

impl StateGraph {
    /// Creates a graph with `n` states, all with equilibrium probability zero.
    pub fn new(n: usize) -> Self {
        Self {
            nodes: (0..n).map(|_| StateNode::new(0.0)).collect(),
            edges: Vec::new(),
            adjacency: vec![Vec::new(); n],
            edge_index: HashMap::new(),
        }
    }

    /// Creates a graph from per-state equilibrium probabilities.
    pub fn from_eq_probs(eq_probs: &[F]) -> Self {
        let mut g = Self::new(eq_probs.len());
        for (i, &p) in eq_probs.iter().enumerate() {
            g.nodes[i].eq_prob = p;
        }
        g
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn set_eq_prob(&mut self, node: NodeId, eq_prob: F) {
        self.nodes[node].eq_prob = eq_prob;
    }

    pub fn eq_prob(&self, node: NodeId) -> F {
        self.nodes[node].eq_prob
    }

    /// Equilibrium probabilities as a dense vector, indexed by state.
    pub fn eq_probs(&self) -> Vec<F> {
        self.nodes.iter().map(|n| n.eq_prob).collect()
    }

    pub fn node(&self, node: NodeId) -> &StateNode {
        &self.nodes[node]
    }

    /// Inserts the directed edge `source -> target`. If the edge already
    /// exists its probability is overwritten and its flux annotation kept.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId, probability: F) {
        assert!(source < self.nodes.len() && target < self.nodes.len());

        if let Some(&idx) = self.edge_index.get(&(source, target)) {
            self.edges[idx].probability = probability;
            return;
        }

        let idx = self.edges.len();
        self.edges.push(TransitionEdge::new(source, target, probability));
        self.adjacency[source].push(idx);
        self.edge_index.insert((source, target), idx);
    }

    pub fn edge_between(&self, source: NodeId, target: NodeId) -> Option<&TransitionEdge> {
        self.edge_index.get(&(source, target)).map(|&i| &self.edges[i])
    }

    pub fn edges(&self) -> &[TransitionEdge] {
        &self.edges
    }

    /// Outgoing `(target, probability)` pairs of `source`, in insertion order.
    pub fn neighbors(&self, source: NodeId) -> impl Iterator<Item = (NodeId, F)> + '_ {
        self.adjacency[source]
            .iter()
            .map(|&i| (self.edges[i].target, self.edges[i].probability))
    }

    pub fn node_flux(&self, node: NodeId) -> F {
        self.nodes[node].flux
    }

    pub fn edge_flux(&self, source: NodeId, target: NodeId) -> Option<F> {
        self.edge_between(source, target).map(|e| e.flux)
    }

    /// Accumulates reactive flux onto a node annotation.
    pub(crate) fn add_node_flux(&mut self, node: NodeId, f: F) {
        self.nodes[node].flux += f;
    }

    /// Accumulates reactive flux onto an edge annotation, if the edge exists
    /// in the graph (flux entries always correspond to graph edges).
    pub(crate) fn add_edge_flux(&mut self, source: NodeId, target: NodeId, f: F) {
        if let Some(&idx) = self.edge_index.get(&(source, target)) {
            self.edges[idx].flux += f;
        }
    }

    /// Fail-fast attribute validation: equilibrium and transition
    /// probabilities must be finite and within `[0, 1]`.
    pub fn validate(&self) -> Result<(), TptError> {
        for (i, node) in self.nodes.iter().enumerate() {
            if !node.eq_prob.is_finite() || !(0.0..=1.0).contains(&node.eq_prob) {
                return Err(TptError::InvalidEqProb {
                    node: i,
                    value: node.eq_prob,
                });
            }
        }
        for edge in &self.edges {
            if !edge.probability.is_finite() || !(0.0..=1.0).contains(&edge.probability) {
                return Err(TptError::InvalidProbability {
                    source: edge.source,
                    target: edge.target,
                    value: edge.probability,
                });
            }
        }
        Ok(())
    }
}
