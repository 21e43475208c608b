use crate::{SpMat, StateGraph};

/// Sparse transition probability matrix reconstructed from the graph's edge
/// attributes. Built once at session construction and immutable afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionMatrix(pub SpMat);

impl TransitionMatrix {
    /// Reconstructs `T` from the graph: for every edge `(s, t, prob)` with
    /// `prob != 0`, `T[s][t] = prob`. A self-edge carrying probability zero
    /// marks a state with no recorded outgoing mass and becomes an absorbing
    /// self-loop `T[s][s] = 1.0`.
    pub fn from_graph(graph: &StateGraph) -> Self {
        let mut t = SpMat::zeros(graph.num_nodes());

        for edge in graph.edges() {
            if edge.probability != 0.0 {
                t.set(edge.source, edge.target, edge.probability);
            } else if edge.source == edge.target {
                t.set(edge.source, edge.target, 1.0);
            }
        }

        TransitionMatrix(t)
    }
}

impl std::ops::Deref for TransitionMatrix {
    type Target = SpMat;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
