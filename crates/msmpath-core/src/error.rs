use crate::NodeId;
use thiserror::Error;

/// Input validation failures raised at session construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TptError {
    #[error("{0} set is empty")]
    EmptySet(&'static str),

    #[error("{set} state {node} out of range (graph has {n} states)")]
    NodeOutOfRange {
        set: &'static str,
        node: NodeId,
        n: usize,
    },

    #[error("state {0} belongs to both the source and target set")]
    OverlappingSets(NodeId),

    #[error("state {node} has invalid equilibrium probability {value}")]
    InvalidEqProb { node: NodeId, value: f64 },

    #[error("edge {source}->{target} has invalid transition probability {value}")]
    InvalidProbability {
        // Raw identifier keeps thiserror from treating this field as the
        // error's `source()`; it is the same field name as `source`.
        r#source: NodeId,
        target: NodeId,
        value: f64,
    },
}
