use crate::{
    compute_flux, CommittorSolution, CommittorSolver, PathDecomposer, ReactivePath, SolveReport,
    SolverConfig, SpMat, StateGraph, TptError, TransitionMatrix, F, NodeId,
};
use nalgebra::DVector;

/// A TPT analysis session over one graph and one source/target labeling.
///
/// Construction runs the whole pipeline: validate inputs, rebuild the
/// transition matrix, solve the committor system, compute the reactive flux
/// matrix, and seed the pathway decomposer with a working copy of it. The
/// transition matrix, committors and original flux matrix are immutable for
/// the session's lifetime; only the working flux matrix (inside the
/// decomposer) and the graph's cumulative `flux` annotations change, and
/// only through `next_path`.
///
/// Not safe for concurrent use; `next_path` and `reset` take `&mut self`
/// and must be serialized by the caller.
pub struct TptSession {
    graph: StateGraph,
    transition: TransitionMatrix,
    committors: CommittorSolution,
    original_flux: SpMat,
    decomposer: PathDecomposer,
}

impl TptSession {
    /// Builds a session with the default solver configuration.
    pub fn new(
        graph: StateGraph,
        sources: &[NodeId],
        targets: &[NodeId],
    ) -> Result<Self, TptError> {
        Self::with_config(graph, sources, targets, SolverConfig::default())
    }

    pub fn with_config(
        graph: StateGraph,
        sources: &[NodeId],
        targets: &[NodeId],
        config: SolverConfig,
    ) -> Result<Self, TptError> {
        validate_sets(&graph, sources, targets)?;
        graph.validate()?;

        let transition = TransitionMatrix::from_graph(&graph);
        let committors = CommittorSolver::with_config(config).solve(&transition, sources, targets);
        let original_flux = compute_flux(&transition, &committors, &graph.eq_probs());
        let decomposer = PathDecomposer::new(original_flux.clone(), sources, targets);

        Ok(Self {
            graph,
            transition,
            committors,
            original_flux,
            decomposer,
        })
    }

    /// Extracts the currently dominant pathway and books its bottleneck flux
    /// out of the working matrix and into the graph annotations. `None`
    /// means no pathway with positive residual flux remains from the seed
    /// source; callers should stop issuing further calls.
    pub fn next_path(&mut self) -> Option<ReactivePath> {
        self.decomposer.next_path(&mut self.graph)
    }

    /// Restores the working flux matrix to the original computed at
    /// construction. The graph's cumulative `flux` annotations are
    /// append-only and deliberately not reverted.
    pub fn reset(&mut self) {
        self.decomposer.restore(self.original_flux.clone());
    }

    pub fn graph(&self) -> &StateGraph {
        &self.graph
    }

    /// Consumes the session, handing back the graph with its accumulated
    /// flux annotations.
    pub fn into_graph(self) -> StateGraph {
        self.graph
    }

    pub fn transition_matrix(&self) -> &TransitionMatrix {
        &self.transition
    }

    pub fn q_forward(&self) -> &DVector<F> {
        &self.committors.q_forward
    }

    pub fn q_backward(&self) -> &DVector<F> {
        &self.committors.q_backward
    }

    /// Convergence diagnostics of the committor solve. A session built from
    /// a non-converged solve is still usable; the committors are the
    /// solver's best iterate.
    pub fn solve_report(&self) -> SolveReport {
        self.committors.report
    }

    /// The immutable flux matrix computed at construction.
    pub fn original_flux(&self) -> &SpMat {
        &self.original_flux
    }

    /// The current residual flux matrix.
    pub fn working_flux(&self) -> &SpMat {
        self.decomposer.working()
    }
}

fn validate_sets(
    graph: &StateGraph,
    sources: &[NodeId],
    targets: &[NodeId],
) -> Result<(), TptError> {
    if sources.is_empty() {
        return Err(TptError::EmptySet("source"));
    }
    if targets.is_empty() {
        return Err(TptError::EmptySet("target"));
    }

    let n = graph.num_nodes();
    for &s in sources {
        if s >= n {
            return Err(TptError::NodeOutOfRange {
                set: "source",
                node: s,
                n,
            });
        }
    }
    for &k in targets {
        if k >= n {
            return Err(TptError::NodeOutOfRange {
                set: "target",
                node: k,
                n,
            });
        }
    }

    for &s in sources {
        if targets.contains(&s) {
            return Err(TptError::OverlappingSets(s));
        }
    }

    Ok(())
}
