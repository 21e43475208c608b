use crate::{SpMat, StateGraph, F, NodeId};

/// One extracted source-to-target pathway.
#[derive(Clone, Debug, PartialEq)]
pub struct ReactivePath {
    /// Visited states in order, source first, target last.
    pub nodes: Vec<NodeId>,
    /// Residual flux each edge carried at extraction time, one per edge.
    pub edge_fluxes: Vec<F>,
    /// Minimum edge flux along the path; the amount removed from the
    /// working matrix for every edge on the path.
    pub bottleneck: F,
}

impl ReactivePath {
    /// Edges of the path as `(from, to)` pairs.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.nodes.windows(2).map(|w| (w[0], w[1]))
    }

    pub fn num_edges(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }
}

/// A search frame: a state, a snapshot of its outgoing flux row, and the
/// candidate currently being explored. Rejected candidates are zeroed in the
/// snapshot, never in the working matrix.
struct Frame {
    node: NodeId,
    candidates: Vec<(NodeId, F)>,
    chosen: Option<usize>,
}

/// Stateful greedy decomposition of the reactive flux field into discrete
/// pathways.
///
/// Each `next_path` call runs a depth-first search over the working flux
/// matrix, always following the locally largest residual flux and
/// backtracking past dead ends. The search is seeded from the first source
/// state only; other sources are reached solely through flux routed via the
/// first one. Ties in the greedy choice resolve to the lowest state index.
///
/// On success the path's bottleneck flux is subtracted from every edge on
/// the path in the working matrix, and the graph's cumulative node and edge
/// `flux` annotations are incremented by it (both endpoints of every edge,
/// so interior path states accumulate it twice per pathway).
pub struct PathDecomposer {
    working: SpMat,
    sources: Vec<NodeId>,
    is_target: Vec<bool>,
}

impl PathDecomposer {
    pub fn new(flux: SpMat, sources: &[NodeId], targets: &[NodeId]) -> Self {
        let mut is_target = vec![false; flux.n()];
        for &k in targets {
            is_target[k] = true;
        }
        Self {
            working: flux,
            sources: sources.to_vec(),
            is_target,
        }
    }

    /// The mutable working copy of the flux matrix.
    pub fn working(&self) -> &SpMat {
        &self.working
    }

    /// Replaces the working matrix with a fresh snapshot, discarding all
    /// decrements so far. Graph `flux` annotations are not reverted.
    pub fn restore(&mut self, snapshot: SpMat) {
        self.working = snapshot;
    }

    /// Extracts the currently dominant pathway, or `None` if no path with
    /// positive residual flux remains from the seed source. `None` is the
    /// terminal signal: later calls will not succeed either unless the
    /// working matrix is restored.
    pub fn next_path(&mut self, graph: &mut StateGraph) -> Option<ReactivePath> {
        let &start = self.sources.first()?;
        let n = self.working.n();

        let mut on_path = vec![false; n];
        let mut stack = vec![Frame {
            node: start,
            candidates: self.working.row(start).to_vec(),
            chosen: None,
        }];
        on_path[start] = true;

        let found = loop {
            let Some(frame) = stack.last() else {
                break false;
            };
            let node = frame.node;

            match select_candidate(&frame.candidates, &on_path) {
                None => {
                    // Dead end: unwind one frame and reject the branch that
                    // led here in the parent's snapshot.
                    stack.pop();
                    on_path[node] = false;
                    if let Some(parent) = stack.last_mut() {
                        if let Some(pc) = parent.chosen.take() {
                            parent.candidates[pc].1 = 0.0;
                        }
                    }
                }
                Some(ci) => {
                    let frame = stack.last_mut().expect("frame checked above");
                    frame.chosen = Some(ci);
                    let (next, _) = frame.candidates[ci];

                    if self.is_target[next] {
                        break true;
                    }

                    stack.push(Frame {
                        node: next,
                        candidates: self.working.row(next).to_vec(),
                        chosen: None,
                    });
                    on_path[next] = true;
                }
            }
        };

        if !found {
            return None;
        }

        // Root-to-target reconstruction from the frames' chosen edges.
        let mut nodes = Vec::with_capacity(stack.len() + 1);
        let mut edge_fluxes = Vec::with_capacity(stack.len());
        let mut last = start;
        for frame in &stack {
            let ci = frame.chosen.expect("every frame on a found path chose");
            nodes.push(frame.node);
            let (next, f) = frame.candidates[ci];
            edge_fluxes.push(f);
            last = next;
        }
        nodes.push(last);

        let bottleneck = edge_fluxes
            .iter()
            .copied()
            .fold(F::INFINITY, |acc, f| if f < acc { f } else { acc });

        // Book the extraction: decrement the working matrix and accumulate
        // the graph-visible annotations.
        for k in 0..nodes.len() - 1 {
            let (u, v) = (nodes[k], nodes[k + 1]);
            let remaining = self.working.get(u, v) - bottleneck;
            self.working.set(u, v, if remaining > 0.0 { remaining } else { 0.0 });

            graph.add_node_flux(u, bottleneck);
            graph.add_node_flux(v, bottleneck);
            graph.add_edge_flux(u, v, bottleneck);
        }

        Some(ReactivePath {
            nodes,
            edge_fluxes,
            bottleneck,
        })
    }
}

/// Greedy choice: the candidate with the largest positive residual flux
/// whose state is not already on the path. Linear scan over the
/// column-sorted snapshot, so ties go to the lowest state index.
fn select_candidate(candidates: &[(NodeId, F)], on_path: &[bool]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (ci, &(j, f)) in candidates.iter().enumerate() {
        if f <= 0.0 || on_path[j] {
            continue;
        }
        if best.map_or(true, |b| f > candidates[b].1) {
            best = Some(ci);
        }
    }
    best
}
