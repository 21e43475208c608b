pub mod committor;
pub mod decompose;
pub mod error;
pub mod flux;
pub mod graph;
pub mod session;
pub mod sparse;
pub mod transition;

// Core types
pub type F = f64;
pub type NodeId = usize;

pub use error::TptError;
pub use graph::{StateGraph, StateNode, TransitionEdge};
pub use sparse::SpMat;
pub use transition::TransitionMatrix;

// Committor solve
pub use committor::{
    CommittorSolution, CommittorSolver, ConsoleReporter, IterationReporter, NullReporter,
    SolveReport, SolverConfig,
};

// Reactive flux and pathway extraction
pub use decompose::{PathDecomposer, ReactivePath};
pub use flux::compute_flux;
pub use session::TptSession;
