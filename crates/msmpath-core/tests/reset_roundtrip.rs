use msmpath_core::{StateGraph, TptSession};

fn network() -> StateGraph {
    let mut g = StateGraph::from_eq_probs(&[0.3, 0.25, 0.25, 0.2]);
    g.add_edge(0, 1, 0.5);
    g.add_edge(0, 2, 0.5);
    g.add_edge(1, 0, 0.4);
    g.add_edge(1, 3, 0.6);
    g.add_edge(2, 0, 0.4);
    g.add_edge(2, 3, 0.6);
    g
}

#[test]
fn reset_restores_working_matrix_exactly() {
    let mut session = TptSession::new(network(), &[0], &[3]).unwrap();

    session.next_path().unwrap();
    assert_ne!(session.working_flux(), session.original_flux());

    session.reset();
    assert_eq!(session.working_flux(), session.original_flux());
    assert_eq!(session.working_flux().sum(), session.original_flux().sum());
}

#[test]
fn reset_is_idempotent() {
    let mut session = TptSession::new(network(), &[0], &[3]).unwrap();
    session.next_path().unwrap();

    session.reset();
    let once = session.working_flux().clone();
    session.reset();
    assert_eq!(*session.working_flux(), once);
}

#[test]
fn extraction_sequence_repeats_after_reset() {
    let mut session = TptSession::new(network(), &[0], &[3]).unwrap();

    let mut first_run = Vec::new();
    while let Some(path) = session.next_path() {
        first_run.push(path);
    }
    assert!(!first_run.is_empty());

    session.reset();

    let mut second_run = Vec::new();
    while let Some(path) = session.next_path() {
        second_run.push(path);
    }

    assert_eq!(first_run, second_run);
    println!("{} pathways repeated identically after reset", first_run.len());
}

#[test]
fn graph_annotations_survive_reset() {
    let mut session = TptSession::new(network(), &[0], &[3]).unwrap();

    let first = session.next_path().unwrap();
    let after_first = session.graph().node_flux(0);
    assert_eq!(after_first, first.bottleneck);

    session.reset();
    // annotations are append-only: reset does not revert them
    assert_eq!(session.graph().node_flux(0), after_first);

    session.next_path().unwrap();
    assert!(session.graph().node_flux(0) > after_first);
}
