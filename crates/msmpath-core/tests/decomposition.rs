use msmpath_core::{StateGraph, TptSession};

/// Six-state network with two routes from the source to the target and
/// enough back-edges that committors and fluxes stay strictly positive on
/// the interior.
fn network() -> StateGraph {
    let mut g = StateGraph::from_eq_probs(&[0.3, 0.2, 0.2, 0.1, 0.1, 0.1]);
    g.add_edge(0, 1, 0.6);
    g.add_edge(0, 2, 0.4);
    g.add_edge(1, 0, 0.3);
    g.add_edge(1, 3, 0.7);
    g.add_edge(2, 0, 0.3);
    g.add_edge(2, 3, 0.3);
    g.add_edge(2, 4, 0.4);
    g.add_edge(3, 1, 0.2);
    g.add_edge(3, 5, 0.8);
    g.add_edge(4, 2, 0.5);
    g.add_edge(4, 5, 0.5);
    g
}

#[test]
fn paths_run_source_to_target_with_decreasing_residual() {
    let mut session = TptSession::new(network(), &[0], &[5]).unwrap();
    assert!(session.solve_report().converged);

    let mut total_before = session.working_flux().sum();
    let mut n_paths = 0;

    while let Some(path) = session.next_path() {
        n_paths += 1;
        assert!(n_paths < 100, "decomposition does not terminate");

        assert_eq!(path.nodes[0], 0);
        assert_eq!(*path.nodes.last().unwrap(), 5);
        assert!(path.bottleneck > 0.0);
        assert_eq!(path.edge_fluxes.len(), path.num_edges());

        // no state repeats within one pathway
        let mut seen = path.nodes.clone();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), path.nodes.len());

        let total_after = session.working_flux().sum();
        assert!(total_after < total_before);
        total_before = total_after;

        println!(
            "pathway {:?}, bottleneck {:.5}",
            path.nodes, path.bottleneck
        );
    }

    assert!(n_paths >= 2, "expected both routes to be extracted");
}

#[test]
fn extracted_flux_bounded_by_source_outflow() {
    let mut session = TptSession::new(network(), &[0], &[5]).unwrap();

    let source_outflow: f64 = session
        .original_flux()
        .row(0)
        .iter()
        .map(|&(_, v)| v)
        .sum();

    let mut extracted = 0.0;
    while let Some(path) = session.next_path() {
        extracted += path.bottleneck;
    }

    println!(
        "extracted {:.6} of source outflow {:.6}",
        extracted, source_outflow
    );
    assert!(extracted <= source_outflow + 1e-12);
}

#[test]
fn exhaustion_is_terminal() {
    let mut session = TptSession::new(network(), &[0], &[5]).unwrap();
    while session.next_path().is_some() {}

    assert!(session.next_path().is_none());
    assert!(session.next_path().is_none());
}

#[test]
fn disconnected_source_yields_no_path() {
    // source 0 has no outgoing edges at all
    let mut g = StateGraph::from_eq_probs(&[0.4, 0.3, 0.3]);
    g.add_edge(1, 2, 1.0);

    let mut session = TptSession::new(g, &[0], &[2]).unwrap();
    assert!(session.next_path().is_none());
}
