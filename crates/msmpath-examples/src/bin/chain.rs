use anyhow::Result;
use clap::Parser;
use msmpath_core::{StateGraph, TptSession};

#[derive(Parser, Debug)]
#[command(about = "TPT pathway extraction on a birth-death chain")]
struct Args {
    /// Number of chain states
    #[arg(long, default_value_t = 8)]
    states: usize,

    /// Backward hop probability of interior states
    #[arg(long, default_value_t = 0.4)]
    back: f64,

    /// Forward hop probability of interior states
    #[arg(long, default_value_t = 0.5)]
    forward: f64,
}

fn main() -> Result<()> {
    let args = Args::parse();
    anyhow::ensure!(args.states >= 3, "need at least 3 states");
    anyhow::ensure!(
        args.back + args.forward <= 1.0,
        "hop probabilities exceed 1"
    );

    let n = args.states;
    println!("Birth-death chain TPT");
    println!("=====================");
    println!("States: {}", n);
    println!("Hops: {} forward / {} backward", args.forward, args.back);

    let mut graph = StateGraph::from_eq_probs(&vec![1.0 / n as f64; n]);
    for i in 1..n - 1 {
        graph.add_edge(i, i + 1, args.forward);
        graph.add_edge(i, i - 1, args.back);
    }
    graph.add_edge(0, 1, args.forward);

    let mut session = TptSession::new(graph, &[0], &[n - 1])?;

    let report = session.solve_report();
    println!(
        "\nCommittor solve: {} ({} iterations, residual {:e})",
        if report.converged { "converged" } else { "NOT converged" },
        report.iterations,
        report.residual
    );

    println!("\nForward committor:");
    for i in 0..n {
        println!("  state {:>3}: q+ = {:.6}", i, session.q_forward()[i]);
    }

    println!("\nPathways:");
    let mut total = 0.0;
    let mut count = 0;
    while let Some(path) = session.next_path() {
        count += 1;
        total += path.bottleneck;
        println!(
            "  #{:<3} {:?}  bottleneck {:.6e}",
            count, path.nodes, path.bottleneck
        );
    }
    println!("\n{} pathways, total extracted flux {:.6e}", count, total);

    Ok(())
}
