use anyhow::Result;
use clap::Parser;
use msmpath_core::{StateGraph, TptSession};

#[derive(Parser, Debug)]
#[command(about = "TPT analysis of a Markov state model discretized from a double-well potential")]
struct Args {
    /// Number of discretization bins
    #[arg(long, default_value_t = 24)]
    bins: usize,

    /// Temperature of the Boltzmann weights
    #[arg(long, default_value_t = 0.5)]
    temperature: f64,

    /// Stop after this many extracted pathways
    #[arg(long, default_value_t = 10)]
    max_paths: usize,
}

// Double-well potential: V(x) = (x^2 - 1)^2 / 4
fn potential(x: f64) -> f64 {
    let d = x * x - 1.0;
    d * d / 4.0
}

fn main() -> Result<()> {
    let args = Args::parse();
    anyhow::ensure!(args.bins >= 6, "need at least 6 bins");

    let n = args.bins;
    let (lo, hi) = (-1.8, 1.8);
    let dx = (hi - lo) / n as f64;
    let centers: Vec<f64> = (0..n).map(|i| lo + (i as f64 + 0.5) * dx).collect();

    println!("Double-well MSM TPT");
    println!("===================");
    println!("Bins: {} over [{}, {}]", n, lo, hi);
    println!("Temperature: {}", args.temperature);

    // Boltzmann equilibrium weights
    let weights: Vec<f64> = centers
        .iter()
        .map(|&x| (-potential(x) / args.temperature).exp())
        .collect();
    let z: f64 = weights.iter().sum();
    let eq_probs: Vec<f64> = weights.iter().map(|w| w / z).collect();

    // Metropolis hops between neighboring bins: propose left/right with
    // probability 1/2, accept with min(1, exp(-dV/T)).
    let mut graph = StateGraph::from_eq_probs(&eq_probs);
    for i in 0..n {
        for j in [i.wrapping_sub(1), i + 1] {
            if j >= n {
                continue;
            }
            let dv = potential(centers[j]) - potential(centers[i]);
            let accept = (-dv / args.temperature).exp().min(1.0);
            graph.add_edge(i, j, 0.5 * accept);
        }
    }

    // wells sit at x = -1 and x = +1; use the bin closest to each bottom
    let nearest = |x0: f64| {
        (0..n)
            .min_by(|&a, &b| {
                (centers[a] - x0)
                    .abs()
                    .partial_cmp(&(centers[b] - x0).abs())
                    .unwrap()
            })
            .unwrap()
    };
    let sources = vec![nearest(-1.0)];
    let targets = vec![nearest(1.0)];
    println!("Source bin: {:?} (left well)", sources);
    println!("Target bin: {:?} (right well)", targets);

    let mut session = TptSession::new(graph, &sources, &targets)?;

    let report = session.solve_report();
    println!(
        "\nCommittor solve: {} ({} iterations, residual {:e})",
        if report.converged { "converged" } else { "NOT converged" },
        report.iterations,
        report.residual
    );

    println!("\nCommittor profile:");
    for i in 0..n {
        println!(
            "  bin {:>3} (x = {:+.3}): q+ = {:.4}  eq = {:.4}",
            i,
            centers[i],
            session.q_forward()[i],
            session.graph().eq_prob(i)
        );
    }

    println!("\nDominant pathways:");
    let mut count = 0;
    while count < args.max_paths {
        let Some(path) = session.next_path() else {
            break;
        };
        count += 1;
        println!(
            "  #{:<3} {} states, bottleneck {:.6e}",
            count,
            path.nodes.len(),
            path.bottleneck
        );
        println!("       {:?}", path.nodes);
    }
    if count == 0 {
        println!("  none (no reactive flux from the seed source)");
    }

    Ok(())
}
