//! Demo driver: train a blank model against data sampled from a reference
//! model and compare their decodings.
//!
//! This binary is a caller of the library, not part of the core: the
//! convergence loop (clone, sweep every sequence, measure parameter
//! distance, stop at a threshold or iteration cap) lives here.

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ehmm_core::{EdgeHmm, HmmSolver, Result};

#[derive(Debug, Parser)]
#[command(name = "ehmm", about = "Edge-emission HMM training demo")]
struct Cli {
    /// Number of training sequences to sample from the reference model.
    #[arg(long, default_value_t = 100)]
    sequences: usize,

    /// Length of each sampled observation sequence.
    #[arg(long, default_value_t = 10)]
    length: usize,

    /// Maximum number of EM sweeps over the training set.
    #[arg(long, default_value_t = 1000)]
    max_iterations: usize,

    /// Stop once the mean squared parameter change per sweep falls below
    /// this threshold.
    #[arg(long, default_value_t = 1e-4)]
    threshold: f64,

    /// RNG seed for reproducible runs.
    #[arg(long, env = "EHMM_SEED")]
    seed: Option<u64>,
}

/// The 2-state, 4-symbol reference model: each symbol identifies exactly one
/// transition edge.
fn reference_model() -> Result<EdgeHmm> {
    let mut hmm = EdgeHmm::new(2, 4)?;
    hmm.set_transition(0, 0, 0.1)?;
    hmm.set_transition(0, 1, 0.9)?;
    hmm.set_transition(1, 0, 0.1)?;
    hmm.set_transition(1, 1, 0.9)?;
    hmm.set_emission(0, 0, 0, 1.0)?;
    hmm.set_emission(1, 1, 1, 1.0)?;
    hmm.set_emission(0, 1, 2, 1.0)?;
    hmm.set_emission(1, 0, 3, 1.0)?;
    hmm.set_initial(0, 0.9)?;
    hmm.set_initial(1, 0.1)?;
    Ok(hmm)
}

fn run(cli: &Cli) -> Result<()> {
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let reference = reference_model()?;
    // Re-estimation needs at least one sequence with at least one symbol.
    let sequence_count = cli.sequences.max(1);
    let length = cli.length.max(1);
    let sequences: Vec<Vec<usize>> = (0..sequence_count)
        .map(|_| reference.sample_observations(length, &mut rng))
        .collect();
    info!(
        count = sequences.len(),
        length,
        "sampled training sequences from the reference model"
    );

    // Decode every sequence under the generating model for later comparison.
    let mut reference_paths = Vec::with_capacity(sequences.len());
    {
        let mut solver = HmmSolver::new(reference.clone(), &sequences[0])?;
        for seq in &sequences {
            solver.rebind(seq)?;
            reference_paths.push(solver.viterbi_decode());
        }
    }

    // Train a uniformly-initialized model with the external EM loop.
    let mut blank = EdgeHmm::new(2, 4)?;
    blank.randomize_uniform(&mut rng);
    let mut solver = HmmSolver::new(blank, &sequences[0])?;
    let mut converged = false;
    for iteration in 0..cli.max_iterations {
        let previous = solver.model().clone();
        for seq in &sequences {
            solver.rebind(seq)?;
            solver.reestimate()?;
        }
        let distance = previous.parameter_distance(solver.model())?;
        info!(iteration, distance, "EM sweep complete");
        if distance < cli.threshold {
            converged = true;
            break;
        }
    }
    if !converged {
        info!(
            max_iterations = cli.max_iterations,
            "stopped at the iteration cap before reaching the threshold"
        );
    }

    let learned = solver.into_model();
    println!(
        "{}",
        serde_json::to_string_pretty(&learned).expect("model serializes")
    );

    // Compare decodings under the reference and the learned model.
    let mut agreement = 0usize;
    let mut total = 0usize;
    let mut solver = HmmSolver::new(learned, &sequences[0])?;
    for (seq, reference_path) in sequences.iter().zip(&reference_paths) {
        solver.rebind(seq)?;
        let path = solver.viterbi_decode();
        agreement += path
            .iter()
            .zip(reference_path.iter())
            .filter(|(a, b)| a == b)
            .count();
        total += path.len();
    }
    info!(
        agreement,
        total,
        fraction = agreement as f64 / total as f64,
        "state decoding agreement between reference and learned model"
    );
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
