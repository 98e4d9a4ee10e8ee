//! `chomptrack` CLI: scenario runs, replay re-tuning, Monte-Carlo evaluation.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use sim::replay::{load_replay, save_replay, ReplayLog};
use sim::scenarios::{Scenario, ScenarioKind};
use std::path::{Path, PathBuf};
use targeting_core::metrics::TrackingMetrics;
use targeting_core::TargetingConfig;

#[derive(Parser)]
#[command(name = "chomptrack", about = "Weapon-targeting tracker CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a named scenario and output metrics.
    RunScenario {
        #[arg(value_enum)]
        scenario: ScenarioKind,
        /// Random seed for reproducibility
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[command(flatten)]
        tuning: Tuning,
        /// Output metrics to a JSON file
        #[arg(long)]
        output: Option<PathBuf>,
        /// Also save the sweep log
        #[arg(long)]
        save_replay: Option<PathBuf>,
    },
    /// Re-run a recorded sweep log, optionally with different parameters.
    Replay {
        /// Path to replay JSON file
        input: PathBuf,
        #[command(flatten)]
        tuning: Tuning,
        /// Output metrics to a JSON file
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Run a scenario over many seeds in parallel and pool the metrics.
    MonteCarlo {
        #[arg(value_enum)]
        scenario: ScenarioKind,
        /// Number of seeds
        #[arg(long, default_value_t = 100)]
        runs: u64,
        /// First seed
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[command(flatten)]
        tuning: Tuning,
        /// Output metrics to a JSON file
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// Configuration file plus per-parameter overrides.
#[derive(Args)]
struct Tuning {
    /// JSON configuration file (missing sections take defaults)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Position gain (/32767)
    #[arg(long)]
    alpha: Option<i16>,
    /// Velocity gain (/16384)
    #[arg(long)]
    beta: Option<i16>,
    /// Corrections needed before the track is valid
    #[arg(long)]
    min_updates: Option<i8>,
    /// Staleness timeout (µs)
    #[arg(long)]
    track_lost_dt: Option<u32>,
    /// Gate for continuing an active track (mm)
    #[arg(long)]
    max_off_track: Option<i16>,
    /// Gate for starting a track (mm)
    #[arg(long)]
    max_start_distance: Option<i16>,
    /// Edge call threshold (sensor units)
    #[arg(long)]
    edge_threshold: Option<i32>,
}

impl Tuning {
    fn resolve(&self, base: TargetingConfig) -> Result<TargetingConfig> {
        let mut config = match &self.config {
            Some(path) => TargetingConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => base,
        };
        let t = &mut config.tracking;
        if let Some(alpha) = self.alpha {
            t.alpha = alpha;
        }
        if let Some(beta) = self.beta {
            t.beta = beta;
        }
        if let Some(n) = self.min_updates {
            t.min_num_updates = n;
        }
        if let Some(dt) = self.track_lost_dt {
            t.track_lost_dt = dt;
        }
        if let Some(d) = self.max_off_track {
            t.max_off_track = d as i32 * d as i32;
        }
        if let Some(d) = self.max_start_distance {
            t.max_start_distance = d as i32 * d as i32;
        }
        if let Some(edge) = self.edge_threshold {
            config.segmentation.edge_call_threshold = edge;
        }
        config.validate()?;
        tracing::debug!(?config, "resolved configuration");
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::RunScenario {
            scenario,
            seed,
            tuning,
            output,
            save_replay: save_path,
        } => {
            let config = tuning.resolve(TargetingConfig::default())?;
            run_scenario(scenario, seed, &config, output.as_deref(), save_path.as_deref())?;
        }
        Commands::Replay {
            input,
            tuning,
            output,
        } => {
            run_replay(&input, &tuning, output.as_deref())?;
        }
        Commands::MonteCarlo {
            scenario,
            runs,
            seed,
            tuning,
            output,
        } => {
            let config = tuning.resolve(TargetingConfig::default())?;
            run_monte_carlo(scenario, seed, runs, &config, output.as_deref())?;
        }
    }

    Ok(())
}

fn run_scenario(
    kind: ScenarioKind,
    seed: u64,
    config: &TargetingConfig,
    output_path: Option<&Path>,
    replay_path: Option<&Path>,
) -> Result<()> {
    let scenario = Scenario::build(kind, seed);
    println!(
        "Running scenario '{}' (seed={}, duration={:.1}s)...",
        scenario.name, seed, scenario.duration
    );

    let start = std::time::Instant::now();
    let frames = scenario.generate();
    let metrics = sim::evaluate(config, &frames);
    let elapsed = start.elapsed();
    print_summary(&metrics, elapsed.as_secs_f64());

    if let Some(rpath) = replay_path {
        let log = ReplayLog {
            scenario_name: scenario.name.clone(),
            seed,
            sweep_period_us: scenario.sweep_period_us,
            config: config.clone(),
            frames,
        };
        save_replay(&log, rpath)?;
        println!("Replay saved to {}", rpath.display());
    }

    if let Some(opath) = output_path {
        write_metrics(opath, &scenario.name, seed, 1, &metrics, elapsed.as_secs_f64())?;
    }

    Ok(())
}

fn run_replay(input: &Path, tuning: &Tuning, output_path: Option<&Path>) -> Result<()> {
    let log = load_replay(input).with_context(|| format!("reading {}", input.display()))?;
    println!(
        "Replaying '{}' ({} sweeps)...",
        log.scenario_name,
        log.frames.len()
    );

    // Recorded configuration unless overridden
    let config = tuning.resolve(log.config.clone())?;
    let start = std::time::Instant::now();
    let metrics = sim::evaluate(&config, &log.frames);
    let elapsed = start.elapsed();
    print_summary(&metrics, elapsed.as_secs_f64());

    if let Some(opath) = output_path {
        write_metrics(opath, &log.scenario_name, log.seed, 1, &metrics, elapsed.as_secs_f64())?;
    }

    Ok(())
}

fn run_monte_carlo(
    kind: ScenarioKind,
    first_seed: u64,
    runs: u64,
    config: &TargetingConfig,
    output_path: Option<&Path>,
) -> Result<()> {
    println!("Monte-Carlo over {runs} seeds from {first_seed}...");
    let start = std::time::Instant::now();

    let per_run: Vec<TrackingMetrics> = (0..runs)
        .into_par_iter()
        .map(|k| {
            let frames = Scenario::build(kind, first_seed.wrapping_add(k)).generate();
            sim::evaluate(config, &frames)
        })
        .collect();

    let mut pooled = TrackingMetrics::default();
    for m in &per_run {
        pooled.merge(m);
    }
    let worst = per_run
        .iter()
        .map(TrackingMetrics::rmse_position)
        .fold(0.0f64, f64::max);

    let elapsed = start.elapsed();
    print_summary(&pooled, elapsed.as_secs_f64());
    println!("Worst single-run RMSE: {worst:.1} mm");

    if let Some(opath) = output_path {
        let name = Scenario::build(kind, first_seed).name;
        write_metrics(opath, &name, first_seed, runs, &pooled, elapsed.as_secs_f64())?;
    }

    Ok(())
}

fn print_summary(m: &TrackingMetrics, elapsed_s: f64) {
    println!(
        "Done: {} sweeps, {:.1}% valid, RMSE={:.1} mm, resets={}, fire sweeps={}, elapsed={:.3}s",
        m.n_sweeps,
        100.0 * m.valid_fraction(),
        m.rmse_position(),
        m.resets,
        m.fire_sweeps,
        elapsed_s,
    );
}

fn write_metrics(
    path: &Path,
    scenario: &str,
    seed: u64,
    runs: u64,
    metrics: &TrackingMetrics,
    elapsed_s: f64,
) -> Result<()> {
    let json = serde_json::json!({
        "scenario": scenario,
        "seed": seed,
        "runs": runs,
        "elapsed_s": elapsed_s,
        "sweeps": metrics.n_sweeps,
        "valid_fraction": metrics.valid_fraction(),
        "rmse_position_mm": metrics.rmse_position(),
        "resets": metrics.resets,
        "corrections": metrics.corrections,
        "coasts": metrics.coasts,
        "fire_sweeps": metrics.fire_sweeps,
    });
    std::fs::write(path, serde_json::to_string_pretty(&json)?)?;
    println!("Metrics saved to {}", path.display());
    Ok(())
}
