//! `dtseg`: evaluate drift-tube segment candidates from the command line.
#![allow(clippy::uninlined_format_args, clippy::cast_precision_loss)]

mod input;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use dtseg_algorithms::{evaluate_batch, BatchReport, Evaluation, SelectionStatistics};
use dtseg_core::{
    ClusterForFit, EvaluatorConfig, ExtendedSegmentCandidate, FittedSegment, LocalError,
    LocalPoint, LocalVector, SuperLayerCluster, SuperLayerId,
};
use log::{debug, info};
use serde::Serialize;
use thiserror::Error;

use input::{ConfigFile, Overrides};

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Core error: {0}")]
    Core(#[from] dtseg_core::Error),

    #[error("missing quality cut '{0}': set it in the config file or on the command line")]
    MissingCut(&'static str),

    #[error("invalid triplet '{0}': expected x,y,z")]
    Triplet(String),
}

/// Drift-tube segment quality evaluation.
#[derive(Parser)]
#[command(name = "dtseg")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Evaluator configuration shared by all commands.
#[derive(Args, Debug)]
struct ConfigArgs {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Minimum number of hits in the base segment
    #[arg(long)]
    n_hits_min: Option<usize>,

    /// Upper bound on chi2/ndof (doubled for superlayer 2)
    #[arg(long)]
    chi2_max: Option<f64>,

    /// Multiplier on the cluster x uncertainty
    #[arg(long)]
    err_scale_factor: Option<f64>,

    /// Minimum compatibility window half-width (cm)
    #[arg(long)]
    min_error: Option<f64>,
}

impl ConfigArgs {
    fn resolve(&self) -> Result<EvaluatorConfig> {
        let file = match &self.config {
            Some(path) => input::read_config(path)?,
            None => ConfigFile::default(),
        };
        let config = file.resolve(Overrides {
            n_hits_min: self.n_hits_min,
            chi2_max: self.chi2_max,
            err_scale_factor: self.err_scale_factor,
            min_error: self.min_error,
        })?;
        debug!("configuration: {:?}", config);
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate every segment candidate of an event file
    Evaluate {
        /// Event file (JSON with "candidates" and "clusters")
        input: PathBuf,

        #[command(flatten)]
        config: ConfigArgs,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Test one cluster against one segment
    Check(CheckArgs),
}

/// Segment and cluster given on the command line.
#[derive(Args, Debug)]
struct CheckArgs {
    /// Segment position x,y,z (cm)
    #[arg(long, value_parser = parse_triplet, allow_hyphen_values = true)]
    position: [f64; 3],

    /// Segment direction x,y,z
    #[arg(long, value_parser = parse_triplet, allow_hyphen_values = true)]
    direction: [f64; 3],

    /// Superlayer index of the segment (1..=3)
    #[arg(long, default_value = "1")]
    superlayer: u8,

    /// Hits in the segment fit
    #[arg(long)]
    n_hits: usize,

    /// Chi2 of the segment fit
    #[arg(long)]
    chi2: f64,

    /// Degrees of freedom of the segment fit
    #[arg(long)]
    ndof: u32,

    /// Cluster position x,y,z (cm)
    #[arg(long, value_parser = parse_triplet, allow_hyphen_values = true)]
    cluster: [f64; 3],

    /// Cluster x variance (cm^2)
    #[arg(long)]
    cluster_xx: f64,

    #[command(flatten)]
    config: ConfigArgs,
}

fn parse_triplet(value: &str) -> std::result::Result<[f64; 3], String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    let invalid = || CliError::Triplet(value.to_string()).to_string();
    if parts.len() != 3 {
        return Err(invalid());
    }
    let mut out = [0.0; 3];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = part.parse().map_err(|_| invalid())?;
    }
    Ok(out)
}

/// JSON form of a batch report.
#[derive(Serialize)]
struct JsonReport<'a> {
    evaluations: &'a [Evaluation],
    failures: Vec<JsonFailure>,
    best: Option<usize>,
    statistics: &'a SelectionStatistics,
}

#[derive(Serialize)]
struct JsonFailure {
    index: usize,
    error: String,
}

impl<'a> From<&'a BatchReport> for JsonReport<'a> {
    fn from(report: &'a BatchReport) -> Self {
        Self {
            evaluations: &report.evaluations,
            failures: report
                .failures
                .iter()
                .map(|failure| JsonFailure {
                    index: failure.index,
                    error: failure.error.to_string(),
                })
                .collect(),
            best: report.best,
            statistics: &report.statistics,
        }
    }
}

fn write_table(out: &mut impl Write, report: &BatchReport) -> Result<()> {
    writeln!(
        out,
        "{:<6} | {:<24} | {:>5} | {:>5} | {:>8} | {:>10} | {:<4}",
        "Index", "Superlayer", "Base", "Hits", "Clusters", "chi2/ndof", "Good"
    )?;
    writeln!(out, "{:-<82}", "")?;
    for evaluation in &report.evaluations {
        let chi2 = evaluation
            .reduced_chi2
            .map_or_else(|| "-".to_string(), |value| format!("{:.3}", value));
        let marker = if report.best == Some(evaluation.index) {
            " *"
        } else {
            ""
        };
        writeln!(
            out,
            "{:<6} | {:<24} | {:>5} | {:>5} | {:>8} | {:>10} | {:<4}{}",
            evaluation.index,
            evaluation.superlayer.to_string(),
            evaluation.base_hits,
            evaluation.n_hits,
            evaluation.attached_clusters.len(),
            chi2,
            if evaluation.good { "yes" } else { "no" },
            marker
        )?;
    }
    for failure in &report.failures {
        writeln!(out, "{:<6} | failed: {}", failure.index, failure.error)?;
    }
    Ok(())
}

fn write_summary(out: &mut impl Write, stats: &SelectionStatistics) -> Result<()> {
    writeln!(out, "Candidates: {}", stats.candidates)?;
    writeln!(out, "Good: {}", stats.good)?;
    writeln!(out, "Rejected: {}", stats.rejected)?;
    writeln!(out, "Failed: {}", stats.failed)?;
    writeln!(out, "Attached clusters: {}", stats.attached_clusters)?;
    if let Some(efficiency) = stats.efficiency() {
        writeln!(out, "Efficiency: {:.1}%", efficiency * 100.0)?;
    }
    if let Some(mean) = stats.mean_good_reduced_chi2 {
        writeln!(out, "Mean chi2/ndof (good): {:.3}", mean)?;
    }
    Ok(())
}

/// Evaluates an event file and writes the report.
fn run_evaluate(
    out: &mut impl Write,
    input: &Path,
    config: &EvaluatorConfig,
    json: bool,
) -> Result<()> {
    let event = input::read_event(input)?;

    let start = Instant::now();
    let report = evaluate_batch(&event.candidates, &event.clusters, config)?;
    info!(
        "evaluated {} candidates in {:.3} ms",
        event.candidates.len(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    if json {
        serde_json::to_writer_pretty(&mut *out, &JsonReport::from(&report))?;
        writeln!(out)?;
    } else {
        write_table(out, &report)?;
        writeln!(out)?;
        write_summary(out, &report.statistics)?;
    }
    Ok(())
}

/// Tests one cluster against one segment and writes the verdicts.
///
/// Nothing is written unless both verdicts can be computed.
fn run_check(out: &mut impl Write, args: &CheckArgs, config: &EvaluatorConfig) -> Result<()> {
    let sl = SuperLayerId::new(0, 1, 1, args.superlayer)?;
    let [px, py, pz] = args.position;
    let [dx, dy, dz] = args.direction;
    let [cx, cy, cz] = args.cluster;
    let segment = FittedSegment::new(
        sl,
        LocalPoint::new(px, py, pz),
        LocalVector::new(dx, dy, dz),
        args.n_hits,
    )
    .with_chi2(args.chi2)
    .with_ndof(args.ndof);
    let cluster = ClusterForFit::new(
        SuperLayerCluster::new(sl, 1),
        LocalPoint::new(cx, cy, cz),
        LocalError::from_xx(args.cluster_xx),
    );

    let candidate = ExtendedSegmentCandidate::new(segment, *config);
    let compatible = candidate.is_compatible(&cluster)?;
    let good = candidate.good()?;
    let predicted = candidate.predicted_position(cluster.pos.z)?;
    let residual = candidate.residual(&cluster)?;
    let window = config.compatibility.window(&cluster.err);

    writeln!(
        out,
        "Predicted: ({:.3}, {:.3}, {:.3})",
        predicted.x, predicted.y, predicted.z
    )?;
    writeln!(out, "Residual x: {:.3} cm", residual)?;
    writeln!(out, "Window: {:.3} cm", window)?;
    writeln!(out, "Compatible: {}", compatible)?;
    writeln!(out, "Good: {}", good)?;
    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Evaluate {
            input,
            config,
            json,
        } => {
            let config = config.resolve()?;
            run_evaluate(&mut out, &input, &config, json)?;
        }

        Commands::Check(args) => {
            let config = args.config.resolve()?;
            run_check(&mut out, &args, &config)?;
        }
    }

    Ok(())
}
