//! K-Means++ clustering over two joined point tables
//! `fit` seeds with K-Means++, refines with Lloyd rounds and prints the seed
//! identifiers followed by the final centroids. `elbow` sweeps K and plots the
//! inertia curve to help choose it.

use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use kmeans::{
    DEFAULT_ITERATION, DEFAULT_SEED, EmptyClusterPolicy, KmeansParams, KmeansPlusPlus, SeedingFallback, fit,
};

use crate::{
    loading::load_datapoints,
    output::{format_report, write_json},
    validate::{GENERIC_ERROR_MSG, parse_cluster_count, parse_delimiter, parse_epsilon, parse_iteration, user_message},
};

mod elbow;
mod loading;
mod output;
mod validate;

/// Command-line arguments for the clustering program
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Seed, refine and print the centroids
    Fit(FitArgs),
    /// Inertia for K = 1..max-k, with the elbow plotted to an SVG
    Elbow(ElbowArgs),
}

#[derive(ClapArgs, Debug)]
struct FitArgs {
    /// Number of clusters, 1 < K < N
    #[arg(allow_negative_numbers = true)]
    k: String,
    /// [MAX_ITER] EPSILON TABLE_1 TABLE_2
    /// (MAX_ITER defaults to 300 and must satisfy 1 < MAX_ITER < 1000)
    #[arg(num_args = 3..=4, required = true, allow_negative_numbers = true, value_name = "ARGS")]
    rest: Vec<String>,
    /// Random seed for reproducibility
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
    /// Field delimiter of both tables
    #[arg(long, default_value_t = ',')]
    delimiter: char,
    /// Also write parameters and the full report as JSON
    #[arg(long)]
    json: Option<PathBuf>,
    /// Handling of a centroid that attracts no points
    #[arg(long, value_enum, default_value_t = EmptyCluster::Reseed)]
    empty_cluster: EmptyCluster,
    /// Handling of seeding when every remaining point sits on a chosen seed
    #[arg(long, value_enum, default_value_t = ZeroWeights::Uniform)]
    zero_weights: ZeroWeights,
}

#[derive(ClapArgs, Debug)]
struct ElbowArgs {
    table_1: PathBuf,
    table_2: PathBuf,
    /// Largest K to try (capped at N - 1)
    #[arg(long, default_value_t = 10)]
    max_k: usize,
    #[arg(long, default_value_t = DEFAULT_ITERATION)]
    max_iter: usize,
    #[arg(long, default_value_t = 0.0001)]
    epsilon: f64,
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
    #[arg(long, default_value_t = ',')]
    delimiter: char,
    /// Where to save the plot
    #[arg(long, default_value = "elbow.svg")]
    output: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
enum EmptyCluster {
    Reseed,
    Keep,
    Fail,
}

impl From<EmptyCluster> for EmptyClusterPolicy {
    fn from(value: EmptyCluster) -> Self {
        match value {
            EmptyCluster::Reseed => EmptyClusterPolicy::Reseed,
            EmptyCluster::Keep => EmptyClusterPolicy::Keep,
            EmptyCluster::Fail => EmptyClusterPolicy::Fail,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
enum ZeroWeights {
    Uniform,
    Fail,
}

impl From<ZeroWeights> for SeedingFallback {
    fn from(value: ZeroWeights) -> Self {
        match value {
            ZeroWeights::Uniform => SeedingFallback::Uniform,
            ZeroWeights::Fail => SeedingFallback::Fail,
        }
    }
}

/// Split `[MAX_ITER] EPSILON TABLE_1 TABLE_2` into its parts.
/// Iteration is checked before epsilon, which is checked before the data is read.
fn split_fit_args(rest: &[String]) -> Result<(usize, f64, PathBuf, PathBuf)> {
    let (max_iteration, tail) = match rest {
        [iteration, tail @ ..] if rest.len() == 4 => (parse_iteration(iteration)?, tail),
        _ => (DEFAULT_ITERATION, rest),
    };
    match tail {
        [epsilon, table_1, table_2] => {
            let epsilon = parse_epsilon(epsilon)?;
            Ok((max_iteration, epsilon, PathBuf::from(table_1), PathBuf::from(table_2)))
        }
        _ => anyhow::bail!("expected [MAX_ITER] EPSILON TABLE_1 TABLE_2, got {} values", rest.len()),
    }
}

fn run_fit(args: FitArgs) -> Result<()> {
    let (max_iteration, epsilon, table_1, table_2) = split_fit_args(&args.rest)?;
    let delimiter = parse_delimiter(args.delimiter)?;

    let data = load_datapoints(&table_1, &table_2, delimiter)?;
    let k = parse_cluster_count(&args.k, data.len())?;

    let params = KmeansParams::new(k, max_iteration, epsilon)?
        .with_seed(args.seed)
        .with_empty_cluster(args.empty_cluster.into())
        .with_seeding_fallback(args.zero_weights.into());
    log::info!("{:<32}{:?}", "parameters", params);

    let report = fit(&data, &mut KmeansPlusPlus::new(params.clone())).context("fitting kmeans++")?;
    print!("{}", format_report(&report));

    if let Some(path) = args.json.as_deref() {
        write_json(&params, &report, path)?;
    }
    Ok(())
}

fn run_elbow(args: ElbowArgs) -> Result<()> {
    let delimiter = parse_delimiter(args.delimiter)?;
    let data = load_datapoints(&args.table_1, &args.table_2, delimiter)?;

    let curve = elbow::inertia_curve(&data, args.max_k, args.max_iter, args.epsilon, args.seed)?;
    println!("k,inertia");
    curve.iter().for_each(|(k, inertia)| println!("{},{:.4}", k, inertia));

    if let Some(knee) = elbow::find_elbow(&curve) {
        println!("elbow at k={}", knee.0);
        elbow::plot_curve(&curve, knee, &args.output)?;
    }
    Ok(())
}

/// Message for a command line clap could not parse. `None` for `--help` and
/// `--version`, which clap prints itself.
fn parse_failure_message(err: &clap::Error) -> Option<&'static str> {
    err.use_stderr().then_some(GENERIC_ERROR_MSG)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let args: Args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => match parse_failure_message(&err) {
            Some(message) => {
                log::error!("{}", err);
                println!("{}", message);
                return ExitCode::FAILURE;
            }
            None => err.exit(),
        },
    };
    let result = match args.command {
        Command::Fit(fit_args) => run_fit(fit_args),
        Command::Elbow(elbow_args) => run_elbow(elbow_args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{:#}", err);
            println!("{}", user_message(&err));
            ExitCode::FAILURE
        }
    }
}

// Example command line usage:
// cargo run --release -p kmeans_pp -- fit 3 100 0.01 ./data/input_1.txt ./data/input_2.txt
