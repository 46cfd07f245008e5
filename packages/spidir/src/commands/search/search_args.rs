use crate::constants::{DEFAULT_DUP_PROB, DEFAULT_LOSS_PROB, DEFAULT_MCMC_ITERS, DEFAULT_NNI_DEPTH, DEFAULT_SPEC_PROB};
use clap::{Parser, ValueHint};
use std::fmt::Debug;
use std::path::PathBuf;

#[derive(Parser, Debug)]
pub struct SpidirSearchArgs {
  /// Path to the gene distance matrix in PHYLIP format
  #[clap(long, short = 'd')]
  #[clap(value_hint = ValueHint::FilePath)]
  pub distmat: PathBuf,

  /// Path to the species tree in Newick format. Every node must be named
  #[clap(long, short = 's')]
  #[clap(value_hint = ValueHint::FilePath)]
  pub stree: PathBuf,

  /// Path to the tab-separated gene-to-species map
  #[clap(long, short = 'S')]
  #[clap(value_hint = ValueHint::FilePath)]
  pub smap: PathBuf,

  /// Path to the rate model parameters, as written by `spidir learn`
  #[clap(long, short = 'p')]
  #[clap(value_hint = ValueHint::FilePath)]
  pub params: PathBuf,

  /// Search strategy. Repeat to run several strategies in order, each starting from the best tree of the previous
  /// one. Possible values: 'greedy', 'mcmc', 'exhaustive', 'none'.
  ///
  /// 'none' stops the search; trees given with `--tree` are still scored.
  #[clap(long)]
  #[clap(default_values_t = vec!["mcmc".to_owned()])]
  pub search: Vec<String>,

  /// Iterations of the Monte Carlo search
  #[clap(long, short = 'i', default_value_t = DEFAULT_MCMC_ITERS)]
  pub iters: usize,

  /// Number of consecutive interchanges tried by the exhaustive search
  #[clap(long, default_value_t = DEFAULT_NNI_DEPTH)]
  pub depth: usize,

  /// Probability of a duplication
  #[clap(long, default_value_t = DEFAULT_DUP_PROB)]
  pub dupprob: f64,

  /// Probability of a speciation
  #[clap(long, default_value_t = DEFAULT_SPEC_PROB)]
  pub specprob: f64,

  /// Probability of a loss
  #[clap(long, default_value_t = DEFAULT_LOSS_PROB)]
  pub lossprob: f64,

  /// Path to a Newick file with candidate trees, scored alongside the search results. Can be repeated.
  ///
  /// Candidates without branch lengths are fitted to the distance matrix first.
  #[clap(long, short = 't')]
  #[clap(value_hint = ValueHint::FilePath)]
  pub tree: Vec<PathBuf>,

  /// Random seed, for reproducible Monte Carlo searches
  #[clap(long)]
  pub seed: Option<u64>,

  /// Path to output Newick file with the best tree. Use `-` to write to standard output
  #[clap(long, short = 'o')]
  #[clap(value_hint = ValueHint::AnyPath)]
  pub output: PathBuf,

  /// Path to output JSON file with the best tree, its log-likelihood and the search history
  #[clap(long)]
  #[clap(value_hint = ValueHint::AnyPath)]
  pub output_json: Option<PathBuf>,

  /// Path to a file receiving detailed per-tree diagnostics of every scored tree
  #[clap(long)]
  #[clap(value_hint = ValueHint::AnyPath)]
  pub diagnostics: Option<PathBuf>,
}
