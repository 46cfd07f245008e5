use crate::constants::{DEFAULT_DUP_PROB, DEFAULT_LOSS_PROB, DEFAULT_SPEC_PROB};
use clap::{Parser, ValueHint};
use std::fmt::Debug;
use std::path::PathBuf;

#[derive(Parser, Debug)]
pub struct SpidirLoglArgs {
  /// Path to one or multiple Newick files with gene trees to score
  #[clap(value_hint = ValueHint::FilePath)]
  #[clap(required = true)]
  pub trees: Vec<PathBuf>,

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

  /// Use this baserate instead of estimating one per tree
  #[clap(long)]
  pub baserate: Option<f64>,

  /// Probability of a duplication
  #[clap(long, default_value_t = DEFAULT_DUP_PROB)]
  pub dupprob: f64,

  /// Probability of a speciation
  #[clap(long, default_value_t = DEFAULT_SPEC_PROB)]
  pub specprob: f64,

  /// Probability of a loss
  #[clap(long, default_value_t = DEFAULT_LOSS_PROB)]
  pub lossprob: f64,
}
