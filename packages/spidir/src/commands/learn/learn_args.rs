use crate::constants::MAX_TREE_LENGTH;
use crate::model::learn::RelativeLength;
use clap::{Parser, ValueHint};
use std::fmt::Debug;
use std::path::PathBuf;

#[derive(Parser, Debug)]
pub struct SpidirLearnArgs {
  /// Path to one or multiple Newick files with gene trees. A file may contain any number of `;`-terminated trees.
  ///
  /// Only trees with the topology of the species tree contribute to the rate model.
  #[clap(value_hint = ValueHint::FilePath)]
  #[clap(required = true)]
  pub trees: Vec<PathBuf>,

  /// Path to the species tree in Newick format. Every node must be named
  #[clap(long, short = 's')]
  #[clap(value_hint = ValueHint::FilePath)]
  pub stree: PathBuf,

  /// Path to the tab-separated gene-to-species map. Patterns may be exact names, `prefix*` or `*suffix`
  #[clap(long, short = 'S')]
  #[clap(value_hint = ValueHint::FilePath)]
  pub smap: PathBuf,

  /// Path to output file with the learned rate model parameters. Use `-` to write to standard output
  #[clap(long, short = 'o')]
  #[clap(value_hint = ValueHint::AnyPath)]
  pub output: PathBuf,

  /// What branch lengths are made relative to before fitting the branch rate distributions
  #[clap(long, value_enum, default_value_t = RelativeLength::default())]
  pub relative: RelativeLength,

  /// Rounds of expectation-maximization when lengths are made relative to baserates
  #[clap(long, default_value_t = 10)]
  pub em_iters: usize,

  /// Gene trees at least this long are left out of the baserate prior
  #[clap(long, default_value_t = MAX_TREE_LENGTH)]
  pub max_tree_length: f64,
}
