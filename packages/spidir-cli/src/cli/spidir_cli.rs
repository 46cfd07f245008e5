use crate::cli::verbosity::Verbosity;
use clap::{Parser, Subcommand};
use eyre::Report;
use spidir::commands::learn::learn_args::SpidirLearnArgs;
use spidir::commands::logl::logl_args::SpidirLoglArgs;
use spidir::commands::search::search_args::SpidirSearchArgs;
use spidir::utils::global_init::setup_logger;
use std::fmt::Debug;

#[derive(Parser, Debug)]
#[clap(name = "spidir")]
#[clap(author, version)]
#[clap(verbatim_doc_comment)]
/// Species-informed gene-tree reconstruction
///
/// Learns a model of branch rates from gene trees that follow the species tree, then searches for the gene tree
/// topology that best explains a distance matrix under that model.
pub struct SpidirArgs {
  #[clap(subcommand)]
  pub command: SpidirCommands,

  #[clap(flatten)]
  pub verbosity: Verbosity,
}

#[derive(Subcommand, Debug)]
#[clap(verbatim_doc_comment)]
pub enum SpidirCommands {
  /// Learns the rate model (per-species-branch rate distributions and the baserate prior) from a corpus of gene trees.
  Learn(SpidirLearnArgs),

  /// Searches for the gene tree that best explains a distance matrix under a learned rate model. Writes the best tree in Newick format.
  Search(SpidirSearchArgs),

  /// Prints the log-likelihood of each given gene tree under a learned rate model.
  Logl(SpidirLoglArgs),
}

pub fn spidir_parse_cli_args() -> Result<SpidirArgs, Report> {
  let args = SpidirArgs::parse();
  setup_logger(args.verbosity.get_filter_level());
  Ok(args)
}

#[cfg(test)]
mod tests {
  use super::*;
  use clap::CommandFactory;
  use log::LevelFilter;
  use pretty_assertions::assert_eq;

  #[test]
  fn command_definition_is_consistent() {
    SpidirArgs::command().debug_assert();
  }

  #[test]
  fn parses_repeated_search_strategies() -> Result<(), Report> {
    let args = SpidirArgs::try_parse_from([
      "spidir", "search", "-d", "g.dist", "-s", "s.nwk", "-S", "g.smap", "-p", "params.txt", "--search", "greedy",
      "--search", "mcmc", "-o", "out.nwk", "-vv",
    ])?;
    let SpidirCommands::Search(search_args) = args.command else {
      panic!("expected search command");
    };
    assert_eq!(search_args.search, vec!["greedy", "mcmc"]);
    assert_eq!(args.verbosity.get_filter_level(), LevelFilter::Debug);
    Ok(())
  }

  #[test]
  fn silent_overrides_default_verbosity() -> Result<(), Report> {
    let args = SpidirArgs::try_parse_from([
      "spidir", "logl", "-s", "s.nwk", "-S", "g.smap", "-p", "params.txt", "--silent", "trees.nwk",
    ])?;
    assert_eq!(args.verbosity.get_filter_level(), LevelFilter::Off);
    Ok(())
  }
}
