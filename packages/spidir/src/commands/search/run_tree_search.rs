use crate::commands::search::search_args::SpidirSearchArgs;
use crate::io::distmat::read_distmat_file;
use crate::io::file::create_file;
use crate::io::json::{json_write_file, JsonPretty};
use crate::io::nwk::{read_nwk_file, read_nwk_file_many, write_nwk_file, WriteNwkOptions};
use crate::io::params::read_params_file;
use crate::io::species_map::read_species_map_file;
use crate::likelihood::config::LikelihoodConfig;
use crate::search::result::SearchResult;
use crate::search::run_search::{run_search, SearchConfig};
use crate::tree::species_tree::SpeciesTree;
use crate::utils::observability::ObservabilityConfig;
use eyre::{Report, WrapErr};
use log::{info, LevelFilter};

pub fn run_tree_search(search_args: &SpidirSearchArgs) -> Result<SearchResult, Report> {
  let SpidirSearchArgs {
    distmat,
    stree,
    smap,
    params,
    search,
    iters,
    depth,
    dupprob,
    specprob,
    lossprob,
    tree,
    seed,
    output,
    output_json,
    diagnostics,
  } = search_args;

  let distmat = read_distmat_file(distmat)?;
  let stree = SpeciesTree::new(read_nwk_file(stree)?).wrap_err("When loading species tree")?;
  let smap = read_species_map_file(smap)?;
  let params = read_params_file(params)?;

  let mut trees = vec![];
  for filepath in tree {
    trees.extend(read_nwk_file_many(filepath)?);
  }

  let config = SearchConfig {
    iters: *iters,
    search: search.clone(),
    depth: *depth,
    likelihood: LikelihoodConfig {
      dup_prob: *dupprob,
      spec_prob: *specprob,
      loss_prob: *lossprob,
    },
    trees,
    seed: *seed,
  };

  let obs = match diagnostics {
    Some(filepath) => ObservabilityConfig::with_sink(LevelFilter::Trace, create_file(filepath)?),
    None => ObservabilityConfig::default(),
  };

  let result = run_search(&distmat, &stree, &smap, &params, &config, &obs)?;
  info!("Best tree: logl {}", result.logl);

  write_nwk_file(output, &result.tree, &WriteNwkOptions::default())?;
  if let Some(output_json) = output_json {
    json_write_file(output_json, &result, JsonPretty(true))?;
  }

  Ok(result)
}
