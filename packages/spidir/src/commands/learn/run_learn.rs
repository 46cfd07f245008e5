use crate::commands::learn::learn_args::SpidirLearnArgs;
use crate::io::nwk::{read_nwk_file, read_nwk_file_many};
use crate::io::params::write_params_file;
use crate::io::species_map::read_species_map_file;
use crate::model::learn::{learn_rate_model, LearnOptions};
use crate::tree::species_tree::SpeciesTree;
use crate::utils::observability::ObservabilityConfig;
use eyre::{Report, WrapErr};
use log::info;

pub fn run_learn(learn_args: &SpidirLearnArgs) -> Result<(), Report> {
  let SpidirLearnArgs {
    trees,
    stree,
    smap,
    output,
    relative,
    em_iters,
    max_tree_length,
  } = learn_args;

  let stree = SpeciesTree::new(read_nwk_file(stree)?).wrap_err("When loading species tree")?;
  let smap = read_species_map_file(smap)?;

  let mut gene_trees = vec![];
  for filepath in trees {
    gene_trees.extend(read_nwk_file_many(filepath)?);
  }
  info!("Read {} gene trees from {} files", gene_trees.len(), trees.len());

  let options = LearnOptions {
    relative_to: *relative,
    em_iterations: *em_iters,
    max_tree_length: *max_tree_length,
  };
  let params = learn_rate_model(&gene_trees, &stree, &smap, &options, &ObservabilityConfig::default())?;

  write_params_file(output, &params)
}
