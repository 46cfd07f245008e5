use crate::fit::distance_matrix::DistanceMatrix;
use crate::fit::least_squares::fit_branch_lengths;
use crate::likelihood::config::LikelihoodConfig;
use crate::likelihood::tree_likelihood::tree_log_likelihood;
use crate::model::params::RateModelParams;
use crate::recon::species_map::SpeciesMap;
use crate::search::cache::VisitedCache;
use crate::tree::species_tree::SpeciesTree;
use crate::tree::topology_key::{topology_key, TopologyKey};
use crate::tree::tree::Tree;
use crate::utils::observability::ObservabilityConfig;
use eyre::Report;

/// Scores a gene tree with branch lengths already assigned. Higher is better.
pub trait TreeScorer {
  fn score(&mut self, tree: &mut Tree) -> Result<f64, Report>;
}

/// Scores trees by their log-likelihood under the rate model, estimating the baserate of each tree.
pub struct LikelihoodScorer<'a> {
  pub stree: &'a SpeciesTree,
  pub smap: &'a SpeciesMap,
  pub params: &'a RateModelParams,
  pub config: &'a LikelihoodConfig,
  pub obs: &'a ObservabilityConfig,
}

impl TreeScorer for LikelihoodScorer<'_> {
  fn score(&mut self, tree: &mut Tree) -> Result<f64, Report> {
    tree_log_likelihood(tree, self.stree, self.smap, self.params, self.config, None, self.obs)
  }
}

/// Fits branch lengths and scores the tree, unless its topology has been scored before, in which case the cached
/// score is returned and the tree is left untouched.
pub fn score_topology(
  tree: &mut Tree,
  distmat: &DistanceMatrix,
  scorer: &mut dyn TreeScorer,
  visited: &mut VisitedCache,
) -> Result<(TopologyKey, f64), Report> {
  let key = topology_key(tree);
  if let Some(entry) = visited.get(&key) {
    return Ok((key, entry.logl));
  }
  fit_branch_lengths(tree, distmat)?;
  let logl = scorer.score(tree)?;
  visited.insert(key.clone(), logl, tree);
  Ok((key, logl))
}
