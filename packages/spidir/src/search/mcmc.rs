use crate::fit::distance_matrix::DistanceMatrix;
use crate::make_internal_report;
use crate::search::cache::VisitedCache;
use crate::search::evaluator::{score_topology, TreeScorer};
use crate::search::nni::propose_random_nni;
use crate::search::result::{BestTracker, SearchResult};
use crate::stats::density::safe_ln;
use crate::tree::topology_key::topology_key;
use crate::tree::tree::Tree;
use crate::utils::observability::ObservabilityConfig;
use eyre::Report;
use log::Level;
use rand::Rng;

const NUM_TOP_TREES_LOGGED: usize = 30;

/// Random walk over topologies. Each step proposes two random interchanges; a better proposal is always
/// accepted, a worse one with probability `exp(logl - current)`.
///
/// `tree` must have its branch lengths fitted already.
pub fn search_mcmc(
  tree: Tree,
  distmat: &DistanceMatrix,
  scorer: &mut dyn TreeScorer,
  iters: usize,
  rng: &mut impl Rng,
  visited: &mut VisitedCache,
  obs: &ObservabilityConfig,
) -> Result<SearchResult, Report> {
  let mut tree = tree;
  let mut current = scorer.score(&mut tree)?;
  visited.insert(topology_key(&tree), current, &tree);

  let mut best = BestTracker::new();
  best.offer(current, &tree);
  obs.emit(Level::Debug, || format!("Iteration 0: logl {current}"));

  for i in 1..iters {
    let mut proposal = tree.clone();
    propose_random_nni(&mut proposal, rng)?;
    propose_random_nni(&mut proposal, rng)?;

    let (key, logl) = score_topology(&mut proposal, distmat, scorer, visited)?;
    if let Some(entry) = visited.get(&key) {
      proposal = entry.tree.clone();
    }

    if best.offer(logl, &proposal) {
      obs.emit(Level::Debug, || format!("Iteration {i}: new best logl {logl}"));
    }

    if logl > current || logl - current > safe_ln(rng.gen::<f64>()) {
      tree = proposal;
      current = logl;
    }
  }

  visited.log_top(obs, NUM_TOP_TREES_LOGGED);

  best
    .into_result()
    .ok_or_else(|| make_internal_report!("Monte Carlo search scored no trees"))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::examples::{
    caterpillar_distmat, caterpillar_params, caterpillar_tree, species_map_5, species_tree_5,
    strict_likelihood_config, tree_from_edges,
  };
  use crate::fit::least_squares::fit_branch_lengths;
  use crate::search::evaluator::tests::CountingScorer;
  use crate::search::evaluator::LikelihoodScorer;
  use crate::tree::topology_key::topology_key;
  use crate::utils::random::get_random_number_generator;
  use approx::assert_abs_diff_eq;
  use pretty_assertions::assert_eq;

  #[test]
  fn improves_on_starting_tree() -> Result<(), Report> {
    let stree = species_tree_5();
    let smap = species_map_5();
    let params = caterpillar_params();
    let config = strict_likelihood_config();
    let obs = ObservabilityConfig::silent();
    let distmat = caterpillar_distmat();
    let mut scorer = LikelihoodScorer {
      stree: &stree,
      smap: &smap,
      params: &params,
      config: &config,
      obs: &obs,
    };

    let mut start = tree_from_edges(
      "g",
      &[
        ("g", "gabc", 0.0),
        ("gabc", "gac", 0.0),
        ("gac", "a1", 0.0),
        ("gac", "c1", 0.0),
        ("gabc", "b1", 0.0),
        ("g", "gde", 0.0),
        ("gde", "d1", 0.0),
        ("gde", "e1", 0.0),
      ],
    );
    fit_branch_lengths(&mut start, &distmat)?;
    let mut rng = get_random_number_generator(Some(42));
    let result = search_mcmc(start, &distmat, &mut scorer, 300, &mut rng, &mut VisitedCache::new(), &obs)?;

    let mut correct = caterpillar_tree();
    let perfect = scorer.score(&mut correct)?;
    assert_eq!(result.history.len(), 300);
    assert!(result.history.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(topology_key(&result.tree).to_string(), "(((a1,b1),c1),(d1,e1))");
    assert_abs_diff_eq!(result.logl, perfect, epsilon = 1e-6);
    Ok(())
  }

  #[test]
  fn does_not_rescore_visited_topologies() -> Result<(), Report> {
    let distmat = caterpillar_distmat();
    let mut start = caterpillar_tree();
    fit_branch_lengths(&mut start, &distmat)?;
    let mut scorer = CountingScorer::default();
    let mut visited = VisitedCache::new();
    let mut rng = get_random_number_generator(Some(7));
    search_mcmc(start, &distmat, &mut scorer, 200, &mut rng, &mut visited, &ObservabilityConfig::silent())?;
    // one call per distinct topology, the start included
    assert_eq!(scorer.calls, visited.len());
    Ok(())
  }
}
