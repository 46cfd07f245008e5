use crate::fit::distance_matrix::DistanceMatrix;
use crate::make_internal_error;
use crate::search::cache::VisitedCache;
use crate::search::evaluator::{score_topology, TreeScorer};
use crate::search::nni::{nni_branches, propose_nni};
use crate::search::result::{BestTracker, SearchResult};
use crate::tree::topology_key::TopologyKey;
use crate::tree::tree::Tree;
use crate::utils::observability::ObservabilityConfig;
use eyre::Report;

/// How many of the best visited topologies are logged.
const NUM_TOP_TREES_LOGGED: usize = 40;

/// Tries every combination of up to `depth` nearest-neighbor interchanges from `tree` and returns the best tree.
pub fn search_exhaustive(
  tree: &Tree,
  distmat: &DistanceMatrix,
  scorer: &mut dyn TreeScorer,
  depth: usize,
  visited: &mut VisitedCache,
  obs: &ObservabilityConfig,
) -> Result<SearchResult, Report> {
  let mut tree = tree.clone();
  let mut best = BestTracker::new();
  explore(&mut tree, distmat, scorer, depth.max(1), visited, &mut best)?;
  visited.log_top(obs, NUM_TOP_TREES_LOGGED);

  match best.into_result() {
    Some(result) => Ok(result),
    None => make_internal_error!("Exhaustive search scored no trees"),
  }
}

fn explore(
  tree: &mut Tree,
  distmat: &DistanceMatrix,
  scorer: &mut dyn TreeScorer,
  depth: usize,
  visited: &mut VisitedCache,
  best: &mut BestTracker,
) -> Result<(), Report> {
  let (key, logl) = score_topology(tree, distmat, scorer, visited)?;
  offer_visited(best, visited, &key, logl, tree);

  for node in nni_branches(tree) {
    for change in 0..2 {
      propose_nni(tree, node, change)?;
      if depth > 1 {
        explore(tree, distmat, scorer, depth - 1, visited, best)?;
      } else {
        let (key, logl) = score_topology(tree, distmat, scorer, visited)?;
        offer_visited(best, visited, &key, logl, tree);
      }
      propose_nni(tree, node, change)?;
    }
  }
  Ok(())
}

/// Offers the cached snapshot of the topology, which carries the fitted branch lengths.
fn offer_visited(best: &mut BestTracker, visited: &VisitedCache, key: &TopologyKey, logl: f64, tree: &Tree) {
  match visited.get(key) {
    Some(entry) => best.offer(logl, &entry.tree),
    None => best.offer(logl, tree),
  };
}
