use crate::fit::distance_matrix::DistanceMatrix;
use crate::fit::least_squares::fit_branch_lengths;
use crate::make_error;
use crate::search::cache::VisitedCache;
use crate::search::evaluator::TreeScorer;
use crate::search::exhaustive::search_exhaustive;
use crate::search::result::{BestTracker, SearchResult};
use crate::tree::tree::{NodeId, Tree};
use crate::utils::observability::ObservabilityConfig;
use eyre::{Report, WrapErr};
use log::Level;

/// Depth of the interchange search after every insertion.
const REFINE_DEPTH: usize = 2;

/// Name for a new internal node which clashes with neither the tree nor any gene still to be inserted.
fn internal_name(tree: &Tree, labels: &[String]) -> String {
  (tree.num_nodes()..)
    .map(|i| format!("n{i}"))
    .find(|name| tree.find(name).is_none() && !labels.contains(name))
    .unwrap_or_default()
}

/// Copy of `tree` with a new leaf joined to the branch above `node`, or above the root.
fn insert_leaf(tree: &Tree, node: NodeId, leaf: &str, labels: &[String]) -> Result<Tree, Report> {
  let mut tree = tree.clone();
  let joint = tree.add_node(internal_name(&tree, labels), 0.0);
  if tree.is_root(node) {
    tree.attach(joint, node)?;
    tree.set_root(joint)?;
  } else {
    tree.replace_child(node, joint)?;
    tree.attach(joint, node)?;
  }
  tree.add_child(joint, leaf, 0.0);
  Ok(tree)
}

/// Builds the tree one gene at a time, in the order of the distance matrix. Each gene goes to the branch where
/// the tree scores best, after which a short interchange search polishes the tree.
///
/// The history covers the last insertion only: scores of trees with fewer genes are not comparable.
pub fn search_greedy(
  distmat: &DistanceMatrix,
  scorer: &mut dyn TreeScorer,
  obs: &ObservabilityConfig,
) -> Result<SearchResult, Report> {
  let labels = distmat.labels();
  if labels.len() < 2 {
    return make_error!("Greedy search requires at least two genes, but got {}", labels.len());
  }

  let mut tree = Tree::new("");
  let root = tree.root();
  tree.add_child(root, &labels[0], 0.0);
  tree.add_child(root, &labels[1], 0.0);
  tree.node_mut(root).name = internal_name(&tree, labels);

  let mut tracker = BestTracker::new();
  let seed = distmat.head(2);
  fit_branch_lengths(&mut tree, &seed)?;
  let mut logl = scorer.score(&mut tree)?;
  tracker.offer(logl, &tree);

  for (k, label) in labels.iter().enumerate().skip(2) {
    obs.emit(Level::Debug, || format!("Adding gene '{label}'"));
    let sub = distmat.head(k + 1);
    tracker = BestTracker::new();

    let mut step_best: Option<(f64, Tree)> = None;
    for node in tree.node_ids() {
      let mut candidate = insert_leaf(&tree, node, label, labels)?;
      fit_branch_lengths(&mut candidate, &sub).wrap_err_with(|| format!("When inserting gene '{label}'"))?;
      let logl = scorer.score(&mut candidate)?;
      tracker.offer(logl, &candidate);
      if step_best.as_ref().map_or(true, |(best, _)| logl >= *best) {
        step_best = Some((logl, candidate));
      }
    }
    let Some((mut top_logl, mut top_tree)) = step_best else {
      return make_error!("Greedy search found no branch to insert gene '{label}'");
    };

    let refined = search_exhaustive(&top_tree, &sub, scorer, REFINE_DEPTH, &mut VisitedCache::new(), obs)?;
    tracker.offer(refined.logl, &refined.tree);
    if refined.logl >= top_logl {
      top_logl = refined.logl;
      top_tree = refined.tree;
    }
    obs.emit(Level::Debug, || format!("Best tree with {} genes: logl {top_logl}", k + 1));
    tree = top_tree;
    logl = top_logl;
  }

  let history = tracker.into_result().map(|result| result.history).unwrap_or_default();
  Ok(SearchResult { tree, logl, history })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::examples::{
    caterpillar_distmat, caterpillar_params, species_map_5, species_tree_5, strict_likelihood_config,
  };
  use crate::search::evaluator::LikelihoodScorer;
  use crate::tree::topology_key::topology_key;
  use pretty_assertions::assert_eq;

  #[test]
  fn inserts_leaf_above_node_and_root() -> Result<(), Report> {
    let labels = ["a", "b", "c"].map(str::to_owned).to_vec();
    let tree = crate::examples::tree_from_edges("r", &[("r", "a", 1.0), ("r", "b", 1.0)]);
    let a = tree.find("a").unwrap();

    let above_a = insert_leaf(&tree, a, "c", &labels)?;
    assert_eq!(topology_key(&above_a).to_string(), "((a,c),b)");
    let above_root = insert_leaf(&tree, tree.root(), "c", &labels)?;
    assert_eq!(topology_key(&above_root).to_string(), "((a,b),c)");
    assert_eq!(above_root.num_nodes(), 5);
    Ok(())
  }

  #[test]
  fn builds_species_topology_gene_by_gene() -> Result<(), Report> {
    let stree = species_tree_5();
    let smap = species_map_5();
    let params = caterpillar_params();
    let config = strict_likelihood_config();
    let obs = ObservabilityConfig::silent();
    let mut scorer = LikelihoodScorer {
      stree: &stree,
      smap: &smap,
      params: &params,
      config: &config,
      obs: &obs,
    };

    let result = search_greedy(&caterpillar_distmat(), &mut scorer, &obs)?;
    assert_eq!(topology_key(&result.tree).to_string(), "(((a1,b1),c1),(d1,e1))");
    assert_eq!(result.tree.leaves().len(), 5);
    assert!(result.history.windows(2).all(|w| w[0] <= w[1]));
    Ok(())
  }
}
