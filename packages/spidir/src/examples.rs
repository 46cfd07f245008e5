//! Small hand-built inputs shared by the unit tests.

use crate::fit::distance_matrix::DistanceMatrix;
use crate::likelihood::config::LikelihoodConfig;
use crate::model::params::{BranchRate, GammaParams, RateModelParams};
use crate::recon::species_map::SpeciesMap;
use crate::tree::species_tree::SpeciesTree;
use crate::tree::tree::{NodeId, Tree};
use ndarray::array;
use std::collections::{BTreeMap, HashMap};

/// Builds a tree from `(parent, child, dist)` triples. Parents must appear before their children.
pub fn tree_from_edges(root: &str, edges: &[(&str, &str, f64)]) -> Tree {
  let mut tree = Tree::new(root);
  let mut ids: HashMap<&str, NodeId> = HashMap::from([(root, tree.root())]);
  for &(parent, child, dist) in edges {
    let id = tree.add_child(ids[parent], child, dist);
    ids.insert(child, id);
  }
  tree
}

/// `(((A,B)AB,C)ABC,(D,E)DE)root`
pub fn species_tree_5() -> SpeciesTree {
  let tree = tree_from_edges(
    "root",
    &[
      ("root", "ABC", 1.0),
      ("ABC", "AB", 1.0),
      ("AB", "A", 1.0),
      ("AB", "B", 1.0),
      ("ABC", "C", 1.0),
      ("root", "DE", 1.0),
      ("DE", "D", 1.0),
      ("DE", "E", 1.0),
    ],
  );
  SpeciesTree::new(tree).unwrap()
}

/// Genes are named after their species in lower case, followed by a copy number: `a1`, `a2`, `b1`, ...
pub fn species_map_5() -> SpeciesMap {
  SpeciesMap::from_rules([("a*", "A"), ("b*", "B"), ("c*", "C"), ("d*", "D"), ("e*", "E")]).unwrap()
}

/// Additive distances of the unrooted tree `((a1,b1),c1,(d1,e1))` with every branch of length 1.
pub fn caterpillar_distmat() -> DistanceMatrix {
  let labels = ["a1", "b1", "c1", "d1", "e1"].map(str::to_owned).to_vec();
  let dists = array![
    [0.0, 2.0, 3.0, 4.0, 4.0],
    [2.0, 0.0, 3.0, 4.0, 4.0],
    [3.0, 3.0, 0.0, 3.0, 3.0],
    [4.0, 4.0, 3.0, 0.0, 2.0],
    [4.0, 4.0, 3.0, 2.0, 0.0],
  ];
  DistanceMatrix::new(labels, dists).unwrap()
}

/// Rates under which the caterpillar tree, rooted like `species_tree_5`, fits perfectly with baserate 7.
pub fn caterpillar_params() -> RateModelParams {
  let leaf = BranchRate {
    mean: 1.0 / 7.0,
    sdev: 0.05,
  };
  let half = BranchRate {
    mean: 0.5 / 7.0,
    sdev: 0.05,
  };
  let branches: BTreeMap<String, BranchRate> = [
    ("A", leaf),
    ("B", leaf),
    ("AB", leaf),
    ("C", leaf),
    ("ABC", half),
    ("D", leaf),
    ("E", leaf),
    ("DE", half),
    ("root", BranchRate::FREE),
  ]
  .into_iter()
  .map(|(name, rate)| (name.to_owned(), rate))
  .collect();

  RateModelParams {
    branches,
    baserate: GammaParams { shape: 8.0, rate: 1.0 },
  }
}

/// Duplications and losses are practically forbidden.
pub fn strict_likelihood_config() -> LikelihoodConfig {
  LikelihoodConfig {
    dup_prob: 1e-20,
    spec_prob: 1.0,
    loss_prob: 1e-20,
  }
}

/// The caterpillar tree rooted like the species tree, with lengths fitted to `caterpillar_distmat`.
pub fn caterpillar_tree() -> Tree {
  tree_from_edges(
    "g",
    &[
      ("g", "gabc", 0.5),
      ("gabc", "gab", 1.0),
      ("gab", "a1", 1.0),
      ("gab", "b1", 1.0),
      ("gabc", "c1", 1.0),
      ("g", "gde", 0.5),
      ("gde", "d1", 1.0),
      ("gde", "e1", 1.0),
    ],
  )
}
