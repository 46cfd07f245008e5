use crate::fit::distance_matrix::DistanceMatrix;
use crate::tree::tree::{NodeId, Tree};
use crate::utils::error::SpidirError;
use eyre::Report;
use log::debug;
use nalgebra::{DMatrix, DVector};
use ndarray::Array2;

/// Singular values below this fraction of the largest one are treated as zero.
const RELATIVE_SINGULAR_TOLERANCE: f64 = 1e-10;

fn fit_error(msg: impl Into<String>) -> Report {
  SpidirError::Fit(msg.into()).into()
}

/// Row of leaf pair `(i, j)`, `i < j`, in the condensed pair ordering.
fn pair_index(n: usize, i: usize, j: usize) -> usize {
  i * n - i * (i + 1) / 2 + j - i - 1
}

/// For every non-root node, which matrix columns (leaves) lie below the edge above it.
fn edge_splits(tree: &Tree, leaf_index: &[Option<usize>], n: usize) -> Vec<(NodeId, Vec<bool>)> {
  let mut below: Vec<Vec<bool>> = vec![vec![]; tree.num_nodes()];
  for node in tree.postorder() {
    let mut side = vec![false; n];
    if let Some(i) = leaf_index[node.0] {
      side[i] = true;
    }
    for child in tree.children(node) {
      for (s, &c) in side.iter_mut().zip(&below[child.0]) {
        *s |= c;
      }
    }
    below[node.0] = side;
  }

  tree
    .preorder()
    .into_iter()
    .filter(|&node| !tree.is_root(node))
    .map(|node| (node, std::mem::take(&mut below[node.0])))
    .collect()
}

/// Assigns branch lengths that best reproduce the pairwise distances in the least-squares sense.
///
/// Rank-deficient systems (e.g. the two edges at a bifurcating root) get the minimum-norm solution.
pub fn fit_branch_lengths(tree: &mut Tree, distmat: &DistanceMatrix) -> Result<(), Report> {
  let temporary_root = if tree.is_rooted() {
    None
  } else {
    let old_root = tree.root();
    let name = tree.new_name();
    let new_root = tree.add_node(name, 0.0);
    tree.attach(new_root, old_root)?;
    tree.set_root(new_root)?;
    Some((new_root, old_root))
  };

  let result = fit_rooted(tree, distmat);

  if let Some((new_root, old_root)) = temporary_root {
    tree.detach(old_root);
    tree.set_root(old_root)?;
    tree.set_dist(old_root, 0.0);
    tree.remove_node(new_root)?;
  }

  result
}

fn fit_rooted(tree: &mut Tree, distmat: &DistanceMatrix) -> Result<(), Report> {
  let n = distmat.len();
  let leaves = tree.leaves();
  if leaves.len() != n {
    return Err(fit_error(format!(
      "tree has {} leaves, but the distance matrix has {n} rows",
      leaves.len()
    )));
  }
  if n < 2 {
    return Err(fit_error("at least two leaves are required"));
  }

  let mut leaf_index = vec![None; tree.num_nodes()];
  for &leaf in &leaves {
    match distmat.index_of(tree.name(leaf)) {
      Some(i) => leaf_index[leaf.0] = Some(i),
      None => return Err(fit_error(format!("leaf '{}' is not among the matrix labels", tree.name(leaf)))),
    }
  }

  let splits = edge_splits(tree, &leaf_index, n);
  if splits.is_empty() {
    return Err(fit_error("tree has no edges"));
  }

  let npairs = n * (n - 1) / 2;
  let mut a = DMatrix::<f64>::zeros(npairs, splits.len());
  let mut b = DVector::<f64>::zeros(npairs);
  for i in 0..n {
    for j in (i + 1)..n {
      let row = pair_index(n, i, j);
      b[row] = distmat.get(i, j);
      for (col, (_, side)) in splits.iter().enumerate() {
        if side[i] != side[j] {
          a[(row, col)] = 1.0;
        }
      }
    }
  }

  let svd = a.clone().svd(true, true);
  let eps = svd.singular_values.amax() * RELATIVE_SINGULAR_TOLERANCE;
  if svd.rank(eps) == 0 {
    return Err(fit_error("least-squares system is singular"));
  }
  let x = svd.solve(&b, eps).map_err(|err| fit_error(format!("least-squares solve failed: {err}")))?;
  if x.iter().any(|v| !v.is_finite()) {
    return Err(fit_error("least-squares solution is not finite"));
  }

  let residual: f64 = (&a * &x - &b).iter().map(|r| r.abs()).sum();
  debug!("Fitted {} branch lengths, total absolute residual {residual:e}", splits.len());

  for ((node, _), len) in splits.iter().zip(x.iter()) {
    tree.set_dist(*node, *len);
  }
  Ok(())
}

/// Path lengths between every pair of leaves, rows and columns ordered by `labels`.
pub fn path_distances(tree: &Tree, labels: &[String]) -> Result<Array2<f64>, Report> {
  let n = labels.len();
  let mut leaf_ids = Vec::with_capacity(n);
  for label in labels {
    match tree.find(label) {
      Some(id) => leaf_ids.push(id),
      None => return Err(fit_error(format!("label '{label}' is not in the tree"))),
    }
  }

  let mut depth = vec![0.0; tree.num_nodes()];
  for node in tree.preorder() {
    if let Some(parent) = tree.parent(node) {
      depth[node.0] = depth[parent.0] + tree.dist(node);
    }
  }

  let ancestors = |mut node: NodeId| {
    let mut path = vec![node];
    while let Some(parent) = tree.parent(node) {
      path.push(parent);
      node = parent;
    }
    path
  };

  let mut dists = Array2::<f64>::zeros((n, n));
  for i in 0..n {
    let up = ancestors(leaf_ids[i]);
    for j in (i + 1)..n {
      let mut lca = leaf_ids[j];
      while !up.contains(&lca) {
        lca = tree.parent(lca).unwrap_or(lca);
      }
      let d = depth[leaf_ids[i].0] + depth[leaf_ids[j].0] - 2.0 * depth[lca.0];
      dists[[i, j]] = d;
      dists[[j, i]] = d;
    }
  }
  Ok(dists)
}
