use crate::fit::distance_matrix::DistanceMatrix;
use crate::make_error;
use crate::tree::tree::{NodeId, Tree};
use eyre::Report;
use ndarray::Array2;

/// Builds an initial topology by neighbor-joining. The result has a trifurcating root.
pub fn neighbor_join(distmat: &DistanceMatrix) -> Result<Tree, Report> {
  let labels = distmat.labels();
  let n = labels.len();
  if n == 0 {
    return make_error!("Neighbor-joining requires at least one gene");
  }

  let mut tree = Tree::new(&labels[0]);
  if n == 1 {
    return Ok(tree);
  }
  for label in &labels[1..] {
    tree.add_node(label, 0.0);
  }

  if n == 2 {
    let d = distmat.get(0, 1);
    let root = tree.add_node(tree.new_name(), 0.0);
    for leaf in [NodeId(0), NodeId(1)] {
      tree.attach(root, leaf)?;
      tree.set_dist(leaf, d / 2.0);
    }
    tree.set_root(root)?;
    return Ok(tree);
  }

  // Distances between arena nodes; every join adds one node
  let mut dist = Array2::<f64>::zeros((2 * n, 2 * n));
  dist.slice_mut(ndarray::s![..n, ..n]).assign(distmat.dists());

  let mut active: Vec<NodeId> = (0..n).map(NodeId).collect();

  while active.len() > 2 {
    let m = active.len() as f64;
    let r: Vec<f64> = active
      .iter()
      .map(|&i| active.iter().map(|&k| dist[[i.0, k.0]]).sum::<f64>() / (m - 2.0))
      .collect();

    let mut best: Option<(f64, usize, usize)> = None;
    for a in 0..active.len() {
      for b in (a + 1)..active.len() {
        let q = dist[[active[a].0, active[b].0]] - r[a] - r[b];
        if best.map_or(true, |(best_q, _, _)| q < best_q) {
          best = Some((q, a, b));
        }
      }
    }
    let Some((_, a, b)) = best else {
      return make_error!("Neighbor-joining: no pair of nodes to join");
    };

    let (i, j) = (active[a], active[b]);
    let dij = dist[[i.0, j.0]];
    let di = (dij + r[a] - r[b]) / 2.0;
    let dj = dij - di;

    let u = tree.add_node(tree.new_name(), 0.0);
    tree.attach(u, i)?;
    tree.attach(u, j)?;
    tree.set_dist(i, di);
    tree.set_dist(j, dj);

    active.remove(b);
    active.remove(a);
    for &k in &active {
      let d = (dist[[i.0, k.0]] + dist[[j.0, k.0]] - dij) / 2.0;
      dist[[u.0, k.0]] = d;
      dist[[k.0, u.0]] = d;
    }
    active.push(u);
  }

  let (x, y) = (active[0], active[1]);
  let (parent, child) = match (tree.is_leaf(x), tree.is_leaf(y)) {
    (true, _) => (y, x),
    (false, true) => (x, y),
    (false, false) => (x.max(y), x.min(y)),
  };
  tree.attach(parent, child)?;
  tree.set_dist(child, dist[[x.0, y.0]]);
  tree.set_root(parent)?;

  Ok(tree)
}
