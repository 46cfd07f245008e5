use crate::tree::tree::{NodeId, Tree};
use crate::{make_error, make_internal_report};
use eyre::Report;

/// Undirected view of a tree. A root with exactly two children is dissolved into a single edge.
struct Unrooted {
  neighbors: Vec<Vec<(NodeId, f64)>>,
  dissolved_root: Option<NodeId>,
}

impl Unrooted {
  fn new(tree: &Tree) -> Self {
    let mut neighbors = vec![vec![]; tree.num_nodes()];
    let root = tree.root();
    let dissolved_root = tree.is_rooted().then_some(root);

    for id in tree.node_ids() {
      let Some(parent) = tree.parent(id) else {
        continue;
      };
      if Some(parent) == dissolved_root {
        continue;
      }
      neighbors[id.0].push((parent, tree.dist(id)));
      neighbors[parent.0].push((id, tree.dist(id)));
    }

    if let Some(root) = dissolved_root {
      let (a, b) = (tree.children(root)[0], tree.children(root)[1]);
      let len = tree.dist(a) + tree.dist(b);
      neighbors[a.0].push((b, len));
      neighbors[b.0].push((a, len));
    }

    Self {
      neighbors,
      dissolved_root,
    }
  }

  fn edge_length(&self, a: NodeId, b: NodeId) -> Option<f64> {
    self.neighbors[a.0].iter().find(|(n, _)| *n == b).map(|(_, len)| *len)
  }
}

/// Edges of the unrooted tree, each named by one non-root node whose parent edge it is.
///
/// The two children of a bifurcating root share one unrooted edge, only the first of them is listed.
pub fn rooting_edges(tree: &Tree) -> Vec<NodeId> {
  let root = tree.root();
  let second_root_child = tree.is_rooted().then(|| tree.children(root)[1]);
  tree
    .preorder()
    .into_iter()
    .filter(|&id| id != root && Some(id) != second_root_child)
    .collect()
}

/// Builds a copy of the tree rooted in the middle of the edge above `node`.
///
/// Node names are kept. Node ids of the result are unrelated to the input's.
pub fn reroot_above(tree: &Tree, node: NodeId) -> Result<Tree, Report> {
  let Some(parent) = tree.parent(node) else {
    return make_error!("Cannot reroot above node '{}': it is the root", tree.name(node));
  };

  let unrooted = Unrooted::new(tree);
  let other = if Some(parent) == unrooted.dissolved_root {
    tree
      .children(parent)
      .iter()
      .copied()
      .find(|&c| c != node)
      .ok_or_else(|| make_internal_report!("Bifurcating root has a single child"))?
  } else {
    parent
  };
  let len = unrooted
    .edge_length(node, other)
    .ok_or_else(|| make_internal_report!("Rerooting: no edge between '{}' and '{}'", tree.name(node), tree.name(other)))?;

  let root_name = match unrooted.dissolved_root {
    Some(old_root) => tree.name(old_root).to_owned(),
    None => tree.new_name(),
  };

  let mut rooted = Tree::new(root_name);
  let new_root = rooted.root();

  // (old node, new parent, branch length, old neighbor we came from)
  let mut stack = vec![(other, new_root, len / 2.0, node), (node, new_root, len / 2.0, other)];
  while let Some((old, new_parent, dist, from)) = stack.pop() {
    let new = rooted.add_child(new_parent, tree.name(old), dist);
    for &(neighbor, len) in unrooted.neighbors[old.0].iter().rev() {
      if neighbor != from {
        stack.push((neighbor, new, len, old));
      }
    }
  }

  Ok(rooted)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::examples::tree_from_edges;
  use crate::tree::topology_key::topology_key;
  use approx::assert_ulps_eq;
  use pretty_assertions::assert_eq;

  #[test]
  fn reroots_trifurcating_tree() -> Result<(), Report> {
    let tree = tree_from_edges(
      "u",
      &[("u", "a", 1.0), ("u", "b", 2.0), ("u", "v", 3.0), ("v", "c", 1.0), ("v", "d", 1.0)],
    );
    let rerooted = reroot_above(&tree, tree.find("v").unwrap())?;
    assert_eq!(topology_key(&rerooted).to_string(), "((a,b),(c,d))");
    assert_eq!(rerooted.num_nodes(), tree.num_nodes() + 1);
    assert_ulps_eq!(rerooted.total_length(), tree.total_length());
    Ok(())
  }

  #[test]
  fn moves_existing_root() -> Result<(), Report> {
    let tree = tree_from_edges(
      "r",
      &[("r", "x", 1.0), ("x", "a", 1.0), ("x", "b", 1.0), ("r", "c", 2.0)],
    );
    let rerooted = reroot_above(&tree, tree.find("a").unwrap())?;
    assert_eq!(topology_key(&rerooted).to_string(), "((b,c),a)");
    assert_eq!(rerooted.num_nodes(), tree.num_nodes());
    assert_eq!(rerooted.name(rerooted.root()), "r");
    assert_ulps_eq!(rerooted.total_length(), tree.total_length());
    Ok(())
  }

  #[test]
  fn lists_each_unrooted_edge_once() {
    let tree = tree_from_edges(
      "r",
      &[("r", "x", 1.0), ("x", "a", 1.0), ("x", "b", 1.0), ("r", "c", 2.0)],
    );
    // unrooted: star of a, b, c around x
    assert_eq!(rooting_edges(&tree).len(), 3);
  }
}
