use crate::make_internal_error;
use crate::tree::tree::{NodeId, Tree};
use crate::utils::random::random_choice_maybe;
use eyre::Report;
use rand::Rng;

/// Internal branches, each given by its lower node: every internal node except the root.
pub fn nni_branches(tree: &Tree) -> Vec<NodeId> {
  tree
    .node_ids()
    .filter(|&node| !tree.is_leaf(node) && !tree.is_root(node))
    .collect()
}

/// Nearest-neighbor interchange across the branch above `node`:
///
/// ```text
///        parent
///       /      \
///    uncle     node
///             /    \
///     child[0]      child[1]
/// ```
///
/// `node.children[change]` trades places with the uncle, the first child of `parent` other than `node`.
/// Applying the same interchange again restores the tree.
pub fn propose_nni(tree: &mut Tree, node: NodeId, change: usize) -> Result<(), Report> {
  let Some(parent) = tree.parent(node) else {
    return make_internal_error!("NNI: node '{}' has no parent", tree.name(node));
  };
  if change >= tree.children(node).len() {
    return make_internal_error!(
      "NNI: node '{}' has no child #{change}, it has {} children",
      tree.name(node),
      tree.children(node).len()
    );
  }
  let Some(uncle) = tree.children(parent).iter().position(|&child| child != node) else {
    return make_internal_error!("NNI: node '{}' has no sibling", tree.name(node));
  };
  tree.swap_children(node, change, parent, uncle);
  Ok(())
}

/// Applies an interchange on a random internal branch. Returns `false` when the tree has no internal branch.
pub fn propose_random_nni(tree: &mut Tree, rng: &mut impl Rng) -> Result<bool, Report> {
  let Some(node) = random_choice_maybe(nni_branches(tree), rng) else {
    return Ok(false);
  };
  let change = rng.gen_range(0..2);
  propose_nni(tree, node, change)?;
  Ok(true)
}
