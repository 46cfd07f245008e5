use crate::recon::reconcile::{Event, Events, Reconciliation};
use crate::tree::species_tree::SpeciesTree;
use crate::tree::tree::Tree;

/// Marks the children of duplications at the species root which leave the species root. Returns one flag per node.
pub fn mark_extra_branches(tree: &mut Tree, stree: &SpeciesTree, recon: &Reconciliation, events: &Events) -> Vec<bool> {
  let mut extra = vec![false; tree.num_nodes()];
  for node in tree.node_ids().collect::<Vec<_>>() {
    if recon[node] != stree.root() || events[node] != Event::Duplication {
      continue;
    }
    for child in tree.children(node).to_vec() {
      if recon[child] != stree.root() {
        extra[child.0] = true;
        tree.node_mut(child).annotations.extra = true;
      }
    }
  }
  extra
}

/// Flags the children of a root duplication at the species root that descend into the species tree.
pub fn mark_unfold(tree: &mut Tree, stree: &SpeciesTree, recon: &Reconciliation, events: &Events) {
  let root = tree.root();
  if recon[root] != stree.root() || events[root] != Event::Duplication {
    return;
  }
  for child in tree.children(root).to_vec() {
    if recon[child] != stree.root() {
      tree.node_mut(child).annotations.unfold = true;
    }
  }
}
