use crate::make_error;
use crate::tree::tree::{NodeId, Tree};
use eyre::Report;
use std::collections::HashMap;

/// Reference species tree with the lookups reconciliation needs precomputed.
#[derive(Clone, Debug)]
pub struct SpeciesTree {
  tree: Tree,
  depths: Vec<usize>,
  index: HashMap<String, NodeId>,
}

impl SpeciesTree {
  pub fn new(tree: Tree) -> Result<Self, Report> {
    let mut depths = vec![0; tree.num_nodes()];
    let mut index = HashMap::with_capacity(tree.num_nodes());
    for id in tree.preorder() {
      if let Some(parent) = tree.parent(id) {
        depths[id.0] = depths[parent.0] + 1;
      }
      if index.insert(tree.name(id).to_owned(), id).is_some() {
        return make_error!("Species tree contains duplicate node name '{}'", tree.name(id));
      }
    }
    if index.len() != tree.num_nodes() {
      return make_error!("Species tree contains nodes not reachable from its root");
    }
    Ok(Self { tree, depths, index })
  }

  pub fn tree(&self) -> &Tree {
    &self.tree
  }

  pub fn root(&self) -> NodeId {
    self.tree.root()
  }

  pub fn parent(&self, id: NodeId) -> Option<NodeId> {
    self.tree.parent(id)
  }

  pub fn children(&self, id: NodeId) -> &[NodeId] {
    self.tree.children(id)
  }

  pub fn name(&self, id: NodeId) -> &str {
    self.tree.name(id)
  }

  pub fn depth(&self, id: NodeId) -> usize {
    self.depths[id.0]
  }

  pub fn find(&self, name: &str) -> Option<NodeId> {
    self.index.get(name).copied()
  }

  pub fn num_nodes(&self) -> usize {
    self.tree.num_nodes()
  }

  /// Lowest common ancestor.
  pub fn lca(&self, a: NodeId, b: NodeId) -> NodeId {
    let (mut a, mut b) = (a, b);
    while self.depth(a) > self.depth(b) {
      a = self.parent(a).unwrap_or(a);
    }
    while self.depth(b) > self.depth(a) {
      b = self.parent(b).unwrap_or(b);
    }
    while a != b {
      match (self.parent(a), self.parent(b)) {
        (Some(pa), Some(pb)) => {
          a = pa;
          b = pb;
        }
        _ => return self.root(),
      }
    }
    a
  }

  pub fn is_descendant_or_self(&self, node: NodeId, ancestor: NodeId) -> bool {
    let mut ptr = node;
    loop {
      if ptr == ancestor {
        return true;
      }
      match self.parent(ptr) {
        Some(parent) => ptr = parent,
        None => return false,
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::examples::species_tree_5;
  use pretty_assertions::assert_eq;

  #[test]
  fn finds_lowest_common_ancestors() {
    let stree = species_tree_5();
    let id = |name: &str| stree.find(name).unwrap();
    assert_eq!(stree.lca(id("A"), id("B")), id("AB"));
    assert_eq!(stree.lca(id("A"), id("C")), id("ABC"));
    assert_eq!(stree.lca(id("C"), id("E")), id("root"));
    assert_eq!(stree.lca(id("AB"), id("A")), id("AB"));
    assert_eq!(stree.depth(id("A")), 3);
    assert!(stree.is_descendant_or_self(id("B"), id("ABC")));
    assert!(!stree.is_descendant_or_self(id("D"), id("ABC")));
  }
}
