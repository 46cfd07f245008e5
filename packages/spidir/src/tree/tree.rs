use crate::make_internal_error;
use eyre::Report;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Index of a node within its tree's arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl Display for NodeId {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Per-node values computed by the likelihood evaluator. Display only, never read back by the algorithms.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotations {
  /// Branch leaves a duplication at the species root into a deeper species
  pub extra: bool,

  /// Child of a root duplication which does not stay at the species root
  pub unfold: bool,

  /// Running log-likelihood of the subtree this node was scored in
  pub logl: Option<f64>,

  /// Mean and standard deviation of the species path this node was scored against
  pub rate: Option<(f64, f64)>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeAnnotations {
  pub baserate: Option<f64>,
  pub logl: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
  pub name: String,
  pub dist: f64,
  pub annotations: Annotations,
  parent: Option<NodeId>,
  children: Vec<NodeId>,
}

impl TreeNode {
  fn new(name: impl AsRef<str>, dist: f64) -> Self {
    Self {
      name: name.as_ref().to_owned(),
      dist,
      annotations: Annotations::default(),
      parent: None,
      children: vec![],
    }
  }

  pub fn parent(&self) -> Option<NodeId> {
    self.parent
  }

  pub fn children(&self) -> &[NodeId] {
    &self.children
  }

  pub fn is_leaf(&self) -> bool {
    self.children.is_empty()
  }
}

/// Rooted tree stored as an arena of nodes. Nodes refer to each other by `NodeId`.
///
/// Removing a node moves the last node of the arena into its slot, so ids are only stable while no
/// nodes are removed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tree {
  nodes: Vec<TreeNode>,
  root: NodeId,
  pub annotations: TreeAnnotations,
}

impl Tree {
  /// Creates a tree consisting of a single root node.
  pub fn new(root_name: impl AsRef<str>) -> Self {
    Self {
      nodes: vec![TreeNode::new(root_name, 0.0)],
      root: NodeId(0),
      annotations: TreeAnnotations::default(),
    }
  }

  pub fn root(&self) -> NodeId {
    self.root
  }

  pub fn set_root(&mut self, root: NodeId) -> Result<(), Report> {
    if self.node(root).parent.is_some() {
      return make_internal_error!("Tree: node '{}' cannot become the root: it has a parent", self.name(root));
    }
    self.root = root;
    Ok(())
  }

  pub fn num_nodes(&self) -> usize {
    self.nodes.len()
  }

  pub fn node(&self, id: NodeId) -> &TreeNode {
    &self.nodes[id.0]
  }

  pub fn node_mut(&mut self, id: NodeId) -> &mut TreeNode {
    &mut self.nodes[id.0]
  }

  pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
    (0..self.nodes.len()).map(NodeId)
  }

  pub fn name(&self, id: NodeId) -> &str {
    &self.nodes[id.0].name
  }

  pub fn dist(&self, id: NodeId) -> f64 {
    self.nodes[id.0].dist
  }

  pub fn set_dist(&mut self, id: NodeId, dist: f64) {
    self.nodes[id.0].dist = dist;
  }

  pub fn parent(&self, id: NodeId) -> Option<NodeId> {
    self.nodes[id.0].parent
  }

  pub fn children(&self, id: NodeId) -> &[NodeId] {
    &self.nodes[id.0].children
  }

  pub fn is_leaf(&self, id: NodeId) -> bool {
    self.nodes[id.0].is_leaf()
  }

  pub fn is_root(&self, id: NodeId) -> bool {
    self.root == id
  }

  /// Rooted in the binary sense: the root has exactly two children.
  pub fn is_rooted(&self) -> bool {
    self.children(self.root).len() == 2
  }

  pub fn find(&self, name: &str) -> Option<NodeId> {
    self.nodes.iter().position(|node| node.name == name).map(NodeId)
  }

  /// Adds a node which is not yet connected to anything.
  pub fn add_node(&mut self, name: impl AsRef<str>, dist: f64) -> NodeId {
    self.nodes.push(TreeNode::new(name, dist));
    NodeId(self.nodes.len() - 1)
  }

  pub fn add_child(&mut self, parent: NodeId, name: impl AsRef<str>, dist: f64) -> NodeId {
    let child = self.add_node(name, dist);
    self.nodes[child.0].parent = Some(parent);
    self.nodes[parent.0].children.push(child);
    child
  }

  /// Appends a detached node to the children of `parent`.
  pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<(), Report> {
    if let Some(old) = self.nodes[child.0].parent {
      return make_internal_error!(
        "Tree: cannot attach node '{}' to '{}': it is already a child of '{}'",
        self.name(child),
        self.name(parent),
        self.name(old)
      );
    }
    self.nodes[child.0].parent = Some(parent);
    self.nodes[parent.0].children.push(child);
    Ok(())
  }

  /// Disconnects a node from its parent. Its subtree stays intact.
  pub fn detach(&mut self, child: NodeId) {
    if let Some(parent) = self.nodes[child.0].parent.take() {
      self.nodes[parent.0].children.retain(|&c| c != child);
    }
  }

  /// Puts detached `new` in the place of `old` among the children of old's parent; `old` becomes detached.
  pub fn replace_child(&mut self, old: NodeId, new: NodeId) -> Result<(), Report> {
    let Some(parent) = self.nodes[old.0].parent else {
      return make_internal_error!("Tree: cannot replace node '{}': it has no parent", self.name(old));
    };
    if self.nodes[new.0].parent.is_some() {
      return make_internal_error!("Tree: cannot use node '{}' as a replacement: it is attached", self.name(new));
    }
    for child in &mut self.nodes[parent.0].children {
      if *child == old {
        *child = new;
      }
    }
    self.nodes[old.0].parent = None;
    self.nodes[new.0].parent = Some(parent);
    Ok(())
  }

  /// Exchanges the subtrees at `(a, a_index)` and `(b, b_index)`. Applying it twice restores the tree.
  pub fn swap_children(&mut self, a: NodeId, a_index: usize, b: NodeId, b_index: usize) {
    let x = self.nodes[a.0].children[a_index];
    let y = self.nodes[b.0].children[b_index];
    self.nodes[a.0].children[a_index] = y;
    self.nodes[b.0].children[b_index] = x;
    self.nodes[x.0].parent = Some(b);
    self.nodes[y.0].parent = Some(a);
  }

  /// Removes a detached node without children from the arena.
  ///
  /// The last node of the arena takes over the id of the removed one.
  pub fn remove_node(&mut self, id: NodeId) -> Result<(), Report> {
    if self.nodes[id.0].parent.is_some() || !self.nodes[id.0].children.is_empty() {
      return make_internal_error!("Tree: cannot remove node '{}': it is still connected", self.name(id));
    }
    if id == self.root {
      return make_internal_error!("Tree: cannot remove the root node '{}'", self.name(id));
    }

    let last = NodeId(self.nodes.len() - 1);
    self.nodes.swap_remove(id.0);
    if last == id {
      return Ok(());
    }

    if let Some(parent) = self.nodes[id.0].parent {
      for child in &mut self.nodes[parent.0].children {
        if *child == last {
          *child = id;
        }
      }
    }
    let children = self.nodes[id.0].children.clone();
    for child in children {
      self.nodes[child.0].parent = Some(id);
    }
    if self.root == last {
      self.root = id;
    }
    Ok(())
  }

  /// Name not used by any node of the tree.
  pub fn new_name(&self) -> String {
    (self.nodes.len()..)
      .map(|i| format!("n{i}"))
      .find(|name| self.find(name).is_none())
      .unwrap_or_default()
  }

  /// Nodes in depth-first preorder, children visited in order.
  pub fn preorder(&self) -> Vec<NodeId> {
    self.preorder_from(self.root)
  }

  pub fn preorder_from(&self, start: NodeId) -> Vec<NodeId> {
    let mut order = Vec::with_capacity(self.nodes.len());
    let mut stack = vec![start];
    while let Some(id) = stack.pop() {
      order.push(id);
      stack.extend(self.children(id).iter().rev().copied());
    }
    order
  }

  /// Nodes in depth-first postorder: children before parents.
  pub fn postorder(&self) -> Vec<NodeId> {
    let mut order = self.preorder();
    order.reverse();
    order
  }

  pub fn leaves(&self) -> Vec<NodeId> {
    self.preorder().into_iter().filter(|&id| self.is_leaf(id)).collect()
  }

  pub fn leaves_under(&self, id: NodeId) -> Vec<NodeId> {
    self
      .preorder_from(id)
      .into_iter()
      .filter(|&id| self.is_leaf(id))
      .collect()
  }

  pub fn leaf_names(&self) -> Vec<String> {
    self.leaves().into_iter().map(|id| self.name(id).to_owned()).collect()
  }

  /// Sum of all branch lengths, the root's included.
  pub fn total_length(&self) -> f64 {
    self.nodes.iter().map(|node| node.dist).sum()
  }

  pub fn clear_annotations(&mut self) {
    for node in &mut self.nodes {
      node.annotations = Annotations::default();
    }
    self.annotations = TreeAnnotations::default();
  }
}
