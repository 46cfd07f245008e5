use crate::tree::tree::Tree;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Canonical form of a rooted leaf-labeled topology, independent of child order and branch lengths.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TopologyKey(String);

impl Display for TopologyKey {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

pub fn topology_key(tree: &Tree) -> TopologyKey {
  let mut keys: Vec<String> = vec![String::new(); tree.num_nodes()];
  for id in tree.postorder() {
    let key = if tree.is_leaf(id) {
      tree.name(id).to_owned()
    } else {
      let children = tree
        .children(id)
        .iter()
        .map(|child| std::mem::take(&mut keys[child.0]))
        .sorted()
        .join(",");
      format!("({children})")
    };
    keys[id.0] = key;
  }
  TopologyKey(std::mem::take(&mut keys[tree.root().0]))
}
