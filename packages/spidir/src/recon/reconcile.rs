use crate::make_error;
use crate::recon::species_map::SpeciesMap;
use crate::tree::species_tree::SpeciesTree;
use crate::tree::tree::{NodeId, Tree};
use eyre::Report;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::ops::Index;

/// Species node of every gene node, in LCA semantics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reconciliation(Vec<NodeId>);

impl Index<NodeId> for Reconciliation {
  type Output = NodeId;

  fn index(&self, gene_node: NodeId) -> &NodeId {
    &self.0[gene_node.0]
  }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Event {
  Gene,
  Speciation,
  Duplication,
}

impl Display for Event {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Event::Gene => write!(f, "gene"),
      Event::Speciation => write!(f, "spec"),
      Event::Duplication => write!(f, "dup"),
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Events(Vec<Event>);

impl Index<NodeId> for Events {
  type Output = Event;

  fn index(&self, gene_node: NodeId) -> &Event {
    &self.0[gene_node.0]
  }
}

impl Events {
  pub fn count(&self, event: Event) -> usize {
    self.0.iter().filter(|&&e| e == event).count()
  }
}

/// A species lineage lost along the gene branch above `gene_node`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Loss {
  pub gene_node: NodeId,
  pub species_node: NodeId,
}

/// Maps leaves through the species map and internal nodes to the LCA of their children's species.
pub fn reconcile(tree: &Tree, stree: &SpeciesTree, smap: &SpeciesMap) -> Result<Reconciliation, Report> {
  let mut recon = vec![stree.root(); tree.num_nodes()];
  for node in tree.postorder() {
    recon[node.0] = if tree.is_leaf(node) {
      let gene = tree.name(node);
      let Some(species) = smap.species_of(gene) else {
        return make_error!("Gene '{gene}' is not covered by the species map");
      };
      match stree.find(species) {
        Some(snode) => snode,
        None => return make_error!("Species '{species}' of gene '{gene}' is not in the species tree"),
      }
    } else {
      let children = tree.children(node);
      children[1..]
        .iter()
        .fold(recon[children[0].0], |acc, child| stree.lca(acc, recon[child.0]))
    };
  }
  Ok(Reconciliation(recon))
}

/// A node is a duplication when one of its children maps to the same species as the node itself.
pub fn label_events(tree: &Tree, recon: &Reconciliation) -> Events {
  let events = tree
    .node_ids()
    .map(|node| {
      if tree.is_leaf(node) {
        Event::Gene
      } else if tree.children(node).iter().any(|&child| recon[child] == recon[node]) {
        Event::Duplication
      } else {
        Event::Speciation
      }
    })
    .collect();
  Events(events)
}

/// Lists the species lineages that must have been lost for the gene tree to fit into the species tree.
pub fn find_loss(tree: &Tree, stree: &SpeciesTree, recon: &Reconciliation) -> Vec<Loss> {
  let events = label_events(tree, recon);
  let mut losses = vec![];

  for node in tree.preorder() {
    if tree.is_leaf(node) {
      continue;
    }
    let snode = recon[node];
    let mut covered = HashSet::new();

    for &child in tree.children(node) {
      let mut ptr = recon[child];
      while ptr != snode {
        let Some(sparent) = stree.parent(ptr) else {
          break;
        };
        let passes_speciation = sparent != snode || events[node] == Event::Duplication;
        if sparent == snode {
          covered.insert(ptr);
        }
        if passes_speciation {
          for &sibling in stree.children(sparent) {
            if sibling != ptr {
              losses.push(Loss {
                gene_node: child,
                species_node: sibling,
              });
            }
          }
        }
        ptr = sparent;
      }
    }

    if events[node] == Event::Speciation {
      for &schild in stree.children(snode) {
        if !covered.contains(&schild) {
          losses.push(Loss {
            gene_node: node,
            species_node: schild,
          });
        }
      }
    }
  }

  losses
}
