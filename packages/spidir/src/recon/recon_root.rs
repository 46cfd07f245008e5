use crate::recon::reconcile::{find_loss, label_events, reconcile, Event};
use crate::recon::species_map::SpeciesMap;
use crate::tree::reroot::{reroot_above, rooting_edges};
use crate::tree::species_tree::SpeciesTree;
use crate::tree::tree::Tree;
use eyre::Report;
use log::debug;

/// Number of duplications plus number of losses implied by the tree's current rooting.
pub fn duploss_cost(tree: &Tree, stree: &SpeciesTree, smap: &SpeciesMap) -> Result<usize, Report> {
  let recon = reconcile(tree, stree, smap)?;
  let events = label_events(tree, &recon);
  Ok(events.count(Event::Duplication) + find_loss(tree, stree, &recon).len())
}

/// Roots the tree on the edge that minimizes duplications plus losses. The first best edge in preorder wins.
pub fn recon_root(tree: &Tree, stree: &SpeciesTree, smap: &SpeciesMap) -> Result<Tree, Report> {
  let mut best: Option<(usize, Tree)> = None;
  for edge in rooting_edges(tree) {
    let rooted = reroot_above(tree, edge)?;
    let cost = duploss_cost(&rooted, stree, smap)?;
    if best.as_ref().map_or(true, |(best_cost, _)| cost < *best_cost) {
      best = Some((cost, rooted));
    }
  }

  match best {
    Some((cost, rooted)) => {
      debug!("Rooted gene tree with {cost} duplications and losses");
      Ok(rooted)
    }
    None => Ok(tree.clone()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::examples::{species_map_5, species_tree_5, tree_from_edges};
  use crate::tree::topology_key::topology_key;
  use pretty_assertions::assert_eq;

  #[test]
  fn roots_unrooted_tree_like_species_tree() -> Result<(), Report> {
    let stree = species_tree_5();
    let smap = species_map_5();
    let tree = tree_from_edges(
      "u",
      &[
        ("u", "w", 1.0),
        ("w", "a1", 1.0),
        ("w", "b1", 1.0),
        ("u", "c1", 1.0),
        ("u", "v", 1.0),
        ("v", "d1", 1.0),
        ("v", "e1", 1.0),
      ],
    );
    let rooted = recon_root(&tree, &stree, &smap)?;
    assert_eq!(topology_key(&rooted).to_string(), "(((a1,b1),c1),(d1,e1))");
    assert_eq!(duploss_cost(&rooted, &stree, &smap)?, 0);
    Ok(())
  }
}
