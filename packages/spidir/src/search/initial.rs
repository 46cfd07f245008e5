use crate::fit::distance_matrix::DistanceMatrix;
use crate::fit::least_squares::fit_branch_lengths;
use crate::fit::neighbor_join::neighbor_join;
use crate::recon::recon_root::recon_root;
use crate::recon::species_map::SpeciesMap;
use crate::tree::species_tree::SpeciesTree;
use crate::tree::tree::Tree;
use eyre::{Report, WrapErr};

/// Starting tree of the local searches: neighbor-joining, rooted to minimize duplications and losses, with
/// least-squares branch lengths.
pub fn initial_tree(distmat: &DistanceMatrix, stree: &SpeciesTree, smap: &SpeciesMap) -> Result<Tree, Report> {
  let tree = neighbor_join(distmat).wrap_err("When building the initial tree")?;
  let mut tree = recon_root(&tree, stree, smap).wrap_err("When rooting the initial tree")?;
  if tree.leaves().len() >= 2 {
    fit_branch_lengths(&mut tree, distmat)?;
  }
  Ok(tree)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::examples::{caterpillar_distmat, species_map_5, species_tree_5};
  use crate::tree::topology_key::topology_key;
  use approx::assert_abs_diff_eq;
  use pretty_assertions::assert_eq;

  #[test]
  fn builds_rooted_fitted_tree() -> Result<(), Report> {
    let tree = initial_tree(&caterpillar_distmat(), &species_tree_5(), &species_map_5())?;
    assert_eq!(topology_key(&tree).to_string(), "(((a1,b1),c1),(d1,e1))");
    assert_abs_diff_eq!(tree.total_length(), 7.0, epsilon = 1e-6);
    Ok(())
  }
}
