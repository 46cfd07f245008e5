use crate::make_error;
use crate::tree::species_tree::SpeciesTree;
use crate::tree::tree::NodeId;
use eyre::Report;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Normal distribution of a species branch's length relative to the gene's baserate.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BranchRate {
  pub mean: f64,
  pub sdev: f64,
}

impl BranchRate {
  /// Entry of the species root, which contributes nothing.
  pub const FREE: BranchRate = BranchRate { mean: 0.0, sdev: 1.0 };
}

/// Gamma prior of per-gene baserates, parameterized by shape and rate.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GammaParams {
  pub shape: f64,
  pub rate: f64,
}

impl GammaParams {
  pub fn from_moments(mean: f64, variance: f64) -> Result<Self, Report> {
    if !(mean > 0.0 && variance > 0.0) {
      return make_error!("Cannot fit a gamma distribution with mean {mean} and variance {variance}");
    }
    Ok(Self {
      shape: mean * mean / variance,
      rate: mean / variance,
    })
  }

  pub fn mean(&self) -> f64 {
    self.shape / self.rate
  }
}

/// Learned rate model. Branches are keyed by species node name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RateModelParams {
  pub branches: BTreeMap<String, BranchRate>,
  pub baserate: GammaParams,
}

impl RateModelParams {
  pub fn branch(&self, species: &str) -> Option<&BranchRate> {
    self.branches.get(species)
  }
}

/// Branch rates laid out by species node id, for repeated lookups during scoring.
#[derive(Clone, Debug)]
pub struct RateTable {
  rates: Vec<BranchRate>,
}

impl RateTable {
  pub fn new(params: &RateModelParams, stree: &SpeciesTree) -> Result<Self, Report> {
    let mut rates = Vec::with_capacity(stree.num_nodes());
    for id in (0..stree.num_nodes()).map(NodeId) {
      let name = stree.name(id);
      match params.branch(name) {
        Some(rate) => rates.push(*rate),
        None if id == stree.root() => rates.push(BranchRate::FREE),
        None => return make_error!("Rate model has no parameters for species branch '{name}'"),
      }
    }
    Ok(Self { rates })
  }

  pub fn get(&self, snode: NodeId) -> &BranchRate {
    &self.rates[snode.0]
  }

  /// Sum of means and of variances of the species branches from `snode` up to, not including, `stop`.
  /// The species root never contributes.
  pub fn path(&self, stree: &SpeciesTree, snode: NodeId, stop: NodeId) -> (f64, f64) {
    let mut mean = 0.0;
    let mut variance = 0.0;
    let mut ptr = snode;
    while ptr != stop && ptr != stree.root() {
      let rate = self.get(ptr);
      mean += rate.mean;
      variance += rate.sdev * rate.sdev;
      match stree.parent(ptr) {
        Some(parent) => ptr = parent,
        None => break,
      }
    }
    (mean, variance)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::examples::{caterpillar_params, species_tree_5};
  use approx::assert_abs_diff_eq;

  #[test]
  fn sums_path_up_to_stop() -> Result<(), Report> {
    let stree = species_tree_5();
    let params = caterpillar_params();
    let table = RateTable::new(&params, &stree)?;
    let id = |name: &str| stree.find(name).unwrap();

    let (mean, variance) = table.path(&stree, id("A"), id("ABC"));
    let a = params.branch("A").unwrap();
    let ab = params.branch("AB").unwrap();
    assert_abs_diff_eq!(mean, a.mean + ab.mean);
    assert_abs_diff_eq!(variance, a.sdev.powi(2) + ab.sdev.powi(2));

    // climbing to the root stops below it
    let (mean, _) = table.path(&stree, id("D"), id("root"));
    assert_abs_diff_eq!(mean, params.branch("D").unwrap().mean + params.branch("DE").unwrap().mean);
    Ok(())
  }

  #[test]
  fn requires_every_non_root_branch() {
    let stree = species_tree_5();
    let mut params = caterpillar_params();
    params.branches.remove("C");
    assert!(RateTable::new(&params, &stree).is_err());
  }

  #[test]
  fn fits_gamma_by_moments() -> Result<(), Report> {
    let gamma = GammaParams::from_moments(2.0, 0.5)?;
    assert_abs_diff_eq!(gamma.shape, 8.0);
    assert_abs_diff_eq!(gamma.rate, 4.0);
    assert_abs_diff_eq!(gamma.mean(), 2.0);
    Ok(())
  }
}
