use crate::constants::{MAX_TREE_LENGTH, MIN_BASERATE_SDEV};
use crate::make_error;
use crate::model::baserate::mle_baserate;
use crate::model::params::{BranchRate, GammaParams, RateModelParams};
use crate::recon::reconcile::{label_events, reconcile, Event, Reconciliation};
use crate::recon::species_map::SpeciesMap;
use crate::stats::density::{gamma_ln_pdf, normal_ln_pdf};
use crate::stats::histogram::fit_normal_mode;
use crate::tree::species_tree::SpeciesTree;
use crate::tree::tree::{NodeId, Tree};
use crate::utils::error::report_to_string;
use crate::utils::observability::ObservabilityConfig;
use clap::ValueEnum;
use eyre::{Report, WrapErr};
use itertools::Itertools;
use log::{warn, Level};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;
use statrs::statistics::Statistics;
use std::collections::{BTreeMap, HashSet};

/// What branch lengths are divided by before their distributions are fitted.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RelativeLength {
  /// Total length of the gene tree
  #[default]
  TreeLength,

  /// Per-gene baserate, re-estimated by expectation-maximization
  Baserate,
}

#[derive(Clone, Debug, SmartDefault, Serialize, Deserialize)]
pub struct LearnOptions {
  pub relative_to: RelativeLength,

  /// Rounds of alternating branch and baserate fits, when lengths are relative to baserates
  #[default(10)]
  pub em_iterations: usize,

  /// Trees at least this long are left out of the baserate prior
  #[default(MAX_TREE_LENGTH)]
  pub max_tree_length: f64,
}

/// Lengths of the gene branches mapped to each non-root species branch, one row per gene tree that has the
/// species topology.
#[derive(Clone, Debug)]
pub struct BranchLengths {
  /// Species node of every column
  pub species: Vec<NodeId>,

  /// Rows are trees, columns are species branches
  pub lengths: Array2<f64>,

  /// Total length of every tree, the root branch included
  pub tree_lengths: Vec<f64>,
}

impl BranchLengths {
  pub fn num_trees(&self) -> usize {
    self.lengths.nrows()
  }

  /// Summed branch lengths of every tree.
  pub fn row_totals(&self) -> Array1<f64> {
    self.lengths.sum_axis(Axis(1))
  }
}

/// A tree has the species topology when it has no duplications and every species node receives exactly one gene
/// node.
fn matches_species_topology(tree: &Tree, stree: &SpeciesTree, recon: &Reconciliation) -> bool {
  if tree.num_nodes() != stree.num_nodes() {
    return false;
  }
  let events = label_events(tree, recon);
  if events.count(Event::Duplication) > 0 {
    return false;
  }
  let hit: HashSet<NodeId> = tree.node_ids().map(|node| recon[node]).collect();
  hit.len() == stree.num_nodes()
}

/// Collects branch lengths from the trees that have the species topology. Trees which cannot be reconciled are
/// skipped with a warning.
pub fn find_branch_distribution(
  trees: &[Tree],
  stree: &SpeciesTree,
  smap: &SpeciesMap,
) -> Result<BranchLengths, Report> {
  let species = stree
    .tree()
    .preorder()
    .into_iter()
    .filter(|&snode| snode != stree.root())
    .collect_vec();
  let mut column = vec![None; stree.num_nodes()];
  for (j, snode) in species.iter().enumerate() {
    column[snode.0] = Some(j);
  }

  let mut rows: Vec<f64> = vec![];
  let mut tree_lengths = vec![];
  for (i, tree) in trees.iter().enumerate() {
    let recon = match reconcile(tree, stree, smap) {
      Ok(recon) => recon,
      Err(report) => {
        warn!("Skipping tree #{}: {}", i + 1, report_to_string(&report));
        continue;
      }
    };
    if !matches_species_topology(tree, stree, &recon) {
      continue;
    }

    let mut row = vec![0.0; species.len()];
    for node in tree.node_ids().filter(|&node| !tree.is_root(node)) {
      if let Some(j) = column[recon[node].0] {
        row[j] = tree.dist(node);
      }
    }
    rows.extend(row);
    tree_lengths.push(tree.total_length());
  }

  let lengths = Array2::from_shape_vec((tree_lengths.len(), species.len()), rows)
    .wrap_err("When collecting branch lengths")?;
  Ok(BranchLengths {
    species,
    lengths,
    tree_lengths,
  })
}

/// Learns the rate model from a corpus of gene trees.
pub fn learn_rate_model(
  trees: &[Tree],
  stree: &SpeciesTree,
  smap: &SpeciesMap,
  options: &LearnOptions,
  obs: &ObservabilityConfig,
) -> Result<RateModelParams, Report> {
  let table = find_branch_distribution(trees, stree, smap)?;
  obs.emit(Level::Info, || {
    format!(
      "{} of {} trees match species topology",
      table.num_trees(),
      trees.len()
    )
  });
  if table.num_trees() == 0 {
    return make_error!("None of the {} trees has the topology of the species tree", trees.len());
  }

  let (rates, baserate) = match options.relative_to {
    RelativeLength::TreeLength => {
      let rates = fit_branch_rates(&table, table.row_totals().view());
      let baserate = fit_tree_length_prior(&table.tree_lengths, options.max_tree_length)?;
      (rates, baserate)
    }
    RelativeLength::Baserate => learn_em(&table, options.em_iterations, obs)?,
  };

  let mut branches = BTreeMap::new();
  for (snode, rate) in table.species.iter().zip(rates) {
    obs.emit(Level::Debug, || {
      format!("{}\tmean={}\tsdev={}", stree.name(*snode), rate.mean, rate.sdev)
    });
    branches.insert(stree.name(*snode).to_owned(), rate);
  }
  branches.insert(stree.name(stree.root()).to_owned(), BranchRate::FREE);
  obs.emit(Level::Debug, || {
    format!("baserate\tshape={}\trate={}", baserate.shape, baserate.rate)
  });

  Ok(RateModelParams { branches, baserate })
}

/// Fits a normal distribution to every column after dividing each row by its scale.
fn fit_branch_rates(table: &BranchLengths, scales: ArrayView1<f64>) -> Vec<BranchRate> {
  table
    .lengths
    .columns()
    .into_iter()
    .map(|lens| {
      let (min, max) = lens.iter().copied().minmax_by(f64::total_cmp).into_option()?;
      if min == max {
        return None;
      }
      let relative = lens.iter().zip(scales).map(|(len, scale)| len / scale).collect_vec();
      fit_normal_mode(&relative)
    })
    .map(|fit| fit.map_or(BranchRate::FREE, |(mean, sdev)| BranchRate { mean, sdev }))
    .collect()
}

/// Gamma prior of the baserate by the method of moments on total tree lengths. Trees of at least `max_length`,
/// and then those of at least twice the mean of the rest, are ignored.
pub fn fit_tree_length_prior(tree_lengths: &[f64], max_length: f64) -> Result<GammaParams, Report> {
  let lens = tree_lengths.iter().copied().filter(|&len| len < max_length).collect_vec();
  let mean = lens.iter().mean();
  let lens = lens.into_iter().filter(|&len| len < 2.0 * mean).collect_vec();
  if lens.len() < 2 {
    return make_error!(
      "At least two trees are required to fit the baserate distribution, but {} remained",
      lens.len()
    );
  }
  let mean = lens.iter().mean();
  let variance = lens.iter().variance();
  GammaParams::from_moments(mean, variance).wrap_err("When fitting the baserate distribution")
}

/// Alternates fitting branch distributions on baserate-relative lengths and re-solving every tree's baserate.
fn learn_em(
  table: &BranchLengths,
  iterations: usize,
  obs: &ObservabilityConfig,
) -> Result<(Vec<BranchRate>, GammaParams), Report> {
  let mut baserates = table.row_totals();
  let prior = GammaParams::from_moments(baserates.iter().mean(), baserates.iter().variance())
    .wrap_err("When fitting the initial baserate distribution")?;

  let mut rates = fit_branch_rates(table, baserates.view());
  for iteration in 0..iterations {
    rates = fit_branch_rates(table, baserates.view());
    let means = rates.iter().map(|rate| rate.mean).collect_vec();
    let sdevs = rates.iter().map(|rate| rate.sdev).collect_vec();

    for (row, baserate) in table.lengths.rows().into_iter().zip(baserates.iter_mut()) {
      let lens = row.to_vec();
      *baserate = mle_baserate(&lens, &means, &sdevs, &prior)?;
    }

    let logl = data_log_likelihood(table, &baserates, &rates, &prior)?;
    obs.emit(Level::Debug, || {
      format!("EM iteration {}: data log-likelihood {logl}", iteration + 1)
    });
  }

  Ok((rates, prior))
}

fn data_log_likelihood(
  table: &BranchLengths,
  baserates: &Array1<f64>,
  rates: &[BranchRate],
  prior: &GammaParams,
) -> Result<f64, Report> {
  let mut logl = 0.0;
  for (row, &baserate) in table.lengths.rows().into_iter().zip(baserates) {
    for (&len, rate) in row.iter().zip(rates) {
      if rate.sdev > MIN_BASERATE_SDEV {
        logl += normal_ln_pdf(len / baserate, rate.mean, rate.sdev)?;
      }
    }
    logl += gamma_ln_pdf(baserate, prior.shape, prior.rate)?;
  }
  Ok(logl)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::examples::{species_map_5, species_tree_5, tree_from_edges};
  use approx::assert_abs_diff_eq;
  use pretty_assertions::assert_eq;

  const BASE: [(&str, f64); 8] = [
    ("A", 0.1),
    ("B", 0.1),
    ("AB", 0.05),
    ("C", 0.15),
    ("ABC", 0.05),
    ("D", 0.1),
    ("E", 0.1),
    ("DE", 0.05),
  ];

  /// Gene tree with the species topology: every branch is its species' base length times `scale`, and the
  /// branch of `BASE[bump]` is stretched by another 10%.
  fn congruent_tree(scale: f64, bump: usize) -> Tree {
    let len = |species: &str| {
      let (i, (_, base)) = BASE.iter().find_position(|(name, _)| *name == species).unwrap();
      base * scale * if i == bump { 1.1 } else { 1.0 }
    };
    tree_from_edges(
      "g",
      &[
        ("g", "gabc", len("ABC")),
        ("gabc", "gab", len("AB")),
        ("gab", "a1", len("A")),
        ("gab", "b1", len("B")),
        ("gabc", "c1", len("C")),
        ("g", "gde", len("DE")),
        ("gde", "d1", len("D")),
        ("gde", "e1", len("E")),
      ],
    )
  }

  fn corpus() -> Vec<Tree> {
    let mut trees = (0..8)
      .map(|i| congruent_tree(1.0 + 0.2 * i as f64, i))
      .collect_vec();
    // duplication of the whole family
    trees.push(tree_from_edges(
      "g",
      &[("g", "x", 1.0), ("x", "a1", 1.0), ("x", "d1", 1.0), ("g", "y", 1.0), ("y", "a2", 1.0), ("y", "d2", 1.0)],
    ));
    // gene of an unknown species
    trees.push(tree_from_edges("g", &[("g", "a1", 1.0), ("g", "z1", 1.0)]));
    trees
  }

  #[test]
  fn keeps_only_trees_with_species_topology() -> Result<(), Report> {
    let stree = species_tree_5();
    let table = find_branch_distribution(&corpus(), &stree, &species_map_5())?;
    assert_eq!(table.num_trees(), 8);
    assert_eq!(table.species.len(), 8);

    let c = table.species.iter().position(|&s| stree.name(s) == "C").unwrap();
    assert_abs_diff_eq!(table.lengths[[0, c]], 0.15, epsilon = 1e-12);
    assert_abs_diff_eq!(table.lengths[[3, c]], 0.15 * 1.6 * 1.1, epsilon = 1e-12);
    Ok(())
  }

  #[test]
  fn learns_relative_rates_and_prior() -> Result<(), Report> {
    let stree = species_tree_5();
    let trees = corpus();
    let params = learn_rate_model(
      &trees,
      &stree,
      &species_map_5(),
      &LearnOptions::default(),
      &ObservabilityConfig::silent(),
    )?;

    assert_eq!(params.branches.len(), 9);
    assert_eq!(params.branch("root"), Some(&BranchRate::FREE));

    let total: f64 = BASE.iter().map(|(_, base)| base).sum();
    for (species, base) in BASE {
      let rate = params.branch(species).unwrap();
      let expected = base / total;
      assert!(
        (rate.mean - expected).abs() < 0.2 * expected,
        "{species}: mean {} vs {expected}",
        rate.mean
      );
      assert!(rate.sdev > 0.0);
    }

    let lengths = trees[..8].iter().map(Tree::total_length).collect_vec();
    let expected = GammaParams::from_moments(lengths.iter().mean(), lengths.iter().variance())?;
    assert_abs_diff_eq!(params.baserate.shape, expected.shape, epsilon = 1e-9);
    assert_abs_diff_eq!(params.baserate.rate, expected.rate, epsilon = 1e-9);
    Ok(())
  }

  #[test]
  fn learns_with_baserate_em() -> Result<(), Report> {
    let options = LearnOptions {
      relative_to: RelativeLength::Baserate,
      em_iterations: 3,
      ..LearnOptions::default()
    };
    let params = learn_rate_model(
      &corpus(),
      &species_tree_5(),
      &species_map_5(),
      &options,
      &ObservabilityConfig::silent(),
    )?;
    assert!(params.baserate.shape > 0.0 && params.baserate.rate > 0.0);
    assert!(params.branches.values().all(|rate| rate.mean >= 0.0 && rate.sdev > 0.0));
    Ok(())
  }

  #[test]
  fn drops_outlier_tree_lengths() -> Result<(), Report> {
    // 25 is beyond the cap, 5 is beyond twice the mean of the rest
    let prior = fit_tree_length_prior(&[1.0, 1.5, 2.0, 5.0, 25.0], 20.0)?;
    let expected = GammaParams::from_moments(1.5, 0.25)?;
    assert_abs_diff_eq!(prior.shape, expected.shape, epsilon = 1e-12);
    assert_abs_diff_eq!(prior.rate, expected.rate, epsilon = 1e-12);
    assert!(fit_tree_length_prior(&[1.0, 30.0], 20.0).is_err());
    Ok(())
  }
}
