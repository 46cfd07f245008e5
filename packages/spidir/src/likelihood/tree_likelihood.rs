use crate::likelihood::baserate::estimate_baserate;
use crate::likelihood::config::LikelihoodConfig;
use crate::likelihood::extra_branches::{mark_extra_branches, mark_unfold};
use crate::likelihood::report::format_diagnostics;
use crate::likelihood::subtree::{subtree_log_likelihood, LikelihoodInputs};
use crate::model::params::{RateModelParams, RateTable};
use crate::recon::reconcile::{find_loss, label_events, reconcile, Event};
use crate::recon::species_map::SpeciesMap;
use crate::stats::density::{gamma_ln_pdf, safe_ln};
use crate::tree::species_tree::SpeciesTree;
use crate::tree::tree::Tree;
use crate::utils::observability::ObservabilityConfig;
use eyre::Report;
use log::Level;

/// Log-likelihood of the gene tree's topology and branch lengths under the rate model.
///
/// The baserate is estimated from the tree unless given. Per-node diagnostics are left in the node annotations,
/// the baserate and the result in the tree annotations.
pub fn tree_log_likelihood(
  tree: &mut Tree,
  stree: &SpeciesTree,
  smap: &SpeciesMap,
  params: &RateModelParams,
  config: &LikelihoodConfig,
  baserate: Option<f64>,
  obs: &ObservabilityConfig,
) -> Result<f64, Report> {
  tree.clear_annotations();
  let recon = reconcile(tree, stree, smap)?;
  let events = label_events(tree, &recon);
  let rates = RateTable::new(params, stree)?;

  mark_unfold(tree, stree, &recon, &events);
  let extra = mark_extra_branches(tree, stree, &recon, &events);
  let inputs = LikelihoodInputs {
    stree,
    rates: &rates,
    recon: &recon,
    events: &events,
    extra: &extra,
  };

  let baserate = match baserate {
    Some(baserate) => baserate,
    None => estimate_baserate(tree, &inputs, &params.baserate)?,
  };
  obs.emit(Level::Debug, || {
    let prior = gamma_ln_pdf(baserate, params.baserate.shape, params.baserate.rate).unwrap_or(f64::NAN);
    format!(
      "Tree length: {}, baserate: {baserate} (log prior density {prior})",
      tree.total_length()
    )
  });

  let mut logl = 0.0;
  for node in tree.preorder() {
    if !tree.is_root(node) && events[node] != Event::Speciation {
      continue;
    }
    for child in tree.children(node).to_vec() {
      logl += subtree_log_likelihood(tree, &inputs, child, baserate)?;
    }
  }

  for node in tree.node_ids() {
    match events[node] {
      Event::Duplication => logl += safe_ln(config.dup_prob),
      Event::Speciation => logl += safe_ln(config.spec_prob),
      Event::Gene => {}
    }
  }
  let nloss = find_loss(tree, stree, &recon).len();
  if nloss > 0 {
    logl += nloss as f64 * safe_ln(config.loss_prob);
  }

  tree.annotations.baserate = Some(baserate);
  tree.annotations.logl = Some(logl);

  obs.emit(Level::Trace, || format_diagnostics(tree, &events, baserate));

  Ok(logl)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::examples::{caterpillar_params, caterpillar_tree, species_map_5, species_tree_5, tree_from_edges};
  use crate::utils::error::{find_error, DegenerateModelError, SpidirError};
  use approx::assert_abs_diff_eq;
  use std::f64::consts::PI;

  /// Every one of the 8 scored paths sits exactly at its mean.
  fn perfect_logl() -> f64 {
    8.0 * (-(0.05_f64.ln()) - 0.5 * (2.0 * PI).ln())
  }

  #[test]
  fn scores_tree_that_fits_the_model_exactly() -> Result<(), Report> {
    let mut tree = caterpillar_tree();
    let logl = tree_log_likelihood(
      &mut tree,
      &species_tree_5(),
      &species_map_5(),
      &caterpillar_params(),
      &LikelihoodConfig::default(),
      None,
      &ObservabilityConfig::silent(),
    )?;
    assert_abs_diff_eq!(logl, perfect_logl(), epsilon = 1e-6);
    assert_abs_diff_eq!(tree.annotations.baserate.unwrap(), 7.0, epsilon = 1e-9);
    assert_eq!(tree.annotations.logl, Some(logl));

    let a1 = tree.find("a1").unwrap();
    assert!(tree.node(a1).annotations.logl.is_some());
    Ok(())
  }

  #[test]
  fn uses_given_baserate() -> Result<(), Report> {
    let stree = species_tree_5();
    let smap = species_map_5();
    let params = caterpillar_params();
    let config = LikelihoodConfig::default();
    let obs = ObservabilityConfig::silent();

    let mut tree = caterpillar_tree();
    let at_seven = tree_log_likelihood(&mut tree, &stree, &smap, &params, &config, Some(7.0), &obs)?;
    let at_fourteen = tree_log_likelihood(&mut tree, &stree, &smap, &params, &config, Some(14.0), &obs)?;
    assert_abs_diff_eq!(at_seven, perfect_logl(), epsilon = 1e-9);
    assert!(at_fourteen < at_seven);
    assert_eq!(tree.annotations.baserate, Some(14.0));
    Ok(())
  }

  #[test]
  fn adds_log_probability_of_each_duplication() -> Result<(), Report> {
    let stree = species_tree_5();
    let smap = species_map_5();
    let params = caterpillar_params();
    let obs = ObservabilityConfig::silent();
    let tree = tree_from_edges(
      "g",
      &[
        ("g", "x", 0.3),
        ("x", "a1", 0.3),
        ("x", "b1", 0.3),
        ("g", "y", 0.2),
        ("y", "a2", 0.7),
        ("y", "d1", 0.9),
      ],
    );

    let rare = LikelihoodConfig::default();
    let common = LikelihoodConfig {
      dup_prob: 0.1,
      ..LikelihoodConfig::default()
    };
    let logl_rare = tree_log_likelihood(&mut tree.clone(), &stree, &smap, &params, &rare, Some(7.0), &obs)?;
    let logl_common = tree_log_likelihood(&mut tree.clone(), &stree, &smap, &params, &common, Some(7.0), &obs)?;
    assert!(logl_rare.is_finite());
    assert_abs_diff_eq!(logl_common - logl_rare, 10.0_f64.ln(), epsilon = 1e-9);
    Ok(())
  }

  #[test]
  fn fails_on_species_branch_without_variance() {
    let mut params = caterpillar_params();
    if let Some(rate) = params.branches.get_mut("C") {
      rate.sdev = 0.0;
    }
    let report = tree_log_likelihood(
      &mut caterpillar_tree(),
      &species_tree_5(),
      &species_map_5(),
      &params,
      &LikelihoodConfig::default(),
      None,
      &ObservabilityConfig::silent(),
    )
    .unwrap_err();

    match find_error::<SpidirError>(&report) {
      Some(SpidirError::DegenerateModel(DegenerateModelError::SigmaTooSmall { gene_node, .. })) => {
        assert_eq!(gene_node, "c1");
      }
      other => panic!("unexpected error: {other:?}"),
    }
  }
}
