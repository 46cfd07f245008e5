use crate::constants::{MAX_SUBTREE_LOGL, MIN_PATH_VARIANCE};
use crate::model::params::RateTable;
use crate::recon::reconcile::{Event, Events, Reconciliation};
use crate::stats::density::{normal_ln_pdf, normal_ln_sf};
use crate::tree::species_tree::SpeciesTree;
use crate::tree::tree::{NodeId, Tree};
use crate::utils::error::{DegenerateModelError, SpidirError};
use eyre::Report;

/// Everything the subtree walks read besides the tree itself.
pub struct LikelihoodInputs<'a> {
  pub stree: &'a SpeciesTree,
  pub rates: &'a RateTable,
  pub recon: &'a Reconciliation,
  pub events: &'a Events,
  pub extra: &'a [bool],
}

/// Mean and standard deviation of the relative length of the species path from `node`'s species up to `sroot`.
pub(crate) fn species_path(
  tree: &Tree,
  inputs: &LikelihoodInputs,
  node: NodeId,
  sroot: NodeId,
) -> Result<(f64, f64), Report> {
  let snode = inputs.recon[node];
  let (mean, variance) = inputs.rates.path(inputs.stree, snode, sroot);
  if variance <= MIN_PATH_VARIANCE {
    return Err(
      SpidirError::from(DegenerateModelError::SigmaTooSmall {
        gene_node: tree.name(node).to_owned(),
        species_node: inputs.stree.name(snode).to_owned(),
        variance,
      })
      .into(),
    );
  }
  Ok((mean, variance.sqrt()))
}

/// Log-likelihood of the lengths in the subtree hanging from `start`, down to the first non-duplication nodes.
///
/// Every path from the subtree's parent to one of those nodes is scored against its species path. Paths share
/// their upper parts; each one is conditioned on the part already accounted for by the paths scored before it.
pub fn subtree_log_likelihood(
  tree: &mut Tree,
  inputs: &LikelihoodInputs,
  start: NodeId,
  baserate: f64,
) -> Result<f64, Report> {
  let Some(entry) = tree.parent(start) else {
    return Ok(0.0);
  };
  let sroot = inputs.recon[entry];

  let mut depths = vec![0.0; tree.num_nodes()];
  let mut marked = vec![false; tree.num_nodes()];
  marked[entry.0] = true;
  let mut logl = 0.0;

  let mut stack: Vec<(NodeId, Option<NodeId>)> = vec![(start, None)];
  while let Some((node, extra)) = stack.pop() {
    let parent_depth = tree.parent(node).map_or(0.0, |parent| depths[parent.0]);
    // branches which stay in the entry species are free
    depths[node.0] = if inputs.recon[node] == sroot {
      parent_depth
    } else {
      parent_depth + tree.dist(node)
    };

    let extra = if inputs.extra[node.0] { Some(node) } else { extra };

    if inputs.events[node] == Event::Duplication {
      stack.extend(tree.children(node).iter().rev().map(|&child| (child, extra)));
      continue;
    }
    if inputs.recon[node] == sroot {
      continue;
    }

    let (mean, sdev) = species_path(tree, inputs, node, sroot)?;

    let mut ptr = node;
    while !marked[ptr.0] {
      marked[ptr.0] = true;
      match tree.parent(ptr) {
        Some(parent) => ptr = parent,
        None => break,
      }
    }
    let mut cond_dist = depths[ptr.0];
    let unconditioned = cond_dist == 0.0;
    let log_denom = if unconditioned {
      0.0
    } else {
      normal_ln_sf(cond_dist / baserate, mean, sdev)?
    };
    let mut dist = depths[node.0].max(cond_dist);

    // the tail term is already fixed, so a conditioned path keeps its full length
    if let Some(extra) = extra {
      let target = mean.min((dist / baserate).max(0.0)) * baserate;
      let shrink = (dist - target).min(tree.dist(extra).max(0.0));
      if unconditioned {
        dist -= shrink;
      } else {
        cond_dist -= shrink;
      }
    }

    let log_nom = normal_ln_pdf(dist / baserate, mean, sdev)?;

    if log_denom == f64::NEG_INFINITY || log_nom == f64::INFINITY {
      logl = f64::NEG_INFINITY;
    } else {
      logl += log_nom - log_denom;
    }

    let annotations = &mut tree.node_mut(node).annotations;
    annotations.logl = Some(logl);
    annotations.rate = Some((mean, sdev));

    check_plausible(logl, || DegenerateModelError::LoglTooHigh {
      dist,
      cond_dist,
      baserate,
      mean,
      sdev,
    })?;
  }

  Ok(logl)
}

/// Fails when a running log-likelihood exceeds what any set of finite densities can produce.
fn check_plausible(logl: f64, details: impl FnOnce() -> DegenerateModelError) -> Result<(), Report> {
  if logl > MAX_SUBTREE_LOGL {
    return Err(SpidirError::from(details()).into());
  }
  Ok(())
}
