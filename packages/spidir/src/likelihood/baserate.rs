use crate::likelihood::subtree::{species_path, LikelihoodInputs};
use crate::model::baserate::mle_baserate;
use crate::model::params::GammaParams;
use crate::recon::reconcile::Event;
use crate::tree::tree::{NodeId, Tree};
use eyre::Report;

/// Paths whose lengths are independent of each other, with their species-path distributions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IndependentPaths {
  pub lens: Vec<f64>,
  pub means: Vec<f64>,
  pub sdevs: Vec<f64>,
}

/// Cuts the tree at every non-duplication node into paths which do not overlap.
///
/// Paths that stay within their entry species, or pass an extra branch, carry no information about the baserate
/// and are skipped.
pub fn independent_paths(tree: &Tree, inputs: &LikelihoodInputs) -> Result<IndependentPaths, Report> {
  struct Frame {
    node: NodeId,
    parent_depth: f64,
    sroot: NodeId,
    extra: bool,
  }

  let root = tree.root();
  let mut paths = IndependentPaths::default();
  let mut stack = tree
    .children(root)
    .iter()
    .rev()
    .map(|&node| Frame {
      node,
      parent_depth: 0.0,
      sroot: inputs.recon[root],
      extra: false,
    })
    .collect::<Vec<_>>();

  while let Some(Frame {
    node,
    parent_depth,
    sroot,
    extra,
  }) = stack.pop()
  {
    let depth = if inputs.recon[node] == sroot {
      parent_depth
    } else {
      parent_depth + tree.dist(node)
    };
    let extra = extra || inputs.extra[node.0];

    if inputs.events[node] == Event::Duplication {
      stack.extend(tree.children(node).iter().rev().map(|&child| Frame {
        node: child,
        parent_depth: depth,
        sroot,
        extra,
      }));
      continue;
    }

    if inputs.recon[node] != sroot && !extra {
      let (mean, sdev) = species_path(tree, inputs, node, sroot)?;
      paths.lens.push(depth);
      paths.means.push(mean);
      paths.sdevs.push(sdev);
    }

    stack.extend(tree.children(node).iter().rev().map(|&child| Frame {
      node: child,
      parent_depth: 0.0,
      sroot: inputs.recon[node],
      extra: false,
    }));
  }

  Ok(paths)
}

/// Most likely baserate of the tree's gene family under the rate model.
pub fn estimate_baserate(tree: &Tree, inputs: &LikelihoodInputs, prior: &GammaParams) -> Result<f64, Report> {
  let paths = independent_paths(tree, inputs)?;
  mle_baserate(&paths.lens, &paths.means, &paths.sdevs, prior)
}
