use crate::tree::tree::Tree;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchResult {
  pub tree: Tree,
  pub logl: f64,

  /// Best log-likelihood seen so far, after every scored candidate
  pub history: Vec<f64>,
}

/// Follows the best tree of a search.
#[derive(Clone, Debug, Default)]
pub struct BestTracker {
  best: Option<(f64, Tree)>,
  history: Vec<f64>,
}

impl BestTracker {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn best_logl(&self) -> Option<f64> {
    self.best.as_ref().map(|(logl, _)| *logl)
  }

  /// Takes the tree if it is strictly better than the best so far, or if it is the first one.
  pub fn offer(&mut self, logl: f64, tree: &Tree) -> bool {
    let better = match &self.best {
      None => true,
      Some((best, _)) => logl > *best,
    };
    if better {
      self.best = Some((logl, tree.clone()));
    }
    if let Some(best) = self.best_logl() {
      self.history.push(best);
    }
    better
  }

  pub fn into_result(self) -> Option<SearchResult> {
    let (logl, tree) = self.best?;
    Some(SearchResult {
      tree,
      logl,
      history: self.history,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::examples::tree_from_edges;
  use pretty_assertions::assert_eq;

  #[test]
  fn history_never_decreases() {
    let tree = tree_from_edges("r", &[("r", "a", 1.0), ("r", "b", 1.0)]);
    let mut tracker = BestTracker::new();
    for logl in [f64::NEG_INFINITY, -3.0, -5.0, -1.0, -2.0] {
      tracker.offer(logl, &tree);
    }
    let result = tracker.into_result().unwrap();
    assert_eq!(result.logl, -1.0);
    assert_eq!(result.history, vec![f64::NEG_INFINITY, -3.0, -3.0, -1.0, -1.0]);
  }
}
