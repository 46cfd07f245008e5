use crate::tree::topology_key::TopologyKey;
use crate::tree::tree::Tree;
use crate::utils::float_fmt::float_to_significant_digits;
use crate::utils::observability::ObservabilityConfig;
use itertools::Itertools;
use log::Level;
use std::collections::HashMap;

#[derive(Clone, Debug)]
pub struct VisitedEntry {
  pub logl: f64,

  /// The tree with the branch lengths it was scored with
  pub tree: Tree,
}

/// Topologies already scored during one search, with the best score seen for each.
#[derive(Clone, Debug, Default)]
pub struct VisitedCache {
  entries: HashMap<TopologyKey, VisitedEntry>,
}

impl VisitedCache {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn get(&self, key: &TopologyKey) -> Option<&VisitedEntry> {
    self.entries.get(key)
  }

  /// Records a score. An existing entry is only replaced by a better one.
  pub fn insert(&mut self, key: TopologyKey, logl: f64, tree: &Tree) {
    match self.entries.get(&key) {
      Some(entry) if !(logl > entry.logl) => {}
      _ => {
        self.entries.insert(
          key,
          VisitedEntry {
            logl,
            tree: tree.clone(),
          },
        );
      }
    }
  }

  /// The `n` best topologies, best first.
  pub fn top(&self, n: usize) -> Vec<(&TopologyKey, f64)> {
    self
      .entries
      .iter()
      .map(|(key, entry)| (key, entry.logl))
      .sorted_by(|(key_a, a), (key_b, b)| b.total_cmp(a).then_with(|| key_a.cmp(key_b)))
      .take(n)
      .collect()
  }

  pub fn log_top(&self, obs: &ObservabilityConfig, n: usize) {
    obs.emit(Level::Debug, || {
      let lines = self
        .top(n)
        .into_iter()
        .map(|(key, logl)| format!("    {}\t{key}", float_to_significant_digits(logl, 8)))
        .join("\n");
      format!("Best trees out of {} visited:\n{lines}", self.len())
    });
  }
}
