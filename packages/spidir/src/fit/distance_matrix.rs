use crate::utils::error::SpidirError;
use eyre::Report;
use getset::Getters;
use ndarray::{s, Array2};
use std::collections::HashMap;

const SYMMETRY_TOLERANCE: f64 = 1e-6;

/// Pairwise gene distances with the labels of rows and columns.
#[derive(Clone, Debug, PartialEq, Getters)]
pub struct DistanceMatrix {
  #[getset(get = "pub")]
  labels: Vec<String>,

  #[getset(get = "pub")]
  dists: Array2<f64>,
}

impl DistanceMatrix {
  /// Checks that the matrix is square, symmetric, non-negative and zero on the diagonal.
  pub fn new(labels: Vec<String>, dists: Array2<f64>) -> Result<Self, Report> {
    let n = labels.len();
    if dists.dim() != (n, n) {
      return Err(
        SpidirError::Fit(format!(
          "distance matrix has shape {:?}, but there are {n} labels",
          dists.dim()
        ))
        .into(),
      );
    }

    let mut seen = HashMap::with_capacity(n);
    for (i, label) in labels.iter().enumerate() {
      if let Some(j) = seen.insert(label.as_str(), i) {
        return Err(SpidirError::Fit(format!("label '{label}' appears in rows {j} and {i}")).into());
      }
    }

    for i in 0..n {
      if dists[[i, i]] != 0.0 {
        return Err(SpidirError::Fit(format!("non-zero self-distance of '{}'", labels[i])).into());
      }
      for j in (i + 1)..n {
        let (a, b) = (dists[[i, j]], dists[[j, i]]);
        if !a.is_finite() || a < 0.0 {
          return Err(SpidirError::Fit(format!("invalid distance {a} between '{}' and '{}'", labels[i], labels[j])).into());
        }
        if (a - b).abs() > SYMMETRY_TOLERANCE * a.abs().max(1.0) {
          return Err(SpidirError::Fit(format!("asymmetric distances between '{}' and '{}'", labels[i], labels[j])).into());
        }
      }
    }

    Ok(Self { labels, dists })
  }

  pub fn len(&self) -> usize {
    self.labels.len()
  }

  pub fn is_empty(&self) -> bool {
    self.labels.is_empty()
  }

  pub fn get(&self, i: usize, j: usize) -> f64 {
    self.dists[[i, j]]
  }

  pub fn index_of(&self, label: &str) -> Option<usize> {
    self.labels.iter().position(|l| l == label)
  }

  /// Matrix restricted to the first `n` labels.
  pub fn head(&self, n: usize) -> Self {
    let n = n.min(self.len());
    Self {
      labels: self.labels[..n].to_vec(),
      dists: self.dists.slice(s![..n, ..n]).to_owned(),
    }
  }
}
