use crate::constants::MIN_BASERATE_SDEV;
use crate::model::params::GammaParams;
use crate::stats::cubic::solve_cubic;
use crate::utils::error::{DegenerateModelError, SpidirError};
use eyre::Report;
use itertools::izip;

/// Most likely baserate of a gene given the lengths of its independent paths.
///
/// Each path `i` has length `lens[i]` and its length relative to the baserate is distributed as
/// `N(means[i], sdevs[i])`; the baserate itself has a gamma prior. Setting the derivative of the log-posterior to
/// zero and multiplying through by `r^3 / rate` gives the cubic
///
/// ```text
/// r^3 + (1 - shape)/rate r^2 + sum(mean len / sdev^2)/rate r - sum(len^2 / sdev^2)/rate = 0
/// ```
///
/// whose largest positive root is returned. Paths with a near-zero sdev are left out.
pub fn mle_baserate(lens: &[f64], means: &[f64], sdevs: &[f64], prior: &GammaParams) -> Result<f64, Report> {
  let GammaParams { shape, rate } = *prior;

  let (mut weighted_mean, mut weighted_len) = (0.0, 0.0);
  for (&len, &mean, &sdev) in izip!(lens, means, sdevs) {
    if sdev <= MIN_BASERATE_SDEV {
      continue;
    }
    let var = sdev * sdev;
    weighted_mean += mean * len / var;
    weighted_len += len * len / var;
  }

  let a = (1.0 - shape) / rate;
  let b = weighted_mean / rate;
  let c = -weighted_len / rate;

  let no_root = || -> Report { SpidirError::from(DegenerateModelError::NoPositiveBaserate { a, b, c }).into() };

  if !(rate > 0.0) || !rate.is_finite() || ![a, b, c].iter().all(|x| x.is_finite()) {
    return Err(no_root());
  }

  solve_cubic(a, b, c)
    .into_iter()
    .filter(|&r| r > 0.0 && r.is_finite())
    .last()
    .ok_or_else(no_root)
}
