use crate::constants::HISTOGRAM_BINS_PER_MEAN;
use itertools::Itertools;
use statrs::statistics::Statistics;

/// Lower edge of the fullest of `ndivs` equal-width bins spanning the data. First bin wins ties.
pub fn histogram_mode(values: &[f64], ndivs: usize) -> Option<f64> {
  let (&min, &max) = values.iter().minmax_by(|a, b| a.total_cmp(b)).into_option()?;
  let ndivs = ndivs.max(1);
  let width = (max - min) / ndivs as f64;
  if width <= 0.0 || !width.is_finite() {
    return Some(min);
  }

  let mut counts = vec![0_usize; ndivs];
  for &x in values {
    let bin = (((x - min) / width).floor() as usize).min(ndivs - 1);
    counts[bin] += 1;
  }

  let (best, _) = counts
    .iter()
    .enumerate()
    .fold((0, 0), |(best, best_count), (i, &count)| {
      if count > best_count {
        (i, count)
      } else {
        (best, best_count)
      }
    });
  Some(min + best as f64 * width)
}

/// Robust normal fit centered on the histogram mode: values outside `[0, 2 * mode]` are ignored for the spread.
///
/// Returns `(mean, sdev)`; the sdev defaults to 1 when fewer than two values remain.
pub fn fit_normal_mode(values: &[f64]) -> Option<(f64, f64)> {
  if values.is_empty() {
    return None;
  }
  let mean = values.iter().mean();
  let (min, max) = values.iter().copied().minmax_by(f64::total_cmp).into_option()?;
  // a mean near zero would ask for an unbounded number of bins
  let max_ndivs = values.len() as f64 * HISTOGRAM_BINS_PER_MEAN;
  let ndivs = ((max - min) / mean * HISTOGRAM_BINS_PER_MEAN).clamp(0.0, max_ndivs) as usize;
  let mode = histogram_mode(values, ndivs)?;

  let kept = values.iter().filter(|&&x| x >= 0.0 && x <= 2.0 * mode).collect_vec();
  let sdev = if kept.len() < 2 {
    1.0
  } else {
    let ss: f64 = kept.iter().map(|&&x| (x - mode).powi(2)).sum();
    (ss / (kept.len() - 1) as f64).sqrt()
  };
  Some((mode, sdev))
}

#[cfg(test)]
mod tests {
  use super::*;
  use approx::assert_abs_diff_eq;
  use pretty_assertions::assert_eq;

  #[test]
  fn picks_fullest_bin() {
    let values = [0.0, 1.0, 1.1, 1.2, 3.9, 4.0];
    // bins of width 1 starting at 0: counts 1, 3, 0, 2
    assert_eq!(histogram_mode(&values, 4), Some(1.0));
    assert_eq!(histogram_mode(&[], 4), None);
  }

  #[test]
  fn bounds_bins_when_mean_is_near_zero() {
    // negative fitted lengths can cancel out the positive ones
    let values = [-1.0, 1.0 + 2e-12];
    assert_eq!(fit_normal_mode(&values), Some((-1.0, 1.0)));
  }

  #[test]
  fn fits_mode_and_spread() {
    let values = [0.9, 1.0, 1.0, 1.0, 1.1, 5.0];
    let (mode, sdev) = fit_normal_mode(&values).unwrap();
    assert!(mode > 0.85 && mode <= 1.0, "mode = {mode}");
    // 5.0 lies beyond twice the mode
    let expected = {
      let kept = [0.9, 1.0, 1.0, 1.0, 1.1];
      (kept.iter().map(|x| (x - mode).powi(2)).sum::<f64>() / 4.0).sqrt()
    };
    assert_abs_diff_eq!(sdev, expected, epsilon = 1e-12);
  }

  #[test]
  fn defaults_spread_for_single_value() {
    assert_eq!(fit_normal_mode(&[0.3]), Some((0.3, 1.0)));
  }
}
