use eyre::{Report, WrapErr};
use statrs::distribution::{Continuous, ContinuousCDF, Gamma, Normal};

/// Natural log that maps non-positive arguments to negative infinity instead of NaN.
pub fn safe_ln(x: f64) -> f64 {
  if x > 0.0 {
    x.ln()
  } else {
    f64::NEG_INFINITY
  }
}

fn normal(mean: f64, sdev: f64) -> Result<Normal, Report> {
  Normal::new(mean, sdev).wrap_err_with(|| format!("When creating normal distribution (mean={mean}, sdev={sdev})"))
}

/// Log of the normal density. Underflows to negative infinity far in the tails.
pub fn normal_ln_pdf(x: f64, mean: f64, sdev: f64) -> Result<f64, Report> {
  Ok(safe_ln(normal(mean, sdev)?.pdf(x)))
}

/// Log of the normal upper tail probability `1 - CDF(x)`.
pub fn normal_ln_sf(x: f64, mean: f64, sdev: f64) -> Result<f64, Report> {
  Ok(safe_ln(normal(mean, sdev)?.sf(x)))
}

/// Log density of the gamma distribution with the given shape and rate.
pub fn gamma_ln_pdf(x: f64, shape: f64, rate: f64) -> Result<f64, Report> {
  let gamma = Gamma::new(shape, rate)
    .wrap_err_with(|| format!("When creating gamma distribution (shape={shape}, rate={rate})"))?;
  Ok(gamma.ln_pdf(x))
}

#[cfg(test)]
mod tests {
  use super::*;
  use approx::assert_abs_diff_eq;
  use std::f64::consts::PI;

  #[test]
  fn safe_ln_of_non_positive_is_negative_infinity() {
    assert_eq!(safe_ln(0.0), f64::NEG_INFINITY);
    assert_eq!(safe_ln(-1.0), f64::NEG_INFINITY);
    assert_abs_diff_eq!(safe_ln(1.0), 0.0);
  }

  #[test]
  fn evaluates_normal_density_and_tail() -> Result<(), Report> {
    assert_abs_diff_eq!(normal_ln_pdf(0.0, 0.0, 1.0)?, -0.5 * (2.0 * PI).ln(), epsilon = 1e-12);
    assert_abs_diff_eq!(normal_ln_sf(0.0, 0.0, 1.0)?, 0.5_f64.ln(), epsilon = 1e-12);
    assert_eq!(normal_ln_pdf(1e6, 0.0, 1.0)?, f64::NEG_INFINITY);
    assert!(normal_ln_pdf(0.0, 0.0, 0.0).is_err());
    Ok(())
  }

  #[test]
  fn evaluates_gamma_density() -> Result<(), Report> {
    // shape 1 is the exponential distribution
    assert_abs_diff_eq!(gamma_ln_pdf(2.0, 1.0, 0.5)?, 0.5_f64.ln() - 1.0, epsilon = 1e-12);
    Ok(())
  }
}
