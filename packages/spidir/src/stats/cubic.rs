use std::f64::consts::PI;

/// Relative size below which the discriminant counts as zero (repeated roots).
const DISCRIMINANT_EPS: f64 = 1e-12;

/// Real roots of the monic cubic `x^3 + a x^2 + b x + c`, in ascending order. Repeated roots are reported once.
pub fn solve_cubic(a: f64, b: f64, c: f64) -> Vec<f64> {
  if c == 0.0 {
    return solve_factored(a, b);
  }

  // Depressed form t^3 + p t + q with x = t - a/3
  let shift = a / 3.0;
  let p = b - a * a / 3.0;
  let q = 2.0 * a * a * a / 27.0 - a * b / 3.0 + c;

  let magnitude = (q / 2.0).powi(2) + (p / 3.0).abs().powi(3);
  let disc = (q / 2.0).powi(2) + (p / 3.0).powi(3);

  let mut roots = if magnitude == 0.0 {
    vec![0.0]
  } else if disc.abs() <= DISCRIMINANT_EPS * magnitude {
    vec![3.0 * q / p, -3.0 * q / (2.0 * p)]
  } else if disc > 0.0 {
    let sq = disc.sqrt();
    vec![(-q / 2.0 + sq).cbrt() + (-q / 2.0 - sq).cbrt()]
  } else {
    let r = 2.0 * (-p / 3.0).sqrt();
    let phi = ((3.0 * q) / (2.0 * p) * (-3.0 / p).sqrt()).clamp(-1.0, 1.0).acos();
    (0..3)
      .map(|k| r * ((phi - 2.0 * PI * f64::from(k)) / 3.0).cos())
      .collect()
  };

  for root in &mut roots {
    *root -= shift;
  }
  roots.sort_by(f64::total_cmp);
  roots
}

/// Roots of `x (x^2 + a x + b)`, keeping the zero root exact.
fn solve_factored(a: f64, b: f64) -> Vec<f64> {
  let mut roots = vec![0.0];
  let disc = a * a - 4.0 * b;
  if disc >= 0.0 {
    let sq = disc.sqrt();
    roots.extend([(-a - sq) / 2.0, (-a + sq) / 2.0]);
  }
  roots.sort_by(f64::total_cmp);
  roots.dedup();
  roots
}
