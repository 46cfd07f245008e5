use crate::recon::reconcile::Events;
use crate::tree::tree::Tree;
use crate::utils::float_fmt::float_to_significant_digits;
use std::fmt::Write;

fn fmt_value(value: Option<f64>) -> String {
  value.map_or_else(|| "-".to_owned(), |x| float_to_significant_digits(x, 4))
}

/// Per-node table of the last likelihood evaluation: name, branch length, running subtree log-likelihood, flags
/// (`x` extra, `u` unfold), expected length and its spread in units of length, and the event.
pub fn format_diagnostics(tree: &Tree, events: &Events, baserate: f64) -> String {
  let mut out = String::new();
  let _ = writeln!(
    out,
    "{:<16} {:>10} {:>12} {:>5} {:>10} {:>10} {:>6}",
    "node", "dist", "logl", "flags", "mean", "sdev", "event"
  );
  for node in tree.preorder() {
    let annotations = &tree.node(node).annotations;
    let flags = match (annotations.extra, annotations.unfold) {
      (true, true) => "xu",
      (true, false) => "x",
      (false, true) => "u",
      (false, false) => "",
    };
    let (mean, sdev) = annotations
      .rate
      .map_or((None, None), |(mean, sdev)| (Some(mean * baserate), Some(sdev * baserate)));
    let _ = writeln!(
      out,
      "{:<16} {:>10} {:>12} {:>5} {:>10} {:>10} {:>6}",
      tree.name(node),
      float_to_significant_digits(tree.dist(node), 4),
      fmt_value(annotations.logl),
      flags,
      fmt_value(mean),
      fmt_value(sdev),
      events[node].to_string(),
    );
  }
  let _ = writeln!(
    out,
    "baserate: {}, logl: {}",
    float_to_significant_digits(baserate, 6),
    fmt_value(tree.annotations.logl)
  );
  out
}
