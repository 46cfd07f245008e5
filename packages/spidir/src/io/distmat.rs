use crate::fit::distance_matrix::DistanceMatrix;
use crate::io::file::create_file;
use crate::io::fs::read_file_to_string;
use crate::make_error;
use crate::utils::float_fmt::float_to_significant_digits;
use eyre::{Report, WrapErr};
use itertools::Itertools;
use ndarray::Array2;
use std::io::Write;
use std::path::Path;

pub fn read_distmat_file(filepath: impl AsRef<Path>) -> Result<DistanceMatrix, Report> {
  let filepath = filepath.as_ref();
  let content = read_file_to_string(filepath)?;
  read_distmat_str(&content).wrap_err_with(|| format!("When reading distance matrix file {filepath:#?}"))
}

/// Parses a square PHYLIP distance matrix: a line with the number of taxa, then one line per taxon with its name
/// followed by its distances. Rows may wrap over several lines.
pub fn read_distmat_str(content: &str) -> Result<DistanceMatrix, Report> {
  let mut tokens = content.split_whitespace();

  let n: usize = match tokens.next() {
    Some(token) => token
      .parse()
      .wrap_err_with(|| format!("When parsing the number of taxa: '{token}'"))?,
    None => return make_error!("Distance matrix is empty"),
  };

  let mut labels = Vec::with_capacity(n);
  let mut dists = Array2::<f64>::zeros((n, n));
  for i in 0..n {
    let Some(label) = tokens.next() else {
      return make_error!("Distance matrix ended early: expected {n} rows, found {i}");
    };
    labels.push(label.to_owned());
    for j in 0..n {
      let Some(token) = tokens.next() else {
        return make_error!("Distance matrix ended early in the row of '{label}'");
      };
      dists[[i, j]] = token
        .parse()
        .wrap_err_with(|| format!("When parsing distance between '{label}' and taxon #{}: '{token}'", j + 1))?;
    }
  }

  if let Some(extra) = tokens.next() {
    return make_error!("Unexpected trailing content in distance matrix: '{extra}'");
  }

  DistanceMatrix::new(labels, dists)
}

pub fn write_distmat_file(filepath: impl AsRef<Path>, distmat: &DistanceMatrix) -> Result<(), Report> {
  let filepath = filepath.as_ref();
  let mut f = create_file(filepath)?;
  write_distmat_writer(&mut f, distmat).wrap_err_with(|| format!("When writing distance matrix file {filepath:#?}"))
}

pub fn write_distmat_writer(writer: &mut impl Write, distmat: &DistanceMatrix) -> Result<(), Report> {
  writeln!(writer, "{:>5}", distmat.len())?;
  for (label, row) in distmat.labels().iter().zip(distmat.dists().rows()) {
    let row = row.iter().map(|&d| float_to_significant_digits(d, 8)).join(" ");
    writeln!(writer, "{label} {row}")?;
  }
  Ok(())
}
