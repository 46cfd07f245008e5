use crate::io::file::{create_file, open_file_or_stdin};
use crate::make_error;
use crate::model::params::{BranchRate, GammaParams, RateModelParams};
use eyre::{Report, WrapErr};
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::Path;

/// Key of the line which holds the gamma prior of the baserate.
const BASERATE_KEY: &str = "baserate";

pub fn read_params_file(filepath: impl AsRef<Path>) -> Result<RateModelParams, Report> {
  let filepath = filepath.as_ref();
  let reader = open_file_or_stdin(filepath)?;
  read_params(reader).wrap_err_with(|| format!("When reading rate model parameters file {filepath:#?}"))
}

/// Reads `key <TAB> value <TAB> value` lines: `baserate <TAB> shape <TAB> rate`, and one
/// `species <TAB> mean <TAB> sdev` line per species branch.
pub fn read_params(reader: impl Read) -> Result<RateModelParams, Report> {
  let mut csv = csv::ReaderBuilder::new()
    .delimiter(b'\t')
    .has_headers(false)
    .trim(csv::Trim::All)
    .flexible(true)
    .from_reader(reader);

  let mut branches = BTreeMap::new();
  let mut baserate = None;
  for (i, record) in csv.records().enumerate() {
    let record = record.wrap_err_with(|| format!("When reading line {}", i + 1))?;
    let (key, x, y) = match (record.get(0), record.get(1), record.get(2), record.get(3)) {
      (Some(key), Some(x), Some(y), None) => (key, x, y),
      (Some(""), None, None, None) => continue,
      _ => return make_error!("Line {}: expected a name followed by two tab-separated numbers", i + 1),
    };
    let parse = |value: &str| -> Result<f64, Report> {
      value
        .parse::<f64>()
        .wrap_err_with(|| format!("Line {}: when parsing number '{value}' of '{key}'", i + 1))
    };
    let (x, y) = (parse(x)?, parse(y)?);

    if key == BASERATE_KEY {
      baserate = Some(GammaParams { shape: x, rate: y });
    } else if branches.insert(key.to_owned(), BranchRate { mean: x, sdev: y }).is_some() {
      return make_error!("Line {}: parameters of species branch '{key}' are given more than once", i + 1);
    }
  }

  let Some(baserate) = baserate else {
    return make_error!("Rate model parameters contain no '{BASERATE_KEY}' line");
  };
  Ok(RateModelParams { branches, baserate })
}

pub fn write_params_file(filepath: impl AsRef<Path>, params: &RateModelParams) -> Result<(), Report> {
  let filepath = filepath.as_ref();
  let f = create_file(filepath)?;
  write_params(f, params).wrap_err_with(|| format!("When writing rate model parameters file {filepath:#?}"))
}

/// Writes all lines sorted by key.
pub fn write_params(writer: impl Write, params: &RateModelParams) -> Result<(), Report> {
  if params.branches.contains_key(BASERATE_KEY) {
    return make_error!("Species branch name '{BASERATE_KEY}' is reserved for the baserate distribution");
  }

  let mut rows: Vec<(&str, f64, f64)> = params
    .branches
    .iter()
    .map(|(name, rate)| (name.as_str(), rate.mean, rate.sdev))
    .collect();
  rows.push((BASERATE_KEY, params.baserate.shape, params.baserate.rate));
  rows.sort_by(|a, b| a.0.cmp(b.0));

  let mut csv = csv::WriterBuilder::new()
    .delimiter(b'\t')
    .has_headers(false)
    .from_writer(writer);
  for (key, x, y) in rows {
    csv.write_record([key.to_owned(), x.to_string(), y.to_string()])?;
  }
  csv.flush()?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::examples::caterpillar_params;
  use indoc::indoc;
  use pretty_assertions::assert_eq;

  #[test]
  fn writes_sorted_lines_and_reads_them_back() -> Result<(), Report> {
    let params = caterpillar_params();
    let mut buf = Vec::new();
    write_params(&mut buf, &params)?;
    let text = String::from_utf8(buf)?;

    let keys: Vec<&str> = text.lines().filter_map(|line| line.split('\t').next()).collect();
    assert_eq!(keys, vec!["A", "AB", "ABC", "B", "C", "D", "DE", "E", "baserate", "root"]);
    assert!(text.contains("baserate\t8\t1\n"));

    assert_eq!(read_params(text.as_bytes())?, params);
    Ok(())
  }

  #[test]
  fn requires_baserate_line() {
    let input = indoc! {"
      A\t0.1\t0.05
      B\t0.2\t0.05
    "};
    assert!(read_params(input.as_bytes()).is_err());
  }

  #[test]
  fn rejects_malformed_numbers() {
    assert!(read_params("baserate\t8\tone\n".as_bytes()).is_err());
    assert!(read_params("baserate\t8\n".as_bytes()).is_err());
  }
}
