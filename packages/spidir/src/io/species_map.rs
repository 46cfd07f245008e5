use crate::io::file::open_file_or_stdin;
use crate::make_error;
use crate::recon::species_map::SpeciesMap;
use eyre::{Report, WrapErr};
use std::io::Read;
use std::path::Path;

pub fn read_species_map_file(filepath: impl AsRef<Path>) -> Result<SpeciesMap, Report> {
  let filepath = filepath.as_ref();
  let reader = open_file_or_stdin(filepath)?;
  read_species_map(reader).wrap_err_with(|| format!("When reading species map file {filepath:#?}"))
}

/// Reads tab-separated `gene pattern <TAB> species` lines. Lines starting with `#` are ignored.
pub fn read_species_map(reader: impl Read) -> Result<SpeciesMap, Report> {
  let mut csv = csv::ReaderBuilder::new()
    .delimiter(b'\t')
    .has_headers(false)
    .comment(Some(b'#'))
    .trim(csv::Trim::All)
    .flexible(true)
    .from_reader(reader);

  let mut smap = SpeciesMap::new();
  for (i, record) in csv.records().enumerate() {
    let record = record.wrap_err_with(|| format!("When reading line {}", i + 1))?;
    match (record.get(0), record.get(1)) {
      (Some(pattern), Some(species)) if !species.is_empty() => smap.add_rule(pattern, species)?,
      (Some(""), None) | (None, None) => {}
      _ => return make_error!("Line {}: expected a gene pattern and a species name separated by a tab", i + 1),
    }
  }
  Ok(smap)
}
