use crate::make_error;
use eyre::Report;
use std::collections::HashMap;

/// Maps gene names to species names.
///
/// Patterns are exact names, `prefix*` or `*suffix`. Exact names win, then the longest matching prefix, then the
/// longest matching suffix.
#[derive(Clone, Debug, Default)]
pub struct SpeciesMap {
  exact: HashMap<String, String>,
  prefixes: Vec<(String, String)>,
  suffixes: Vec<(String, String)>,
}

impl SpeciesMap {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn from_rules<'a>(rules: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<Self, Report> {
    let mut smap = Self::new();
    for (pattern, species) in rules {
      smap.add_rule(pattern, species)?;
    }
    Ok(smap)
  }

  pub fn add_rule(&mut self, pattern: &str, species: &str) -> Result<(), Report> {
    let species = species.to_owned();
    if let Some(prefix) = pattern.strip_suffix('*') {
      self.prefixes.push((prefix.to_owned(), species));
    } else if let Some(suffix) = pattern.strip_prefix('*') {
      self.suffixes.push((suffix.to_owned(), species));
    } else if pattern.is_empty() {
      return make_error!("Species map: empty gene pattern for species '{species}'");
    } else {
      self.exact.insert(pattern.to_owned(), species);
    }
    Ok(())
  }

  pub fn species_of(&self, gene: &str) -> Option<&str> {
    if let Some(species) = self.exact.get(gene) {
      return Some(species);
    }
    let by_prefix = self
      .prefixes
      .iter()
      .filter(|(prefix, _)| gene.starts_with(prefix.as_str()))
      .max_by_key(|(prefix, _)| prefix.len());
    if let Some((_, species)) = by_prefix {
      return Some(species);
    }
    self
      .suffixes
      .iter()
      .filter(|(suffix, _)| gene.ends_with(suffix.as_str()))
      .max_by_key(|(suffix, _)| suffix.len())
      .map(|(_, species)| species.as_str())
  }
}
