use crate::io::file::open_file_or_stdin;
use eyre::{Report, WrapErr};
use std::fs;
use std::io::Read;
use std::path::Path;

/// Creates the directory that is to contain the file, with all of its ancestors.
pub fn ensure_dir(filepath: impl AsRef<Path>) -> Result<(), Report> {
  let filepath = filepath.as_ref();
  match filepath.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
      .wrap_err_with(|| format!("When creating parent directory for '{}'", filepath.display())),
    _ => Ok(()),
  }
}

pub fn filename_maybe(filepath: impl AsRef<Path>) -> Option<String> {
  filepath.as_ref().file_name()?.to_str()?.to_owned().into()
}

/// Reads entire file into a string. A path of `-` reads standard input.
pub fn read_file_to_string(filepath: impl AsRef<Path>) -> Result<String, Report> {
  let filepath = filepath.as_ref();
  let mut file = open_file_or_stdin(filepath)?;
  let mut data = String::new();
  file
    .read_to_string(&mut data)
    .wrap_err_with(|| format!("When reading file: '{}'", filepath.display()))?;
  Ok(data)
}
