use crate::io::file::create_file;
use eyre::{Report, WrapErr};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Clone, Copy, Debug)]
pub struct JsonPretty(pub bool);

/// Serializes search results and the like. A path of `-` writes to standard output.
pub fn json_write_file<T: Serialize>(filepath: impl AsRef<Path>, obj: &T, pretty: JsonPretty) -> Result<(), Report> {
  let filepath = filepath.as_ref();
  let mut file = create_file(filepath)?;
  json_write(&mut file, obj, pretty)
    .and_then(|()| writeln!(file).wrap_err("When writing JSON"))
    .wrap_err_with(|| format!("When writing JSON file: '{}'", filepath.display()))
}

pub fn json_write<W: Write, T: Serialize>(writer: W, obj: &T, JsonPretty(pretty): JsonPretty) -> Result<(), Report> {
  let written = if pretty {
    serde_json::to_writer_pretty(writer, obj)
  } else {
    serde_json::to_writer(writer, obj)
  };
  written.wrap_err("When writing JSON")
}
