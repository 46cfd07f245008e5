use crate::io::fs::ensure_dir;
use eyre::{Report, WrapErr};
use log::info;
use std::fs::File;
use std::io::{stdin, stdout, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Opens a file for reading. `-` and `/dev/stdin` read standard input.
pub fn open_file_or_stdin(filepath: impl AsRef<Path>) -> Result<Box<dyn BufRead>, Report> {
  let filepath = filepath.as_ref();
  if is_path_stdin(filepath) {
    info!("Reading from standard input");
    return Ok(Box::new(BufReader::new(stdin())));
  }
  let file = File::open(filepath).wrap_err_with(|| format!("When opening file '{}'", filepath.display()))?;
  Ok(Box::new(BufReader::with_capacity(32 * 1024, file)))
}

/// Opens a file for writing, creating missing parent directories. `-` and `/dev/stdout` write to standard output.
pub fn create_file(filepath: impl AsRef<Path>) -> Result<Box<dyn Write + Send>, Report> {
  let filepath = filepath.as_ref();

  let file: Box<dyn Write + Send> = if is_path_stdout(filepath) {
    info!("Writing to standard output");
    Box::new(stdout())
  } else {
    ensure_dir(filepath)?;
    Box::new(File::create(filepath).wrap_err_with(|| format!("When creating file: '{}'", filepath.display()))?)
  };

  Ok(Box::new(BufWriter::with_capacity(32 * 1024, file)))
}

pub fn is_path_stdin(filepath: impl AsRef<Path>) -> bool {
  let filepath = filepath.as_ref();
  filepath == Path::new("-") || filepath == Path::new("/dev/stdin")
}

pub fn is_path_stdout(filepath: impl AsRef<Path>) -> bool {
  let filepath = filepath.as_ref();
  filepath == Path::new("-") || filepath == Path::new("/dev/stdout")
}
