use crate::io::fs::filename_maybe;
use color_eyre::owo_colors::{OwoColorize, Style};
use env_logger::Env;
use log::{Level, LevelFilter, Record};
use std::io::Write;

/// Frames of these crates are left out of error reports and panic backtraces.
const HIDDEN_FRAME_PREFIXES: &[&str] = &[
  "__rust_try",
  "alloc::",
  "color_eyre::",
  "core::",
  "eyre::",
  "spidir::utils::error",
  "std::",
];

fn source_location(record: &Record) -> String {
  match (record.file().and_then(filename_maybe), record.line()) {
    (Some(file), Some(line)) => format!("{file}:{line}:").dimmed().to_string(),
    (Some(file), None) => format!("{file}:").dimmed().to_string(),
    _ => String::new(),
  }
}

fn level_tag(level: Level) -> String {
  let letter = &level.as_str()[..1];
  let letter = match level {
    Level::Error => letter.red().to_string(),
    Level::Warn => letter.yellow().to_string(),
    Level::Info => letter.cyan().dimmed().to_string(),
    Level::Debug => letter.green().dimmed().to_string(),
    Level::Trace => letter.dimmed().to_string(),
  };
  format!("{}{letter}{}", "[".dimmed(), "]".dimmed())
}

/// Console logger: timestamp, one-letter level, source location, message.
pub fn setup_logger(filter_level: LevelFilter) {
  env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
    .filter_level(filter_level)
    .format(|buf, record| {
      let timestamp = buf.timestamp_millis().to_string().dimmed().to_string();
      writeln!(
        buf,
        "{timestamp} {} {} {}",
        level_tag(record.level()),
        source_location(record),
        record.args()
      )
    })
    .init();
}

fn is_hidden_frame(frame: &color_eyre::config::Frame) -> bool {
  let hidden_name = frame.name.as_ref().map_or(true, |name| {
    HIDDEN_FRAME_PREFIXES
      .iter()
      .any(|&prefix| name.starts_with(prefix) || name.starts_with(&format!("<{prefix}")))
  });
  let hidden_file = frame
    .filename
    .as_ref()
    .map_or(false, |filename| filename.starts_with("/rustc/"));
  hidden_name || hidden_file
}

/// Installs the colored report and panic hooks.
pub fn global_init() {
  let installed = color_eyre::config::HookBuilder::default()
    .theme(
      color_eyre::config::Theme::dark()
        .dependency_code(Style::new().dimmed())
        .file(Style::new().green())
        .line_number(Style::new().yellow())
        .panic_message(Style::new().bright_red().bold())
        .hidden_frames(Style::new().dimmed()),
    )
    .panic_section(format!(
      "If you think it's a bug, consider reporting at: '{}/issues'",
      env!("CARGO_PKG_REPOSITORY"),
    ))
    .add_frame_filter(Box::new(|frames| frames.retain(|frame| !is_hidden_frame(frame))))
    .install();

  // Test binaries may call this more than once
  if let Err(report) = installed {
    eprintln!("color_eyre initialization skipped: {report}");
  }
}
