use log::{Level, LevelFilter};
use parking_lot::Mutex;
use std::fmt::{Debug, Formatter};
use std::io::Write;
use std::sync::Arc;

pub type DiagnosticsSink = Arc<Mutex<Box<dyn Write + Send>>>;

/// Verbosity and destination of the diagnostics produced by learning and search.
///
/// Messages at or below `level` go to `sink` when one is set, otherwise they become ordinary `log` records.
#[derive(Clone)]
pub struct ObservabilityConfig {
  pub level: LevelFilter,
  sink: Option<DiagnosticsSink>,
}

impl Default for ObservabilityConfig {
  fn default() -> Self {
    Self {
      level: log::max_level(),
      sink: None,
    }
  }
}

impl Debug for ObservabilityConfig {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ObservabilityConfig")
      .field("level", &self.level)
      .field("sink", &self.sink.as_ref().map(|_| "<writer>"))
      .finish()
  }
}

impl ObservabilityConfig {
  pub fn new(level: LevelFilter) -> Self {
    Self { level, sink: None }
  }

  pub fn with_sink(level: LevelFilter, writer: impl Write + Send + 'static) -> Self {
    Self {
      level,
      sink: Some(Arc::new(Mutex::new(Box::new(writer)))),
    }
  }

  pub fn silent() -> Self {
    Self::new(LevelFilter::Off)
  }

  pub fn is_enabled(&self, level: Level) -> bool {
    level <= self.level
  }

  /// Builds the message only if it is going to be shown.
  pub fn emit(&self, level: Level, message: impl FnOnce() -> String) {
    if !self.is_enabled(level) {
      return;
    }
    let message = message();
    match &self.sink {
      Some(sink) => {
        if let Err(err) = writeln!(sink.lock(), "{message}") {
          log::warn!("Unable to write diagnostics: {err}");
        }
      }
      None => log::log!(level, "{message}"),
    }
  }
}
