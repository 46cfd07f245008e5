#![allow(clippy::pub_use)]

use eyre::Report;
use thiserror::Error;

pub fn report_to_string(report: &Report) -> String {
  let strings: Vec<String> = report.chain().map(std::string::ToString::to_string).collect();
  strings.join(": ")
}

/// Finds a typed error anywhere in the report's context chain.
pub fn find_error<E>(report: &Report) -> Option<&E>
where
  E: std::error::Error + Send + Sync + 'static,
{
  report.chain().find_map(|cause| cause.downcast_ref::<E>())
}

/// Failures with a meaning of their own, as opposed to plain I/O or parse errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpidirError {
  #[error("When fitting branch lengths: {0}")]
  Fit(String),

  #[error(transparent)]
  DegenerateModel(#[from] DegenerateModelError),

  #[error("Unknown search strategy: '{0}'. Possible values: 'greedy', 'mcmc', 'exhaustive', 'none'")]
  UnknownStrategy(String),

  #[error("No search strategy produced a tree and no candidate trees were given")]
  NoResult,
}

/// The rate model cannot produce a usable likelihood for the tree at hand.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DegenerateModelError {
  #[error(
    "Rate model variance is too small ({variance:e}) on the species path of gene node '{gene_node}' \
     (species branch '{species_node}')"
  )]
  SigmaTooSmall {
    gene_node: String,
    species_node: String,
    variance: f64,
  },

  #[error("Baserate equation has no positive real root (a={a}, b={b}, c={c})")]
  NoPositiveBaserate { a: f64, b: f64, c: f64 },

  #[error(
    "Log-likelihood is implausibly high: dist={dist}, conditioning dist={cond_dist}, baserate={baserate}, \
     mean={mean}, sdev={sdev}"
  )]
  LoglTooHigh {
    dist: f64,
    cond_dist: f64,
    baserate: f64,
    mean: f64,
    sdev: f64,
  },
}

#[macro_export(local_inner_macros)]
macro_rules! make_error {
  ($($arg:tt)*) => {
    {
      Err(eyre::eyre!(std::format!($($arg)*)))
    }
  };
}

pub use make_error;

#[macro_export(local_inner_macros)]
macro_rules! make_internal_error {
  ($($arg:tt)*) => {
    {
      let msg_external = std::format!($($arg)*);
      let msg = std::format!("{msg_external}. This is an internal error. Please report it to developers.");
      Err(eyre::eyre!(msg))
    }
  };
}

pub use make_internal_error;

#[macro_export(local_inner_macros)]
macro_rules! make_internal_report {
  ($($arg:tt)*) => {
    {
      let msg_external = std::format!($($arg)*);
      let msg = std::format!("{msg_external}. This is an internal error. Please report it to developers.");
      eyre::eyre!(msg)
    }
  };
}

pub use make_internal_report;
