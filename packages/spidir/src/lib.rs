pub mod commands;
pub mod constants;
pub mod fit;
pub mod io;
pub mod likelihood;
pub mod model;
pub mod recon;
pub mod search;
pub mod stats;
pub mod tree;
pub mod utils;

#[cfg(test)]
pub(crate) mod examples;
