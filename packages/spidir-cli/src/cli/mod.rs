pub mod spidir_cli;
pub mod verbosity;
