pub mod error;
pub mod float_fmt;
pub mod global_init;
pub mod observability;
pub mod random;
