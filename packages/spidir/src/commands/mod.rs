pub mod learn;
pub mod logl;
pub mod search;
