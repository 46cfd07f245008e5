pub mod cache;
pub mod evaluator;
pub mod exhaustive;
pub mod greedy;
pub mod initial;
pub mod mcmc;
pub mod nni;
pub mod result;
pub mod run_search;
