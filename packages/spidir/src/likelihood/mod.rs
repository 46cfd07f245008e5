pub mod baserate;
pub mod config;
pub mod extra_branches;
pub mod report;
pub mod subtree;
pub mod tree_likelihood;
