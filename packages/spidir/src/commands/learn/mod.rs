pub mod learn_args;
pub mod run_learn;
