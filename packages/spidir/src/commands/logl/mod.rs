pub mod logl_args;
pub mod run_logl;
