use ctor::ctor;
use eyre::Report;
use log::info;
use spidir::commands::learn::run_learn::run_learn;
use spidir::commands::logl::run_logl::run_logl;
use spidir::commands::search::run_tree_search::run_tree_search;
use spidir::utils::global_init::global_init;
use spidir_cli::cli::spidir_cli::{spidir_parse_cli_args, SpidirCommands};

#[ctor]
fn init() {
  global_init();
}

fn main() -> Result<(), Report> {
  let args = spidir_parse_cli_args()?;

  info!("{:#?}", &args);

  match args.command {
    SpidirCommands::Learn(learn_args) => {
      run_learn(&learn_args)?;
    }
    SpidirCommands::Search(search_args) => {
      run_tree_search(&search_args)?;
    }
    SpidirCommands::Logl(logl_args) => {
      run_logl(&logl_args)?;
    }
  }

  Ok(())
}
