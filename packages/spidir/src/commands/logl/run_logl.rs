use crate::commands::logl::logl_args::SpidirLoglArgs;
use crate::io::nwk::{read_nwk_file, read_nwk_file_many};
use crate::io::params::read_params_file;
use crate::io::species_map::read_species_map_file;
use crate::likelihood::config::LikelihoodConfig;
use crate::likelihood::tree_likelihood::tree_log_likelihood;
use crate::tree::species_tree::SpeciesTree;
use crate::utils::observability::ObservabilityConfig;
use eyre::{Report, WrapErr};

/// Scores every given tree as it is, and prints one line per tree: file, tree number, baserate and log-likelihood.
pub fn run_logl(logl_args: &SpidirLoglArgs) -> Result<Vec<f64>, Report> {
  let SpidirLoglArgs {
    trees,
    stree,
    smap,
    params,
    baserate,
    dupprob,
    specprob,
    lossprob,
  } = logl_args;

  let stree = SpeciesTree::new(read_nwk_file(stree)?).wrap_err("When loading species tree")?;
  let smap = read_species_map_file(smap)?;
  let params = read_params_file(params)?;
  let config = LikelihoodConfig {
    dup_prob: *dupprob,
    spec_prob: *specprob,
    loss_prob: *lossprob,
  };
  let obs = ObservabilityConfig::default();

  let mut logls = vec![];
  for filepath in trees {
    for (i, mut tree) in read_nwk_file_many(filepath)?.into_iter().enumerate() {
      let logl = tree_log_likelihood(&mut tree, &stree, &smap, &params, &config, *baserate, &obs)
        .wrap_err_with(|| format!("When scoring tree #{} of {filepath:#?}", i + 1))?;
      let used_baserate = tree.annotations.baserate.unwrap_or(f64::NAN);
      println!("{}\t{}\t{used_baserate}\t{logl}", filepath.display(), i + 1);
      logls.push(logl);
    }
  }
  Ok(logls)
}

#[cfg(test)]
mod tests {
  use super::*;
  use approx::assert_abs_diff_eq;
  use indoc::indoc;
  use pretty_assertions::assert_eq;
  use std::f64::consts::PI;
  use std::fs;

  #[test]
  fn scores_every_tree_of_every_file() -> Result<(), Report> {
    let dir = std::env::temp_dir().join(format!("spidir-logl-{}", std::process::id()));
    fs::create_dir_all(&dir)?;

    fs::write(dir.join("species.nwk"), "(((A:1,B:1)AB:1,C:1)ABC:1,(D:1,E:1)DE:1)root;\n")?;
    fs::write(dir.join("genes.smap"), "a*\tA\nb*\tB\nc*\tC\nd*\tD\ne*\tE\n")?;
    fs::write(
      dir.join("params.txt"),
      indoc! {"
        baserate\t8\t1
        A\t0.14285714285714285\t0.05
        B\t0.14285714285714285\t0.05
        C\t0.14285714285714285\t0.05
        D\t0.14285714285714285\t0.05
        E\t0.14285714285714285\t0.05
        AB\t0.14285714285714285\t0.05
        ABC\t0.07142857142857142\t0.05
        DE\t0.07142857142857142\t0.05
      "},
    )?;
    fs::write(
      dir.join("genes.nwk"),
      indoc! {"
        (((a1:1,b1:1):1,c1:1):0.5,(d1:1,e1:1):0.5);
        (((a1:1,b1:1):1,c1:1):0.5,(d1:1,e1:1):0.5);
      "},
    )?;

    let args = SpidirLoglArgs {
      trees: vec![dir.join("genes.nwk")],
      stree: dir.join("species.nwk"),
      smap: dir.join("genes.smap"),
      params: dir.join("params.txt"),
      baserate: Some(7.0),
      dupprob: 0.01,
      specprob: 1.0,
      lossprob: 0.01,
    };
    let logls = run_logl(&args)?;

    assert_eq!(logls.len(), 2);
    let perfect = 8.0 * (-(0.05_f64.ln()) - 0.5 * (2.0 * PI).ln());
    assert_abs_diff_eq!(logls[0], perfect, epsilon = 1e-6);
    assert_abs_diff_eq!(logls[1], logls[0]);

    fs::remove_dir_all(&dir)?;
    Ok(())
  }
}
