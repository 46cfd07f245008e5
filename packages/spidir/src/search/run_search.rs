use crate::constants::{DEFAULT_MCMC_ITERS, DEFAULT_NNI_DEPTH};
use crate::fit::distance_matrix::DistanceMatrix;
use crate::fit::least_squares::fit_branch_lengths;
use crate::likelihood::config::LikelihoodConfig;
use crate::model::params::RateModelParams;
use crate::recon::species_map::SpeciesMap;
use crate::search::cache::VisitedCache;
use crate::search::evaluator::{LikelihoodScorer, TreeScorer};
use crate::search::exhaustive::search_exhaustive;
use crate::search::greedy::search_greedy;
use crate::search::initial::initial_tree;
use crate::search::mcmc::search_mcmc;
use crate::search::result::SearchResult;
use crate::tree::species_tree::SpeciesTree;
use crate::tree::tree::Tree;
use crate::utils::error::SpidirError;
use crate::utils::observability::ObservabilityConfig;
use crate::utils::random::get_random_number_generator;
use eyre::{Report, WrapErr};
use log::Level;
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchStrategy {
  Greedy,
  Mcmc,
  Exhaustive,
  /// Stops running strategies; candidate trees are still scored
  #[serde(rename = "none")]
  Stop,
}

impl FromStr for SearchStrategy {
  type Err = SpidirError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "greedy" => Ok(Self::Greedy),
      "mcmc" => Ok(Self::Mcmc),
      "exhaustive" => Ok(Self::Exhaustive),
      "none" => Ok(Self::Stop),
      _ => Err(SpidirError::UnknownStrategy(s.to_owned())),
    }
  }
}

impl Display for SearchStrategy {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Greedy => write!(f, "greedy"),
      Self::Mcmc => write!(f, "mcmc"),
      Self::Exhaustive => write!(f, "exhaustive"),
      Self::Stop => write!(f, "none"),
    }
  }
}

#[derive(Clone, Debug, SmartDefault, Serialize, Deserialize)]
pub struct SearchConfig {
  /// Iterations of the Monte Carlo search
  #[default(DEFAULT_MCMC_ITERS)]
  pub iters: usize,

  /// Strategies, run in order. Each one starts from the tree found by the previous one
  #[default(vec!["mcmc".to_owned()])]
  pub search: Vec<String>,

  /// Number of consecutive interchanges tried by the exhaustive search
  #[default(DEFAULT_NNI_DEPTH)]
  pub depth: usize,

  pub likelihood: LikelihoodConfig,

  /// Candidate trees scored alongside the search results. Trees without branch lengths are fitted first
  pub trees: Vec<Tree>,

  /// Seed of the random number generator of the Monte Carlo search
  pub seed: Option<u64>,
}

/// Runs the configured searches, scores the candidate trees and returns the best tree of all.
pub fn run_search(
  distmat: &DistanceMatrix,
  stree: &SpeciesTree,
  smap: &SpeciesMap,
  params: &RateModelParams,
  config: &SearchConfig,
  obs: &ObservabilityConfig,
) -> Result<SearchResult, Report> {
  let mut scorer = LikelihoodScorer {
    stree,
    smap,
    params,
    config: &config.likelihood,
    obs,
  };
  let mut rng = get_random_number_generator(config.seed);

  let mut results: Vec<SearchResult> = vec![];
  let mut current: Option<Tree> = None;

  for name in &config.search {
    let strategy = SearchStrategy::from_str(name)?;
    obs.emit(Level::Info, || format!("Running {strategy} search"));

    let result = match strategy {
      SearchStrategy::Greedy => search_greedy(distmat, &mut scorer, obs)?,
      SearchStrategy::Mcmc => {
        let start = match current.take() {
          Some(tree) => tree,
          None => initial_tree(distmat, stree, smap)?,
        };
        let mut visited = VisitedCache::new();
        search_mcmc(start, distmat, &mut scorer, config.iters, &mut rng, &mut visited, obs)?
      }
      SearchStrategy::Exhaustive => {
        let start = match current.take() {
          Some(tree) => tree,
          None => initial_tree(distmat, stree, smap)?,
        };
        let mut visited = VisitedCache::new();
        search_exhaustive(&start, distmat, &mut scorer, config.depth, &mut visited, obs)?
      }
      SearchStrategy::Stop => break,
    };

    obs.emit(Level::Info, || format!("Best tree of {strategy} search: logl {}", result.logl));
    current = Some(result.tree.clone());
    results.push(result);
  }

  for (i, tree) in config.trees.iter().enumerate() {
    let result = score_candidate(tree, distmat, &mut scorer).wrap_err_with(|| format!("When scoring tree #{}", i + 1))?;
    obs.emit(Level::Info, || format!("Candidate tree #{}: logl {}", i + 1, result.logl));
    results.push(result);
  }

  results
    .into_iter()
    .reduce(|best, result| if result.logl > best.logl { result } else { best })
    .ok_or_else(|| SpidirError::NoResult.into())
}

fn score_candidate(tree: &Tree, distmat: &DistanceMatrix, scorer: &mut dyn TreeScorer) -> Result<SearchResult, Report> {
  let mut tree = tree.clone();
  if tree.total_length() == 0.0 {
    fit_branch_lengths(&mut tree, distmat)?;
  }
  let logl = scorer.score(&mut tree)?;
  Ok(SearchResult {
    tree,
    logl,
    history: vec![logl],
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::examples::{
    caterpillar_distmat, caterpillar_params, caterpillar_tree, species_map_5, species_tree_5,
    strict_likelihood_config, tree_from_edges,
  };
  use crate::tree::topology_key::topology_key;
  use crate::utils::error::{find_error, DegenerateModelError};
  use approx::assert_abs_diff_eq;
  use pretty_assertions::assert_eq;
  use rstest::rstest;

  fn config(search: &[&str]) -> SearchConfig {
    SearchConfig {
      iters: 100,
      search: search.iter().map(|&s| s.to_owned()).collect(),
      likelihood: strict_likelihood_config(),
      seed: Some(1),
      ..SearchConfig::default()
    }
  }

  fn run(config: &SearchConfig) -> Result<SearchResult, Report> {
    run_search(
      &caterpillar_distmat(),
      &species_tree_5(),
      &species_map_5(),
      &caterpillar_params(),
      config,
      &ObservabilityConfig::silent(),
    )
  }

  fn perfect_logl() -> Result<f64, Report> {
    let stree = species_tree_5();
    let smap = species_map_5();
    let params = caterpillar_params();
    let likelihood = strict_likelihood_config();
    let obs = ObservabilityConfig::silent();
    let mut scorer = LikelihoodScorer {
      stree: &stree,
      smap: &smap,
      params: &params,
      config: &likelihood,
      obs: &obs,
    };
    scorer.score(&mut caterpillar_tree())
  }

  #[rstest]
  #[case(&["greedy"])]
  #[case(&["mcmc"])]
  #[case(&["exhaustive"])]
  #[case(&["greedy", "mcmc", "exhaustive"])]
  fn every_strategy_finds_species_topology(#[case] search: &[&str]) -> Result<(), Report> {
    let result = run(&config(search))?;
    assert_eq!(topology_key(&result.tree).to_string(), "(((a1,b1),c1),(d1,e1))");
    assert_abs_diff_eq!(result.logl, perfect_logl()?, epsilon = 1e-6);
    assert!(result.history.windows(2).all(|w| w[0] <= w[1]));
    Ok(())
  }

  #[rstest]
  #[case(&["greedy"])]
  #[case(&["mcmc"])]
  #[case(&["exhaustive"])]
  fn stops_on_degenerate_model(#[case] search: &[&str]) {
    let mut params = caterpillar_params();
    if let Some(rate) = params.branches.get_mut("C") {
      rate.sdev = 0.0;
    }
    let report = run_search(
      &caterpillar_distmat(),
      &species_tree_5(),
      &species_map_5(),
      &params,
      &config(search),
      &ObservabilityConfig::silent(),
    )
    .unwrap_err();

    match find_error::<SpidirError>(&report) {
      Some(SpidirError::DegenerateModel(DegenerateModelError::SigmaTooSmall { gene_node, .. })) => {
        assert_eq!(gene_node, "c1");
      }
      other => panic!("unexpected error: {other:?}"),
    }
  }

  #[test]
  fn rejects_unknown_strategy() {
    let report = run(&config(&["annealing"])).unwrap_err();
    assert_eq!(
      find_error::<SpidirError>(&report),
      Some(&SpidirError::UnknownStrategy("annealing".to_owned()))
    );
  }

  #[test]
  fn fails_without_anything_to_score() {
    let report = run(&config(&["none", "mcmc"])).unwrap_err();
    assert_eq!(find_error::<SpidirError>(&report), Some(&SpidirError::NoResult));
  }

  #[test]
  fn fits_and_scores_candidate_trees() -> Result<(), Report> {
    let unfitted = tree_from_edges(
      "g",
      &[
        ("g", "gabc", 0.0),
        ("gabc", "gab", 0.0),
        ("gab", "a1", 0.0),
        ("gab", "b1", 0.0),
        ("gabc", "c1", 0.0),
        ("g", "gde", 0.0),
        ("gde", "d1", 0.0),
        ("gde", "e1", 0.0),
      ],
    );
    let wrong = tree_from_edges(
      "g",
      &[
        ("g", "gabd", 0.5),
        ("gabd", "gab", 1.0),
        ("gab", "a1", 1.0),
        ("gab", "b1", 1.0),
        ("gabd", "d1", 1.0),
        ("g", "gce", 0.5),
        ("gce", "c1", 1.0),
        ("gce", "e1", 1.0),
      ],
    );
    let config = SearchConfig {
      trees: vec![wrong, unfitted],
      ..config(&["none"])
    };
    let result = run(&config)?;
    assert_eq!(topology_key(&result.tree).to_string(), "(((a1,b1),c1),(d1,e1))");
    assert_abs_diff_eq!(result.tree.total_length(), 7.0, epsilon = 1e-6);
    assert_abs_diff_eq!(result.logl, perfect_logl()?, epsilon = 1e-6);
    Ok(())
  }

  #[test]
  fn parses_strategy_names() {
    assert_eq!("mcmc".parse::<SearchStrategy>(), Ok(SearchStrategy::Mcmc));
    assert_eq!("none".parse::<SearchStrategy>(), Ok(SearchStrategy::Stop));
    assert_eq!(SearchStrategy::Exhaustive.to_string(), "exhaustive");
    assert!("nni".parse::<SearchStrategy>().is_err());
  }
}
