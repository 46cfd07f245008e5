use crate::constants::{DEFAULT_DUP_PROB, DEFAULT_LOSS_PROB, DEFAULT_SPEC_PROB};
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;

/// Probabilities of the reconciliation events. Their natural logs are added to the log-likelihood, once per event.
#[derive(Clone, Debug, PartialEq, SmartDefault, Serialize, Deserialize)]
pub struct LikelihoodConfig {
  #[default(DEFAULT_DUP_PROB)]
  pub dup_prob: f64,

  #[default(DEFAULT_SPEC_PROB)]
  pub spec_prob: f64,

  #[default(DEFAULT_LOSS_PROB)]
  pub loss_prob: f64,
}
