/// Path variances at or below this make the normal density meaningless.
pub const MIN_PATH_VARIANCE: f64 = 1e-8;

/// Paths with a smaller standard deviation are left out of the baserate estimate.
pub const MIN_BASERATE_SDEV: f64 = 1e-4;

/// A subtree log-likelihood above this indicates a degenerate model.
pub const MAX_SUBTREE_LOGL: f64 = 1e10;

/// Histogram bins per unit of (range / mean) when estimating the mode of relative branch lengths.
pub const HISTOGRAM_BINS_PER_MEAN: f64 = 40.0;

/// Corpus trees at least this long are treated as outliers when fitting the baserate prior.
pub const MAX_TREE_LENGTH: f64 = 20.0;

pub const DEFAULT_DUP_PROB: f64 = 0.01;
pub const DEFAULT_SPEC_PROB: f64 = 1.0;
pub const DEFAULT_LOSS_PROB: f64 = 0.01;

pub const DEFAULT_MCMC_ITERS: usize = 1000;
pub const DEFAULT_NNI_DEPTH: usize = 2;
