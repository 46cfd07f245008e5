use rand::seq::IteratorRandom;
use rand::{Rng, SeedableRng};
use rand_isaac::Isaac64Rng;

/// Monte Carlo searches are reproducible when a seed is given.
pub fn get_random_number_generator(seed: Option<u64>) -> Isaac64Rng {
  match seed {
    None => Isaac64Rng::from_entropy(),
    Some(seed) => Isaac64Rng::seed_from_u64(seed),
  }
}

pub fn random_choice_maybe<T>(iter: impl IntoIterator<Item = T>, rng: &mut impl Rng) -> Option<T> {
  iter.into_iter().choose(rng)
}
