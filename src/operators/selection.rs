//! Selection operators
//!
//! This module provides selection operators that work on scaled fitness values.

use rand::Rng;
use rand_distr::{Distribution, WeightedIndex};

use crate::operators::traits::SelectionOperator;

/// Roulette wheel selection (fitness proportionate)
///
/// Selection probability is proportional to scaled fitness. When the weights are
/// unusable (all zero, negative or non-finite) every individual is equally likely.
#[derive(Clone, Copy, Debug, Default)]
pub struct RouletteSelection;

impl RouletteSelection {
    /// Create a new roulette selection
    pub fn new() -> Self {
        Self
    }
}

impl SelectionOperator for RouletteSelection {
    fn select<R: Rng>(&self, fitness: &[f64], rng: &mut R) -> usize {
        assert!(!fitness.is_empty(), "Population cannot be empty");

        let usable = fitness.iter().all(|f| f.is_finite() && *f >= 0.0);
        let total: f64 = fitness.iter().sum();
        if !usable || !(total > 0.0) || !total.is_finite() {
            log::trace!("roulette weights unusable (total {}); selecting uniformly", total);
            return rng.gen_range(0..fitness.len());
        }

        match WeightedIndex::new(fitness) {
            Ok(dist) => dist.sample(rng),
            Err(_) => rng.gen_range(0..fitness.len()),
        }
    }
}

/// Tournament selection operator
///
/// Draws `tournament_size` individuals uniformly (with replacement) and keeps the fittest.
#[derive(Clone, Copy, Debug)]
pub struct TournamentSelection {
    /// Tournament size (number of individuals competing)
    pub tournament_size: usize,
}

impl TournamentSelection {
    /// Create a new tournament selection with the given size
    pub fn new(tournament_size: usize) -> Self {
        assert!(tournament_size >= 1, "Tournament size must be at least 1");
        Self { tournament_size }
    }

    /// Create binary tournament selection (size = 2)
    pub fn binary() -> Self {
        Self::new(2)
    }
}

impl SelectionOperator for TournamentSelection {
    fn select<R: Rng>(&self, fitness: &[f64], rng: &mut R) -> usize {
        assert!(!fitness.is_empty(), "Population cannot be empty");

        let mut best = rng.gen_range(0..fitness.len());
        for _ in 1..self.tournament_size {
            let challenger = rng.gen_range(0..fitness.len());
            if fitness[challenger] > fitness[best] {
                best = challenger;
            }
        }
        best
    }
}

/// Uniform selection, ignoring fitness
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformSelection;

impl UniformSelection {
    /// Create a new uniform selection
    pub fn new() -> Self {
        Self
    }
}

impl SelectionOperator for UniformSelection {
    fn select<R: Rng>(&self, fitness: &[f64], rng: &mut R) -> usize {
        assert!(!fitness.is_empty(), "Population cannot be empty");
        rng.gen_range(0..fitness.len())
    }
}
