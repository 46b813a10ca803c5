//! Operator traits
//!
//! This module defines the core operator traits for the genetic algorithm.

use rand::Rng;

use crate::error::OperatorError;
use crate::genome::bin2dec::Bin2DecGenome;

/// Selection operator trait
///
/// Picks parents given the scaled fitness of every individual in the population.
pub trait SelectionOperator: Send + Sync {
    /// Select a single individual
    ///
    /// `fitness[i]` is the scaled fitness of individual `i`. Returns the index of the
    /// selected individual.
    fn select<R: Rng>(&self, fitness: &[f64], rng: &mut R) -> usize;

    /// Select multiple individuals
    fn select_many<R: Rng>(&self, fitness: &[f64], count: usize, rng: &mut R) -> Vec<usize> {
        (0..count).map(|_| self.select(fitness, rng)).collect()
    }
}

/// Crossover operator trait
///
/// Combines genetic material from two parents to create two offspring. Offspring
/// start unevaluated.
pub trait CrossoverOperator: Send + Sync {
    /// Apply crossover to two parents and produce two offspring
    fn crossover<R: Rng>(
        &self,
        parent1: &Bin2DecGenome,
        parent2: &Bin2DecGenome,
        rng: &mut R,
    ) -> Result<(Bin2DecGenome, Bin2DecGenome), OperatorError>;
}

/// Reject parents of different lengths
pub(crate) fn check_parents(
    parent1: &Bin2DecGenome,
    parent2: &Bin2DecGenome,
) -> Result<(), OperatorError> {
    if parent1.len() != parent2.len() {
        return Err(OperatorError::CrossoverFailed(format!(
            "parent lengths differ ({} vs {})",
            parent1.len(),
            parent2.len()
        )));
    }
    Ok(())
}
