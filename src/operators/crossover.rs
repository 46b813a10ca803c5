//! Crossover operators
//!
//! This module provides crossover operators for binary-to-decimal genomes. Cut points are
//! chosen over the whole bit string, so a cut may fall inside a variable's segment.

use rand::Rng;

use crate::error::{GenomeError, OperatorError};
use crate::genome::bin2dec::Bin2DecGenome;
use crate::operators::traits::{check_parents, CrossoverOperator};

/// Build two children that swap the bits of `parent1` and `parent2` inside `range`
fn swap_range(
    parent1: &Bin2DecGenome,
    parent2: &Bin2DecGenome,
    range: std::ops::Range<usize>,
) -> Result<(Bin2DecGenome, Bin2DecGenome), OperatorError> {
    let (mut child1, mut child2) = unevaluated_copies(parent1, parent2);
    child1
        .splice_from(parent2, range.clone())
        .and_then(|_| child2.splice_from(parent1, range))
        .map_err(genome_to_operator)?;
    Ok((child1, child2))
}

/// Copies of both parents with their cached scores cleared
fn unevaluated_copies(
    parent1: &Bin2DecGenome,
    parent2: &Bin2DecGenome,
) -> (Bin2DecGenome, Bin2DecGenome) {
    let mut child1 = parent1.clone();
    let mut child2 = parent2.clone();
    child1.reset_score();
    child2.reset_score();
    (child1, child2)
}

fn genome_to_operator(err: GenomeError) -> OperatorError {
    OperatorError::CrossoverFailed(err.to_string())
}

/// Single-point crossover
///
/// Picks a cut index in `1..L` and swaps the tails. With a one-bit genome the
/// children are unevaluated copies of the parents.
#[derive(Clone, Copy, Debug, Default)]
pub struct OnePointCrossover;

impl OnePointCrossover {
    /// Create a new one-point crossover
    pub fn new() -> Self {
        Self
    }
}

impl CrossoverOperator for OnePointCrossover {
    fn crossover<R: Rng>(
        &self,
        parent1: &Bin2DecGenome,
        parent2: &Bin2DecGenome,
        rng: &mut R,
    ) -> Result<(Bin2DecGenome, Bin2DecGenome), OperatorError> {
        check_parents(parent1, parent2)?;

        let n = parent1.len();
        if n < 2 {
            return Ok(unevaluated_copies(parent1, parent2));
        }

        let crossover_point = rng.gen_range(1..n);
        swap_range(parent1, parent2, crossover_point..n)
    }
}

/// Two-point crossover
///
/// Swaps the bits between two distinct cut points.
#[derive(Clone, Copy, Debug, Default)]
pub struct TwoPointCrossover;

impl TwoPointCrossover {
    /// Create a new two-point crossover
    pub fn new() -> Self {
        Self
    }
}

impl CrossoverOperator for TwoPointCrossover {
    fn crossover<R: Rng>(
        &self,
        parent1: &Bin2DecGenome,
        parent2: &Bin2DecGenome,
        rng: &mut R,
    ) -> Result<(Bin2DecGenome, Bin2DecGenome), OperatorError> {
        check_parents(parent1, parent2)?;

        let n = parent1.len();
        if n < 2 {
            return Ok(unevaluated_copies(parent1, parent2));
        }

        let a = rng.gen_range(0..n);
        let mut b = rng.gen_range(0..n - 1);
        if b >= a {
            b += 1;
        }
        let (start, end) = if a < b { (a, b) } else { (b, a) };
        swap_range(parent1, parent2, start..end)
    }
}

/// Uniform crossover
///
/// Each bit comes from the first parent with probability `bias`, otherwise from the second.
#[derive(Clone, Copy, Debug)]
pub struct UniformCrossover {
    /// Probability of keeping the first parent's bit in the first child
    pub bias: f64,
}

impl UniformCrossover {
    /// Create an unbiased uniform crossover
    pub fn new() -> Self {
        Self { bias: 0.5 }
    }

    /// Create a uniform crossover with the given bias
    pub fn with_bias(bias: f64) -> Self {
        assert!((0.0..=1.0).contains(&bias), "Bias must be in [0, 1]");
        Self { bias }
    }
}

impl Default for UniformCrossover {
    fn default() -> Self {
        Self::new()
    }
}

impl CrossoverOperator for UniformCrossover {
    fn crossover<R: Rng>(
        &self,
        parent1: &Bin2DecGenome,
        parent2: &Bin2DecGenome,
        rng: &mut R,
    ) -> Result<(Bin2DecGenome, Bin2DecGenome), OperatorError> {
        check_parents(parent1, parent2)?;

        let (mut child1, mut child2) = unevaluated_copies(parent1, parent2);

        for i in 0..parent1.len() {
            if rng.gen::<f64>() >= self.bias && parent1.bits()[i] != parent2.bits()[i] {
                child1.flip(i);
                child2.flip(i);
            }
        }

        Ok((child1, child2))
    }
}
