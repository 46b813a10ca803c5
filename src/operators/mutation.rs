//! Mutation operators
//!
//! This module provides the bit-flip mutation applied to every offspring.

use rand::Rng;

use crate::error::OperatorError;
use crate::genome::bin2dec::Bin2DecGenome;

/// Bit-flip mutation
///
/// Every bit flips independently with the configured probability.
#[derive(Clone, Copy, Debug)]
pub struct BitFlipMutation {
    /// Per-bit flip probability
    pub flip_probability: f64,
}

impl BitFlipMutation {
    /// Create a new bit-flip mutation
    ///
    /// # Panics
    ///
    /// Panics if `flip_probability` is outside `[0, 1]`.
    pub fn new(flip_probability: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&flip_probability),
            "Probability must be in [0, 1]"
        );
        Self { flip_probability }
    }

    /// Create a new bit-flip mutation, rejecting an invalid probability
    pub fn try_new(flip_probability: f64) -> Result<Self, OperatorError> {
        if !(0.0..=1.0).contains(&flip_probability) {
            return Err(OperatorError::InvalidConfiguration(format!(
                "flip probability must be in [0, 1], got {}",
                flip_probability
            )));
        }
        Ok(Self { flip_probability })
    }

    /// Mutate the genome in place and return the number of flipped bits
    ///
    /// The cached score survives only when no bit flips.
    pub fn mutate<R: Rng>(&self, genome: &mut Bin2DecGenome, rng: &mut R) -> usize {
        if self.flip_probability <= 0.0 {
            return 0;
        }

        let mut flipped = 0;
        for i in 0..genome.len() {
            if rng.gen::<f64>() < self.flip_probability {
                genome.flip(i);
                flipped += 1;
            }
        }
        flipped
    }
}

impl Default for BitFlipMutation {
    fn default() -> Self {
        Self::new(0.01)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fitness::traits::FnObjective;
    use crate::genome::bit_string::BitString;
    use crate::genome::phenotype::PhenotypeMap;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn evaluated_genome(bits: usize) -> Bin2DecGenome {
        let map = Arc::new(PhenotypeMap::uniform(bits / 8, 8, 0.0, 1.0).unwrap());
        let mut genome = Bin2DecGenome::from_bits(map, BitString::zeros(bits)).unwrap();
        genome
            .evaluate(&FnObjective::new(|x: &[f64]| x.iter().sum()))
            .unwrap();
        genome
    }

    #[test]
    fn test_zero_probability_keeps_score() {
        let mut rng = StdRng::seed_from_u64(31);
        let mut genome = evaluated_genome(32);
        let original = genome.clone();

        assert_eq!(BitFlipMutation::new(0.0).mutate(&mut genome, &mut rng), 0);
        assert_eq!(genome, original);
        assert!(genome.is_evaluated());
    }

    #[test]
    fn test_full_probability_flips_everything() {
        let mut rng = StdRng::seed_from_u64(32);
        let mut genome = evaluated_genome(16);

        assert_eq!(BitFlipMutation::new(1.0).mutate(&mut genome, &mut rng), 16);
        assert_eq!(genome.bits().count_ones(), 16);
        assert!(!genome.is_evaluated());
    }

    #[test]
    fn test_flip_count_matches_hamming_distance() {
        let mut rng = StdRng::seed_from_u64(33);
        let mutation = BitFlipMutation::new(0.1);

        for _ in 0..20 {
            let mut genome = evaluated_genome(64);
            let original = genome.clone();
            let flipped = mutation.mutate(&mut genome, &mut rng);
            assert_eq!(genome.distance(&original), flipped as f64);
            assert_eq!(genome.is_evaluated(), flipped == 0);
        }
    }

    #[test]
    fn test_flip_rate_is_close_to_probability() {
        let mut rng = StdRng::seed_from_u64(34);
        let mutation = BitFlipMutation::new(0.05);
        let total: usize = (0..200)
            .map(|_| mutation.mutate(&mut evaluated_genome(64), &mut rng))
            .sum();

        // 12800 bits, expected 640 flips
        assert!(total > 500 && total < 780, "total flips {}", total);
    }

    #[test]
    fn test_try_new_rejects_out_of_range() {
        assert!(BitFlipMutation::try_new(0.5).is_ok());
        assert!(matches!(
            BitFlipMutation::try_new(1.5),
            Err(OperatorError::InvalidConfiguration(_))
        ));
        assert!(BitFlipMutation::try_new(f64::NAN).is_err());
    }

    #[test]
    #[should_panic(expected = "Probability must be in [0, 1]")]
    fn test_new_panics_on_negative() {
        BitFlipMutation::new(-0.1);
    }
}
