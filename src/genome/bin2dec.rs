//! Binary-to-decimal genome
//!
//! A [`Bin2DecGenome`] is one candidate solution: a bit string laid out by a shared
//! [`PhenotypeMap`], together with its memoized objective score.

use std::ops::Range;
use std::sync::Arc;

use rand::Rng;

use crate::error::{GenomeError, ObjectiveError};
use crate::fitness::traits::Scorable;
use crate::genome::bit_string::BitString;
use crate::genome::phenotype::{PhenotypeMap, VariableSpec};

/// Evaluation state of a genome
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ScoreState {
    /// Bits changed since the last evaluation (or never evaluated)
    #[default]
    Unevaluated,
    /// Cached objective score for the current bits
    Evaluated(f64),
}

/// Bit string genome decoded through a phenotype map
///
/// Every method that changes bits resets the score to [`ScoreState::Unevaluated`];
/// the bits are never handed out mutably, so a stale score cannot survive a change.
#[derive(Debug, Clone)]
pub struct Bin2DecGenome {
    map: Arc<PhenotypeMap>,
    bits: BitString,
    score: ScoreState,
}

impl Bin2DecGenome {
    /// Create a genome with uniformly random bits
    pub fn random<R: Rng>(map: Arc<PhenotypeMap>, rng: &mut R) -> Self {
        let bits = BitString::random(map.total_bits(), rng);
        Self {
            map,
            bits,
            score: ScoreState::Unevaluated,
        }
    }

    /// Create a genome from explicit bits
    pub fn from_bits(map: Arc<PhenotypeMap>, bits: BitString) -> Result<Self, GenomeError> {
        if bits.len() != map.total_bits() {
            return Err(GenomeError::DimensionMismatch {
                expected: map.total_bits(),
                actual: bits.len(),
            });
        }
        Ok(Self {
            map,
            bits,
            score: ScoreState::Unevaluated,
        })
    }

    /// Create a genome encoding the given variable values (clamped to their bounds)
    pub fn from_phenotype(map: Arc<PhenotypeMap>, values: &[f64]) -> Result<Self, GenomeError> {
        if values.len() != map.len() {
            return Err(GenomeError::DimensionMismatch {
                expected: map.len(),
                actual: values.len(),
            });
        }
        let mut genome = Self {
            bits: BitString::zeros(map.total_bits()),
            map,
            score: ScoreState::Unevaluated,
        };
        for (index, &value) in values.iter().enumerate() {
            genome.set_phenotype(index, value)?;
        }
        Ok(genome)
    }

    /// The phenotype map this genome is laid out by
    pub fn map(&self) -> &Arc<PhenotypeMap> {
        &self.map
    }

    /// The raw bits
    pub fn bits(&self) -> &BitString {
        &self.bits
    }

    /// Total number of bits
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// True only for a genome with no bits, which a valid map never produces
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Decoded value of one variable
    pub fn phenotype(&self, index: usize) -> Result<f64, GenomeError> {
        let (spec, range) = self.variable(index)?;
        Ok(spec.decode(&self.bits.bits()[range]))
    }

    /// Decoded values of all variables, in map order
    pub fn phenotypes(&self) -> Vec<f64> {
        self.map.decode_all(self.bits.bits())
    }

    /// Current evaluation state
    pub fn score_state(&self) -> ScoreState {
        self.score
    }

    /// Cached score, if the current bits have been evaluated
    pub fn score(&self) -> Option<f64> {
        match self.score {
            ScoreState::Evaluated(s) => Some(s),
            ScoreState::Unevaluated => None,
        }
    }

    /// Check if this genome has been evaluated
    pub fn is_evaluated(&self) -> bool {
        matches!(self.score, ScoreState::Evaluated(_))
    }

    /// Score the genome, calling the objective only if no score is cached
    ///
    /// A NaN score is reported as an [`ObjectiveError`] and nothing is cached.
    pub fn evaluate<O>(&mut self, objective: &O) -> Result<f64, ObjectiveError>
    where
        O: Scorable + ?Sized,
    {
        if let ScoreState::Evaluated(s) = self.score {
            return Ok(s);
        }
        let s = objective.score(&self.phenotypes())?;
        if s.is_nan() {
            return Err(ObjectiveError::new("objective returned NaN"));
        }
        self.score = ScoreState::Evaluated(s);
        Ok(s)
    }

    /// Flip one bit
    pub fn flip(&mut self, index: usize) {
        if index < self.bits.len() {
            self.bits.flip(index);
            self.reset_score();
        }
    }

    /// Encode `value` (clamped to the variable's bounds) into a variable's segment
    pub fn set_phenotype(&mut self, index: usize, value: f64) -> Result<(), GenomeError> {
        let (spec, range) = self.variable(index)?;
        let encoded = spec.encode_value(value);
        self.bits.write_uint(range, encoded);
        self.reset_score();
        Ok(())
    }

    /// Replace the bits in `range` with the same bits of `donor`
    pub fn splice_from(&mut self, donor: &Self, range: Range<usize>) -> Result<(), GenomeError> {
        if range.end > self.bits.len() {
            return Err(GenomeError::DimensionMismatch {
                expected: self.bits.len(),
                actual: range.end,
            });
        }
        self.bits.copy_range_from(&donor.bits, range)?;
        self.reset_score();
        Ok(())
    }

    /// Hamming distance to another genome
    pub fn distance(&self, other: &Self) -> f64 {
        self.bits.hamming_distance(&other.bits) as f64
    }

    /// Mark the genome as needing a fresh evaluation
    pub(crate) fn reset_score(&mut self) {
        self.score = ScoreState::Unevaluated;
    }

    fn variable(&self, index: usize) -> Result<(VariableSpec, Range<usize>), GenomeError> {
        match (self.map.get(index), self.map.segment(index)) {
            (Some(spec), Some(range)) => Ok((*spec, range)),
            _ => Err(GenomeError::IndexOutOfRange {
                index,
                count: self.map.len(),
            }),
        }
    }
}

/// Genomes are equal when their bits are equal; the cached score is not compared
impl PartialEq for Bin2DecGenome {
    fn eq(&self, other: &Self) -> bool {
        self.bits == other.bits
    }
}

impl std::fmt::Display for Bin2DecGenome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.bits)
    }
}
