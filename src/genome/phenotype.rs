//! Variable codec and phenotype map
//!
//! A [`VariableSpec`] maps a fixed-width unsigned integer onto a closed real
//! interval; a [`PhenotypeMap`] lays several of them end to end in one bit string.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{EvoResult, EvolutionError};
use crate::genome::bit_string::read_uint;

/// Widest segment a single variable may occupy.
///
/// Every integer up to `2^32 - 1` is exact in an `f64`, so decoding never rounds
/// the integer before scaling it.
pub const MAX_BIT_WIDTH: u32 = 32;

/// Encoding of one real variable as a fixed-width bit segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VariableSpec {
    bit_width: u32,
    lower: f64,
    upper: f64,
}

impl VariableSpec {
    /// Create a new variable spec
    ///
    /// Fails with a configuration error if the width is zero or above
    /// [`MAX_BIT_WIDTH`], a bound is not finite, or `lower >= upper`.
    pub fn new(bit_width: u32, lower: f64, upper: f64) -> EvoResult<Self> {
        if bit_width == 0 || bit_width > MAX_BIT_WIDTH {
            return Err(EvolutionError::Configuration(format!(
                "bit width must be in 1..={}, got {}",
                MAX_BIT_WIDTH, bit_width
            )));
        }
        if !lower.is_finite() || !upper.is_finite() {
            return Err(EvolutionError::Configuration(format!(
                "bounds must be finite, got [{}, {}]",
                lower, upper
            )));
        }
        if lower >= upper {
            return Err(EvolutionError::Configuration(format!(
                "lower bound ({}) must be < upper bound ({})",
                lower, upper
            )));
        }
        Ok(Self {
            bit_width,
            lower,
            upper,
        })
    }

    /// Number of bits in the segment
    pub fn bit_width(&self) -> u32 {
        self.bit_width
    }

    /// Lower bound (inclusive)
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// Upper bound (inclusive)
    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// Get the range (upper - lower)
    pub fn range(&self) -> f64 {
        self.upper - self.lower
    }

    /// Largest integer the segment can hold, `2^L - 1`
    pub fn max_value(&self) -> u64 {
        (1u64 << self.bit_width) - 1
    }

    /// Distance between two adjacent representable values
    pub fn resolution(&self) -> f64 {
        self.range() / self.max_value() as f64
    }

    /// Map an integer in `[0, 2^L - 1]` onto `[lower, upper]`.
    ///
    /// Integers above the maximum saturate to `upper`.
    pub fn decode_value(&self, value: u64) -> f64 {
        let max = self.max_value();
        if value == 0 {
            self.lower
        } else if value >= max {
            self.upper
        } else {
            self.lower + value as f64 * self.range() / max as f64
        }
    }

    /// Map a real number onto the nearest representable integer, clamping to the bounds first
    pub fn encode_value(&self, value: f64) -> u64 {
        if value.is_nan() {
            return 0;
        }
        let clamped = value.clamp(self.lower, self.upper);
        let max = self.max_value();
        let scaled = ((clamped - self.lower) / self.range() * max as f64).round();
        (scaled as u64).min(max)
    }

    /// Decode a bit segment (most significant bit first)
    ///
    /// # Panics
    /// Panics if `bits.len()` differs from the bit width.
    pub fn decode(&self, bits: &[bool]) -> f64 {
        assert_eq!(
            bits.len(),
            self.bit_width as usize,
            "segment length must match the bit width"
        );
        self.decode_value(read_uint(bits))
    }

    /// Encode a real number as a bit segment (most significant bit first)
    pub fn encode(&self, value: f64) -> Vec<bool> {
        let v = self.encode_value(value);
        (0..self.bit_width)
            .rev()
            .map(|shift| (v >> shift) & 1 == 1)
            .collect()
    }
}

/// Ordered layout of variables in a genome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhenotypeMap {
    specs: Vec<VariableSpec>,
    offsets: Vec<usize>,
    total_bits: usize,
}

impl PhenotypeMap {
    /// Create a phenotype map from variable specs
    ///
    /// Fails with a configuration error if `specs` is empty.
    pub fn new(specs: Vec<VariableSpec>) -> EvoResult<Self> {
        if specs.is_empty() {
            return Err(EvolutionError::Configuration(
                "phenotype map needs at least one variable".to_string(),
            ));
        }
        let mut offsets = Vec::with_capacity(specs.len());
        let mut total_bits = 0usize;
        for spec in &specs {
            offsets.push(total_bits);
            total_bits += spec.bit_width() as usize;
        }
        Ok(Self {
            specs,
            offsets,
            total_bits,
        })
    }

    /// Start building a map one variable at a time
    pub fn builder() -> PhenotypeMapBuilder {
        PhenotypeMapBuilder::default()
    }

    /// A map of `count` identical variables
    pub fn uniform(count: usize, bit_width: u32, lower: f64, upper: f64) -> EvoResult<Self> {
        let spec = VariableSpec::new(bit_width, lower, upper)?;
        Self::new(vec![spec; count])
    }

    /// Number of variables
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Always false for a constructed map; present for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Sum of all bit widths
    pub fn total_bits(&self) -> usize {
        self.total_bits
    }

    /// Get the spec of a variable
    pub fn get(&self, index: usize) -> Option<&VariableSpec> {
        self.specs.get(index)
    }

    /// Bit offset at which a variable's segment starts
    pub fn offset(&self, index: usize) -> Option<usize> {
        self.offsets.get(index).copied()
    }

    /// Bit range occupied by a variable
    pub fn segment(&self, index: usize) -> Option<Range<usize>> {
        let spec = self.specs.get(index)?;
        let start = self.offsets[index];
        Some(start..start + spec.bit_width() as usize)
    }

    /// Iterate over the variable specs in order
    pub fn iter(&self) -> impl Iterator<Item = &VariableSpec> {
        self.specs.iter()
    }

    /// Decode every variable from a full-length bit slice
    pub(crate) fn decode_all(&self, bits: &[bool]) -> Vec<f64> {
        self.specs
            .iter()
            .zip(self.offsets.iter())
            .map(|(spec, &start)| spec.decode(&bits[start..start + spec.bit_width() as usize]))
            .collect()
    }
}

/// Incremental builder for [`PhenotypeMap`]
#[derive(Debug, Clone, Default)]
pub struct PhenotypeMapBuilder {
    specs: Vec<VariableSpec>,
}

impl PhenotypeMapBuilder {
    /// Append a variable of `bit_width` bits spanning `[lower, upper]`
    pub fn add(mut self, bit_width: u32, lower: f64, upper: f64) -> EvoResult<Self> {
        self.specs.push(VariableSpec::new(bit_width, lower, upper)?);
        Ok(self)
    }

    /// Finish the map
    pub fn build(self) -> EvoResult<PhenotypeMap> {
        PhenotypeMap::new(self.specs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_variable_spec_rejects_bad_config() {
        assert!(VariableSpec::new(0, -1.0, 1.0).is_err());
        assert!(VariableSpec::new(MAX_BIT_WIDTH + 1, -1.0, 1.0).is_err());
        assert!(VariableSpec::new(8, 1.0, 1.0).is_err());
        assert!(VariableSpec::new(8, 2.0, 1.0).is_err());
        assert!(VariableSpec::new(8, f64::NEG_INFINITY, 1.0).is_err());
        assert!(VariableSpec::new(8, 0.0, f64::NAN).is_err());
        assert!(VariableSpec::new(MAX_BIT_WIDTH, -1.0, 1.0).is_ok());
    }

    #[test]
    fn test_resolution() {
        let spec = VariableSpec::new(16, -5.0, 5.0).unwrap();
        assert_eq!(spec.max_value(), 65535);
        assert_relative_eq!(spec.resolution(), 10.0 / 65535.0);
    }

    #[test]
    fn test_decode_boundaries_are_exact() {
        let spec = VariableSpec::new(16, -4.5, 4.5).unwrap();
        assert_eq!(spec.decode(&[false; 16]), -4.5);
        assert_eq!(spec.decode(&[true; 16]), 4.5);

        let odd = VariableSpec::new(7, 0.1, 0.7).unwrap();
        assert_eq!(odd.decode(&[true; 7]), 0.7);
    }

    #[test]
    fn test_single_bit_variable_holds_only_bounds() {
        let spec = VariableSpec::new(1, -10.0, 0.0).unwrap();
        assert_eq!(spec.decode(&[false]), -10.0);
        assert_eq!(spec.decode(&[true]), 0.0);
        assert_eq!(spec.encode(-6.0), vec![false]);
        assert_eq!(spec.encode(-4.0), vec![true]);
    }

    #[test]
    fn test_decode_midpoint() {
        let spec = VariableSpec::new(2, 0.0, 3.0).unwrap();
        assert_relative_eq!(spec.decode(&[false, true]), 1.0);
        assert_relative_eq!(spec.decode(&[true, false]), 2.0);
    }

    #[test]
    fn test_encode_clamps_and_rounds() {
        let spec = VariableSpec::new(4, 0.0, 15.0).unwrap();
        assert_eq!(spec.encode_value(-3.0), 0);
        assert_eq!(spec.encode_value(99.0), 15);
        assert_eq!(spec.encode_value(6.4), 6);
        assert_eq!(spec.encode_value(6.6), 7);
        assert_eq!(spec.encode_value(f64::NAN), 0);
        assert_eq!(spec.encode(5.0), vec![false, true, false, true]);
    }

    #[test]
    fn test_max_width_round_trip() {
        let spec = VariableSpec::new(MAX_BIT_WIDTH, -1.0, 1.0).unwrap();
        let v = spec.max_value() / 3;
        assert_eq!(spec.encode_value(spec.decode_value(v)), v);
    }

    #[test]
    fn test_phenotype_map_offsets() {
        let map = PhenotypeMap::builder()
            .add(16, -10.0, 0.0)
            .and_then(|b| b.add(8, -6.5, 0.0))
            .and_then(|b| b.add(3, 0.0, 1.0))
            .and_then(|b| b.build())
            .unwrap();

        assert_eq!(map.len(), 3);
        assert_eq!(map.total_bits(), 27);
        assert_eq!(map.offset(1), Some(16));
        assert_eq!(map.segment(2), Some(24..27));
        assert_eq!(map.segment(3), None);
    }

    #[test]
    fn test_phenotype_map_rejects_empty() {
        assert!(PhenotypeMap::new(vec![]).is_err());
        assert!(PhenotypeMap::builder().build().is_err());
    }

    #[test]
    fn test_builder_propagates_spec_errors() {
        let result = PhenotypeMap::builder().add(16, 5.0, -5.0);
        assert!(matches!(result, Err(EvolutionError::Configuration(_))));
    }

    #[test]
    fn test_decode_all() {
        let map = PhenotypeMap::uniform(2, 2, 0.0, 3.0).unwrap();
        let values = map.decode_all(&[false, false, true, true]);
        assert_eq!(values, vec![0.0, 3.0]);
    }
}
