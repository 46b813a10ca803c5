//! Bit string storage
//!
//! This module provides the fixed-length bit container that backs a binary-to-decimal genome.

use std::ops::Range;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::GenomeError;

/// Fixed-length bit string
///
/// Unsigned integers stored in a range of the string are read most significant bit first.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitString {
    /// The bits of this string
    bits: Vec<bool>,
}

impl BitString {
    /// Create a new bit string with the given bits
    pub fn new(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// Create an all-zeros bit string of the given length
    pub fn zeros(length: usize) -> Self {
        Self {
            bits: vec![false; length],
        }
    }

    /// Create an all-ones bit string of the given length
    pub fn ones(length: usize) -> Self {
        Self {
            bits: vec![true; length],
        }
    }

    /// Create a uniformly random bit string
    pub fn random<R: Rng>(length: usize, rng: &mut R) -> Self {
        Self {
            bits: (0..length).map(|_| rng.gen()).collect(),
        }
    }

    /// Get the length of the bit string
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Check if the bit string is empty
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Get a specific bit
    pub fn get(&self, index: usize) -> Option<bool> {
        self.bits.get(index).copied()
    }

    /// Flip a specific bit
    pub fn flip(&mut self, index: usize) {
        if let Some(bit) = self.bits.get_mut(index) {
            *bit = !*bit;
        }
    }

    /// Borrow the bits
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Count the set bits
    pub fn count_ones(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Interpret `range` as an unsigned integer, most significant bit first.
    ///
    /// Ranges wider than 64 bits keep only the low 64 bits.
    pub fn read_uint(&self, range: Range<usize>) -> u64 {
        read_uint(&self.bits[range])
    }

    /// Store `value` into `range`, most significant bit first.
    ///
    /// Bits of `value` above the width of the range are discarded.
    pub fn write_uint(&mut self, range: Range<usize>, value: u64) {
        let segment = &mut self.bits[range];
        let width = segment.len();
        for (i, bit) in segment.iter_mut().enumerate() {
            let shift = width - 1 - i;
            *bit = shift < 64 && (value >> shift) & 1 == 1;
        }
    }

    /// Copy `range` from another bit string of the same length
    pub fn copy_range_from(&mut self, other: &Self, range: Range<usize>) -> Result<(), GenomeError> {
        if self.bits.len() != other.bits.len() {
            return Err(GenomeError::DimensionMismatch {
                expected: self.bits.len(),
                actual: other.bits.len(),
            });
        }
        self.bits[range.clone()].copy_from_slice(&other.bits[range]);
        Ok(())
    }

    /// Hamming distance to another bit string
    pub fn hamming_distance(&self, other: &Self) -> usize {
        self.bits
            .iter()
            .zip(other.bits.iter())
            .filter(|(a, b)| a != b)
            .count()
    }
}

/// Interpret a bit slice as an unsigned integer, most significant bit first
pub(crate) fn read_uint(bits: &[bool]) -> u64 {
    bits.iter()
        .fold(0u64, |acc, &bit| (acc << 1) | u64::from(bit))
}

impl std::ops::Index<usize> for BitString {
    type Output = bool;

    fn index(&self, index: usize) -> &Self::Output {
        &self.bits[index]
    }
}

impl From<Vec<bool>> for BitString {
    fn from(bits: Vec<bool>) -> Self {
        Self { bits }
    }
}

impl<const N: usize> From<[bool; N]> for BitString {
    fn from(arr: [bool; N]) -> Self {
        Self { bits: arr.to_vec() }
    }
}

impl<'a> IntoIterator for &'a BitString {
    type Item = &'a bool;
    type IntoIter = std::slice::Iter<'a, bool>;

    fn into_iter(self) -> Self::IntoIter {
        self.bits.iter()
    }
}

impl std::fmt::Display for BitString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for bit in &self.bits {
            write!(f, "{}", if *bit { '1' } else { '0' })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_bit_string_zeros_ones() {
        let zeros = BitString::zeros(5);
        assert_eq!(zeros.len(), 5);
        assert_eq!(zeros.count_ones(), 0);

        let ones = BitString::ones(5);
        assert_eq!(ones.count_ones(), 5);
    }

    #[test]
    fn test_bit_string_random_length() {
        let mut rng = StdRng::seed_from_u64(7);
        let bs = BitString::random(37, &mut rng);
        assert_eq!(bs.len(), 37);
    }

    #[test]
    fn test_read_uint_is_msb_first() {
        let bs = BitString::new(vec![true, false, true, true]);
        assert_eq!(bs.read_uint(0..4), 0b1011);
        assert_eq!(bs.read_uint(1..4), 0b011);
        assert_eq!(bs.read_uint(0..1), 1);
    }

    #[test]
    fn test_write_uint_only_touches_range() {
        let mut bs = BitString::ones(8);
        bs.write_uint(2..6, 0b0101);
        assert_eq!(bs.to_string(), "11010111");
        assert_eq!(bs.read_uint(2..6), 0b0101);
    }

    #[test]
    fn test_write_uint_discards_high_bits() {
        let mut bs = BitString::zeros(3);
        bs.write_uint(0..3, 0b1_1010);
        assert_eq!(bs.read_uint(0..3), 0b010);
    }

    #[test]
    fn test_copy_range_from() {
        let mut a = BitString::zeros(6);
        let b = BitString::ones(6);
        a.copy_range_from(&b, 3..6).unwrap();
        assert_eq!(a.to_string(), "000111");

        let short = BitString::ones(4);
        assert!(a.copy_range_from(&short, 0..2).is_err());
    }

    #[test]
    fn test_bit_string_flip() {
        let mut bs = BitString::zeros(3);
        bs.flip(1);
        assert_eq!(bs.bits(), &[false, true, false]);
        bs.flip(10);
        assert_eq!(bs.len(), 3);
    }

    #[test]
    fn test_bit_string_hamming_distance() {
        let bs1 = BitString::new(vec![true, false, true, false]);
        let bs2 = BitString::new(vec![true, true, false, false]);
        assert_eq!(bs1.hamming_distance(&bs2), 2);
    }

    #[test]
    fn test_bit_string_display_and_index() {
        let bs: BitString = [true, false, true, true].into();
        assert_eq!(format!("{}", bs), "1011");
        assert!(bs[0]);
        assert!(!bs[1]);
    }
}
