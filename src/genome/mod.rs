//! Genome representation
//!
//! This module provides the bit string container, the variable codec and the
//! binary-to-decimal genome built from them.

pub mod bin2dec;
pub mod bit_string;
pub mod phenotype;

pub mod prelude {
    pub use super::bin2dec::*;
    pub use super::bit_string::*;
    pub use super::phenotype::*;
}
