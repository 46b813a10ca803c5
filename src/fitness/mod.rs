//! Objective functions
//!
//! This module provides the objective abstraction used to score genomes.

pub mod traits;

pub mod prelude {
    pub use super::traits::*;
}
