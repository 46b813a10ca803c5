//! Fitness scaling
//!
//! Raw objective scores can be negative or tightly bunched, which starves
//! fitness-proportionate selection. Scaling maps them to non-negative selection weights,
//! recomputed from the whole population every generation.

use serde::{Deserialize, Serialize};

use crate::error::{EvoResult, EvolutionError};

/// Default number of standard deviations kept below the mean by sigma truncation
pub const DEFAULT_SIGMA_MULTIPLIER: f64 = 2.0;

/// Scaling applied to raw scores before selection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum ScalingMethod {
    /// `max(0, s - (mean - multiplier * std))`
    ///
    /// Individuals more than `multiplier` standard deviations below the mean get zero
    /// fitness. A population with zero spread gets a uniform fitness of 1.0.
    SigmaTruncation {
        /// Multiplier `c` on the standard deviation
        multiplier: f64,
    },
    /// Raw scores are used unchanged
    Identity,
}

impl ScalingMethod {
    /// Sigma truncation with the given multiplier
    pub fn sigma_truncation(multiplier: f64) -> Self {
        Self::SigmaTruncation { multiplier }
    }

    /// Check the scaling parameters
    pub fn validate(&self) -> EvoResult<()> {
        match *self {
            Self::SigmaTruncation { multiplier } if !(multiplier.is_finite() && multiplier > 0.0) => {
                Err(EvolutionError::Configuration(format!(
                    "scaling constant must be positive and finite, got {}",
                    multiplier
                )))
            }
            _ => Ok(()),
        }
    }

    /// Map raw scores to selection fitness, index for index
    pub fn scale(&self, raw: &[f64]) -> Vec<f64> {
        match *self {
            Self::SigmaTruncation { multiplier } => sigma_truncate(raw, multiplier),
            Self::Identity => raw.to_vec(),
        }
    }
}

impl Default for ScalingMethod {
    fn default() -> Self {
        Self::sigma_truncation(DEFAULT_SIGMA_MULTIPLIER)
    }
}

fn sigma_truncate(raw: &[f64], multiplier: f64) -> Vec<f64> {
    let (mean, std) = mean_and_std(raw);
    if std == 0.0 || !std.is_finite() {
        log::trace!("zero score spread over {} individuals; uniform fitness", raw.len());
        return vec![1.0; raw.len()];
    }
    let floor = mean - multiplier * std;
    raw.iter().map(|s| (s - floor).max(0.0)).collect()
}

/// Mean and sample standard deviation; the deviation is 0 for fewer than two scores
pub(crate) fn mean_and_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (mean, 0.0);
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, variance.sqrt())
}
