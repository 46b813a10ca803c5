//! Objective traits
//!
//! This module defines the capability a caller implements to score decoded phenotypes.

use crate::error::ObjectiveError;

/// Objective evaluation trait
///
/// Scores a decoded phenotype vector. Higher is better; to minimize `f`,
/// return `-f` or wrap the objective in [`Minimize`].
#[cfg(feature = "parallel")]
pub trait Scorable: Send + Sync {
    /// Score one phenotype (variable values in map order)
    fn score(&self, phenotype: &[f64]) -> Result<f64, ObjectiveError>;
}

/// Objective evaluation trait (non-parallel version)
///
/// Scores a decoded phenotype vector. Higher is better; to minimize `f`,
/// return `-f` or wrap the objective in [`Minimize`].
#[cfg(not(feature = "parallel"))]
pub trait Scorable {
    /// Score one phenotype (variable values in map order)
    fn score(&self, phenotype: &[f64]) -> Result<f64, ObjectiveError>;
}

/// A wrapper to negate an objective (for minimization problems)
#[derive(Clone, Debug)]
pub struct Minimize<O> {
    inner: O,
}

impl<O> Minimize<O> {
    /// Create a minimization wrapper around an objective
    pub fn new(objective: O) -> Self {
        Self { inner: objective }
    }
}

impl<O: Scorable> Scorable for Minimize<O> {
    fn score(&self, phenotype: &[f64]) -> Result<f64, ObjectiveError> {
        self.inner.score(phenotype).map(|s| -s)
    }
}

/// A simple function wrapper for infallible objectives
#[derive(Clone)]
pub struct FnObjective<F>
where
    F: Fn(&[f64]) -> f64,
{
    f: F,
}

impl<F> FnObjective<F>
where
    F: Fn(&[f64]) -> f64,
{
    /// Create a new function-based objective
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> std::fmt::Debug for FnObjective<F>
where
    F: Fn(&[f64]) -> f64,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnObjective").finish_non_exhaustive()
    }
}

#[cfg(feature = "parallel")]
impl<F> Scorable for FnObjective<F>
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    fn score(&self, phenotype: &[f64]) -> Result<f64, ObjectiveError> {
        Ok((self.f)(phenotype))
    }
}

#[cfg(not(feature = "parallel"))]
impl<F> Scorable for FnObjective<F>
where
    F: Fn(&[f64]) -> f64,
{
    fn score(&self, phenotype: &[f64]) -> Result<f64, ObjectiveError> {
        Ok((self.f)(phenotype))
    }
}
