//! Termination criteria
//!
//! The generation budget always applies. These criteria can stop a run earlier.

/// Evolution state for termination checking
#[derive(Clone, Copy, Debug)]
pub struct EvolutionState<'a> {
    /// Current generation number
    pub generation: usize,
    /// Total objective evaluations so far
    pub evaluations: usize,
    /// Best-of-run score
    pub best_score: f64,
    /// Best-of-run score after each generation, oldest first
    pub best_score_history: &'a [f64],
}

/// Termination criterion trait
pub trait TerminationCriterion: Send + Sync {
    /// Check if evolution should terminate
    fn should_terminate(&self, state: &EvolutionState<'_>) -> bool;

    /// Get a description of why termination occurred
    fn reason(&self) -> &'static str;

    /// The reason to report if this criterion fires for `state`
    fn triggered_reason(&self, state: &EvolutionState<'_>) -> Option<&'static str> {
        self.should_terminate(state).then(|| self.reason())
    }
}

/// Terminate after a maximum number of objective evaluations
#[derive(Clone, Debug)]
pub struct MaxEvaluations(pub usize);

impl MaxEvaluations {
    /// Create a new max evaluations criterion
    pub fn new(max: usize) -> Self {
        Self(max)
    }
}

impl TerminationCriterion for MaxEvaluations {
    fn should_terminate(&self, state: &EvolutionState<'_>) -> bool {
        state.evaluations >= self.0
    }

    fn reason(&self) -> &'static str {
        "Maximum evaluations reached"
    }
}

/// Terminate when the best score stops improving
///
/// Fires once the best-of-run score has changed by less than `epsilon` over the
/// last `window` generations.
#[derive(Clone, Debug)]
pub struct ScoreStagnation {
    /// Number of generations to look back
    pub window: usize,
    /// Minimum improvement threshold
    pub epsilon: f64,
}

impl ScoreStagnation {
    /// Create a new score stagnation criterion
    pub fn new(window: usize, epsilon: f64) -> Self {
        assert!(window >= 2, "Stagnation window must span at least 2 generations");
        Self { window, epsilon }
    }
}

impl TerminationCriterion for ScoreStagnation {
    fn should_terminate(&self, state: &EvolutionState<'_>) -> bool {
        let history = state.best_score_history;
        if history.len() < self.window {
            return false;
        }

        let window = &history[history.len() - self.window..];
        let first = window[0];
        let last = window[window.len() - 1];

        (last - first).abs() < self.epsilon
    }

    fn reason(&self) -> &'static str {
        "Score stagnation detected"
    }
}

/// Terminate when a target score is reached
#[derive(Clone, Debug)]
pub struct TargetScore {
    /// Target score value
    pub target: f64,
    /// Tolerance for reaching target
    pub tolerance: f64,
}

impl TargetScore {
    /// Create a new target score criterion
    pub fn new(target: f64) -> Self {
        Self {
            target,
            tolerance: 0.0,
        }
    }

    /// Create with a tolerance
    pub fn with_tolerance(target: f64, tolerance: f64) -> Self {
        Self { target, tolerance }
    }
}

impl TerminationCriterion for TargetScore {
    fn should_terminate(&self, state: &EvolutionState<'_>) -> bool {
        state.best_score >= self.target - self.tolerance
    }

    fn reason(&self) -> &'static str {
        "Target score reached"
    }
}

/// Combine criteria with OR logic (any one triggers termination)
pub struct AnyOf {
    criteria: Vec<Box<dyn TerminationCriterion>>,
}

impl AnyOf {
    /// Create a new AnyOf combinator
    pub fn new(criteria: Vec<Box<dyn TerminationCriterion>>) -> Self {
        Self { criteria }
    }
}

impl TerminationCriterion for AnyOf {
    fn should_terminate(&self, state: &EvolutionState<'_>) -> bool {
        self.criteria.iter().any(|c| c.should_terminate(state))
    }

    fn reason(&self) -> &'static str {
        "One of multiple criteria met"
    }

    fn triggered_reason(&self, state: &EvolutionState<'_>) -> Option<&'static str> {
        self.criteria
            .iter()
            .find_map(|c| c.triggered_reason(state))
    }
}

impl AnyOf {
    /// The first criterion that fires for `state`
    pub fn triggered(&self, state: &EvolutionState<'_>) -> Option<&dyn TerminationCriterion> {
        self.criteria
            .iter()
            .find(|c| c.should_terminate(state))
            .map(|c| c.as_ref())
    }
}

impl std::fmt::Debug for AnyOf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnyOf")
            .field("criteria", &self.criteria.len())
            .finish()
    }
}

pub mod prelude {
    pub use super::{
        AnyOf, EvolutionState, MaxEvaluations, ScoreStagnation, TargetScore,
        TerminationCriterion,
    };
}
