//! Diagnostics and statistics
//!
//! This module provides statistics collection for evolutionary runs and the
//! telemetry sinks the engine reports them to.

use serde::{Deserialize, Serialize};

use crate::genome::bin2dec::Bin2DecGenome;
use crate::population::population::Population;

/// Statistics for a single generation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Generation number
    pub generation: usize,
    /// Total objective evaluations so far
    pub evaluations: usize,
    /// Best raw score in this generation
    pub best_score: f64,
    /// Mean raw score
    pub mean_score: f64,
    /// Worst raw score in this generation
    pub worst_score: f64,
    /// Sample standard deviation of the raw scores
    pub score_std: f64,
    /// Mean pairwise Hamming distance
    pub diversity: f64,
}

impl GenerationStats {
    /// Compute statistics from a population
    ///
    /// Only evaluated genomes contribute to the score statistics.
    pub fn from_population(population: &Population, evaluations: usize) -> Self {
        let generation = population.generation();
        let best_score = population
            .best()
            .and_then(|g| g.score())
            .unwrap_or(f64::NEG_INFINITY);
        let worst_score = population
            .worst_index()
            .and_then(|i| population[i].score())
            .unwrap_or(f64::INFINITY);

        Self {
            generation,
            evaluations,
            best_score,
            mean_score: population.mean_score().unwrap_or(0.0),
            worst_score,
            score_std: population.score_std().unwrap_or(0.0),
            diversity: population.diversity(),
        }
    }
}

/// Statistics for an entire evolution run
///
/// The best-of-run record is replaced only on strict improvement, so `best_score`
/// never decreases even when a later generation regresses.
#[derive(Clone, Debug)]
pub struct RunStatistics {
    /// Generation of the latest update
    pub generation: usize,
    /// Total objective evaluations so far
    pub evaluations: usize,
    /// Best genome seen in any generation
    pub best_individual: Option<Bin2DecGenome>,
    /// Score of `best_individual`
    pub best_score: f64,
    /// Statistics of the latest generation
    pub current: Option<GenerationStats>,
    /// Statistics per generation, oldest first
    pub history: Vec<GenerationStats>,
}

impl RunStatistics {
    /// Create an empty record
    pub fn new() -> Self {
        Self {
            generation: 0,
            evaluations: 0,
            best_individual: None,
            best_score: f64::NEG_INFINITY,
            current: None,
            history: Vec::new(),
        }
    }

    /// Record a scored generation
    pub fn update(&mut self, population: &Population, evaluations: usize) {
        let stats = GenerationStats::from_population(population, evaluations);

        if let Some(best) = population.best() {
            if let Some(score) = best.score() {
                if self.best_individual.is_none() || score > self.best_score {
                    self.best_score = score;
                    self.best_individual = Some(best.clone());
                }
            }
        }

        self.generation = stats.generation;
        self.evaluations = evaluations;
        self.history.push(stats.clone());
        self.current = Some(stats);
    }

    /// Get the number of generations recorded
    pub fn num_generations(&self) -> usize {
        self.history.len()
    }

    /// Decoded variables of the best-of-run genome
    pub fn best_phenotype(&self) -> Option<Vec<f64>> {
        self.best_individual.as_ref().map(|g| g.phenotypes())
    }

    /// Get the history of per-generation best scores
    pub fn best_score_history(&self) -> Vec<f64> {
        self.history.iter().map(|g| g.best_score).collect()
    }

    /// Get the history of mean scores
    pub fn mean_score_history(&self) -> Vec<f64> {
        self.history.iter().map(|g| g.mean_score).collect()
    }

    /// Get the history of diversity values
    pub fn diversity_history(&self) -> Vec<f64> {
        self.history.iter().map(|g| g.diversity).collect()
    }

    /// Best score seen up to each recorded generation
    pub fn best_so_far_history(&self) -> Vec<f64> {
        self.history
            .iter()
            .scan(f64::NEG_INFINITY, |best, g| {
                *best = best.max(g.best_score);
                Some(*best)
            })
            .collect()
    }

    /// Get a summary of the run so far
    pub fn summary(&self) -> String {
        let (mean, worst) = self
            .current
            .as_ref()
            .map_or((f64::NAN, f64::NAN), |c| (c.mean_score, c.worst_score));

        format!(
            "Evolution Summary:\n\
             - Generations: {}\n\
             - Evaluations: {}\n\
             - Best score: {:.6}\n\
             - Current mean: {:.6}\n\
             - Current worst: {:.6}",
            self.generation, self.evaluations, self.best_score, mean, worst
        )
    }
}

impl Default for RunStatistics {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiver for run statistics
///
/// The engine calls `record` after every `statistics_interval`-th generation and
/// after the final generation.
pub trait StatisticsSink {
    /// Receive the statistics after a generation
    fn record(&mut self, stats: &RunStatistics);
}

impl<F> StatisticsSink for F
where
    F: FnMut(&RunStatistics),
{
    fn record(&mut self, stats: &RunStatistics) {
        self(stats)
    }
}

/// Sink that discards everything
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl StatisticsSink for NoopSink {
    fn record(&mut self, _stats: &RunStatistics) {}
}

/// Sink that writes one log line per recorded generation
#[derive(Clone, Copy, Debug)]
pub struct LogSink {
    level: log::Level,
}

impl LogSink {
    /// Log at the given level
    pub fn new(level: log::Level) -> Self {
        Self { level }
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new(log::Level::Info)
    }
}

impl StatisticsSink for LogSink {
    fn record(&mut self, stats: &RunStatistics) {
        if let Some(current) = &stats.current {
            log::log!(
                self.level,
                "generation {}: best {:.6} mean {:.6} worst {:.6} (best of run {:.6}, {} evaluations)",
                current.generation,
                current.best_score,
                current.mean_score,
                current.worst_score,
                stats.best_score,
                stats.evaluations
            );
        }
    }
}

/// Sink that keeps a snapshot of every recorded generation
#[derive(Clone, Debug, Default)]
pub struct HistorySink {
    /// Latest generation statistics at each call
    pub snapshots: Vec<GenerationStats>,
    /// Best-of-run score at each call
    pub best_scores: Vec<f64>,
}

impl HistorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Generation numbers that were recorded
    pub fn generations(&self) -> Vec<usize> {
        self.snapshots.iter().map(|s| s.generation).collect()
    }
}

impl StatisticsSink for HistorySink {
    fn record(&mut self, stats: &RunStatistics) {
        if let Some(current) = &stats.current {
            self.snapshots.push(current.clone());
        }
        self.best_scores.push(stats.best_score);
    }
}

/// Result of an evolution run
#[derive(Clone, Debug)]
pub struct EvolutionResult {
    /// The best genome found in any generation
    pub best_genome: Bin2DecGenome,
    /// The best score
    pub best_score: f64,
    /// Number of generations completed
    pub generations: usize,
    /// Total objective evaluations
    pub evaluations: usize,
    /// Statistics for the run
    pub statistics: RunStatistics,
    /// Population after the last generation
    pub final_population: Population,
    /// Why the run stopped
    pub termination_reason: String,
}

impl EvolutionResult {
    /// Decoded variables of the best genome
    pub fn best_phenotype(&self) -> Vec<f64> {
        self.best_genome.phenotypes()
    }
}

pub mod prelude {
    pub use super::{
        EvolutionResult, GenerationStats, HistorySink, LogSink, NoopSink, RunStatistics,
        StatisticsSink,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fitness::traits::FnObjective;
    use crate::genome::phenotype::PhenotypeMap;
    use approx::assert_relative_eq;
    use std::sync::Arc;

    fn population_of(values: &[f64], generation: usize) -> Population {
        let map = Arc::new(PhenotypeMap::uniform(1, 8, 0.0, 255.0).unwrap());
        let mut pop: Population = values
            .iter()
            .map(|&v| Bin2DecGenome::from_phenotype(map.clone(), &[v]).unwrap())
            .collect();
        pop.evaluate(&FnObjective::new(|x: &[f64]| x[0])).unwrap();
        pop.set_generation(generation);
        pop
    }

    #[test]
    fn test_generation_stats_from_population() {
        let pop = population_of(&[10.0, 20.0, 30.0, 40.0, 50.0], 10);
        let stats = GenerationStats::from_population(&pop, 100);

        assert_eq!(stats.generation, 10);
        assert_eq!(stats.evaluations, 100);
        assert_eq!(stats.best_score, 50.0);
        assert_eq!(stats.worst_score, 10.0);
        assert_relative_eq!(stats.mean_score, 30.0);
        assert!(stats.score_std > 15.0 && stats.score_std < 16.0);
        assert!(stats.diversity > 0.0);
    }

    #[test]
    fn test_generation_stats_empty_population() {
        let stats = GenerationStats::from_population(&Population::new(), 0);

        assert_eq!(stats.best_score, f64::NEG_INFINITY);
        assert_eq!(stats.worst_score, f64::INFINITY);
        assert_eq!(stats.diversity, 0.0);
    }

    #[test]
    fn test_best_record_survives_regression() {
        let mut stats = RunStatistics::new();
        stats.update(&population_of(&[5.0, 90.0], 0), 2);
        stats.update(&population_of(&[1.0, 3.0], 1), 4);

        assert_eq!(stats.best_score, 90.0);
        assert_eq!(stats.best_phenotype(), Some(vec![90.0]));
        assert_eq!(stats.generation, 1);
        assert_eq!(stats.evaluations, 4);
        assert_eq!(stats.best_score_history(), vec![90.0, 3.0]);
        assert_eq!(stats.best_so_far_history(), vec![90.0, 90.0]);
    }

    #[test]
    fn test_equal_score_keeps_first_record() {
        let mut stats = RunStatistics::new();
        let first = population_of(&[7.0], 0);
        stats.update(&first, 1);
        let recorded = stats.best_individual.clone().unwrap();

        stats.update(&population_of(&[7.0], 1), 2);
        assert_eq!(stats.best_individual.unwrap(), recorded);
    }

    #[test]
    fn test_history() {
        let mut stats = RunStatistics::new();
        for i in 0..5 {
            let v = (i + 1) as f64 * 10.0;
            stats.update(&population_of(&[v, v], i), i * 2);
        }

        assert_eq!(stats.num_generations(), 5);
        assert_eq!(
            stats.best_score_history(),
            vec![10.0, 20.0, 30.0, 40.0, 50.0]
        );
        assert_eq!(
            stats.mean_score_history(),
            vec![10.0, 20.0, 30.0, 40.0, 50.0]
        );
        assert_eq!(stats.diversity_history(), vec![0.0; 5]);
        assert_eq!(stats.current.as_ref().unwrap().generation, 4);
    }

    #[test]
    fn test_summary() {
        let mut stats = RunStatistics::new();
        stats.update(&population_of(&[10.0, 50.0], 3), 100);

        let summary = stats.summary();
        assert!(summary.contains("Generations: 3"));
        assert!(summary.contains("Evaluations: 100"));
        assert!(summary.contains("Best score: 50"));
    }

    #[test]
    fn test_generation_stats_serialize() {
        let stats = GenerationStats::from_population(&population_of(&[2.0], 7), 14);
        let json = serde_json::to_string(&stats).unwrap();
        let back: GenerationStats = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stats);
    }

    #[test]
    fn test_sinks() {
        let mut stats = RunStatistics::new();
        stats.update(&population_of(&[4.0, 8.0], 0), 2);

        let mut history = HistorySink::new();
        history.record(&stats);
        assert_eq!(history.generations(), vec![0]);
        assert_eq!(history.best_scores, vec![8.0]);

        let mut seen = Vec::new();
        let mut closure = |s: &RunStatistics| seen.push(s.generation);
        closure.record(&stats);
        assert_eq!(seen, vec![0]);

        NoopSink.record(&stats);
        LogSink::default().record(&stats);
    }
}
