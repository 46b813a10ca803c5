//! Simple Genetic Algorithm
//!
//! This module implements a generational genetic algorithm over binary-to-decimal
//! genomes: scale, select, cross over, mutate, replace.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::diagnostics::{EvolutionResult, NoopSink, RunStatistics, StatisticsSink};
use crate::error::{EvoResult, EvolutionError, ObjectiveError};
use crate::fitness::traits::Scorable;
use crate::genome::phenotype::PhenotypeMap;
use crate::operators::crossover::OnePointCrossover;
use crate::operators::mutation::BitFlipMutation;
use crate::operators::selection::RouletteSelection;
use crate::operators::traits::{CrossoverOperator, SelectionOperator};
use crate::population::population::Population;
use crate::scaling::ScalingMethod;
use crate::termination::{EvolutionState, TerminationCriterion};

const BUDGET_EXHAUSTED: &str = "Maximum generations reached";

/// Configuration for the Simple GA
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimpleGAConfig {
    /// Population size, constant for the whole run
    pub population_size: usize,
    /// Number of generations to breed after the initial population
    pub n_generations: usize,
    /// Per-bit flip probability
    pub mutation_probability: f64,
    /// Probability that a mating pair is crossed over rather than cloned
    pub crossover_probability: f64,
    /// Scaling from raw scores to selection fitness
    pub scaling: ScalingMethod,
    /// Seed for [`SimpleGA::run`]; drawn from entropy when absent
    pub random_seed: Option<u64>,
    /// Report to the statistics sink every this many generations
    pub statistics_interval: usize,
    /// Carry the best genome into the next generation in place of the worst child
    pub elitism: bool,
    /// Whether to evaluate in parallel
    pub parallel_evaluation: bool,
}

impl Default for SimpleGAConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            n_generations: 100,
            mutation_probability: 0.01,
            crossover_probability: 0.6,
            scaling: ScalingMethod::default(),
            random_seed: None,
            statistics_interval: 1,
            elitism: false,
            parallel_evaluation: true,
        }
    }
}

impl SimpleGAConfig {
    /// Check every option, returning the first problem found
    pub fn validate(&self) -> EvoResult<()> {
        if self.population_size == 0 {
            return Err(EvolutionError::Configuration(
                "population size must be at least 1".to_string(),
            ));
        }
        check_probability("mutation probability", self.mutation_probability)?;
        check_probability("crossover probability", self.crossover_probability)?;
        self.scaling.validate()?;
        if self.statistics_interval == 0 {
            return Err(EvolutionError::Configuration(
                "statistics interval must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn check_probability(name: &str, value: f64) -> EvoResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(EvolutionError::Configuration(format!(
            "{} must be in [0, 1], got {}",
            name, value
        )))
    }
}

/// Builder for SimpleGA
///
/// The objective and the phenotype map are required up front; everything else has
/// a default.
pub struct SimpleGABuilder<O, S = RouletteSelection, C = OnePointCrossover> {
    config: SimpleGAConfig,
    map: Arc<PhenotypeMap>,
    objective: O,
    selection: S,
    crossover: C,
    termination: Option<Box<dyn TerminationCriterion>>,
}

impl<O, S, C> SimpleGABuilder<O, S, C> {
    /// Replace the whole configuration
    pub fn config(mut self, config: SimpleGAConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the population size
    pub fn population_size(mut self, size: usize) -> Self {
        self.config.population_size = size;
        self
    }

    /// Set the number of generations
    pub fn n_generations(mut self, generations: usize) -> Self {
        self.config.n_generations = generations;
        self
    }

    /// Set the per-bit mutation probability
    pub fn mutation_probability(mut self, probability: f64) -> Self {
        self.config.mutation_probability = probability;
        self
    }

    /// Set the crossover probability
    pub fn crossover_probability(mut self, probability: f64) -> Self {
        self.config.crossover_probability = probability;
        self
    }

    /// Set the scaling method
    pub fn scaling(mut self, scaling: ScalingMethod) -> Self {
        self.config.scaling = scaling;
        self
    }

    /// Use sigma truncation scaling with the given multiplier
    pub fn scaling_constant(mut self, multiplier: f64) -> Self {
        self.config.scaling = ScalingMethod::sigma_truncation(multiplier);
        self
    }

    /// Set the seed used by [`SimpleGA::run`]
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.config.random_seed = Some(seed);
        self
    }

    /// Set how often the statistics sink is called
    pub fn statistics_interval(mut self, interval: usize) -> Self {
        self.config.statistics_interval = interval;
        self
    }

    /// Enable or disable elitism
    pub fn elitism(mut self, enabled: bool) -> Self {
        self.config.elitism = enabled;
        self
    }

    /// Enable or disable parallel evaluation
    pub fn parallel_evaluation(mut self, enabled: bool) -> Self {
        self.config.parallel_evaluation = enabled;
        self
    }

    /// Stop early when `criterion` fires
    pub fn termination<T>(mut self, criterion: T) -> Self
    where
        T: TerminationCriterion + 'static,
    {
        self.termination = Some(Box::new(criterion));
        self
    }

    /// Set the selection operator
    pub fn selection<NewS>(self, selection: NewS) -> SimpleGABuilder<O, NewS, C>
    where
        NewS: SelectionOperator,
    {
        SimpleGABuilder {
            config: self.config,
            map: self.map,
            objective: self.objective,
            selection,
            crossover: self.crossover,
            termination: self.termination,
        }
    }

    /// Set the crossover operator
    pub fn crossover<NewC>(self, crossover: NewC) -> SimpleGABuilder<O, S, NewC>
    where
        NewC: CrossoverOperator,
    {
        SimpleGABuilder {
            config: self.config,
            map: self.map,
            objective: self.objective,
            selection: self.selection,
            crossover,
            termination: self.termination,
        }
    }
}

impl<O, S, C> SimpleGABuilder<O, S, C>
where
    O: Scorable,
    S: SelectionOperator,
    C: CrossoverOperator,
{
    /// Validate the configuration and build the SimpleGA instance
    pub fn build(self) -> EvoResult<SimpleGA<O, S, C>> {
        self.config.validate()?;
        let mutation = BitFlipMutation::try_new(self.config.mutation_probability)?;

        Ok(SimpleGA {
            config: self.config,
            map: self.map,
            objective: self.objective,
            selection: self.selection,
            crossover: self.crossover,
            mutation,
            termination: self.termination,
        })
    }
}

/// Simple Genetic Algorithm
///
/// Each generation the raw scores are scaled, `population_size` children are bred by
/// select-select-crossover-mutate, and the children replace the whole population.
pub struct SimpleGA<O, S = RouletteSelection, C = OnePointCrossover> {
    config: SimpleGAConfig,
    map: Arc<PhenotypeMap>,
    objective: O,
    selection: S,
    crossover: C,
    mutation: BitFlipMutation,
    termination: Option<Box<dyn TerminationCriterion>>,
}

impl<O: Scorable> SimpleGA<O> {
    /// Create a builder for SimpleGA
    pub fn builder(map: impl Into<Arc<PhenotypeMap>>, objective: O) -> SimpleGABuilder<O> {
        SimpleGABuilder {
            config: SimpleGAConfig::default(),
            map: map.into(),
            objective,
            selection: RouletteSelection,
            crossover: OnePointCrossover,
            termination: None,
        }
    }
}

impl<O, S, C> SimpleGA<O, S, C>
where
    O: Scorable,
    S: SelectionOperator,
    C: CrossoverOperator,
{
    /// The validated configuration
    pub fn config(&self) -> &SimpleGAConfig {
        &self.config
    }

    /// The phenotype map every genome is laid out by
    pub fn map(&self) -> &Arc<PhenotypeMap> {
        &self.map
    }

    /// The objective being maximized
    pub fn objective(&self) -> &O {
        &self.objective
    }

    /// Run with an RNG seeded from `random_seed`
    pub fn run(&self) -> EvoResult<EvolutionResult> {
        self.run_with_sink(&mut NoopSink)
    }

    /// Run with an RNG seeded from `random_seed`, reporting to `sink`
    pub fn run_with_sink<K>(&self, sink: &mut K) -> EvoResult<EvolutionResult>
    where
        K: StatisticsSink + ?Sized,
    {
        let seed = self.config.random_seed.unwrap_or_else(rand::random);
        log::info!("seeding run with {}", seed);
        let mut rng = StdRng::seed_from_u64(seed);
        self.run_with_rng_and_sink(&mut rng, sink)
    }

    /// Run the genetic algorithm with the given RNG
    pub fn run_with_rng<R: Rng>(&self, rng: &mut R) -> EvoResult<EvolutionResult> {
        self.run_with_rng_and_sink(rng, &mut NoopSink)
    }

    /// Run the genetic algorithm with the given RNG, reporting to `sink`
    ///
    /// Objective failures abort the run and are returned as
    /// [`EvolutionError::Objective`].
    pub fn run_with_rng_and_sink<R, K>(
        &self,
        rng: &mut R,
        sink: &mut K,
    ) -> EvoResult<EvolutionResult>
    where
        R: Rng,
        K: StatisticsSink + ?Sized,
    {
        let n_generations = self.config.n_generations;
        log::info!(
            "starting run: population {}, {} generations, {} variables in {} bits",
            self.config.population_size,
            n_generations,
            self.map.len(),
            self.map.total_bits()
        );

        // Initialize and score the population
        let mut population = Population::random(self.config.population_size, &self.map, rng);
        let mut evaluations = self.evaluate(&mut population)?;

        let mut statistics = RunStatistics::new();
        statistics.update(&population, evaluations);
        let mut best_score_history = vec![statistics.best_score];
        let mut last_reported = None;
        self.report(&statistics, sink, &mut last_reported);

        let mut termination_reason = BUDGET_EXHAUSTED;

        while population.generation() < n_generations {
            if let Some(reason) = self.early_stop(&statistics, &best_score_history) {
                termination_reason = reason;
                break;
            }

            let generation = population.generation() + 1;
            let mut children = self.breed(&population, rng)?;
            evaluations += self.evaluate(&mut children)?;
            if self.config.elitism {
                carry_elite(&population, &mut children);
            }
            children.set_generation(generation);
            population = children;

            statistics.update(&population, evaluations);
            best_score_history.push(statistics.best_score);
            if let Some(current) = &statistics.current {
                log::debug!(
                    "generation {}: best {:.6} mean {:.6} worst {:.6}",
                    generation,
                    current.best_score,
                    current.mean_score,
                    current.worst_score
                );
            }
            self.report(&statistics, sink, &mut last_reported);
        }

        if termination_reason == BUDGET_EXHAUSTED {
            if let Some(reason) = self.early_stop(&statistics, &best_score_history) {
                termination_reason = reason;
            }
        }

        // The final generation is always reported
        if last_reported != Some(population.generation()) {
            sink.record(&statistics);
        }

        let best_genome = statistics
            .best_individual
            .clone()
            .ok_or(EvolutionError::EmptyPopulation)?;

        log::info!(
            "run finished after {} generations ({} evaluations): best {:.6} ({})",
            population.generation(),
            evaluations,
            statistics.best_score,
            termination_reason
        );

        Ok(EvolutionResult {
            best_genome,
            best_score: statistics.best_score,
            generations: population.generation(),
            evaluations,
            statistics,
            final_population: population,
            termination_reason: termination_reason.to_string(),
        })
    }

    /// Breed a full generation of children from the scaled parent scores
    fn breed<R: Rng>(&self, parents: &Population, rng: &mut R) -> EvoResult<Population> {
        let size = self.config.population_size;
        let fitness = self.config.scaling.scale(&parents.raw_scores());
        let mut children = Population::with_capacity(size);

        while children.len() < size {
            let parent1 = &parents[self.selection.select(&fitness, rng)];
            let parent2 = &parents[self.selection.select(&fitness, rng)];

            let (mut child1, mut child2) = if rng.gen::<f64>() < self.config.crossover_probability {
                self.crossover.crossover(parent1, parent2, rng)?
            } else {
                (parent1.clone(), parent2.clone())
            };

            self.mutation.mutate(&mut child1, rng);
            self.mutation.mutate(&mut child2, rng);

            children.push(child1);
            if children.len() < size {
                children.push(child2);
            }
        }

        Ok(children)
    }

    fn evaluate(&self, population: &mut Population) -> Result<usize, ObjectiveError> {
        if self.config.parallel_evaluation {
            population.evaluate_parallel(&self.objective)
        } else {
            population.evaluate(&self.objective)
        }
    }

    fn report<K>(&self, statistics: &RunStatistics, sink: &mut K, last: &mut Option<usize>)
    where
        K: StatisticsSink + ?Sized,
    {
        let generation = statistics.generation;
        if generation % self.config.statistics_interval == 0
            || generation == self.config.n_generations
        {
            sink.record(statistics);
            *last = Some(generation);
        }
    }

    fn early_stop(&self, statistics: &RunStatistics, history: &[f64]) -> Option<&'static str> {
        let criterion = self.termination.as_ref()?;
        let state = EvolutionState {
            generation: statistics.generation,
            evaluations: statistics.evaluations,
            best_score: statistics.best_score,
            best_score_history: history,
        };
        criterion.triggered_reason(&state)
    }
}

/// Replace the worst child with the best parent when the parent scores higher
fn carry_elite(parents: &Population, children: &mut Population) {
    let (Some(best), Some(worst)) = (parents.best(), children.worst_index()) else {
        return;
    };
    let (Some(best_score), Some(worst_score)) = (best.score(), children[worst].score()) else {
        return;
    };
    if best_score > worst_score {
        if let Some(slot) = children.get_mut(worst) {
            *slot = best.clone();
        }
    }
}

impl<O, S, C> std::fmt::Debug for SimpleGA<O, S, C>
where
    S: std::fmt::Debug,
    C: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimpleGA")
            .field("config", &self.config)
            .field("map", &self.map)
            .field("selection", &self.selection)
            .field("crossover", &self.crossover)
            .field("mutation", &self.mutation)
            .field("early_stopping", &self.termination.is_some())
            .finish()
    }
}
