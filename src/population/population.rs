//! Population type
//!
//! This module provides the Population container type.

use std::sync::Arc;

use rand::Rng;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::ObjectiveError;
use crate::fitness::traits::Scorable;
use crate::genome::bin2dec::Bin2DecGenome;
use crate::genome::phenotype::PhenotypeMap;
use crate::scaling::mean_and_std;

/// An ordered population of genomes
#[derive(Clone, Debug, Default)]
pub struct Population {
    /// The genomes in this population
    genomes: Vec<Bin2DecGenome>,
    /// Current generation number
    generation: usize,
}

impl Population {
    /// Create an empty population
    pub fn new() -> Self {
        Self {
            genomes: Vec::new(),
            generation: 0,
        }
    }

    /// Create a population with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            genomes: Vec::with_capacity(capacity),
            generation: 0,
        }
    }

    /// Create a population from existing genomes
    pub fn from_genomes(genomes: Vec<Bin2DecGenome>) -> Self {
        Self {
            genomes,
            generation: 0,
        }
    }

    /// Create a population of uniformly random genomes
    pub fn random<R: Rng>(size: usize, map: &Arc<PhenotypeMap>, rng: &mut R) -> Self {
        let genomes = (0..size)
            .map(|_| Bin2DecGenome::random(Arc::clone(map), rng))
            .collect();
        Self {
            genomes,
            generation: 0,
        }
    }

    /// Get the current generation
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Set the generation number
    pub fn set_generation(&mut self, generation: usize) {
        self.generation = generation;
    }

    /// Get the population size
    pub fn len(&self) -> usize {
        self.genomes.len()
    }

    /// Check if the population is empty
    pub fn is_empty(&self) -> bool {
        self.genomes.is_empty()
    }

    /// Get a genome by index
    pub fn get(&self, index: usize) -> Option<&Bin2DecGenome> {
        self.genomes.get(index)
    }

    /// Get a mutable reference to a genome by index
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Bin2DecGenome> {
        self.genomes.get_mut(index)
    }

    /// Add a genome to the population
    pub fn push(&mut self, genome: Bin2DecGenome) {
        self.genomes.push(genome);
    }

    /// Keep only the first `len` genomes
    pub fn truncate(&mut self, len: usize) {
        self.genomes.truncate(len);
    }

    /// Get an iterator over the genomes
    pub fn iter(&self) -> impl Iterator<Item = &Bin2DecGenome> {
        self.genomes.iter()
    }

    /// Get the underlying genomes
    pub fn genomes(&self) -> &[Bin2DecGenome] {
        &self.genomes
    }

    /// Take the genomes out of this population
    pub fn into_genomes(self) -> Vec<Bin2DecGenome> {
        self.genomes
    }

    /// Check if all genomes have been evaluated
    pub fn all_evaluated(&self) -> bool {
        self.genomes.iter().all(|g| g.is_evaluated())
    }

    /// Count the number of evaluated genomes
    pub fn count_evaluated(&self) -> usize {
        self.genomes.iter().filter(|g| g.is_evaluated()).count()
    }

    /// Score every unevaluated genome (sequential)
    ///
    /// Returns the number of objective calls. The first objective failure is returned
    /// and the remaining genomes are left as they were.
    pub fn evaluate<O>(&mut self, objective: &O) -> Result<usize, ObjectiveError>
    where
        O: Scorable + ?Sized,
    {
        let mut calls = 0;
        for genome in self.genomes.iter_mut().filter(|g| !g.is_evaluated()) {
            genome.evaluate(objective)?;
            calls += 1;
        }
        Ok(calls)
    }

    /// Raw scores in population order
    ///
    /// An unevaluated genome reports `f64::NEG_INFINITY`.
    pub fn raw_scores(&self) -> Vec<f64> {
        self.genomes
            .iter()
            .map(|g| g.score().unwrap_or(f64::NEG_INFINITY))
            .collect()
    }

    /// Get the best evaluated genome (highest score, first on ties)
    pub fn best(&self) -> Option<&Bin2DecGenome> {
        self.best_index().map(|i| &self.genomes[i])
    }

    /// Index of the best evaluated genome (highest score, first on ties)
    pub fn best_index(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, score) in self.scored() {
            if best.map_or(true, |(_, b)| score > b) {
                best = Some((i, score));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Index of the worst evaluated genome (lowest score, first on ties)
    pub fn worst_index(&self) -> Option<usize> {
        let mut worst: Option<(usize, f64)> = None;
        for (i, score) in self.scored() {
            if worst.map_or(true, |(_, w)| score < w) {
                worst = Some((i, score));
            }
        }
        worst.map(|(i, _)| i)
    }

    /// Mean score of the evaluated genomes
    pub fn mean_score(&self) -> Option<f64> {
        let scores: Vec<f64> = self.scored().map(|(_, s)| s).collect();
        if scores.is_empty() {
            None
        } else {
            Some(mean_and_std(&scores).0)
        }
    }

    /// Sample standard deviation of the evaluated scores
    pub fn score_std(&self) -> Option<f64> {
        let scores: Vec<f64> = self.scored().map(|(_, s)| s).collect();
        if scores.len() < 2 {
            return None;
        }
        Some(mean_and_std(&scores).1)
    }

    /// Population diversity (mean pairwise Hamming distance)
    pub fn diversity(&self) -> f64 {
        if self.len() < 2 {
            return 0.0;
        }

        let mut total_distance = 0.0;
        let mut count = 0;

        for i in 0..self.len() {
            for j in (i + 1)..self.len() {
                total_distance += self.genomes[i].distance(&self.genomes[j]);
                count += 1;
            }
        }

        total_distance / count as f64
    }

    fn scored(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.genomes
            .iter()
            .enumerate()
            .filter_map(|(i, g)| g.score().map(|s| (i, s)))
    }
}

/// Parallel evaluation support (requires `parallel` feature)
#[cfg(feature = "parallel")]
impl Population {
    /// Score every unevaluated genome on the rayon pool
    ///
    /// Scoring draws no random numbers, so seeded runs stay reproducible.
    pub fn evaluate_parallel<O>(&mut self, objective: &O) -> Result<usize, ObjectiveError>
    where
        O: Scorable + ?Sized,
    {
        let pending = self.genomes.len() - self.count_evaluated();
        self.genomes
            .par_iter_mut()
            .filter(|g| !g.is_evaluated())
            .try_for_each(|genome| genome.evaluate(objective).map(|_| ()))?;
        Ok(pending)
    }
}

/// Sequential fallback for parallel evaluation (when `parallel` feature is disabled)
#[cfg(not(feature = "parallel"))]
impl Population {
    /// Score every unevaluated genome (sequential fallback)
    ///
    /// Note: This is a sequential implementation used when the `parallel` feature is disabled.
    pub fn evaluate_parallel<O>(&mut self, objective: &O) -> Result<usize, ObjectiveError>
    where
        O: Scorable + ?Sized,
    {
        self.evaluate(objective)
    }
}

impl std::ops::Index<usize> for Population {
    type Output = Bin2DecGenome;

    fn index(&self, index: usize) -> &Self::Output {
        &self.genomes[index]
    }
}

impl IntoIterator for Population {
    type Item = Bin2DecGenome;
    type IntoIter = std::vec::IntoIter<Bin2DecGenome>;

    fn into_iter(self) -> Self::IntoIter {
        self.genomes.into_iter()
    }
}

impl<'a> IntoIterator for &'a Population {
    type Item = &'a Bin2DecGenome;
    type IntoIter = std::slice::Iter<'a, Bin2DecGenome>;

    fn into_iter(self) -> Self::IntoIter {
        self.genomes.iter()
    }
}

impl FromIterator<Bin2DecGenome> for Population {
    fn from_iter<I: IntoIterator<Item = Bin2DecGenome>>(iter: I) -> Self {
        Self::from_genomes(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fitness::traits::FnObjective;
    use crate::genome::bit_string::BitString;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn line_map() -> Arc<PhenotypeMap> {
        Arc::new(PhenotypeMap::uniform(1, 8, 0.0, 255.0).unwrap())
    }

    fn identity() -> FnObjective<impl Fn(&[f64]) -> f64 + Send + Sync> {
        FnObjective::new(|x: &[f64]| x[0])
    }

    /// Five genomes decoding to 10, 20, 30, 40, 50, already scored
    fn create_test_population() -> Population {
        let map = line_map();
        let mut pop: Population = [10.0, 20.0, 30.0, 40.0, 50.0]
            .iter()
            .map(|&v| Bin2DecGenome::from_phenotype(map.clone(), &[v]).unwrap())
            .collect();
        pop.evaluate(&identity()).unwrap();
        pop
    }

    #[test]
    fn test_population_new() {
        let pop = Population::new();
        assert!(pop.is_empty());
        assert_eq!(pop.generation(), 0);
    }

    #[test]
    fn test_population_random() {
        let mut rng = StdRng::seed_from_u64(41);
        let pop = Population::random(10, &line_map(), &mut rng);

        assert_eq!(pop.len(), 10);
        assert!(pop.iter().all(|g| g.len() == 8));
        assert!(!pop.all_evaluated());
    }

    #[test]
    fn test_population_best_worst() {
        let pop = create_test_population();

        assert_eq!(pop.best().unwrap().score(), Some(50.0));
        assert_eq!(pop.best_index(), Some(4));
        assert_eq!(pop.worst_index(), Some(0));
    }

    #[test]
    fn test_best_ignores_unevaluated() {
        let mut pop = create_test_population();
        pop.push(Bin2DecGenome::from_phenotype(line_map(), &[255.0]).unwrap());

        assert_eq!(pop.best_index(), Some(4));
        assert_eq!(pop.raw_scores()[5], f64::NEG_INFINITY);
        assert_eq!(Population::new().best_index(), None);
    }

    #[test]
    fn test_population_mean_and_std() {
        let pop = create_test_population();
        assert_relative_eq!(pop.mean_score().unwrap(), 30.0);
        // Sample variance 1000 / 4 = 250
        assert_relative_eq!(pop.score_std().unwrap(), 250f64.sqrt());
    }

    #[test]
    fn test_population_evaluate_counts_calls() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut pop = Population::random(5, &line_map(), &mut rng);

        assert_eq!(pop.evaluate(&identity()).unwrap(), 5);
        assert!(pop.all_evaluated());
        assert_eq!(pop.evaluate(&identity()).unwrap(), 0);

        pop.get_mut(2).unwrap().flip(0);
        assert_eq!(pop.evaluate(&identity()).unwrap(), 1);
        assert_eq!(pop.count_evaluated(), 5);
    }

    #[test]
    fn test_population_evaluate_parallel() {
        let mut rng = StdRng::seed_from_u64(43);
        let mut pop = Population::random(100, &line_map(), &mut rng);
        let mut sequential = pop.clone();

        assert_eq!(pop.evaluate_parallel(&identity()).unwrap(), 100);
        sequential.evaluate(&identity()).unwrap();
        assert_eq!(pop.raw_scores(), sequential.raw_scores());
    }

    #[test]
    fn test_population_evaluate_propagates_error() {
        struct Failing;
        impl Scorable for Failing {
            fn score(&self, _: &[f64]) -> Result<f64, ObjectiveError> {
                Err(ObjectiveError::new("unavailable"))
            }
        }

        let mut rng = StdRng::seed_from_u64(44);
        let mut pop = Population::random(4, &line_map(), &mut rng);
        assert!(pop.evaluate(&Failing).is_err());
        assert!(pop.evaluate_parallel(&Failing).is_err());
        assert_eq!(pop.count_evaluated(), 0);
    }

    #[test]
    fn test_population_generation() {
        let mut pop = create_test_population();
        assert_eq!(pop.generation(), 0);

        pop.set_generation(100);
        assert_eq!(pop.generation(), 100);
    }

    #[test]
    fn test_population_push_truncate() {
        let mut pop = create_test_population();
        pop.truncate(2);
        assert_eq!(pop.len(), 2);
        assert_eq!(pop[1].score(), Some(20.0));

        pop.push(Bin2DecGenome::from_phenotype(line_map(), &[1.0]).unwrap());
        assert_eq!(pop.len(), 3);
    }

    #[test]
    fn test_population_diversity() {
        let map = line_map();
        let genome = |bits: [bool; 8]| Bin2DecGenome::from_bits(map.clone(), bits.into()).unwrap();
        let pop = Population::from_genomes(vec![
            genome([false; 8]),
            genome([true, false, false, false, false, false, false, false]),
            genome([true, true, true, false, false, false, false, false]),
        ]);

        // Pairwise distances 1, 3, 2
        assert_relative_eq!(pop.diversity(), 2.0);
        assert_eq!(Population::new().diversity(), 0.0);
    }

    #[test]
    fn test_identical_population_has_no_diversity() {
        let map = line_map();
        let pop: Population = (0..4)
            .map(|_| Bin2DecGenome::from_bits(map.clone(), BitString::ones(8)).unwrap())
            .collect();
        assert_eq!(pop.diversity(), 0.0);
    }

    #[test]
    fn test_population_into_iterator() {
        let pop = create_test_population();
        let genomes: Vec<_> = pop.into_iter().collect();

        assert_eq!(genomes.len(), 5);
    }
}
