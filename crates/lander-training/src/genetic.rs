//! Genetic algorithm over landing control sequences.
//!
//! This module evolves populations of [`Chromosome`]s toward lower scores. The GA uses
//! roulette-wheel selection, blend crossover, random-reset mutation and a smoothness
//! repair step to create new generations.
//!
//! # Algorithm Overview
//!
//! 1. **Evaluate** - Every chromosome is flown by the [`TrajectoryEvaluator`] and
//!    scored; the population is then sorted best first
//! 2. **Weigh** - [`SelectionWheel`] turns scores into cumulative selection weights
//! 3. **Elite Selection** - The best chromosomes are copied unchanged
//! 4. **Roulette Selection** - Two distinct parents are drawn for every pair of children
//! 5. **Crossover** - [`genes::blend`] mixes the parents with one coefficient per pair
//! 6. **Mutation** - [`genes::mutate`] resets genes to fresh random values
//! 7. **Repair** - [`genes::smooth`] restores the per-turn limits between neighbours
//!
//! # Key Components
//!
//! - [`Individual`] - A chromosome and its latest evaluation
//! - [`Population`] - Fixed-size collection of individuals evaluated together
//! - [`SelectionWheel`] - Cumulative roulette weights of an evaluated population
//! - [`PopulationEvolver`] - Elitism and reproduction for one generation
//! - [`EvolutionParams`] - Validated population size, horizon and operator rates
//!
//! # Roulette Weights
//!
//! Scores are lower-is-better and unbounded, so they are inverted against the worst
//! score of the generation (`max - score`) and normalized to sum to 1. The wheel stores,
//! for each individual, the probability mass of itself and every better individual;
//! the best individual therefore holds 1.0 and the worst holds its own share. A single
//! uniform draw `r` selects the worst individual whose cumulative weight still exceeds
//! `r`, which picks every individual with probability equal to its share.
//!
//! When every score is equal there is nothing to invert; the wheel then falls back to
//! uniform weights.
//!
//! # Parallelization
//!
//! Evaluation is split into one chunk per available hardware thread and run inside
//! [`thread::scope`]. Evaluation is deterministic and draws no random numbers, so the
//! result does not depend on the number of workers.
//!
//! # Example
//!
//! ```
//! use lander_engine::{ActuatorPolicy, Episode};
//! use lander_evaluator::{fitness::FitnessKind, trajectory_evaluator::TrajectoryEvaluator};
//! use lander_training::genetic::{EvolutionParams, Population, PopulationEvolver, SelectionWheel};
//! use rand::SeedableRng as _;
//! use rand_pcg::Pcg32;
//!
//! let episode: Episode = "3 0 100 3000 100 6999 2000 2500 2700 0 0 550 0 0".parse().unwrap();
//! let evaluator = TrajectoryEvaluator::new(
//!     episode,
//!     ActuatorPolicy::default(),
//!     FitnessKind::Landing.build(Default::default()),
//! );
//!
//! let params = EvolutionParams { population_size: 20, horizon: 40, ..Default::default() };
//! let evolver = PopulationEvolver::new(&params).unwrap();
//! let mut rng = Pcg32::seed_from_u64(1);
//!
//! let mut population = Population::random(&mut rng, params.population_size, params.horizon);
//! for _ in 0..5 {
//!     population.evaluate_fitness(&evaluator);
//!     let wheel = SelectionWheel::new(&population);
//!     population = evolver.evolve(&population, &wheel, &mut rng).unwrap();
//! }
//! assert_eq!(population.len(), 20);
//! ```
//!
//! # Current Limitations
//!
//! - **No restart mechanism**: A population stuck in a local optimum keeps evolving
//!   there; the caller decides whether to start over with a fresh random population
//! - **Fixed operator rates**: Mutation chance and elitism do not adapt over time

use std::{num::NonZeroUsize, thread};

use rand::Rng;
use serde::{Deserialize, Serialize};

use lander_evaluator::{
    chromosome::Chromosome,
    fitness::Score,
    trajectory_evaluator::{Evaluation, TrajectoryEvaluator},
};

use crate::{genes, stats::ScoreStats};

/// Number of roulette draws for a second parent before falling back to a uniform pick
/// among the other individuals.
const MAX_PARENT_DRAWS: usize = 32;

/// Errors raised while configuring or running the genetic algorithm.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum EvolutionError {
    #[display("population must contain at least one chromosome")]
    EmptyPopulation,
    #[display("cannot select two distinct parents from a population of {size}")]
    NoDistinctParents { size: usize },
    #[display("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Tunables of the genetic algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvolutionParams {
    /// Number of chromosomes per generation (at least 2).
    pub population_size: usize,
    /// Genes per chromosome, i.e. simulated turns (at least 1).
    pub horizon: usize,
    /// Fraction of the population copied unchanged, in `[0, 1]`.
    pub elitism_factor: f64,
    /// Per-gene probability of replacing a child's gene by a random one, in `[0, 1]`.
    pub mutation_chance: f64,
}

impl Default for EvolutionParams {
    fn default() -> Self {
        Self {
            population_size: 100,
            horizon: 100,
            elitism_factor: 0.1,
            mutation_chance: 0.01,
        }
    }
}

impl EvolutionParams {
    /// Checks every parameter against its legal range.
    pub fn validate(&self) -> Result<(), EvolutionError> {
        match self.population_size {
            0 => return Err(EvolutionError::EmptyPopulation),
            1 => return Err(EvolutionError::NoDistinctParents { size: 1 }),
            _ => {}
        }
        if self.horizon == 0 {
            return Err(EvolutionError::InvalidParameter {
                name: "horizon",
                reason: "must be at least 1".to_owned(),
            });
        }
        check_probability("elitism_factor", self.elitism_factor)?;
        check_probability("mutation_chance", self.mutation_chance)?;
        Ok(())
    }

    /// Number of elite chromosomes, adjusted so the remaining slots can be filled in
    /// pairs.
    ///
    /// ```
    /// use lander_training::genetic::EvolutionParams;
    ///
    /// let params = EvolutionParams { population_size: 100, elitism_factor: 0.1, ..Default::default() };
    /// assert_eq!(params.elite_count(), 10);
    ///
    /// let params = EvolutionParams { population_size: 15, elitism_factor: 0.1, ..Default::default() };
    /// assert_eq!(params.elite_count(), 3);
    /// ```
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    #[must_use]
    pub fn elite_count(&self) -> usize {
        let n = self.population_size;
        let elite = ((self.elitism_factor * n as f64).round() as usize).min(n);
        if (n - elite) % 2 == 0 {
            elite
        } else if elite < n {
            elite + 1
        } else {
            elite - 1
        }
    }
}

fn check_probability(name: &'static str, value: f64) -> Result<(), EvolutionError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(EvolutionError::InvalidParameter {
            name,
            reason: format!("{value} is outside [0, 1]"),
        })
    }
}

/// A single candidate control sequence and its latest evaluation.
#[derive(Debug, Clone)]
pub struct Individual {
    chromosome: Chromosome,
    evaluation: Option<Evaluation>,
}

impl Individual {
    /// Creates an individual that has not been evaluated yet.
    #[must_use]
    pub fn new(chromosome: Chromosome) -> Self {
        Self {
            chromosome,
            evaluation: None,
        }
    }

    #[must_use]
    pub fn chromosome(&self) -> &Chromosome {
        &self.chromosome
    }

    /// The latest evaluation, or `None` if the chromosome changed since.
    #[must_use]
    pub fn evaluation(&self) -> Option<&Evaluation> {
        self.evaluation.as_ref()
    }

    /// The latest score; unevaluated individuals rank last.
    #[must_use]
    pub fn score(&self) -> Score {
        self.evaluation.map_or(Score::MAX, |e| e.score)
    }
}

/// A fixed-size population of individuals.
#[derive(Debug, Clone, Default)]
pub struct Population {
    individuals: Vec<Individual>,
}

impl Population {
    /// Creates a population of `size` random chromosomes of `horizon` genes.
    #[must_use]
    pub fn random<R>(rng: &mut R, size: usize, horizon: usize) -> Self
    where
        R: Rng + ?Sized,
    {
        (0..size)
            .map(|_| genes::random_chromosome(rng, horizon))
            .collect()
    }

    #[must_use]
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// The first individual; after [`Population::evaluate_fitness`] this is the best.
    #[must_use]
    pub fn best(&self) -> Option<&Individual> {
        self.individuals.first()
    }

    /// Whether every individual carries an evaluation.
    #[must_use]
    pub fn is_evaluated(&self) -> bool {
        self.individuals.iter().all(|ind| ind.evaluation.is_some())
    }

    /// Evaluates every individual in parallel, then sorts by score ascending (best first).
    ///
    /// The sort is stable, so equally scored individuals keep their relative order.
    pub fn evaluate_fitness(&mut self, evaluator: &TrajectoryEvaluator) {
        let workers = thread::available_parallelism().map_or(1, NonZeroUsize::get);
        let chunk_size = self.individuals.len().div_ceil(workers).max(1);
        thread::scope(|s| {
            for chunk in self.individuals.chunks_mut(chunk_size) {
                s.spawn(move || {
                    for ind in chunk {
                        ind.evaluation = Some(evaluator.evaluate(&ind.chromosome));
                    }
                });
            }
        });

        self.individuals.sort_by_key(Individual::score);
    }

    /// Descriptive statistics of the current scores.
    #[must_use]
    pub fn score_stats(&self) -> Option<ScoreStats> {
        ScoreStats::new(self.individuals.iter().map(Individual::score))
    }

    /// Shifts every chromosome one turn forward, appending a random gene to each.
    ///
    /// Evaluations are discarded because they no longer describe the chromosomes.
    pub fn shift_left<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        for ind in &mut self.individuals {
            ind.chromosome.shift_left(genes::random_gene(rng));
            ind.evaluation = None;
        }
    }
}

impl FromIterator<Chromosome> for Population {
    fn from_iter<I: IntoIterator<Item = Chromosome>>(iter: I) -> Self {
        Self {
            individuals: iter.into_iter().map(Individual::new).collect(),
        }
    }
}

/// Cumulative roulette weights of an evaluated, sorted population.
///
/// `weights()[i]` belongs to `population.individuals()[i]`. Weights never increase
/// along the population, the best individual holds exactly 1.0, and the difference
/// between neighbours is the selection probability of the worse one.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionWheel {
    cumulative: Vec<f64>,
}

impl SelectionWheel {
    /// Builds the wheel for a population sorted best first.
    ///
    /// # Panics
    ///
    /// Panics if the population is not sorted by ascending score.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new(population: &Population) -> Self {
        let scores = population
            .individuals
            .iter()
            .map(Individual::score)
            .collect::<Vec<_>>();
        assert!(scores.is_sorted(), "population must be sorted best first");

        let Some(&max) = scores.last() else {
            return Self { cumulative: vec![] };
        };
        let inverted = scores
            .iter()
            .map(|&s| max.abs_diff(s) as f64)
            .collect::<Vec<_>>();
        let total = inverted.iter().sum::<f64>();
        let shares = if total > 0.0 {
            inverted.iter().map(|w| w / total).collect::<Vec<_>>()
        } else {
            vec![1.0 / scores.len() as f64; scores.len()]
        };

        let mut cumulative = shares;
        let mut acc = 0.0;
        for w in cumulative.iter_mut().rev() {
            acc += *w;
            *w = acc;
        }
        cumulative[0] = 1.0;
        Self { cumulative }
    }

    /// The cumulative weight of each individual, aligned with the population.
    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.cumulative
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }

    /// Selects an index for the uniform draw `r` in `[0, 1)`.
    ///
    /// Returns the worst individual whose cumulative weight exceeds `r`.
    #[must_use]
    pub fn index_for(&self, r: f64) -> Option<usize> {
        self.cumulative.partition_point(|&w| w > r).checked_sub(1)
    }

    /// Spins the wheel once.
    pub fn select<R>(&self, rng: &mut R) -> Option<usize>
    where
        R: Rng + ?Sized,
    {
        self.index_for(rng.random::<f64>())
    }

    /// Selects two parents with different indices.
    ///
    /// The second parent is redrawn a bounded number of times; if every draw repeats
    /// the first parent, it is picked uniformly among the remaining individuals.
    pub fn select_pair<R>(&self, rng: &mut R) -> Result<(usize, usize), EvolutionError>
    where
        R: Rng + ?Sized,
    {
        let n = self.len();
        if n < 2 {
            return Err(EvolutionError::NoDistinctParents { size: n });
        }
        let first = self
            .select(rng)
            .ok_or(EvolutionError::NoDistinctParents { size: n })?;
        let redraw =
            (0..MAX_PARENT_DRAWS).find_map(|_| self.select(rng).filter(|&i| i != first));
        let second = match redraw {
            Some(i) => i,
            None => {
                let i = rng.random_range(0..n - 1);
                if i >= first { i + 1 } else { i }
            }
        };
        Ok((first, second))
    }
}

/// Produces the next generation from an evaluated population.
#[derive(Debug, Clone)]
pub struct PopulationEvolver {
    population_size: usize,
    elite_count: usize,
    mutation_chance: f64,
}

impl PopulationEvolver {
    /// Creates an evolver after validating `params`.
    pub fn new(params: &EvolutionParams) -> Result<Self, EvolutionError> {
        params.validate()?;
        Ok(Self {
            population_size: params.population_size,
            elite_count: params.elite_count(),
            mutation_chance: params.mutation_chance,
        })
    }

    #[must_use]
    pub fn elite_count(&self) -> usize {
        self.elite_count
    }

    /// Evolves the population to create the next generation.
    ///
    /// 1. Copies the top `elite_count` individuals unchanged, evaluation included
    /// 2. Fills the remaining slots in pairs: roulette selection of two distinct
    ///    parents, blend crossover, mutation and smoothing
    ///
    /// `population` must be evaluated and sorted, and `wheel` built from it.
    pub fn evolve<R>(
        &self,
        population: &Population,
        wheel: &SelectionWheel,
        rng: &mut R,
    ) -> Result<Population, EvolutionError>
    where
        R: Rng + ?Sized,
    {
        if population.is_empty() {
            return Err(EvolutionError::EmptyPopulation);
        }
        if population.len() != self.population_size || wheel.len() != population.len() {
            return Err(EvolutionError::InvalidParameter {
                name: "population_size",
                reason: format!(
                    "expected {} individuals, got {} with {} weights",
                    self.population_size,
                    population.len(),
                    wheel.len()
                ),
            });
        }

        let mut next = Vec::with_capacity(self.population_size);
        next.extend(population.individuals[..self.elite_count].iter().cloned());

        while next.len() < self.population_size {
            let (i1, i2) = wheel.select_pair(rng)?;
            let (mut c1, mut c2) = genes::blend(
                &population.individuals[i1].chromosome,
                &population.individuals[i2].chromosome,
                rng,
            );
            for child in [&mut c1, &mut c2] {
                genes::mutate(child, self.mutation_chance, rng);
                genes::smooth(child);
            }
            next.push(Individual::new(c1));
            next.push(Individual::new(c2));
        }

        Ok(Population { individuals: next })
    }
}
