//! Generation loop and per-turn query surface.
//!
//! [`EvolutionDriver`] owns the population between generations, the random stream and
//! the evaluator. One call to [`EvolutionDriver::run_generation`] evaluates the current
//! population, builds its selection wheel and replaces it with the next generation.
//! The evaluated generation is kept so callers can query it (best trajectory, selection
//! weights, next command) until the next generation or turn replaces it.
//!
//! The driver never stops on its own: callers run as many generations as their time
//! budget allows and stop early once [`EvolutionDriver::is_solved`] reports a valid
//! landing.
//!
//! # Receding Horizon
//!
//! In a live episode the lander moves one turn at a time. After the chosen command has
//! been sent and the next telemetry observed, [`EvolutionDriver::advance_turn`] restarts
//! the episode from the observed state and shifts every chromosome one gene forward, so
//! the search continues from the previous turn's population instead of from scratch.

use std::mem;

use rand_pcg::Pcg32;
use tracing::{debug, info, trace};

use lander_engine::{Command, LanderState, Terrain};
use lander_evaluator::trajectory_evaluator::{Evaluation, Trajectory, TrajectoryEvaluator};

use crate::{
    genetic::{
        EvolutionError, EvolutionParams, Individual, Population, PopulationEvolver,
        SelectionWheel,
    },
    seed::SearchSeed,
    stats::ScoreStats,
};

/// Summary of one call to [`EvolutionDriver::run_generation`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationReport {
    /// One-based index of the generation that was evaluated.
    pub generation: usize,
    pub stats: ScoreStats,
    /// Evaluation of the best chromosome of the generation.
    pub best: Evaluation,
    pub elite_count: usize,
}

#[derive(Debug, Clone)]
struct EvaluatedGeneration {
    population: Population,
    wheel: SelectionWheel,
}

/// Runs the genetic algorithm for one episode.
#[derive(Debug)]
pub struct EvolutionDriver {
    evaluator: TrajectoryEvaluator,
    evolver: PopulationEvolver,
    params: EvolutionParams,
    seed: SearchSeed,
    rng: Pcg32,
    population: Population,
    evaluated: Option<EvaluatedGeneration>,
    generation: usize,
    turn: usize,
}

impl EvolutionDriver {
    /// Validates `params` and draws the initial random population from `seed`.
    pub fn new(
        evaluator: TrajectoryEvaluator,
        params: EvolutionParams,
        seed: SearchSeed,
    ) -> Result<Self, EvolutionError> {
        let evolver = PopulationEvolver::new(&params)?;
        let mut rng = seed.rng();
        let population = Population::random(&mut rng, params.population_size, params.horizon);
        Ok(Self {
            evaluator,
            evolver,
            params,
            seed,
            rng,
            population,
            evaluated: None,
            generation: 0,
            turn: 0,
        })
    }

    #[must_use]
    pub fn evaluator(&self) -> &TrajectoryEvaluator {
        &self.evaluator
    }

    #[must_use]
    pub fn params(&self) -> &EvolutionParams {
        &self.params
    }

    #[must_use]
    pub fn seed(&self) -> SearchSeed {
        self.seed
    }

    /// Number of generations run so far, across all turns.
    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Number of turns advanced so far.
    #[must_use]
    pub fn turn(&self) -> usize {
        self.turn
    }

    #[must_use]
    pub fn terrain(&self) -> &Terrain {
        self.evaluator.episode().terrain()
    }

    /// The population the next generation will evaluate.
    #[must_use]
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// The most recently evaluated population, sorted best first.
    #[must_use]
    pub fn evaluated_population(&self) -> Option<&Population> {
        self.evaluated.as_ref().map(|g| &g.population)
    }

    /// Evaluates the current population and replaces it with the next generation.
    ///
    /// On error the current population is kept, so the caller may retry or give up.
    pub fn run_generation(&mut self) -> Result<GenerationReport, EvolutionError> {
        let mut population = mem::take(&mut self.population);
        population.evaluate_fitness(&self.evaluator);
        let wheel = SelectionWheel::new(&population);

        let next = match self.evolver.evolve(&population, &wheel, &mut self.rng) {
            Ok(next) => next,
            Err(e) => {
                self.population = population;
                return Err(e);
            }
        };
        let (Some(stats), Some(best)) = (
            population.score_stats(),
            population.best().and_then(Individual::evaluation).copied(),
        ) else {
            return Err(EvolutionError::EmptyPopulation);
        };

        let was_solved = self.is_solved();
        self.generation += 1;
        self.population = next;
        self.evaluated = Some(EvaluatedGeneration { population, wheel });

        let elite_count = self.evolver.elite_count();
        debug!(
            generation = self.generation,
            best_score = stats.min,
            mean_score = stats.mean,
            elite_count,
            "generation evaluated"
        );
        if best.flight.outcome.is_landed() && !was_solved {
            info!(
                generation = self.generation,
                turn = self.turn,
                score = best.score,
                turns = best.flight.turns,
                "valid landing found"
            );
        }

        Ok(GenerationReport {
            generation: self.generation,
            stats,
            best,
            elite_count,
        })
    }

    /// The best individual of the last evaluated generation.
    #[must_use]
    pub fn best(&self) -> Option<&Individual> {
        self.evaluated.as_ref().and_then(|g| g.population.best())
    }

    /// Simulated path, commands and evaluation of the best chromosome.
    ///
    /// The terminal state is `evaluation.flight.last`.
    #[must_use]
    pub fn best_trajectory(&self) -> Option<(Evaluation, Trajectory)> {
        self.best()
            .map(|ind| self.evaluator.evaluate_with_trajectory(ind.chromosome()))
    }

    /// Cumulative selection weights of the last evaluated generation, aligned with
    /// [`EvolutionDriver::evaluated_population`]; empty before the first generation.
    #[must_use]
    pub fn normalized_weights(&self) -> &[f64] {
        self.evaluated
            .as_ref()
            .map(|g| g.wheel.weights())
            .unwrap_or_default()
    }

    /// Whether the best chromosome of the last generation lands validly.
    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.best()
            .and_then(Individual::evaluation)
            .is_some_and(|e| e.flight.outcome.is_landed())
    }

    /// The absolute command to send this turn, from the best chromosome's first gene.
    #[must_use]
    pub fn next_command(&self) -> Option<Command> {
        self.best()
            .and_then(|ind| self.evaluator.first_command(ind.chromosome()))
    }

    /// Moves the episode one turn forward to the `observed` lander state.
    ///
    /// Every chromosome drops its first gene and gains a random one at the end; the
    /// last evaluated generation is discarded since it describes the previous turn.
    pub fn advance_turn(&mut self, observed: LanderState) {
        self.evaluator.reseed(observed);
        self.population.shift_left(&mut self.rng);
        self.evaluated = None;
        self.turn += 1;
        trace!(
            turn = self.turn,
            x = observed.position.x,
            y = observed.position.y,
            fuel = observed.fuel,
            "advanced to next turn"
        );
    }
}

#[cfg(test)]
mod tests {
    use lander_engine::{ActuatorPolicy, Episode};
    use lander_evaluator::fitness::FitnessKind;

    use super::*;

    const SEED: &str = "5eed5eed5eed5eed5eed5eed5eed5eed";

    fn driver(input: &str, population_size: usize, horizon: usize) -> EvolutionDriver {
        let episode: Episode = input.parse().unwrap();
        let evaluator = TrajectoryEvaluator::new(
            episode,
            ActuatorPolicy::default(),
            FitnessKind::Landing.build(Default::default()),
        );
        let params = EvolutionParams {
            population_size,
            horizon,
            ..Default::default()
        };
        EvolutionDriver::new(evaluator, params, SEED.parse().unwrap()).unwrap()
    }

    const CAVE: &str = "
        7
        0 100
        1000 500
        1500 1500
        3000 1000
        4000 150
        5500 150
        6999 800
        2500 2700 0 0 550 0 0
    ";

    // flat ground, lander 30 m above it and descending
    const HOP: &str = "2 0 100 6999 100 3500 130 0 -30 550 0 0";

    #[test]
    fn test_rejects_invalid_params() {
        let episode: Episode = HOP.parse().unwrap();
        let evaluator = TrajectoryEvaluator::new(
            episode,
            ActuatorPolicy::default(),
            FitnessKind::Landing.build(Default::default()),
        );
        let params = EvolutionParams {
            population_size: 0,
            ..Default::default()
        };
        assert_eq!(
            EvolutionDriver::new(evaluator, params, SearchSeed::random()).unwrap_err(),
            EvolutionError::EmptyPopulation
        );
    }

    #[test]
    fn test_nothing_to_query_before_first_generation() {
        let driver = driver(CAVE, 10, 20);
        assert_eq!(driver.generation(), 0);
        assert!(driver.best().is_none());
        assert!(driver.best_trajectory().is_none());
        assert!(driver.next_command().is_none());
        assert!(driver.normalized_weights().is_empty());
        assert!(!driver.is_solved());
        assert_eq!(driver.population().len(), 10);
    }

    #[test]
    fn test_run_generation_exposes_evaluated_generation() {
        let mut driver = driver(CAVE, 20, 60);
        let report = driver.run_generation().unwrap();

        assert_eq!(report.generation, 1);
        assert_eq!(report.elite_count, 2);
        assert_eq!(report.stats.min, report.best.score);
        assert_eq!(driver.population().len(), 20);
        assert_eq!(driver.evaluated_population().unwrap().len(), 20);

        let weights = driver.normalized_weights();
        assert_eq!(weights.len(), 20);
        assert_eq!(weights[0], 1.0);

        let (evaluation, trajectory) = driver.best_trajectory().unwrap();
        assert_eq!(evaluation, report.best);
        assert_eq!(trajectory.path.len(), 61);
        assert_eq!(
            trajectory.commands.first().copied(),
            driver.next_command()
        );
    }

    #[test]
    fn test_best_score_never_worsens_within_a_turn() {
        let mut driver = driver(CAVE, 30, 80);
        let mut previous = i64::MAX;
        for _ in 0..15 {
            let report = driver.run_generation().unwrap();
            assert!(report.best.score <= previous);
            previous = report.best.score;
        }
    }

    #[test]
    fn test_same_seed_same_search() {
        let run = || {
            let mut driver = driver(CAVE, 20, 40);
            (0..5)
                .map(|_| driver.run_generation().unwrap().best.score)
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_solves_short_hop() {
        let mut driver = driver(HOP, 40, 10);
        for _ in 0..50 {
            driver.run_generation().unwrap();
            if driver.is_solved() {
                break;
            }
        }
        assert!(driver.is_solved());
        let (evaluation, _) = driver.best_trajectory().unwrap();
        assert!(evaluation.flight.outcome.is_landed());
        assert_eq!(evaluation.flight.last.rotate, 0);
    }

    #[test]
    fn test_advance_turn_continues_from_observed_state() {
        let mut driver = driver(CAVE, 20, 40);
        driver.run_generation().unwrap();
        let command = driver.next_command().unwrap();
        let before = *driver.evaluator().episode().initial_state();
        let observed = before.step(command, ActuatorPolicy::default());

        driver.advance_turn(observed);
        assert_eq!(driver.turn(), 1);
        assert_eq!(*driver.evaluator().episode().initial_state(), observed);
        assert!(driver.best().is_none());
        assert!(driver.normalized_weights().is_empty());
        assert!(driver.population().individuals().iter().all(|i| i.chromosome().len() == 40));

        let report = driver.run_generation().unwrap();
        assert_eq!(report.generation, 2);
        assert!(driver.next_command().is_some());
    }
}
