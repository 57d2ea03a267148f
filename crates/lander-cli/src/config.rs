use std::{path::PathBuf, time::Duration};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use lander_engine::{ActuatorPolicy, Episode, LandingZonePolicy};
use lander_evaluator::{
    fitness::{FitnessKind, FitnessWeights},
    trajectory_evaluator::TrajectoryEvaluator,
};
use lander_training::{genetic::EvolutionParams, seed::SearchSeed};

use crate::util;

/// Per-turn search budget of `play`, in milliseconds.
pub const PLAY_TIME_BUDGET_MS: u64 = 90;
/// Total search budget of `solve`, in milliseconds.
pub const SOLVE_TIME_BUDGET_MS: u64 = 10_000;

/// Search configuration shared by every command.
///
/// Loaded from JSON; every field is optional and falls back to its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    pub horizon: usize,
    pub population_size: usize,
    pub elitism_factor: f64,
    pub mutation_chance: f64,
    pub max_generations: usize,
    /// Search budget in milliseconds; per turn for `play`, in total for `solve`.
    pub time_budget_ms: Option<u64>,
    pub seed: Option<SearchSeed>,
    /// Clamp commands to the absolute actuator ranges in the physics stepper.
    pub clamp_absolute: bool,
    pub landing_zone: LandingZonePolicy,
    pub fitness: FitnessKind,
    pub fitness_weights: FitnessWeights,
}

impl Default for SolverConfig {
    fn default() -> Self {
        let params = EvolutionParams::default();
        Self {
            horizon: params.horizon,
            population_size: params.population_size,
            elitism_factor: params.elitism_factor,
            mutation_chance: params.mutation_chance,
            max_generations: 2000,
            time_budget_ms: None,
            seed: None,
            clamp_absolute: false,
            landing_zone: LandingZonePolicy::default(),
            fitness: FitnessKind::default(),
            fitness_weights: FitnessWeights::default(),
        }
    }
}

impl SolverConfig {
    pub fn evolution_params(&self) -> EvolutionParams {
        EvolutionParams {
            population_size: self.population_size,
            horizon: self.horizon,
            elitism_factor: self.elitism_factor,
            mutation_chance: self.mutation_chance,
        }
    }

    pub fn actuator_policy(&self) -> ActuatorPolicy {
        ActuatorPolicy {
            clamp_absolute: self.clamp_absolute,
        }
    }

    pub fn evaluator(&self, episode: Episode) -> TrajectoryEvaluator {
        TrajectoryEvaluator::new(
            episode,
            self.actuator_policy(),
            self.fitness.build(self.fitness_weights),
        )
    }

    pub fn time_budget(&self, default_ms: u64) -> Duration {
        Duration::from_millis(self.time_budget_ms.unwrap_or(default_ms))
    }

    /// The configured seed, or a fresh random one.
    pub fn seed_or_random(&self) -> SearchSeed {
        self.seed.unwrap_or_else(SearchSeed::random)
    }
}

/// Command-line overrides of [`SolverConfig`].
///
/// Precedence, lowest first: built-in defaults, `--config` file, individual flags.
#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct SolverArg {
    /// Solver configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Genes per chromosome (simulated turns)
    #[arg(long)]
    horizon: Option<usize>,
    /// Chromosomes per generation
    #[arg(long)]
    population_size: Option<usize>,
    /// Fraction of the population carried over unchanged, in [0, 1]
    #[arg(long)]
    elitism_factor: Option<f64>,
    /// Per-gene mutation probability, in [0, 1]
    #[arg(long)]
    mutation_chance: Option<f64>,
    /// Maximum number of generations (per turn for `play`)
    #[arg(long)]
    max_generations: Option<usize>,
    /// Search budget in milliseconds
    #[arg(long)]
    time_budget_ms: Option<u64>,
    /// Random seed as 32 hex characters
    #[arg(long)]
    seed: Option<SearchSeed>,
    /// Clamp commands to the absolute actuator ranges
    #[arg(long)]
    clamp_absolute: bool,
    /// Fitness function (landing or fuelaware)
    #[arg(long)]
    fitness: Option<FitnessKind>,
}

impl SolverArg {
    pub(crate) fn load(&self) -> anyhow::Result<SolverConfig> {
        let mut config = match &self.config {
            Some(path) => util::read_json_file("solver config", path)?,
            None => SolverConfig::default(),
        };
        self.apply(&mut config);
        config
            .evolution_params()
            .validate()
            .context("Invalid solver configuration")?;
        Ok(config)
    }

    fn apply(&self, config: &mut SolverConfig) {
        let Self {
            config: _,
            horizon,
            population_size,
            elitism_factor,
            mutation_chance,
            max_generations,
            time_budget_ms,
            seed,
            clamp_absolute,
            fitness,
        } = self;
        if let Some(v) = horizon {
            config.horizon = *v;
        }
        if let Some(v) = population_size {
            config.population_size = *v;
        }
        if let Some(v) = elitism_factor {
            config.elitism_factor = *v;
        }
        if let Some(v) = mutation_chance {
            config.mutation_chance = *v;
        }
        if let Some(v) = max_generations {
            config.max_generations = *v;
        }
        if let Some(v) = time_budget_ms {
            config.time_budget_ms = Some(*v);
        }
        if let Some(v) = seed {
            config.seed = Some(*v);
        }
        if *clamp_absolute {
            config.clamp_absolute = true;
        }
        if let Some(v) = fitness {
            config.fitness = *v;
        }
    }
}
