use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use lander_engine::{ActuatorPolicy, Command, Episode, GridPoint, LanderState, LandingZonePolicy};
use lander_evaluator::{
    chromosome::Chromosome,
    fitness::{FitnessKind, FitnessWeights, Score},
    trajectory_evaluator::{Evaluation, FlightOutcome, Trajectory, TrajectoryEvaluator},
};
use lander_training::seed::SearchSeed;

/// A landing plan found by `lander solve`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Solution {
    pub solved_at: DateTime<Utc>,
    pub seed: SearchSeed,
    pub generations: usize,
    pub fitness: FitnessKind,
    pub fitness_weights: FitnessWeights,
    pub landing_zone: LandingZonePolicy,
    pub policy: ActuatorPolicy,
    pub score: Score,
    pub outcome: FlightOutcome,
    pub initial_state: LanderState,
    pub terminal_state: LanderState,
    /// Absolute commands, one per flown turn.
    pub commands: Vec<Command>,
    /// Rounded positions, starting with the initial position.
    pub path: Vec<GridPoint>,
}

pub struct SolutionContext {
    pub seed: SearchSeed,
    pub generations: usize,
    pub fitness: FitnessKind,
    pub fitness_weights: FitnessWeights,
    pub landing_zone: LandingZonePolicy,
    pub policy: ActuatorPolicy,
    pub initial_state: LanderState,
}

impl Solution {
    /// Builds the document from the best evaluation, dropping the path padding after
    /// the flight ended.
    pub fn new(context: SolutionContext, evaluation: &Evaluation, trajectory: Trajectory) -> Self {
        let SolutionContext {
            seed,
            generations,
            fitness,
            fitness_weights,
            landing_zone,
            policy,
            initial_state,
        } = context;
        let Trajectory {
            mut path,
            mut commands,
        } = trajectory;
        let turns = evaluation.flight.turns;
        path.truncate(turns + 1);
        commands.truncate(turns);
        Self {
            solved_at: Utc::now(),
            seed,
            generations,
            fitness,
            fitness_weights,
            landing_zone,
            policy,
            score: evaluation.score,
            outcome: evaluation.flight.outcome,
            initial_state,
            terminal_state: evaluation.flight.last,
            commands,
            path,
        }
    }

    /// The chromosome that flies exactly the stored commands.
    pub fn to_chromosome(&self) -> Chromosome {
        Chromosome::from_commands(self.initial_state.command(), &self.commands)
    }

    /// An evaluator configured exactly as the search that produced this solution.
    pub fn evaluator(&self, episode: Episode) -> TrajectoryEvaluator {
        TrajectoryEvaluator::new(
            episode,
            self.policy,
            self.fitness.build(self.fitness_weights),
        )
    }
}
