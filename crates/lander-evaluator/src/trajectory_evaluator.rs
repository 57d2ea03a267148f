//! Trajectory evaluation: flying a chromosome and scoring where it ends.
//!
//! # How It Works
//!
//! 1. **Start** - Copy the episode's initial lander state
//! 2. **Fly** - For each gene, derive the absolute command and step the physics
//! 3. **Detect End** - After each step, test the motion between the previous and the
//!    new rounded position against the terrain; leaving the world also ends the flight
//! 4. **Score** - Hand the terminal state (and the state before it) to a
//!    [`FitnessFunction`]
//!
//! Each evaluation owns its lander state and only reads the shared episode, so many
//! evaluations can run concurrently against the same [`TrajectoryEvaluator`].
//!
//! # Optional Trajectory Recording
//!
//! [`TrajectoryEvaluator::evaluate`] only computes the score. Use
//! [`TrajectoryEvaluator::evaluate_with_trajectory`] to also record the visited
//! positions and the commands sent, e.g. for display or for the per-turn output.

use serde::{Deserialize, Serialize};

use lander_engine::{ActuatorPolicy, Command, Episode, GridPoint, LanderState};

use crate::{
    chromosome::Chromosome,
    fitness::{FitnessFunction, Score},
};

/// How a simulated flight ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
#[serde(rename_all = "kebab-case")]
pub enum FlightOutcome {
    /// Touched the landing zone within all landing limits.
    Landed,
    /// Touched the ground anywhere else, or too fast, or tilted.
    Crashed,
    /// Left the world rectangle.
    OutOfBounds,
    /// Still flying when the horizon was exhausted.
    Airborne,
}

/// Summary of a simulated flight, enough to compute any fitness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    pub outcome: FlightOutcome,
    /// State after the last simulated turn.
    pub last: LanderState,
    /// State one turn before `last` (equal to `last` if no turn was simulated).
    pub prior: LanderState,
    /// Number of turns actually simulated.
    pub turns: usize,
}

/// Positions visited and commands sent during a flight.
///
/// `path[0]` is the starting position; `path` always holds `horizon + 1` entries,
/// padded with the terminal position when the flight ends early. `commands` holds
/// one entry per simulated turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trajectory {
    pub path: Vec<GridPoint>,
    pub commands: Vec<Command>,
}

/// Result of evaluating one chromosome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Fitness score, lower is better and never negative.
    pub score: Score,
    pub flight: Flight,
}

/// Flies chromosomes through an episode and scores them.
#[derive(Debug)]
pub struct TrajectoryEvaluator {
    episode: Episode,
    policy: ActuatorPolicy,
    fitness: Box<dyn FitnessFunction>,
}

impl TrajectoryEvaluator {
    #[must_use]
    pub fn new(
        episode: Episode,
        policy: ActuatorPolicy,
        fitness: Box<dyn FitnessFunction>,
    ) -> Self {
        Self {
            episode,
            policy,
            fitness,
        }
    }

    #[must_use]
    pub fn episode(&self) -> &Episode {
        &self.episode
    }

    #[must_use]
    pub fn policy(&self) -> ActuatorPolicy {
        self.policy
    }

    /// Replaces the episode's starting state, keeping terrain, policy and fitness.
    pub fn reseed(&mut self, initial_state: LanderState) {
        self.episode = self.episode.with_initial_state(initial_state);
    }

    /// Scores a chromosome without recording its trajectory.
    #[must_use]
    pub fn evaluate(&self, chromosome: &Chromosome) -> Evaluation {
        let flight = self.fly(chromosome, None);
        self.score(flight)
    }

    /// Scores a chromosome and records the positions and commands of its flight.
    #[must_use]
    pub fn evaluate_with_trajectory(&self, chromosome: &Chromosome) -> (Evaluation, Trajectory) {
        let mut trajectory = Trajectory {
            path: Vec::with_capacity(chromosome.len() + 1),
            commands: Vec::with_capacity(chromosome.len()),
        };
        let flight = self.fly(chromosome, Some(&mut trajectory));
        (self.score(flight), trajectory)
    }

    /// The absolute command for the upcoming turn, derived from the first gene.
    #[must_use]
    pub fn first_command(&self, chromosome: &Chromosome) -> Option<Command> {
        chromosome
            .commands(self.episode.initial_state().command())
            .next()
    }

    fn score(&self, flight: Flight) -> Evaluation {
        let score = self.fitness.score(&self.episode, &flight).max(0);
        Evaluation { score, flight }
    }

    fn fly(&self, chromosome: &Chromosome, mut trajectory: Option<&mut Trajectory>) -> Flight {
        let terrain = self.episode.terrain();
        let mut state = *self.episode.initial_state();
        let mut prior = state;
        let mut position = state.grid_position();
        if let Some(t) = trajectory.as_deref_mut() {
            t.path.push(position);
        }

        for (turn, gene) in chromosome.genes().iter().enumerate() {
            let command = gene.apply(state.command());
            let next = state.step(command, self.policy);
            let next_position = next.grid_position();
            if let Some(t) = trajectory.as_deref_mut() {
                t.path.push(next_position);
                t.commands.push(command);
            }
            prior = state;
            state = next;

            let outcome = if terrain.crosses(position, next_position) {
                if terrain.is_valid_landing(&state, &prior) {
                    Some(FlightOutcome::Landed)
                } else {
                    Some(FlightOutcome::Crashed)
                }
            } else if terrain.contains(next_position) {
                None
            } else {
                Some(FlightOutcome::OutOfBounds)
            };
            position = next_position;

            if let Some(outcome) = outcome {
                if let Some(t) = trajectory {
                    t.path.resize(chromosome.len() + 1, position);
                }
                return Flight {
                    outcome,
                    last: state,
                    prior,
                    turns: turn + 1,
                };
            }
        }

        Flight {
            outcome: FlightOutcome::Airborne,
            last: state,
            prior,
            turns: chromosome.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use lander_engine::{GridPoint, Terrain, Vec2};

    use super::*;
    use crate::{chromosome::Gene, fitness::LandingFitness};

    /// Flat strip from x=1000 to x=2000 at height 500 with sloped sides.
    fn strip_terrain() -> Terrain {
        Terrain::new(vec![
            GridPoint::new(0, 1500),
            GridPoint::new(1000, 500),
            GridPoint::new(2000, 500),
            GridPoint::new(6999, 2000),
        ])
        .unwrap()
    }

    fn evaluator(initial: LanderState) -> TrajectoryEvaluator {
        TrajectoryEvaluator::new(
            Episode::new(strip_terrain(), initial),
            ActuatorPolicy::default(),
            Box::new(LandingFitness::default()),
        )
    }

    fn free_fall_start() -> LanderState {
        LanderState::new(Vec2::new(1500.0, 2700.0), Vec2::ZERO, 550, 0, 0)
    }

    #[test]
    fn test_free_fall_crashes_on_strip() {
        let evaluator = evaluator(free_fall_start());
        let chromosome = Chromosome::new(vec![Gene::default(); 100]);
        let (evaluation, trajectory) = evaluator.evaluate_with_trajectory(&chromosome);

        let flight = evaluation.flight;
        assert_eq!(flight.outcome, FlightOutcome::Crashed);
        assert!(flight.last.position.y <= 500.0);
        assert!(flight.prior.position.y > 500.0);
        assert!(flight.last.velocity.y < -40.0);
        assert!(!evaluator.episode().terrain().is_valid_landing(&flight.last, &flight.prior));

        // y(t) = 2700 - 3.711 t² / 2 reaches 500 after ~34.4 turns
        assert_eq!(flight.turns, 35);
        assert_eq!(trajectory.commands.len(), 35);
        assert_eq!(trajectory.path.len(), 101);
        assert_eq!(trajectory.path[0], GridPoint::new(1500, 2700));
        let terminal = flight.last.grid_position();
        assert!(trajectory.path[35..].iter().all(|p| *p == terminal));
        assert!(trajectory.path.iter().all(|p| p.x == 1500));
    }

    #[test]
    fn test_gentle_touchdown_is_landed() {
        let start = LanderState::new(Vec2::new(1500.0, 510.0), Vec2::new(0.0, -5.0), 100, 0, 0);
        let evaluator = evaluator(start);
        let chromosome = Chromosome::new(vec![Gene::default(); 10]);
        let evaluation = evaluator.evaluate(&chromosome);
        assert_eq!(evaluation.flight.outcome, FlightOutcome::Landed);
        assert_eq!(evaluation.score, 0);
    }

    #[test]
    fn test_touchdown_just_above_strip_is_landed() {
        // ends at y=500.44, which rounds onto the strip height
        let start = LanderState::new(Vec2::new(1500.0, 504.0), Vec2::new(0.0, -1.7), 100, 0, 0);
        let evaluation = evaluator(start).evaluate(&Chromosome::new(vec![Gene::default(); 10]));
        assert_eq!(evaluation.flight.turns, 1);
        assert!(evaluation.flight.last.position.y > 500.0);
        assert_eq!(evaluation.flight.outcome, FlightOutcome::Landed);
        assert_eq!(evaluation.score, 0);
    }

    #[test]
    fn test_horizon_exhausted_is_airborne() {
        let evaluator = evaluator(free_fall_start());
        let chromosome = Chromosome::new(vec![Gene::default(); 5]);
        let (evaluation, trajectory) = evaluator.evaluate_with_trajectory(&chromosome);
        assert_eq!(evaluation.flight.outcome, FlightOutcome::Airborne);
        assert_eq!(evaluation.flight.turns, 5);
        assert_eq!(trajectory.path.len(), 6);
        assert!(evaluation.score > 0);
    }

    #[test]
    fn test_leaving_the_world_is_out_of_bounds() {
        let start = LanderState::new(Vec2::new(6990.0, 2900.0), Vec2::new(50.0, 0.0), 100, 0, 0);
        let evaluation = evaluator(start).evaluate(&Chromosome::new(vec![Gene::default(); 10]));
        assert_eq!(evaluation.flight.outcome, FlightOutcome::OutOfBounds);
        assert_eq!(evaluation.flight.turns, 1);
    }

    #[test]
    fn test_large_rotate_delta_is_clamped() {
        let evaluator = evaluator(free_fall_start());
        let chromosome = Chromosome::new(vec![Gene::new(50, 0), Gene::new(50, 0)]);
        let (_, trajectory) = evaluator.evaluate_with_trajectory(&chromosome);
        assert_eq!(trajectory.commands[0].rotate, 15);
        assert_eq!(trajectory.commands[1].rotate, 30);
        assert_eq!(evaluator.first_command(&chromosome), Some(Command::new(15, 0)));
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let evaluator = evaluator(free_fall_start());
        let chromosome: Chromosome = (0..80)
            .map(|i| Gene::new((i % 7) - 3, (i % 3) - 1))
            .collect();
        let (a, path_a) = evaluator.evaluate_with_trajectory(&chromosome);
        let (b, path_b) = evaluator.evaluate_with_trajectory(&chromosome);
        assert_eq!(a, b);
        assert_eq!(path_a, path_b);
        assert_eq!(evaluator.evaluate(&chromosome), a);
    }

    #[test]
    fn test_reseed_keeps_terrain() {
        let mut evaluator = evaluator(free_fall_start());
        let mut state = free_fall_start();
        state.position.y = 600.0;
        evaluator.reseed(state);
        assert_eq!(evaluator.episode().initial_state().position.y, 600.0);
        assert_eq!(evaluator.episode().terrain().landing_zone().y, 500);
    }
}
