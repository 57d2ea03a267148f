//! Evaluator system for scoring lander control sequences.
//!
//! This crate turns a candidate control sequence into a single score the genetic
//! algorithm can minimize:
//!
//! 1. **Representation** ([`chromosome`]) - A [`Chromosome`](chromosome::Chromosome) is a
//!    fixed-length list of [`Gene`](chromosome::Gene)s, each an incremental change to the
//!    commanded rotation and thrust power.
//!
//! 2. **Simulation** ([`trajectory_evaluator`]) - Flies a chromosome from the episode's
//!    initial state with the physics stepper until it touches the ground, leaves the
//!    world, or runs out of genes.
//!
//! 3. **Scoring** ([`fitness`]) - Converts the terminal state into a score; lower is
//!    better.
//!
//! # Architecture
//!
//! ```text
//! Fitness Function (score a finished flight)
//!     ↑ used by
//! Trajectory Evaluator (fly a chromosome)
//!     ↑ used by
//! Genetic Algorithm (lander-training)
//! ```
//!
//! # Example
//!
//! ```
//! use lander_engine::{ActuatorPolicy, Episode};
//! use lander_evaluator::{
//!     chromosome::{Chromosome, Gene},
//!     fitness::{FitnessKind, FitnessWeights},
//!     trajectory_evaluator::{FlightOutcome, TrajectoryEvaluator},
//! };
//!
//! let episode: Episode = "4\n0 1500\n1000 500\n2000 500\n6999 2000\n1500 2700 0 0 550 0 0"
//!     .parse()
//!     .unwrap();
//! let evaluator = TrajectoryEvaluator::new(
//!     episode,
//!     ActuatorPolicy::default(),
//!     FitnessKind::Landing.build(FitnessWeights::default()),
//! );
//!
//! // free fall straight down onto the strip
//! let chromosome = Chromosome::new(vec![Gene::default(); 60]);
//! let evaluation = evaluator.evaluate(&chromosome);
//! assert_eq!(evaluation.flight.outcome, FlightOutcome::Crashed);
//! ```
//!
//! # Current Limitations
//!
//! - **Terminal-only scoring**: The path taken is ignored, so two flights ending in the
//!   same state score the same regardless of how risky the approach was.
//! - **Hand-tuned weights**: See [`fitness`] for the formula and its constants.

pub mod chromosome;
pub mod fitness;
pub mod trajectory_evaluator;
