//! Search system for evolving landing control sequences with a genetic algorithm.
//!
//! This crate searches for a chromosome (a fixed-length list of per-turn rotation and
//! thrust changes) that brings the lander down on the landing zone. Chromosomes are
//! scored by the evaluator system and evolved generation by generation.
//!
//! # How the Search Works
//!
//! 1. **Population** - Draw random chromosomes from a seeded generator ([`seed`])
//! 2. **Evaluation** - Fly every chromosome in parallel and score where it ends
//! 3. **Weighing** - Turn scores into roulette weights, best chromosome first
//! 4. **Reproduction** - Keep the elite, breed the rest by crossover and mutation
//! 5. **Repeat** - Until the best chromosome lands or the caller's budget runs out
//!
//! # Architecture
//!
//! ```text
//! Evolution Driver (driver)
//!     ↓ owns
//! Population + Selection Wheel (genetic)
//!     ↓ bred with
//! Gene Operators (genes)
//!     ↓ scored by
//! Trajectory Evaluator (lander-evaluator)
//! ```
//!
//! # Example
//!
//! ```
//! use lander_engine::{ActuatorPolicy, Episode};
//! use lander_evaluator::{fitness::FitnessKind, trajectory_evaluator::TrajectoryEvaluator};
//! use lander_training::{driver::EvolutionDriver, genetic::EvolutionParams, seed::SearchSeed};
//!
//! let episode: Episode = "2 0 100 6999 100 3500 2000 0 0 550 0 0".parse().unwrap();
//! let evaluator = TrajectoryEvaluator::new(
//!     episode,
//!     ActuatorPolicy::default(),
//!     FitnessKind::Landing.build(Default::default()),
//! );
//! let params = EvolutionParams { population_size: 30, horizon: 60, ..Default::default() };
//! let mut driver = EvolutionDriver::new(evaluator, params, SearchSeed::random()).unwrap();
//!
//! for _ in 0..10 {
//!     let report = driver.run_generation().unwrap();
//!     if driver.is_solved() {
//!         break;
//!     }
//!     assert!(report.stats.min <= report.stats.max);
//! }
//! let command = driver.next_command().unwrap();
//! assert!((-15..=15).contains(&command.rotate));
//! ```
//!
//! # Determinism
//!
//! Every stochastic operator draws from one [`rand_pcg::Pcg32`] stream owned by the
//! driver. Evaluation draws nothing, so a given seed, episode and parameter set
//! reproduce the same search regardless of the number of worker threads.
//!
//! # Current Limitations
//!
//! - **No internal time limit**: The driver runs one generation per call; budgets are
//!   enforced by the caller between generations
//! - **Fixed horizon**: The horizon does not shrink as the lander approaches the ground,
//!   so late in an episode most genes are never flown

pub mod driver;
pub mod genes;
pub mod genetic;
pub mod seed;
pub mod stats;
