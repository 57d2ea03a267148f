//! Fitness functions: turning a finished flight into a score.
//!
//! Scores are `i64` and **lower is better**; zero is the best possible value.
//! Only the terminal state matters, not what happened on the way.
//!
//! # Landing Fitness
//!
//! ```text
//! score = angle_penalty + speed_penalty + airborne_penalty + distance²
//!
//! where:
//!   angle_penalty    = angle_weight × |R| + angle_excess_weight × max(|R| − 15, 0)
//!   speed_penalty    = speed_excess_weight × Σ over {last, prior} of
//!                        max(|HS| − 20, 0) + max(|VS| − 40, 0)
//!   airborne_penalty = airborne_weight × max(height above ground, 0)   (horizon exhausted only)
//!   distance²        = squared distance from the terminal position to the zone center
//! ```
//!
//! A final angle beyond 15° can no longer be brought to zero in one turn, which is
//! why it gets the much larger `angle_excess_weight`. Speeds are checked on both the
//! terminal and the preceding state because the last step before touching the
//! ground can hide a violation.
//!
//! A valid landing scores zero for everything but fuel (see below): the lander is
//! already on the strip, so the distance term no longer applies.
//!
//! # Fuel-Aware Fitness
//!
//! Same as the landing fitness, plus `fuel_weight` per liter burned and
//! `negative_fuel_weight` per liter below zero.
//!
//! # Design Notes
//!
//! The weights are hand-picked. They were chosen so that a valid landing anywhere on
//! the strip always beats an invalid one, while far away from the strip the distance
//! term dominates and pulls the search towards the zone first.

use std::fmt;

use serde::{Deserialize, Serialize};

use lander_engine::{Episode, MAX_LANDING_H_SPEED, MAX_LANDING_V_SPEED, MAX_ROTATE_STEP};

use crate::trajectory_evaluator::{Flight, FlightOutcome};

/// Fitness score; lower is better, never negative.
pub type Score = i64;

/// Computes the score of a finished flight.
pub trait FitnessFunction: fmt::Debug + Send + Sync {
    /// Returns the raw score (lower is better). Callers clamp it to be non-negative.
    fn score(&self, episode: &Episode, flight: &Flight) -> Score;
}

/// Which fitness function to use.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, derive_more::FromStr,
)]
#[serde(rename_all = "lowercase")]
pub enum FitnessKind {
    #[default]
    Landing,
    FuelAware,
}

impl FitnessKind {
    #[must_use]
    pub fn build(self, weights: FitnessWeights) -> Box<dyn FitnessFunction> {
        match self {
            FitnessKind::Landing => Box::new(LandingFitness::new(weights)),
            FitnessKind::FuelAware => Box::new(FuelAwareFitness::new(weights)),
        }
    }
}

/// Weighting constants of the fitness terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessWeights {
    pub angle_weight: f64,
    pub angle_excess_weight: f64,
    pub speed_excess_weight: f64,
    pub airborne_weight: f64,
    pub distance_weight: f64,
    pub fuel_weight: f64,
    pub negative_fuel_weight: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            angle_weight: 10_000.0,
            angle_excess_weight: 1_000_000.0,
            speed_excess_weight: 100_000.0,
            airborne_weight: 1_000.0,
            distance_weight: 1.0,
            fuel_weight: 10.0,
            negative_fuel_weight: 1_000_000.0,
        }
    }
}

/// The canonical fitness: distance to the landing zone plus landing-rule violations.
#[derive(Debug, Default)]
pub struct LandingFitness {
    weights: FitnessWeights,
}

impl LandingFitness {
    #[must_use]
    pub const fn new(weights: FitnessWeights) -> Self {
        Self { weights }
    }

    fn terms(&self, episode: &Episode, flight: &Flight) -> f64 {
        let w = &self.weights;
        let last = &flight.last;
        let prior = &flight.prior;

        let rotate = f64::from(last.rotate.abs());
        let rotate_excess = f64::from((last.rotate.abs() - MAX_ROTATE_STEP).max(0));
        let angle = w.angle_weight * rotate + w.angle_excess_weight * rotate_excess;

        let speed_excess = |state: &lander_engine::LanderState| {
            let h = (state.velocity.x.abs() - MAX_LANDING_H_SPEED).max(0.0);
            let v = (state.velocity.y.abs() - MAX_LANDING_V_SPEED).max(0.0);
            f64::from(h + v)
        };
        let speed = w.speed_excess_weight * (speed_excess(last) + speed_excess(prior));

        if flight.outcome.is_landed() {
            return angle + speed;
        }

        let terrain = episode.terrain();
        let airborne = if flight.outcome.is_airborne() {
            let ground = terrain.ground_height(last.position.x);
            let height = (f64::from(last.position.y) - f64::from(ground)).max(0.0);
            w.airborne_weight * height
        } else {
            0.0
        };

        #[expect(clippy::cast_precision_loss)]
        let distance = w.distance_weight
            * last
                .grid_position()
                .distance_squared(terrain.landing_zone().center()) as f64;

        angle + speed + airborne + distance
    }
}

impl FitnessFunction for LandingFitness {
    #[expect(clippy::cast_possible_truncation)]
    fn score(&self, episode: &Episode, flight: &Flight) -> Score {
        self.terms(episode, flight).round() as Score
    }
}

/// [`LandingFitness`] plus a cost for every liter of fuel burned.
#[derive(Debug, Default)]
pub struct FuelAwareFitness {
    landing: LandingFitness,
}

impl FuelAwareFitness {
    #[must_use]
    pub const fn new(weights: FitnessWeights) -> Self {
        Self {
            landing: LandingFitness::new(weights),
        }
    }
}

impl FitnessFunction for FuelAwareFitness {
    #[expect(clippy::cast_possible_truncation)]
    fn score(&self, episode: &Episode, flight: &Flight) -> Score {
        let w = &self.landing.weights;
        let burned = f64::from(episode.initial_state().fuel - flight.last.fuel);
        let deficit = f64::from((-flight.last.fuel).max(0));
        let fuel = w.fuel_weight * burned.max(0.0) + w.negative_fuel_weight * deficit;
        (self.landing.terms(episode, flight) + fuel).round() as Score
    }
}

#[cfg(test)]
mod tests {
    use lander_engine::{GridPoint, LanderState, Terrain, Vec2};

    use super::*;

    fn episode(fuel: i32) -> Episode {
        let terrain = Terrain::new(vec![
            GridPoint::new(0, 1500),
            GridPoint::new(1000, 500),
            GridPoint::new(2000, 500),
            GridPoint::new(6999, 2000),
        ])
        .unwrap();
        let start = LanderState::new(Vec2::new(1500.0, 2700.0), Vec2::ZERO, fuel, 0, 0);
        Episode::new(terrain, start)
    }

    fn flight(outcome: FlightOutcome, last: LanderState) -> Flight {
        Flight {
            outcome,
            last,
            prior: last,
            turns: 1,
        }
    }

    fn state(x: f32, y: f32, vx: f32, vy: f32, rotate: i32) -> LanderState {
        LanderState::new(Vec2::new(x, y), Vec2::new(vx, vy), 500, rotate, 0)
    }

    #[test]
    fn test_distance_term() {
        let fitness = LandingFitness::default();
        let crash = flight(FlightOutcome::Crashed, state(1800.0, 500.0, 0.0, -10.0, 0));
        assert_eq!(fitness.score(&episode(500), &crash), 300 * 300);
    }

    #[test]
    fn test_landing_scores_zero() {
        let fitness = LandingFitness::default();
        let landed = flight(FlightOutcome::Landed, state(1900.0, 499.0, 3.0, -30.0, 0));
        assert_eq!(fitness.score(&episode(500), &landed), 0);
    }

    #[test]
    fn test_valid_landing_beats_near_miss() {
        let fitness = LandingFitness::default();
        let ep = episode(500);
        let edge_landing = flight(FlightOutcome::Landed, state(2000.0, 499.0, 0.0, -39.0, 0));
        let fast_center = flight(FlightOutcome::Crashed, state(1500.0, 499.0, 0.0, -41.0, 0));
        let tilted_center = flight(FlightOutcome::Crashed, state(1500.0, 499.0, 0.0, -10.0, 5));
        let landed = fitness.score(&ep, &edge_landing);
        assert!(landed < fitness.score(&ep, &fast_center));
        assert!(landed < fitness.score(&ep, &tilted_center));
    }

    #[test]
    fn test_speed_checked_on_prior_state() {
        let fitness = LandingFitness::default();
        let ep = episode(500);
        let mut f = flight(FlightOutcome::Crashed, state(1500.0, 499.0, 0.0, -39.0, 0));
        let clean = fitness.score(&ep, &f);
        f.prior = state(1500.0, 520.0, 25.0, -39.0, 0);
        assert_eq!(fitness.score(&ep, &f) - clean, 5 * 100_000);
    }

    #[test]
    fn test_unreachable_angle_is_heavily_penalized() {
        let fitness = LandingFitness::default();
        let ep = episode(500);
        let within = flight(FlightOutcome::Crashed, state(1500.0, 500.0, 0.0, 0.0, 15));
        let beyond = flight(FlightOutcome::Crashed, state(1500.0, 500.0, 0.0, 0.0, -16));
        let (within, beyond) = (fitness.score(&ep, &within), fitness.score(&ep, &beyond));
        assert_eq!(within, 15 * 10_000);
        assert_eq!(beyond, 16 * 10_000 + 1_000_000);
    }

    #[test]
    fn test_airborne_height_penalty() {
        let fitness = LandingFitness::default();
        let ep = episode(500);
        let hovering = flight(FlightOutcome::Airborne, state(1500.0, 600.0, 0.0, 0.0, 0));
        let crashed = flight(FlightOutcome::Crashed, state(1500.0, 600.0, 0.0, 0.0, 0));
        assert_eq!(
            fitness.score(&ep, &hovering) - fitness.score(&ep, &crashed),
            100 * 1_000
        );
    }

    #[test]
    fn test_fuel_aware_adds_fuel_cost() {
        let ep = episode(550);
        let landed = flight(FlightOutcome::Landed, state(1500.0, 499.0, 0.0, -10.0, 0));
        assert_eq!(FuelAwareFitness::default().score(&ep, &landed), 50 * 10);

        let mut dry = landed;
        dry.last.fuel = -2;
        assert_eq!(
            FuelAwareFitness::default().score(&ep, &dry),
            552 * 10 + 2 * 1_000_000
        );
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("landing".parse::<FitnessKind>().unwrap(), FitnessKind::Landing);
        assert_eq!("FuelAware".parse::<FitnessKind>().unwrap(), FitnessKind::FuelAware);
    }
}
