//! Lander dynamics, landing rules and episode input.
//!
//! - [`LanderState`] - Position, velocity, fuel and actuator state of the lander
//! - [`Command`] - An absolute (rotation, thrust power) request for one turn
//! - [`ActuatorPolicy`] - How requested commands are clamped before being applied
//! - [`Telemetry`] - The integer state reported by the environment each turn
//! - [`Episode`] - Terrain plus initial lander state, fixed for one search
//!
//! # Turn Flow
//!
//! 1. The requested rotation is limited to ±15° of the current rotation
//! 2. The requested power is limited to ±1 of the current power
//! 3. Thrust (along the lander's axis) and gravity are integrated over one second
//! 4. Fuel is reduced by the power actually applied
//!
//! The flight ends when the straight motion between two consecutive rounded
//! positions touches the ground (see [`Terrain::crosses`](crate::Terrain::crosses)).
//!
//! # Example
//!
//! ```
//! use lander_engine::{ActuatorPolicy, Command, LanderState, Vec2};
//!
//! let state = LanderState::new(Vec2::new(2500.0, 2700.0), Vec2::ZERO, 550, 0, 0);
//! let next = state.step(Command::new(-45, 4), ActuatorPolicy::default());
//!
//! assert_eq!(next.rotate, -15);
//! assert_eq!(next.power, 1);
//! assert_eq!(next.fuel, 549);
//! ```

pub use self::{episode::*, lander::*, landing::*};

mod episode;
mod lander;
mod landing;
