use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use crate::core::{GridPoint, Vec2};

/// Gravity on Mars, in m/s².
pub const GRAVITY: Vec2 = Vec2::new(0.0, -3.711);

/// Largest rotation change the lander can perform in one turn, in degrees.
pub const MAX_ROTATE_STEP: i32 = 15;
/// Largest thrust power change the lander can perform in one turn.
pub const MAX_POWER_STEP: i32 = 1;
/// Absolute rotation range, in degrees.
pub const ROTATE_RANGE: (i32, i32) = (-90, 90);
/// Absolute thrust power range.
pub const POWER_RANGE: (i32, i32) = (0, 4);

/// An absolute actuator request for one turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Command {
    /// Rotation angle in degrees; positive tilts the lander to the left.
    pub rotate: i32,
    /// Thrust power.
    pub power: i32,
}

impl Command {
    #[must_use]
    pub const fn new(rotate: i32, power: i32) -> Self {
        Self { rotate, power }
    }
}

/// Controls how requested commands are clamped by [`LanderState::step`].
///
/// The per-turn rate limits are always applied. The absolute ranges
/// ([`ROTATE_RANGE`], [`POWER_RANGE`]) are only enforced when `clamp_absolute` is set,
/// since the reference environment does not clamp them on its side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActuatorPolicy {
    pub clamp_absolute: bool,
}

impl ActuatorPolicy {
    /// Policy that enforces both the rate limits and the absolute ranges.
    pub const STRICT: Self = Self {
        clamp_absolute: true,
    };

    #[must_use]
    pub fn clamp_rotate(self, requested: i32, current: i32) -> i32 {
        let rotate = requested.clamp(
            current.saturating_sub(MAX_ROTATE_STEP),
            current.saturating_add(MAX_ROTATE_STEP),
        );
        if self.clamp_absolute {
            rotate.clamp(ROTATE_RANGE.0, ROTATE_RANGE.1)
        } else {
            rotate
        }
    }

    #[must_use]
    pub fn clamp_power(self, requested: i32, current: i32) -> i32 {
        let power = requested.clamp(
            current.saturating_sub(MAX_POWER_STEP),
            current.saturating_add(MAX_POWER_STEP),
        );
        if self.clamp_absolute {
            power.clamp(POWER_RANGE.0, POWER_RANGE.1)
        } else {
            power
        }
    }

    #[must_use]
    pub fn clamp(self, requested: Command, current: Command) -> Command {
        Command::new(
            self.clamp_rotate(requested.rotate, current.rotate),
            self.clamp_power(requested.power, current.power),
        )
    }
}

/// Complete physical state of the lander at the start of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LanderState {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Remaining fuel in liters; decreases by the applied power every turn.
    pub fuel: i32,
    /// Current rotation in degrees.
    pub rotate: i32,
    /// Current thrust power.
    pub power: i32,
}

impl LanderState {
    #[must_use]
    pub const fn new(position: Vec2, velocity: Vec2, fuel: i32, rotate: i32, power: i32) -> Self {
        Self {
            position,
            velocity,
            fuel,
            rotate,
            power,
        }
    }

    /// The command currently held by the actuators.
    #[must_use]
    pub const fn command(&self) -> Command {
        Command::new(self.rotate, self.power)
    }

    #[must_use]
    pub fn grid_position(&self) -> GridPoint {
        self.position.round()
    }

    /// Advances the lander by one second.
    ///
    /// The requested command is clamped by `policy`, the thrust vector is derived
    /// from the clamped rotation, and position and velocity are integrated with
    /// constant acceleration over the turn:
    ///
    /// ```text
    /// a  = thrust + gravity
    /// p' = p + v + a/2
    /// v' = v + a
    /// ```
    #[must_use]
    pub fn step(&self, requested: Command, policy: ActuatorPolicy) -> Self {
        let Command { rotate, power } = policy.clamp(requested, self.command());

        #[expect(clippy::cast_precision_loss)]
        let (radians, magnitude) = (rotate as f32 * PI / 180.0, power as f32);
        let thrust = Vec2::from_angle(PI / 2.0 + radians) * magnitude;
        let acceleration = GRAVITY + thrust;

        Self {
            position: self.position + self.velocity + acceleration * 0.5,
            velocity: self.velocity + acceleration,
            fuel: self.fuel.saturating_sub(power),
            rotate,
            power,
        }
    }

    /// Rounds the state to the integer telemetry reported by the environment.
    #[must_use]
    pub fn telemetry(&self) -> Telemetry {
        let position = self.position.round();
        let velocity = self.velocity.round();
        Telemetry {
            x: position.x,
            y: position.y,
            h_speed: velocity.x,
            v_speed: velocity.y,
            fuel: self.fuel,
            rotate: self.rotate,
            power: self.power,
        }
    }
}

/// One line of lander telemetry as reported by the environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Telemetry {
    pub x: i32,
    pub y: i32,
    pub h_speed: i32,
    pub v_speed: i32,
    pub fuel: i32,
    pub rotate: i32,
    pub power: i32,
}

impl From<Telemetry> for LanderState {
    fn from(t: Telemetry) -> Self {
        LanderState::new(
            GridPoint::new(t.x, t.y).to_vec2(),
            GridPoint::new(t.h_speed, t.v_speed).to_vec2(),
            t.fuel,
            t.rotate,
            t.power,
        )
    }
}
