use std::ops::Mul;

use serde::{Deserialize, Serialize};

/// A continuous 2D vector used for lander position, velocity and forces.
///
/// All components are `f32` so that the rounding behavior of the physics
/// stepper matches the reference environment exactly.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Serialize,
    Deserialize,
    derive_more::Add,
    derive_more::Sub,
)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing at `radians` measured counter-clockwise from +x.
    #[must_use]
    pub fn from_angle(radians: f32) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self::new(cos, sin)
    }

    /// Rounds both components half away from zero.
    #[expect(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn round(self) -> GridPoint {
        GridPoint::new(self.x.round() as i32, self.y.round() as i32)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

/// An integer point on the world grid.
///
/// Terrain vertices and recorded lander paths both use this type.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Add,
    derive_more::Sub,
)]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

impl GridPoint {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }

    /// Squared euclidean distance, computed in `i64` so map-sized values never overflow.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> i64 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dy = i64::from(self.y) - i64::from(other.y);
        dx * dx + dy * dy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_arithmetic() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(0.5, -1.0);
        assert_eq!(a + b, Vec2::new(1.5, 1.0));
        assert_eq!(a - b, Vec2::new(0.5, 3.0));
        assert_eq!(a * 0.5, Vec2::new(0.5, 1.0));
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(Vec2::new(2.5, -2.5).round(), GridPoint::new(3, -3));
        assert_eq!(Vec2::new(2.49, -0.4).round(), GridPoint::new(2, 0));
    }

    #[test]
    fn test_distance_squared_does_not_overflow() {
        let a = GridPoint::new(0, 0);
        let b = GridPoint::new(i32::MAX, i32::MAX);
        let d = i64::from(i32::MAX) * i64::from(i32::MAX) * 2;
        assert_eq!(a.distance_squared(b), d);
    }
}
