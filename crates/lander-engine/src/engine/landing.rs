use crate::core::{LandingZone, Terrain};

use super::lander::LanderState;

/// Largest horizontal speed allowed at touchdown, in m/s.
pub const MAX_LANDING_H_SPEED: f32 = 20.0;
/// Largest vertical speed allowed at touchdown, in m/s.
pub const MAX_LANDING_V_SPEED: f32 = 40.0;

/// Returns `true` if moving from `prior` to `last` is a valid touchdown on `zone`.
///
/// A landing is valid when the lander is upright, inside the zone horizontally,
/// within both speed limits, and crosses the zone height during this very turn.
///
/// The height crossing is tested on rounded positions, the same grid the terrain
/// collision test works on.
#[must_use]
pub fn is_valid_landing(zone: &LandingZone, last: &LanderState, prior: &LanderState) -> bool {
    last.rotate == 0
        && zone.contains_x(last.position.x)
        && last.velocity.x.abs() <= MAX_LANDING_H_SPEED
        && last.velocity.y.abs() <= MAX_LANDING_V_SPEED
        && prior.grid_position().y > zone.y
        && last.grid_position().y <= zone.y
}

impl Terrain {
    /// Shorthand for [`is_valid_landing`] against this terrain's landing zone.
    #[must_use]
    pub fn is_valid_landing(&self, last: &LanderState, prior: &LanderState) -> bool {
        is_valid_landing(&self.landing_zone(), last, prior)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Vec2;

    const ZONE: LandingZone = LandingZone {
        x0: 1000,
        x1: 2000,
        y: 500,
    };

    fn state(x: f32, y: f32, vx: f32, vy: f32, rotate: i32) -> LanderState {
        LanderState::new(Vec2::new(x, y), Vec2::new(vx, vy), 100, rotate, 3)
    }

    #[test]
    fn test_valid_landing() {
        let prior = state(1500.0, 520.0, 5.0, -30.0, 0);
        let last = state(1505.0, 490.0, 5.0, -35.0, 0);
        assert!(is_valid_landing(&ZONE, &last, &prior));
    }

    #[test]
    fn test_edges_of_zone_are_valid() {
        let prior = state(2000.0, 501.0, 0.0, -10.0, 0);
        let last = state(2000.0, 500.0, -20.0, -40.0, 0);
        assert!(is_valid_landing(&ZONE, &last, &prior));
    }

    #[test]
    fn test_invalid_landings() {
        let prior = state(1500.0, 520.0, 5.0, -30.0, 0);
        // tilted
        assert!(!is_valid_landing(&ZONE, &state(1500.0, 490.0, 0.0, -30.0, 5), &prior));
        // outside the zone
        assert!(!is_valid_landing(&ZONE, &state(2001.0, 490.0, 0.0, -30.0, 0), &prior));
        // too fast horizontally
        assert!(!is_valid_landing(&ZONE, &state(1500.0, 490.0, 20.5, -30.0, 0), &prior));
        // too fast vertically
        assert!(!is_valid_landing(&ZONE, &state(1500.0, 490.0, 0.0, -40.5, 0), &prior));
        // did not cross the zone height this turn
        let low_prior = state(1500.0, 495.0, 0.0, -5.0, 0);
        assert!(!is_valid_landing(&ZONE, &state(1500.0, 490.0, 0.0, -5.0, 0), &low_prior));
        assert!(!is_valid_landing(&ZONE, &state(1500.0, 510.0, 0.0, -5.0, 0), &prior));
    }

    #[test]
    fn test_crossing_uses_rounded_height() {
        // 500.44 is still above the zone as a float but lies on it once rounded
        let prior = state(1500.0, 504.0, 0.0, -1.7, 0);
        let last = state(1500.0, 500.44, 0.0, -5.4, 0);
        assert!(is_valid_landing(&ZONE, &last, &prior));
        // 500.6 rounds up to 501 and has not touched down yet
        let last = state(1500.0, 500.6, 0.0, -5.4, 0);
        assert!(!is_valid_landing(&ZONE, &last, &prior));
    }
}
