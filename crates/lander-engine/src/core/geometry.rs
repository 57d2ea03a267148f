use serde::{Deserialize, Serialize};

use super::vec2::GridPoint;

/// A closed line segment between two grid points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub start: GridPoint,
    pub end: GridPoint,
}

impl Segment {
    #[must_use]
    pub const fn new(start: GridPoint, end: GridPoint) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn reversed(self) -> Self {
        Self::new(self.end, self.start)
    }

    /// Returns `true` if the two closed segments share at least one point.
    ///
    /// Uses orientation tests in exact integer arithmetic. Touching endpoints and
    /// collinear overlaps count as intersections: a point lies on a segment if it is
    /// collinear with it and inside its bounding box.
    ///
    /// # Example
    ///
    /// ```
    /// use lander_engine::{GridPoint, Segment};
    ///
    /// let ground = Segment::new(GridPoint::new(0, 100), GridPoint::new(1000, 100));
    /// let fall = Segment::new(GridPoint::new(500, 150), GridPoint::new(500, 90));
    /// assert!(fall.intersects(ground));
    /// assert!(ground.intersects(fall));
    /// ```
    #[must_use]
    pub fn intersects(self, other: Self) -> bool {
        let d1 = orientation(other.start, other.end, self.start);
        let d2 = orientation(other.start, other.end, self.end);
        let d3 = orientation(self.start, self.end, other.start);
        let d4 = orientation(self.start, self.end, other.end);

        if d1 * d2 < 0 && d3 * d4 < 0 {
            return true;
        }

        (d1 == 0 && other.bounding_box_contains(self.start))
            || (d2 == 0 && other.bounding_box_contains(self.end))
            || (d3 == 0 && self.bounding_box_contains(other.start))
            || (d4 == 0 && self.bounding_box_contains(other.end))
    }

    fn bounding_box_contains(self, p: GridPoint) -> bool {
        let (x_min, x_max) = min_max(self.start.x, self.end.x);
        let (y_min, y_max) = min_max(self.start.y, self.end.y);
        (x_min..=x_max).contains(&p.x) && (y_min..=y_max).contains(&p.y)
    }
}

/// Sign of the cross product `(b - a) × (c - a)`: `1` counter-clockwise, `-1` clockwise, `0` collinear.
fn orientation(a: GridPoint, b: GridPoint, c: GridPoint) -> i64 {
    let abx = i64::from(b.x) - i64::from(a.x);
    let aby = i64::from(b.y) - i64::from(a.y);
    let acx = i64::from(c.x) - i64::from(a.x);
    let acy = i64::from(c.y) - i64::from(a.y);
    (abx * acy - aby * acx).signum()
}

fn min_max(a: i32, b: i32) -> (i32, i32) {
    if a <= b { (a, b) } else { (b, a) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(x0: i32, y0: i32, x1: i32, y1: i32) -> Segment {
        Segment::new(GridPoint::new(x0, y0), GridPoint::new(x1, y1))
    }

    fn assert_symmetric(a: Segment, b: Segment, expected: bool) {
        for (s, t) in [
            (a, b),
            (b, a),
            (a.reversed(), b),
            (a, b.reversed()),
            (a.reversed(), b.reversed()),
        ] {
            assert_eq!(s.intersects(t), expected, "{s:?} vs {t:?}");
        }
    }

    #[test]
    fn test_crossing() {
        assert_symmetric(seg(2, 5, 2, -2), seg(0, 0, 3, 3), true);
    }

    #[test]
    fn test_disjoint_not_parallel() {
        assert_symmetric(seg(-1, -3, -5, -4), seg(1, 1, 5, 1), false);
    }

    #[test]
    fn test_parallel_disjoint() {
        assert_symmetric(seg(1, 3, 6, 3), seg(1, 1, 5, 1), false);
    }

    #[test]
    fn test_collinear_disjoint() {
        assert_symmetric(seg(6, 1, 7, 1), seg(1, 1, 5, 1), false);
    }

    #[test]
    fn test_touching_endpoint() {
        assert_symmetric(seg(1, 5, 2, 2), seg(0, 0, 3, 3), true);
        assert_symmetric(seg(-3, 1, 1, 1), seg(1, 1, 3, 1), true);
    }

    #[test]
    fn test_collinear_overlap() {
        assert_symmetric(seg(-2, 1, 2, 1), seg(1, 1, 3, 1), true);
        assert_symmetric(seg(-2, 1, 5, 1), seg(1, 1, 3, 1), true);
    }

    #[test]
    fn test_degenerate_point_segment() {
        assert_symmetric(seg(2, 2, 2, 2), seg(0, 0, 3, 3), true);
        assert_symmetric(seg(2, 3, 2, 3), seg(0, 0, 3, 3), false);
    }

    #[test]
    fn test_large_coordinates() {
        assert_symmetric(seg(0, 0, 7000, 3000), seg(0, 3000, 7000, 0), true);
    }
}
