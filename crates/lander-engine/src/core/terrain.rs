//! Terrain model: the ground polyline, its landing zone and dense column heights.

use serde::{Deserialize, Serialize};

use crate::TerrainError;

use super::{geometry::Segment, vec2::GridPoint};

/// Widest supported world; the last terrain point must lie left of this column.
pub const MAX_WORLD_WIDTH: i32 = 7000;
/// Height of the playable world; positions at or above this are out of bounds.
pub const WORLD_HEIGHT: i32 = 3000;

/// Minimum width of the flat landing zone guaranteed by standard maps.
pub const MIN_LANDING_ZONE_WIDTH: i32 = 1000;

/// How the landing zone is derived from the terrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LandingZonePolicy {
    /// Longest run of equal values in the dense per-column height array.
    ColumnHeights,
    /// Longest maximal horizontal run of polyline points, at least `min_width` wide.
    FlatSegment { min_width: i32 },
}

impl Default for LandingZonePolicy {
    fn default() -> Self {
        Self::FlatSegment {
            min_width: MIN_LANDING_ZONE_WIDTH,
        }
    }
}

/// The flat strip `[x0, x1]` at height `y` where a landing is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandingZone {
    pub x0: i32,
    pub x1: i32,
    pub y: i32,
}

impl LandingZone {
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.x1 - self.x0
    }

    #[must_use]
    pub const fn center(&self) -> GridPoint {
        GridPoint::new(self.x0 + self.width() / 2, self.y)
    }

    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn contains_x(&self, x: f32) -> bool {
        (self.x0 as f32..=self.x1 as f32).contains(&x)
    }
}

/// The ground of one episode.
///
/// Built once from the raw polyline and read-only afterwards, so it can be shared
/// freely between evaluation threads.
///
/// # Example
///
/// ```
/// use lander_engine::{GridPoint, Terrain};
///
/// let terrain = Terrain::new(vec![
///     GridPoint::new(0, 1500),
///     GridPoint::new(1000, 500),
///     GridPoint::new(2000, 500),
///     GridPoint::new(6999, 2000),
/// ])
/// .unwrap();
///
/// let zone = terrain.landing_zone();
/// assert_eq!((zone.x0, zone.x1, zone.y), (1000, 2000, 500));
/// assert_eq!(terrain.width(), 7000);
/// ```
#[derive(Debug, Clone)]
pub struct Terrain {
    points: Vec<GridPoint>,
    heights: Vec<i32>,
    landing_zone: LandingZone,
}

impl Terrain {
    /// Builds a terrain using the default [`LandingZonePolicy`].
    pub fn new(points: Vec<GridPoint>) -> Result<Self, TerrainError> {
        Self::with_policy(points, LandingZonePolicy::default())
    }

    pub fn with_policy(
        points: Vec<GridPoint>,
        policy: LandingZonePolicy,
    ) -> Result<Self, TerrainError> {
        validate_points(&points)?;
        let heights = column_heights(&points);
        let landing_zone = match policy {
            LandingZonePolicy::ColumnHeights => zone_from_heights(&heights),
            LandingZonePolicy::FlatSegment { min_width } => zone_from_segments(&points, min_width),
        }
        .ok_or(TerrainError::NoLandingZone)?;
        Ok(Self {
            points,
            heights,
            landing_zone,
        })
    }

    #[must_use]
    pub fn points(&self) -> &[GridPoint] {
        &self.points
    }

    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.points.windows(2).map(|w| Segment::new(w[0], w[1]))
    }

    #[must_use]
    pub fn landing_zone(&self) -> LandingZone {
        self.landing_zone
    }

    /// Number of integer columns covered, `last.x + 1`.
    #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    #[must_use]
    pub fn width(&self) -> i32 {
        self.heights.len() as i32
    }

    /// Dense ground height for every integer column in `[0, width)`.
    #[must_use]
    pub fn heights(&self) -> &[i32] {
        &self.heights
    }

    /// Ground height below `x`, using the nearest column and clamping to the map edges.
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[must_use]
    pub fn ground_height(&self, x: f32) -> i32 {
        let last = self.heights.len() - 1;
        let column = if x <= 0.0 {
            0
        } else {
            (x.round() as usize).min(last)
        };
        self.heights[column]
    }

    /// Whether `position` lies inside the world rectangle.
    #[must_use]
    pub fn contains(&self, position: GridPoint) -> bool {
        (0..self.width()).contains(&position.x) && (0..WORLD_HEIGHT).contains(&position.y)
    }

    /// Whether the straight motion from `prev` to `curr` touches the ground polyline.
    ///
    /// This is the authoritative "flight has ended" predicate. The result does not
    /// depend on the direction of motion.
    #[must_use]
    pub fn crosses(&self, prev: GridPoint, curr: GridPoint) -> bool {
        let motion = Segment::new(prev, curr);
        self.segments().any(|ground| motion.intersects(ground))
    }
}

fn validate_points(points: &[GridPoint]) -> Result<(), TerrainError> {
    if points.len() < 2 {
        return Err(TerrainError::TooFewPoints {
            count: points.len(),
        });
    }
    if points[0].x != 0 {
        return Err(TerrainError::NotStartingAtOrigin { x: points[0].x });
    }
    for (index, w) in points.windows(2).enumerate() {
        if w[1].x <= w[0].x {
            return Err(TerrainError::NonIncreasingX {
                index: index + 1,
                x: w[1].x,
            });
        }
    }
    let last = points[points.len() - 1].x;
    if last >= MAX_WORLD_WIDTH {
        return Err(TerrainError::TooWide {
            x: last,
            max_width: MAX_WORLD_WIDTH,
        });
    }
    Ok(())
}

/// Linearly interpolates the polyline at every integer column, rounding up.
#[expect(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn column_heights(points: &[GridPoint]) -> Vec<i32> {
    let width = points[points.len() - 1].x + 1;
    let mut heights = Vec::with_capacity(usize::try_from(width).unwrap_or_default());
    let mut segment = 0;
    for x in 0..width {
        while x > points[segment + 1].x {
            segment += 1;
        }
        let a = points[segment];
        let b = points[segment + 1];
        let alpha = (x - a.x) as f32 / (b.x - a.x) as f32;
        let y = (1.0 - alpha) * a.y as f32 + alpha * b.y as f32;
        heights.push(y.ceil() as i32);
    }
    heights
}

#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn zone_from_heights(heights: &[i32]) -> Option<LandingZone> {
    let mut best: Option<(usize, usize)> = None;
    let mut start = 0;
    for i in 1..=heights.len() {
        if i < heights.len() && heights[i] == heights[start] {
            continue;
        }
        let end = i - 1;
        if end > start && best.is_none_or(|(x0, x1)| end - start > x1 - x0) {
            best = Some((start, end));
        }
        start = i;
    }
    best.map(|(x0, x1)| LandingZone {
        x0: x0 as i32,
        x1: x1 as i32,
        y: heights[x0],
    })
}

fn zone_from_segments(points: &[GridPoint], min_width: i32) -> Option<LandingZone> {
    let mut best: Option<LandingZone> = None;
    let mut start = 0;
    for i in 1..=points.len() {
        if i < points.len() && points[i].y == points[start].y {
            continue;
        }
        let end = i - 1;
        let zone = LandingZone {
            x0: points[start].x,
            x1: points[end].x,
            y: points[start].y,
        };
        if end > start
            && zone.width() >= min_width
            && best.is_none_or(|b| zone.width() > b.width())
        {
            best = Some(zone);
        }
        start = i;
    }
    best
}
