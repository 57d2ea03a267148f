pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// Reasons a terrain polyline cannot be used for an episode.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum TerrainError {
    #[display("terrain needs at least 2 points, got {count}")]
    TooFewPoints { count: usize },
    #[display("terrain x must be strictly increasing (point #{index} at x={x})")]
    NonIncreasingX { index: usize, x: i32 },
    #[display("terrain must start at x=0 (got x={x})")]
    NotStartingAtOrigin { x: i32 },
    #[display("terrain must end before x={max_width} (got x={x})")]
    TooWide { x: i32, max_width: i32 },
    #[display("no flat landing zone found in terrain")]
    NoLandingZone,
}

/// Failure while reading the textual episode description.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum ParseEpisodeError {
    #[display("unexpected end of input while reading {what}")]
    MissingToken { what: &'static str },
    #[display("invalid integer {token:?} for {what}")]
    InvalidInteger { what: &'static str, token: String },
    #[display("malformed terrain: {_0}")]
    #[from]
    MalformedTerrain(TerrainError),
}
