pub use self::{geometry::*, terrain::*, vec2::*};

pub(crate) mod geometry;
pub(crate) mod terrain;
pub(crate) mod vec2;
