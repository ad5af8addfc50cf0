//! Error types for geometry construction and spatial queries.

use thiserror::Error;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GeometryError>;

/// Errors raised by geometric primitives and surface builders.
///
/// All of these are construction-time input defects: nothing in this crate
/// retries or recovers, callers are expected to treat them as fatal.
#[derive(Debug, Error)]
pub enum GeometryError {
    /// Longitude outside the [-180, 180] range.
    #[error("longitude {0} is out of range [-180, 180]")]
    InvalidLongitude(f64),

    /// Latitude outside the [-90, 90] range.
    #[error("latitude {0} is out of range [-90, 90]")]
    InvalidLatitude(f64),

    /// A line needs at least one point after duplicate removal.
    #[error("line must have at least one point")]
    EmptyLine,

    /// A line needs at least two points for length-based operations.
    #[error("line must have at least two points")]
    ShortLine,

    /// The 2D projection of the polyline crosses itself.
    #[error("line intersects itself")]
    SelfIntersectingLine,

    #[error("polygon must have at least 3 unique vertices")]
    TooFewPolygonVertices,

    #[error("polygon perimeter intersects itself")]
    SelfIntersectingPolygon,

    /// No single hemisphere bounded by meridians contains the collection.
    #[error("points collection has longitudinal extent wider than 180 deg")]
    WideLongitudinalExtent,

    /// Orthographic projection is undefined more than 90 degrees away
    /// from its center.
    #[error("some points are too far from the projection center lon={lon} lat={lat}")]
    OutsideProjection { lon: f64, lat: f64 },

    /// Surface-specific geometric constraint violation. The message names
    /// the constraint that broke.
    #[error("invalid surface geometry: {0}")]
    InvalidSurface(&'static str),

    #[error("mesh spacing must be positive, got {0}")]
    InvalidMeshSpacing(f64),

    #[error("dip must be in (0, 90], got {0}")]
    InvalidDip(f64),

    #[error("strike must be in [0, 360), got {0}")]
    InvalidStrike(f64),
}
