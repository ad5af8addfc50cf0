//! Geographical point primitive.

use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, Result};
use crate::geodetic;

/// Coordinate comparison tolerance, in degrees.
const LON_LAT_TOLERANCE: f64 = 1e-5;
/// Depth comparison tolerance, in km.
const DEPTH_TOLERANCE: f64 = 1e-3;

/// A point on or below the Earth surface: longitude and latitude in decimal
/// degrees, depth in km (positive downwards, negative values mean elevation
/// above sea level).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Point {
    pub longitude: f64,
    pub latitude: f64,
    pub depth: f64,
}

impl Point {
    /// Creates a point, validating coordinate ranges.
    pub fn new(longitude: f64, latitude: f64, depth: f64) -> Result<Self> {
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(GeometryError::InvalidLongitude(longitude));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(GeometryError::InvalidLatitude(latitude));
        }
        Ok(Point {
            longitude,
            latitude,
            depth,
        })
    }

    /// Creates a point at zero depth.
    pub fn at_surface(longitude: f64, latitude: f64) -> Result<Self> {
        Point::new(longitude, latitude, 0.0)
    }

    /// Constructor bypassing range checks, for coordinates that come out of
    /// geodetic computations and are in range by construction.
    pub(crate) fn new_unchecked(longitude: f64, latitude: f64, depth: f64) -> Self {
        Point {
            longitude,
            latitude,
            depth,
        }
    }

    /// True if the point lies exactly at the Earth surface.
    pub fn on_surface(&self) -> bool {
        self.depth == 0.0
    }

    /// The point lying at the given horizontal distance (km) along the
    /// given azimuth, with depth shifted by `vertical_increment` km.
    pub fn point_at(&self, horizontal_distance: f64, vertical_increment: f64, azimuth: f64) -> Self {
        let (lon, lat) =
            geodetic::point_at(self.longitude, self.latitude, azimuth, horizontal_distance);
        Point::new_unchecked(lon, lat, self.depth + vertical_increment)
    }

    /// Azimuth towards another point, in [0, 360) degrees.
    pub fn azimuth(&self, other: &Point) -> f64 {
        geodetic::azimuth(self.longitude, self.latitude, other.longitude, other.latitude)
    }

    /// Great-circle distance to another point ignoring depths, in km.
    pub fn horizontal_distance(&self, other: &Point) -> f64 {
        geodetic::geodetic_distance(self.longitude, self.latitude, other.longitude, other.latitude)
    }

    /// Distance to another point combining the great-circle distance and
    /// the depth difference, in km.
    pub fn distance(&self, other: &Point) -> f64 {
        geodetic::distance(
            self.longitude,
            self.latitude,
            self.depth,
            other.longitude,
            other.latitude,
            other.depth,
        )
    }

    /// Points spaced by `distance` km along the arc from this point towards
    /// `target`, this point included. The actual span is the multiple of
    /// `distance` closest to the distance between the two points, so the
    /// last point can fall short of or overshoot `target`.
    pub fn equally_spaced_points(&self, target: &Point, distance: f64) -> Vec<Point> {
        geodetic::intervals_between(
            self.longitude,
            self.latitude,
            self.depth,
            target.longitude,
            target.latitude,
            target.depth,
            distance,
        )
        .into_iter()
        .map(|(lon, lat, depth)| Point::new_unchecked(lon, lat, depth))
        .collect()
    }
}

/// Tolerant comparison: coordinates within a hundred-thousandth of a degree
/// (about a meter) and depths within a meter compare equal.
impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        (self.longitude - other.longitude).abs() <= LON_LAT_TOLERANCE
            && (self.latitude - other.latitude).abs() <= LON_LAT_TOLERANCE
            && (self.depth - other.depth).abs() <= DEPTH_TOLERANCE
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "<Latitude={}, Longitude={}, Depth={}>",
            self.latitude, self.longitude, self.depth
        )
    }
}
