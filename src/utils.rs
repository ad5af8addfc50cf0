//! Low-level spatial helpers shared by the geometric primitives: longitude
//! arithmetic that survives the international date line, the local
//! orthographic projection, Cartesian-space vectors and polyline simplicity
//! checks.

use geo::line_intersection::{line_intersection, LineIntersection};
use geo_types::{coord, Line as PlanarLine};
use nalgebra::Vector3;

use crate::error::{GeometryError, Result};
use crate::geodetic::{self, EARTH_RADIUS};

/// Spherical bounding box of a point collection, expressed as western and
/// eastern meridians plus northern and southern parallels.
///
/// When the collection crosses the 180 meridian `west` is numerically
/// greater than `east`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphericalBoundingBox {
    pub west: f64,
    pub east: f64,
    pub north: f64,
    pub south: f64,
}

/// Angular distance between two longitudes in degrees.
///
/// Positive when `lon2` lies east of `lon1`, negative otherwise; absolute
/// value never exceeds 180 for valid input. This is the one place longitude
/// subtraction happens, so date-line wraparound is handled once.
pub fn get_longitudinal_extent(lon1: f64, lon2: f64) -> f64 {
    (lon2 - lon1 + 180.0).rem_euclid(360.0) - 180.0
}

/// True if the segment between two longitudes crosses the international
/// date line.
pub fn cross_idl(lon1: f64, lon2: f64) -> bool {
    lon1 * lon2 < 0.0 && (lon1 - lon2).abs() > 180.0
}

/// Finds the bounding box of a point collection.
///
/// When the naive west/east span comes out negative the points straddle
/// meridian 180: the actual west border is the lowest positive longitude
/// and the east border the highest negative one. Fails if no hemisphere
/// bounded by two meridians contains the whole collection.
pub fn get_spherical_bounding_box(lons: &[f64], lats: &[f64]) -> Result<SphericalBoundingBox> {
    debug_assert_eq!(lons.len(), lats.len());
    debug_assert!(!lons.is_empty());
    let north = lats.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let south = lats.iter().cloned().fold(f64::INFINITY, f64::min);
    let mut west = lons.iter().cloned().fold(f64::INFINITY, f64::min);
    let mut east = lons.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if get_longitudinal_extent(west, east) < 0.0 {
        west = lons
            .iter()
            .cloned()
            .filter(|&lon| lon > 0.0)
            .fold(f64::INFINITY, f64::min);
        east = lons
            .iter()
            .cloned()
            .filter(|&lon| lon < 0.0)
            .fold(f64::NEG_INFINITY, f64::max);
        let all_inside = lons.iter().all(|&lon| {
            get_longitudinal_extent(west, lon) >= 0.0 && get_longitudinal_extent(lon, east) >= 0.0
        });
        if !all_inside {
            return Err(GeometryError::WideLongitudinalExtent);
        }
    }
    Ok(SphericalBoundingBox {
        west,
        east,
        north,
        south,
    })
}

/// Midpoint of the great circle arc between two points, in degrees.
pub fn get_middle_point(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> (f64, f64) {
    if lon1 == lon2 && lat1 == lat2 {
        return (lon1, lat1);
    }
    let dist = geodetic::geodetic_distance(lon1, lat1, lon2, lat2);
    let azimuth = geodetic::azimuth(lon1, lat1, lon2, lat2);
    geodetic::point_at(lon1, lat1, azimuth, dist / 2.0)
}

/// Orthographic projection centered on the middle of a bounding box.
///
/// Maps longitudes and latitudes to a km-scaled plane. The projection
/// distorts distances, areas and angles away from its center, but is good
/// enough for shape checks (polyline simplicity, point in polygon) and for
/// measuring distances up to roughly 700 km, where the error stays below
/// 1 km. Only defined for points less than 90 degrees away from the center.
#[derive(Debug, Clone, Copy)]
pub struct OrthographicProjection {
    lambda0: f64,
    phi0: f64,
    cos_phi0: f64,
    sin_phi0: f64,
}

impl OrthographicProjection {
    pub fn new(bbox: SphericalBoundingBox) -> Self {
        let (lon0, lat0) = get_middle_point(bbox.west, bbox.north, bbox.east, bbox.south);
        let lambda0 = lon0.to_radians();
        let phi0 = lat0.to_radians();
        OrthographicProjection {
            lambda0,
            phi0,
            cos_phi0: phi0.cos(),
            sin_phi0: phi0.sin(),
        }
    }

    pub fn from_lons_lats(lons: &[f64], lats: &[f64]) -> Result<Self> {
        Ok(Self::new(get_spherical_bounding_box(lons, lats)?))
    }

    /// Projects one point to planar `(x, y)` in km.
    pub fn project(&self, lon: f64, lat: f64) -> Result<(f64, f64)> {
        let phi = lat.to_radians();
        let lambda = lon.to_radians() - self.lambda0;
        let cos_phi = phi.cos();
        // Haversine of the angular distance between the point and the
        // projection center; sin(45 deg) bounds the valid half-disc.
        let a = ((self.phi0 - phi) / 2.0).sin();
        let b = (lambda / 2.0).sin();
        let sin_dist = (a * a + self.cos_phi0 * cos_phi * b * b).sqrt();
        if sin_dist > std::f64::consts::FRAC_1_SQRT_2 {
            return Err(GeometryError::OutsideProjection {
                lon: self.lambda0.to_degrees(),
                lat: self.phi0.to_degrees(),
            });
        }
        let x = cos_phi * lambda.sin();
        let y = self.cos_phi0 * phi.sin() - self.sin_phi0 * cos_phi * lambda.cos();
        Ok((x * EARTH_RADIUS, y * EARTH_RADIUS))
    }

    /// Projects a collection of points, failing if any falls outside the
    /// projection's validity range.
    pub fn project_all(&self, lons: &[f64], lats: &[f64]) -> Result<(Vec<f64>, Vec<f64>)> {
        let mut xx = Vec::with_capacity(lons.len());
        let mut yy = Vec::with_capacity(lats.len());
        for (&lon, &lat) in lons.iter().zip(lats) {
            let (x, y) = self.project(lon, lat)?;
            xx.push(x);
            yy.push(y);
        }
        Ok((xx, yy))
    }
}

/// Returns true if the polyline given by parallel longitude/latitude arrays
/// intersects itself in 2D projection. A line whose last point repeats the
/// first is considered self-intersecting.
///
/// With `closed_shape` the check runs twice, the second time with the
/// vertex sequence rotated by one position. That brings the closing edge of
/// a polygon perimeter into the open-polyline test.
pub fn line_intersects_itself(lons: &[f64], lats: &[f64], closed_shape: bool) -> Result<bool> {
    debug_assert_eq!(lons.len(), lats.len());
    // Fewer than four points cannot produce a crossing.
    if lons.len() <= 3 {
        return Ok(false);
    }
    let proj = OrthographicProjection::from_lons_lats(lons, lats)?;
    let (xx, yy) = proj.project_all(lons, lats)?;
    if !polyline_is_simple(&xx, &yy) {
        return Ok(true);
    }
    if closed_shape {
        let n = lons.len();
        let mut rolled_lons = Vec::with_capacity(n);
        let mut rolled_lats = Vec::with_capacity(n);
        rolled_lons.push(lons[n - 1]);
        rolled_lats.push(lats[n - 1]);
        rolled_lons.extend_from_slice(&lons[..n - 1]);
        rolled_lats.extend_from_slice(&lats[..n - 1]);
        let (xx, yy) = proj.project_all(&rolled_lons, &rolled_lats)?;
        if !polyline_is_simple(&xx, &yy) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Pairwise segment test: non-adjacent segments may not touch at all,
/// adjacent ones only at their shared vertex.
fn polyline_is_simple(xx: &[f64], yy: &[f64]) -> bool {
    let segments: Vec<PlanarLine<f64>> = xx
        .windows(2)
        .zip(yy.windows(2))
        .map(|(x, y)| {
            PlanarLine::new(coord! { x: x[0], y: y[0] }, coord! { x: x[1], y: y[1] })
        })
        .collect();
    for i in 0..segments.len() {
        for j in (i + 1)..segments.len() {
            let Some(isect) = line_intersection(segments[i], segments[j]) else {
                continue;
            };
            if j == i + 1 {
                match isect {
                    LineIntersection::SinglePoint { intersection, .. } => {
                        let shared = segments[i].end;
                        let dx = intersection.x - shared.x;
                        let dy = intersection.y - shared.y;
                        if dx * dx + dy * dy > 1e-12 {
                            return false;
                        }
                    }
                    LineIntersection::Collinear { .. } => return false,
                }
            } else {
                return false;
            }
        }
    }
    true
}

/// Position vector in Cartesian space of a point given in spherical
/// coordinates. Depth is subtracted from the Earth radius, so a unit of the
/// resulting vector is 1 km.
pub fn spherical_to_cartesian(lon: f64, lat: f64, depth: f64) -> Vector3<f64> {
    let phi = lon.to_radians();
    let theta = lat.to_radians();
    let rr = EARTH_RADIUS - depth;
    let cos_theta_r = rr * theta.cos();
    Vector3::new(cos_theta_r * phi.cos(), cos_theta_r * phi.sin(), rr * theta.sin())
}

/// Spherical coordinates `(lon, lat, depth)` of a position vector in
/// Cartesian space. Inverse of [`spherical_to_cartesian`].
pub fn cartesian_to_spherical(vector: &Vector3<f64>) -> (f64, f64, f64) {
    let rr = vector.norm();
    let lat = (vector.z / rr).clamp(-1.0, 1.0).asin().to_degrees();
    let lon = vector.y.atan2(vector.x).to_degrees();
    (lon, lat, EARTH_RADIUS - rr)
}

/// Area of a triangle given by its three edge vectors, via Heron's formula.
pub fn triangle_area(e1: &Vector3<f64>, e2: &Vector3<f64>, e3: &Vector3<f64>) -> f64 {
    let l1 = e1.norm();
    let l2 = e2.norm();
    let l3 = e3.norm();
    let s = (l1 + l2 + l3) / 2.0;
    (s * (s - l1) * (s - l2) * (s - l3)).max(0.0).sqrt()
}

/// Unit vector in the direction of the given one.
pub fn normalized(vector: &Vector3<f64>) -> Vector3<f64> {
    vector / vector.norm()
}

/// Weighted circular mean of azimuths, in [0, 360) degrees.
///
/// Azimuths are summed as unit vectors scaled by their weights, so opposite
/// directions cancel instead of averaging to their arithmetic midpoint.
pub fn azimuths_weighted_mean(azimuths: &[f64], weights: &[f64]) -> f64 {
    debug_assert_eq!(azimuths.len(), weights.len());
    let mut east = 0.0;
    let mut north = 0.0;
    for (&az, &weight) in azimuths.iter().zip(weights) {
        let rad = az.to_radians();
        east += rad.sin() * weight;
        north += rad.cos() * weight;
    }
    east.atan2(north).to_degrees().rem_euclid(360.0)
}
