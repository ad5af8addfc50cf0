//! Spherical geodesy primitives used by every other module.
//!
//! All angles are decimal degrees, all distances kilometers. The Earth is
//! modelled as a sphere of radius [`EARTH_RADIUS`]; depths combine with
//! great-circle distances through the Pythagorean theorem. That planar
//! combination is an approximation, but it is the convention every
//! downstream distance metric (Rrup, Rjb) is calibrated against, so it is
//! preserved deliberately.

/// Earth radius in km.
pub const EARTH_RADIUS: f64 = 6371.0;

/// Calculates the great-circle distance between two points in km.
///
/// Uses the haversine formulation, which stays numerically stable for
/// nearby points.
pub fn geodetic_distance(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let (lon1, lat1) = (lon1.to_radians(), lat1.to_radians());
    let (lon2, lat2) = (lon2.to_radians(), lat2.to_radians());
    let a = ((lat1 - lat2) / 2.0).sin();
    let b = ((lon1 - lon2) / 2.0).sin();
    let angle = (a * a + lat1.cos() * lat2.cos() * b * b).sqrt().min(1.0).asin();
    2.0 * EARTH_RADIUS * angle
}

/// Calculates the azimuth from the first point to the second one, measured
/// clockwise from north, in [0, 360) degrees.
pub fn azimuth(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let (lon1, lat1) = (lon1.to_radians(), lat1.to_radians());
    let (lon2, lat2) = (lon2.to_radians(), lat2.to_radians());
    let cos_lat2 = lat2.cos();
    let true_course = ((lon1 - lon2).sin() * cos_lat2)
        .atan2(lat1.cos() * lat2.sin() - lat1.sin() * cos_lat2 * (lon1 - lon2).cos())
        .to_degrees();
    (360.0 - true_course).rem_euclid(360.0)
}

/// Distance between two points taking depth into account: the square root
/// of the squared great-circle distance plus the squared depth difference.
pub fn distance(lon1: f64, lat1: f64, depth1: f64, lon2: f64, lat2: f64, depth2: f64) -> f64 {
    let hdist = geodetic_distance(lon1, lat1, lon2, lat2);
    let vdist = depth1 - depth2;
    (hdist * hdist + vdist * vdist).sqrt()
}

/// Forward geodetic problem: the point lying `distance` km from
/// `(lon, lat)` along the great circle arc with the given azimuth.
///
/// Returns `(longitude, latitude)` in decimal degrees, longitude wrapped
/// into [-180, 180].
pub fn point_at(lon: f64, lat: f64, azimuth: f64, distance: f64) -> (f64, f64) {
    let (rlon, rlat) = (lon.to_radians(), lat.to_radians());
    let tc = (360.0 - azimuth).to_radians();
    let sin_dist = (distance / EARTH_RADIUS).sin();
    let cos_dist = (distance / EARTH_RADIUS).cos();
    let sin_lat = rlat.sin();
    let cos_lat = rlat.cos();

    let sin_lat2 = sin_lat * cos_dist + cos_lat * sin_dist * tc.cos();
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin().to_degrees();

    let dlon = (tc.sin() * sin_dist * cos_lat).atan2(cos_dist - sin_lat * sin_lat2);
    let lon2 = ((rlon - dlon + std::f64::consts::PI).rem_euclid(2.0 * std::f64::consts::PI)
        - std::f64::consts::PI)
        .to_degrees();
    (lon2, lat2)
}

/// Finds `npoints` points equally spaced along the great circle arc
/// starting at `(lon, lat, depth)` with the given azimuth; the arc covers
/// `hdist` km horizontally and `vdist` km of depth change in total.
///
/// The first point is the start point itself, left intact. `npoints` below
/// two yields just the start point.
pub fn npoints_towards(
    lon: f64,
    lat: f64,
    depth: f64,
    azimuth: f64,
    hdist: f64,
    vdist: f64,
    npoints: usize,
) -> Vec<(f64, f64, f64)> {
    if npoints < 2 {
        return vec![(lon, lat, depth)];
    }
    let mut result = Vec::with_capacity(npoints);
    result.push((lon, lat, depth));
    let steps = (npoints - 1) as f64;
    for i in 1..npoints {
        let frac = i as f64 / steps;
        let (plon, plat) = point_at(lon, lat, azimuth, hdist * frac);
        result.push((plon, plat, depth + vdist * frac));
    }
    result
}

/// Finds `npoints` equally spaced points between two given ones, both ends
/// included and left intact.
pub fn npoints_between(
    lon1: f64,
    lat1: f64,
    depth1: f64,
    lon2: f64,
    lat2: f64,
    depth2: f64,
    npoints: usize,
) -> Vec<(f64, f64, f64)> {
    let hdist = geodetic_distance(lon1, lat1, lon2, lat2);
    let vdist = depth2 - depth1;
    let mut points = npoints_towards(
        lon1,
        lat1,
        depth1,
        azimuth(lon1, lat1, lon2, lat2),
        hdist,
        vdist,
        npoints,
    );
    if let Some(last) = points.last_mut() {
        *last = (lon2, lat2, depth2);
    }
    points
}

/// Puts points between two given ones, equally spaced by `length` km along
/// the connecting great circle arc.
///
/// The number of intervals is the rounded division of the total distance by
/// `length`, so the last point may fall short of or past the second
/// reference point. A degenerate pair (total distance rounding to zero
/// intervals) yields just the start point.
pub fn intervals_between(
    lon1: f64,
    lat1: f64,
    depth1: f64,
    lon2: f64,
    lat2: f64,
    depth2: f64,
    length: f64,
) -> Vec<(f64, f64, f64)> {
    let hdist = geodetic_distance(lon1, lat1, lon2, lat2);
    let vdist = depth2 - depth1;
    // Rounding to a fixed precision keeps the interval count stable when
    // the same nominal distance comes out of slightly different floating
    // point computations (e.g. 64.9999999999990 vs 65.0000000000020).
    let total = round7((hdist * hdist + vdist * vdist).sqrt());
    let num_intervals = (total / length).round() as usize;
    if num_intervals == 0 {
        return vec![(lon1, lat1, depth1)];
    }
    let dist_factor = (length * num_intervals as f64) / total;
    npoints_towards(
        lon1,
        lat1,
        depth1,
        azimuth(lon1, lat1, lon2, lat2),
        hdist * dist_factor,
        vdist * dist_factor,
        num_intervals + 1,
    )
}

/// Signed distance from a point to a great circle arc, in km.
///
/// The arc is defined by a reference point and an azimuth measured there.
/// The result is positive when the target point lies on the right-hand
/// side of the arc, negative on the left.
pub fn distance_to_arc(alon: f64, alat: f64, aazimuth: f64, plon: f64, plat: f64) -> f64 {
    let azimuth_to_target = azimuth(alon, alat, plon, plat);
    let distance_to_target = geodetic_distance(alon, alat, plon, plat);
    // Spherical right triangle: the cosine of the angle at the projection
    // foot equals the sine of the opposite angle times the sine of the
    // hypotenuse (Napier's pentagon).
    let t_angle = (azimuth_to_target - aazimuth + 360.0).rem_euclid(360.0);
    let angle = (t_angle.to_radians().sin() * (distance_to_target / EARTH_RADIUS).sin())
        .clamp(-1.0, 1.0)
        .acos();
    (std::f64::consts::FRAC_PI_2 - angle) * EARTH_RADIUS
}

/// Minimum great-circle distance from a collection of surface points to a
/// single point, in km. Depths are ignored.
pub fn min_geodetic_distance(lons: &[f64], lats: &[f64], plon: f64, plat: f64) -> f64 {
    debug_assert_eq!(lons.len(), lats.len());
    lons.iter()
        .zip(lats)
        .map(|(&lon, &lat)| geodetic_distance(lon, lat, plon, plat))
        .fold(f64::INFINITY, f64::min)
}

fn round7(value: f64) -> f64 {
    (value * 1e7).round() / 1e7
}
