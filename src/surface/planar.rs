//! Planar rectangular rupture surface.

use nalgebra::Vector3;
use once_cell::sync::OnceCell;

use crate::error::{GeometryError, Result};
use crate::geodetic;
use crate::geometry::Point;
use crate::mesh::RectangularMesh;
use crate::surface::Surface;
use crate::utils;

/// Maximum difference between top and bottom edge lengths, in km.
const EDGE_LENGTH_TOLERANCE: f64 = 1e-3;
/// Maximum difference between top and bottom edge azimuths, in degrees.
const EDGE_AZIMUTH_TOLERANCE: f64 = 0.1;
/// Corner offsets from the common plane beyond this fraction of the
/// surface area are reported, see the constructor.
const IMPERFECT_RECTANGLE_TOLERANCE: f64 = 0.002;

/// A planar rectangle with the top and bottom edges parallel to the Earth
/// surface, defined by its four corners in clockwise order starting from
/// the top left one.
///
/// Strike and dip are taken on trust: they are supposed to match the
/// factual geometry of the corners but that is not enforced.
///
/// The plane equation of the rectangle is computed eagerly, so Rrup, Rjb
/// and Rx are all answered in closed form; the mesh is only built if a
/// caller explicitly asks for it.
#[derive(Debug)]
pub struct PlanarSurface {
    strike: f64,
    dip: f64,
    mesh_spacing: f64,
    top_left: Point,
    top_right: Point,
    bottom_right: Point,
    bottom_left: Point,
    length: f64,
    width: f64,
    // plane equation and in-plane basis, see init_plane()
    normal: Vector3<f64>,
    d: f64,
    uv1: Vector3<f64>,
    uv2: Vector3<f64>,
    origin: Vector3<f64>,
    mesh: OnceCell<RectangularMesh>,
}

impl PlanarSurface {
    pub fn new(
        mesh_spacing: f64,
        strike: f64,
        dip: f64,
        top_left: Point,
        top_right: Point,
        bottom_right: Point,
        bottom_left: Point,
    ) -> Result<Self> {
        if mesh_spacing <= 0.0 {
            return Err(GeometryError::InvalidMeshSpacing(mesh_spacing));
        }
        if !(dip > 0.0 && dip <= 90.0) {
            return Err(GeometryError::InvalidDip(dip));
        }
        if !(0.0..360.0).contains(&strike) {
            return Err(GeometryError::InvalidStrike(strike));
        }
        if top_left.depth != top_right.depth || bottom_left.depth != bottom_right.depth {
            return Err(GeometryError::InvalidSurface(
                "top and bottom edges must be parallel to the earth surface",
            ));
        }
        let top_azimuth = top_left.azimuth(&top_right);
        let bottom_azimuth = bottom_left.azimuth(&bottom_right);
        let azimuth_diff = ((top_azimuth - bottom_azimuth + 180.0).rem_euclid(360.0) - 180.0).abs();
        if azimuth_diff > EDGE_AZIMUTH_TOLERANCE {
            return Err(GeometryError::InvalidSurface(
                "top and bottom edges must be parallel",
            ));
        }
        let top_length = top_left.distance(&top_right);
        let bottom_length = bottom_left.distance(&bottom_right);
        if (top_length - bottom_length).abs() > EDGE_LENGTH_TOLERANCE {
            return Err(GeometryError::InvalidSurface(
                "top and bottom edges must have the same length",
            ));
        }

        let mut surface = PlanarSurface {
            strike,
            dip,
            mesh_spacing,
            top_left,
            top_right,
            bottom_right,
            bottom_left,
            length: 0.0,
            width: 0.0,
            normal: Vector3::zeros(),
            d: 0.0,
            uv1: Vector3::zeros(),
            uv2: Vector3::zeros(),
            origin: Vector3::zeros(),
            mesh: OnceCell::new(),
        };
        surface.init_plane();

        // measure length and width in the surface's own coordinate space
        // and see how far the corners fall from the common plane
        let mut max_offset = 0.0f64;
        let mut xx = [0.0; 4];
        let mut yy = [0.0; 4];
        for (i, corner) in [top_left, top_right, bottom_left, bottom_right]
            .iter()
            .enumerate()
        {
            let (dist, x, y) = surface.project(&utils::spherical_to_cartesian(
                corner.longitude,
                corner.latitude,
                corner.depth,
            ));
            max_offset = max_offset.max(dist.abs());
            xx[i] = x;
            yy[i] = y;
        }
        surface.length = (xx[1] - xx[0] + xx[3] - xx[2]) / 2.0;
        surface.width = (yy[2] - yy[0] + yy[3] - yy[1]) / 2.0;
        let tolerance = surface.length * surface.width * IMPERFECT_RECTANGLE_TOLERANCE;
        if max_offset > tolerance {
            log::warn!("corner points do not lie on the same plane");
        }
        Ok(surface)
    }

    /// Creates a planar surface deriving strike and dip from the corners:
    /// strike is the azimuth of the top edge, dip the angle the left edge
    /// makes with the horizontal.
    pub fn from_corner_points(
        mesh_spacing: f64,
        top_left: Point,
        top_right: Point,
        bottom_right: Point,
        bottom_left: Point,
    ) -> Result<Self> {
        let strike = top_left.azimuth(&top_right);
        let vert_dist = bottom_left.depth - top_left.depth;
        let dip = (vert_dist / top_left.distance(&bottom_left))
            .clamp(-1.0, 1.0)
            .asin()
            .to_degrees();
        PlanarSurface::new(
            mesh_spacing,
            strike,
            dip,
            top_left,
            top_right,
            bottom_right,
            bottom_left,
        )
    }

    pub fn top_left(&self) -> Point {
        self.top_left
    }

    pub fn top_right(&self) -> Point {
        self.top_right
    }

    pub fn bottom_right(&self) -> Point {
        self.bottom_right
    }

    pub fn bottom_left(&self) -> Point {
        self.bottom_left
    }

    /// Length of the surface along strike, in km.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Sets up the plane containing the surface: a unit normal with the
    /// scalar offset of the plane equation, plus two in-plane unit vectors
    /// pointing along the top edge and down dip. Together with the top
    /// left corner they turn the plane into a 2D coordinate space.
    fn init_plane(&mut self) {
        let tl = corner_vector(&self.top_left);
        let tr = corner_vector(&self.top_right);
        let bl = corner_vector(&self.bottom_left);
        self.normal = utils::normalized(&(tl - tr).cross(&(tl - bl)));
        self.d = -self.normal.dot(&tl);
        self.uv1 = utils::normalized(&(tr - tl));
        self.uv2 = self.normal.cross(&self.uv1);
        self.origin = tl;
    }

    /// Projects a Cartesian point onto the surface's plane. Returns the
    /// distance from the plane in km and the projection's coordinates in
    /// the plane's 2D space.
    fn project(&self, point: &Vector3<f64>) -> (f64, f64, f64) {
        let dist = self.normal.dot(point) + self.d;
        let projection = point - self.normal * dist;
        let in_plane = projection - self.origin;
        (dist, in_plane.dot(&self.uv1), in_plane.dot(&self.uv2))
    }

    /// Inverse of [`project`](Self::project): plane-space coordinates back
    /// to a geographical point.
    fn project_back(&self, dist: f64, x: f64, y: f64) -> Point {
        let vector = self.origin + self.uv1 * x + self.uv2 * y + self.normal * dist;
        let (lon, lat, depth) = utils::cartesian_to_spherical(&vector);
        Point::new_unchecked(lon, lat, depth)
    }

    fn build_mesh(&self) -> RectangularMesh {
        // both pairs of opposite edges are equal within tolerance, so a
        // common interval count per direction keeps the grid rectangular
        let left_points = num_interval_points(self.top_left.distance(&self.bottom_left), self.mesh_spacing);
        let across_points = num_interval_points(self.length, self.mesh_spacing);
        let left = edge_points(&self.top_left, &self.bottom_left, left_points);
        let right = edge_points(&self.top_right, &self.bottom_right, left_points);
        let rows: Vec<Vec<Point>> = left
            .iter()
            .zip(&right)
            .map(|(l, r)| edge_points(l, r, across_points))
            .collect();
        RectangularMesh::from_points_list(&rows)
            .unwrap_or_else(|_| unreachable!("rows share a common point count"))
    }
}

fn corner_vector(point: &Point) -> Vector3<f64> {
    utils::spherical_to_cartesian(point.longitude, point.latitude, point.depth)
}

fn num_interval_points(distance: f64, spacing: f64) -> usize {
    ((distance / spacing).round() as usize).max(1) + 1
}

fn edge_points(from: &Point, to: &Point, npoints: usize) -> Vec<Point> {
    geodetic::npoints_between(
        from.longitude,
        from.latitude,
        from.depth,
        to.longitude,
        to.latitude,
        to.depth,
        npoints,
    )
    .into_iter()
    .map(|(lon, lat, depth)| Point::new_unchecked(lon, lat, depth))
    .collect()
}

impl Surface for PlanarSurface {
    fn get_mesh(&self) -> &RectangularMesh {
        self.mesh.get_or_init(|| self.build_mesh())
    }

    fn get_strike(&self) -> f64 {
        self.strike
    }

    fn get_dip(&self) -> f64 {
        self.dip
    }

    /// Closed-form Rrup: the site is projected onto the surface's plane
    /// and the in-plane distance to the rectangle (nine-region case split:
    /// beyond a corner, beyond an edge, or over the rectangle) combines
    /// with the out-of-plane distance by the Pythagorean theorem.
    fn get_min_distance(&self, point: &Point) -> f64 {
        let (dist, x, y) = self.project(&corner_vector(point));
        let mx = if x < 0.0 {
            x
        } else if x > self.length {
            x - self.length
        } else {
            0.0
        };
        let my = if y < 0.0 {
            y
        } else if y > self.width {
            y - self.width
        } else {
            0.0
        };
        (dist * dist + mx * mx + my * my).sqrt()
    }

    fn get_closest_point(&self, point: &Point) -> Point {
        let (_, x, y) = self.project(&corner_vector(point));
        self.project_back(0.0, x.clamp(0.0, self.length), y.clamp(0.0, self.width))
    }

    /// Closed-form Rjb via four great circle arcs containing the sides of
    /// the projected rectangle: two along strike through the top and
    /// bottom edges, two down dip through the left and right ones. The
    /// signs of the four arc distances locate the site in one of nine
    /// regions; the answer is then either zero (over the footprint), the
    /// distance to the nearest side arc, or the distance to the nearest
    /// corner.
    fn get_joyner_boore_distance(&self, point: &Point) -> Result<f64> {
        let downdip = (self.strike + 90.0) % 360.0;
        let arcs = [
            (self.top_left, self.strike),
            (self.bottom_left, self.strike),
            (self.top_left, downdip),
            (self.top_right, downdip),
        ];
        let mut dists = [0.0f64; 4];
        for (i, (corner, azimuth)) in arcs.iter().enumerate() {
            dists[i] = geodetic::distance_to_arc(
                corner.longitude,
                corner.latitude,
                *azimuth,
                point.longitude,
                point.latitude,
            );
        }
        let sign = |d: f64| {
            if d > 0.0 {
                1i8
            } else if d < 0.0 {
                -1
            } else {
                0
            }
        };
        let same_along_strike = sign(dists[0]) == sign(dists[1]);
        let same_downdip = sign(dists[2]) == sign(dists[3]);
        let jb = if same_along_strike && same_downdip {
            // beyond a corner of the rectangle
            let corner_lons = [
                self.top_left.longitude,
                self.top_right.longitude,
                self.bottom_left.longitude,
                self.bottom_right.longitude,
            ];
            let corner_lats = [
                self.top_left.latitude,
                self.top_right.latitude,
                self.bottom_left.latitude,
                self.bottom_right.latitude,
            ];
            geodetic::min_geodetic_distance(
                &corner_lons,
                &corner_lats,
                point.longitude,
                point.latitude,
            )
        } else if same_along_strike {
            dists[0].abs().min(dists[1].abs())
        } else if same_downdip {
            dists[2].abs().min(dists[3].abs())
        } else {
            0.0
        };
        Ok(jb)
    }

    /// Closed-form Rx: signed distance to the arc through the top left
    /// corner along strike.
    fn get_rx_distance(&self, point: &Point) -> f64 {
        geodetic::distance_to_arc(
            self.top_left.longitude,
            self.top_left.latitude,
            self.strike,
            point.longitude,
            point.latitude,
        )
    }

    fn get_top_edge_depth(&self) -> f64 {
        self.top_left.depth
    }

    fn get_top_edge_centroid(&self) -> Point {
        let (lon, lat) = utils::get_middle_point(
            self.top_left.longitude,
            self.top_left.latitude,
            self.top_right.longitude,
            self.top_right.latitude,
        );
        Point::new_unchecked(lon, lat, self.top_left.depth)
    }

    fn get_width(&self) -> Result<f64> {
        Ok(self.width)
    }

    fn get_area(&self) -> f64 {
        self.width * self.length
    }

    fn get_middle_point(&self) -> Point {
        let (lon, lat) = utils::get_middle_point(
            self.top_left.longitude,
            self.top_left.latitude,
            self.bottom_right.longitude,
            self.bottom_right.latitude,
        );
        Point::new_unchecked(lon, lat, (self.top_left.depth + self.bottom_right.depth) / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // a vertical square along the prime meridian, 0 to 10 km deep
    fn vertical_surface() -> PlanarSurface {
        let top_left = Point::new(0.0, 0.0, 0.0).unwrap();
        let top_right = top_left.point_at(10.0, 0.0, 0.0);
        let bottom_left = Point::new(0.0, 0.0, 10.0).unwrap();
        let bottom_right = top_right.point_at(0.0, 10.0, 0.0);
        PlanarSurface::new(
            1.0, 0.0, 90.0, top_left, top_right, bottom_right, bottom_left,
        )
        .unwrap()
    }

    #[test]
    fn validation_rejects_sloped_top_edge() {
        let result = PlanarSurface::new(
            1.0,
            0.0,
            90.0,
            Point::new(0.0, 0.0, 1.0).unwrap(),
            Point::new(0.0, 0.1, 2.0).unwrap(),
            Point::new(0.0, 0.1, 10.0).unwrap(),
            Point::new(0.0, 0.0, 10.0).unwrap(),
        );
        assert!(matches!(result, Err(GeometryError::InvalidSurface(_))));
    }

    #[test]
    fn validation_rejects_non_parallel_edges() {
        let top_left = Point::new(0.0, 0.0, 0.0).unwrap();
        let top_right = top_left.point_at(10.0, 0.0, 0.0);
        // bottom edge rotated by a degree
        let bottom_left = Point::new(0.1, 0.0, 10.0).unwrap();
        let bottom_right = bottom_left.point_at(10.0, 0.0, 1.0);
        let result = PlanarSurface::new(
            1.0, 0.0, 90.0, top_left, top_right, bottom_right, bottom_left,
        );
        assert!(matches!(
            result,
            Err(GeometryError::InvalidSurface(
                "top and bottom edges must be parallel"
            ))
        ));
    }

    #[test]
    fn validation_rejects_unequal_edges() {
        let top_left = Point::new(0.0, 0.0, 0.0).unwrap();
        let top_right = top_left.point_at(10.0, 0.0, 0.0);
        let bottom_left = Point::new(0.0, 0.0, 10.0).unwrap();
        let bottom_right = top_right.point_at(1.0, 10.0, 0.0);
        let result = PlanarSurface::new(
            1.0, 0.0, 90.0, top_left, top_right, bottom_right, bottom_left,
        );
        assert!(matches!(
            result,
            Err(GeometryError::InvalidSurface(
                "top and bottom edges must have the same length"
            ))
        ));
    }

    #[test]
    fn validation_rejects_bad_scalars() {
        let surface = vertical_surface();
        let (tl, tr, br, bl) = (
            surface.top_left(),
            surface.top_right(),
            surface.bottom_right(),
            surface.bottom_left(),
        );
        assert!(matches!(
            PlanarSurface::new(0.0, 0.0, 90.0, tl, tr, br, bl),
            Err(GeometryError::InvalidMeshSpacing(_))
        ));
        assert!(matches!(
            PlanarSurface::new(1.0, 0.0, 0.0, tl, tr, br, bl),
            Err(GeometryError::InvalidDip(_))
        ));
        assert!(matches!(
            PlanarSurface::new(1.0, 360.0, 90.0, tl, tr, br, bl),
            Err(GeometryError::InvalidStrike(_))
        ));
    }

    #[test]
    fn off_plane_corner_warns_but_builds() {
        let _ = env_logger::builder().is_test(true).try_init();
        // long and narrow vertical surface with the bottom right corner
        // pushed 150 m north, off the plane of the other three corners but
        // within the edge azimuth and length tolerances
        let top_left = Point::new(0.0, 0.0, 0.0).unwrap();
        let top_right = top_left.point_at(100.0, 0.0, 90.0);
        let bottom_left = Point::new(0.0, 0.0, 0.5).unwrap();
        let bottom_right = top_right.point_at(0.15, 0.5, 0.0);
        let surface = PlanarSurface::new(
            0.5, 90.0, 90.0, top_left, top_right, bottom_right, bottom_left,
        )
        .unwrap();
        assert!((surface.length() - 100.0).abs() < 0.1);
        assert!((surface.get_width().unwrap() - 0.5).abs() < 0.01);
    }

    #[test]
    fn strike_and_dip_are_reported_back() {
        let surface = vertical_surface();
        assert_eq!(surface.get_strike(), 0.0);
        assert_eq!(surface.get_dip(), 90.0);
    }

    #[test]
    fn length_width_and_area() {
        let surface = vertical_surface();
        assert!((surface.length() - 10.0).abs() < 0.01);
        assert!((surface.get_width().unwrap() - 10.0).abs() < 0.01);
        assert!((surface.get_area() - 100.0).abs() < 0.2);
    }

    #[test]
    fn mesh_shape_and_corners() {
        let surface = vertical_surface();
        let mesh = surface.get_mesh();
        assert_eq!(mesh.row_count(), 11);
        assert_eq!(mesh.col_count(), 11);
        assert_eq!(mesh.get(0, 0), surface.top_left());
        assert_eq!(mesh.get(0, 10), surface.top_right());
        assert_eq!(mesh.get(10, 0), surface.bottom_left());
        assert_eq!(mesh.get(10, 10), surface.bottom_right());
    }

    #[test]
    fn min_distance_matches_mesh_version() {
        let surface = vertical_surface();
        let sites = [
            Point::new(0.2, 0.03, 0.0).unwrap(),
            Point::new(-0.3, -0.2, 5.0).unwrap(),
            Point::new(0.0, 0.04, 20.0).unwrap(),
        ];
        for site in &sites {
            let analytic = surface.get_min_distance(site);
            let brute = surface.get_mesh().get_min_distance(site);
            assert!((analytic - brute).abs() < 0.1, "{analytic} vs {brute}");
        }
    }

    #[test]
    fn min_distance_on_surface_is_zero() {
        let surface = vertical_surface();
        let on_surface = Point::new(0.0, 0.02, 5.0).unwrap();
        assert!(surface.get_min_distance(&on_surface) < 0.05);
    }

    #[test]
    fn closest_point_clamps_to_rectangle() {
        let surface = vertical_surface();
        // site north of the top right corner at depth beyond the bottom
        let site = Point::new(0.0, 0.2, 20.0).unwrap();
        let closest = surface.get_closest_point(&site);
        // plane coordinates of a corner differ from (length, width) by the
        // chord-versus-arc error, well under 50 m here
        assert!(closest.distance(&surface.bottom_right()) < 0.05);
    }

    #[test]
    fn joyner_boore_sideways_matches_arc_distance() {
        let surface = vertical_surface();
        // vertical surface projects to a line along the meridian; a site
        // due east of it is closer to the side arc than to any corner
        let site = Point::new(0.5, 0.045, 0.0).unwrap();
        let jb = surface.get_joyner_boore_distance(&site).unwrap();
        let expected = geodetic::geodetic_distance(0.0, 0.045, 0.5, 0.045);
        assert!((jb - expected).abs() < 0.2, "{jb} vs {expected}");
    }

    #[test]
    fn joyner_boore_beyond_corner() {
        let surface = vertical_surface();
        let site = Point::new(0.2, -0.2, 0.0).unwrap();
        let jb = surface.get_joyner_boore_distance(&site).unwrap();
        let expected = geodetic::geodetic_distance(0.0, 0.0, 0.2, -0.2);
        assert!((jb - expected).abs() < 0.2, "{jb} vs {expected}");
    }

    #[test]
    fn joyner_boore_over_footprint_is_zero() {
        // east-striking surface dipping south, footprint 20 by 10 km
        let top_left = Point::new(0.0, 0.0, 1.0).unwrap();
        let top_right = top_left.point_at(20.0, 0.0, 90.0);
        let bottom_left = top_left.point_at(10.0, 10.0, 180.0);
        let bottom_right = top_right.point_at(10.0, 10.0, 180.0);
        let surface =
            PlanarSurface::from_corner_points(1.0, top_left, top_right, bottom_right, bottom_left)
                .unwrap();
        let site = Point::new(0.09, -0.045, 0.0).unwrap();
        assert_eq!(surface.get_joyner_boore_distance(&site).unwrap(), 0.0);
    }

    #[test]
    fn rx_sign_distinguishes_sides() {
        let surface = vertical_surface();
        let east = Point::new(0.2, 0.045, 0.0).unwrap();
        let west = Point::new(-0.2, 0.045, 0.0).unwrap();
        assert!(surface.get_rx_distance(&east) > 0.0);
        assert!(surface.get_rx_distance(&west) < 0.0);
    }

    #[test]
    fn from_corner_points_derives_angles() {
        let top_left = Point::new(0.0, 0.0, 0.0).unwrap();
        let top_right = top_left.point_at(10.0, 0.0, 90.0);
        let bottom_left = top_left.point_at(5.0, 5.0, 180.0);
        let bottom_right = top_right.point_at(5.0, 5.0, 180.0);
        let surface =
            PlanarSurface::from_corner_points(1.0, top_left, top_right, bottom_right, bottom_left)
                .unwrap();
        assert!((surface.get_strike() - 90.0).abs() < 1e-3);
        assert!((surface.get_dip() - 45.0).abs() < 0.1);
    }

    #[test]
    fn top_edge_queries() {
        let surface = vertical_surface();
        assert_eq!(surface.get_top_edge_depth(), 0.0);
        let centroid = surface.get_top_edge_centroid();
        assert!((centroid.latitude - 0.045).abs() < 1e-3);
        assert_eq!(centroid.depth, 0.0);
    }
}
