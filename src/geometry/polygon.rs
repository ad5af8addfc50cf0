//! Polygon on the Earth surface.

use geo::{Contains, Intersects};
use geo_types::{coord, LineString, Polygon as PlanarPolygon};
use once_cell::sync::OnceCell;

use crate::error::{GeometryError, Result};
use crate::geodetic;
use crate::geometry::line::clean_points;
use crate::geometry::Point;
use crate::mesh::Mesh;
use crate::utils::{self, OrthographicProjection, SphericalBoundingBox};

/// Edges longer than this are subdivided before projection, in km.
const UPSAMPLING_STEP_KM: f64 = 100.0;

/// A polygon defined by surface vertices (depths are ignored).
///
/// The perimeter edges follow great circle arcs, so long edges are
/// resampled before any planar operation: the great circle arc between two
/// points on the same parallel does not keep a constant latitude.
#[derive(Debug, Clone)]
pub struct Polygon {
    lons: Vec<f64>,
    lats: Vec<f64>,
    shape: OnceCell<PolygonShape>,
}

/// Projected form of the perimeter, built at most once.
#[derive(Debug, Clone)]
struct PolygonShape {
    bbox: SphericalBoundingBox,
    projection: OrthographicProjection,
    polygon2d: PlanarPolygon<f64>,
}

impl Polygon {
    /// Creates a polygon from its vertices, listed in perimeter order
    /// without the closing repetition of the first one.
    pub fn new(points: Vec<Point>) -> Result<Self> {
        let mut points = clean_points(&points);
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        if points.len() < 3 {
            return Err(GeometryError::TooFewPolygonVertices);
        }
        let lons: Vec<f64> = points.iter().map(|p| p.longitude).collect();
        let lats: Vec<f64> = points.iter().map(|p| p.latitude).collect();
        if utils::line_intersects_itself(&lons, &lats, true)? {
            return Err(GeometryError::SelfIntersectingPolygon);
        }
        Ok(Polygon {
            lons,
            lats,
            shape: OnceCell::new(),
        })
    }

    pub fn num_vertices(&self) -> usize {
        self.lons.len()
    }

    pub fn lons(&self) -> &[f64] {
        &self.lons
    }

    pub fn lats(&self) -> &[f64] {
        &self.lats
    }

    fn shape(&self) -> Result<&PolygonShape> {
        self.shape.get_or_try_init(|| {
            let (lons, lats) = get_resampled_coordinates(&self.lons, &self.lats);
            let bbox = utils::get_spherical_bounding_box(&lons, &lats)?;
            let projection = OrthographicProjection::new(bbox);
            let (xx, yy) = projection.project_all(&lons, &lats)?;
            let ring: Vec<_> = xx
                .iter()
                .zip(&yy)
                .map(|(&x, &y)| coord! { x: x, y: y })
                .collect();
            Ok(PolygonShape {
                bbox,
                projection,
                polygon2d: PlanarPolygon::new(LineString::from(ring), vec![]),
            })
        })
    }

    /// True if the point is strictly inside the polygon; perimeter points
    /// are outside.
    pub fn contains(&self, point: &Point) -> Result<bool> {
        let shape = self.shape()?;
        match shape.projection.project(point.longitude, point.latitude) {
            Ok((x, y)) => Ok(shape.polygon2d.contains(&geo_types::Point::new(x, y))),
            // Too far from the projection center means way outside.
            Err(GeometryError::OutsideProjection { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// True if the point is inside the polygon or on its perimeter.
    pub fn intersects(&self, point: &Point) -> Result<bool> {
        let shape = self.shape()?;
        match shape.projection.project(point.longitude, point.latitude) {
            Ok((x, y)) => Ok(shape.polygon2d.intersects(&geo_types::Point::new(x, y))),
            Err(GeometryError::OutsideProjection { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Creates a mesh of surface points covering the polygon interior with
    /// the given spacing, in km.
    ///
    /// The bounding box is swept from its north-western corner, east in
    /// `mesh_spacing` km steps along each row and south between rows. Only
    /// candidates strictly inside the projected perimeter are kept, so a
    /// thin polygon can yield an empty mesh.
    pub fn discretize(&self, mesh_spacing: f64) -> Result<Mesh> {
        if mesh_spacing <= 0.0 {
            return Err(GeometryError::InvalidMeshSpacing(mesh_spacing));
        }
        let shape = self.shape()?;
        let SphericalBoundingBox {
            west,
            east,
            north,
            south,
        } = shape.bbox;
        let mut lons = Vec::new();
        let mut lats = Vec::new();
        let mut latitude = north;
        while latitude > south {
            let mut longitude = west;
            while utils::get_longitudinal_extent(longitude, east) > 0.0 {
                let (x, y) = shape.projection.project(longitude, latitude)?;
                if shape.polygon2d.contains(&geo_types::Point::new(x, y)) {
                    lons.push(longitude);
                    lats.push(latitude);
                }
                longitude = geodetic::point_at(longitude, latitude, 90.0, mesh_spacing).0;
            }
            latitude = geodetic::point_at(west, latitude, 180.0, mesh_spacing).1;
        }
        Ok(Mesh::new(lons, lats, None))
    }
}

/// Inserts points along edges longer than [`UPSAMPLING_STEP_KM`], walking
/// the perimeter edge by edge. The closing vertex is cut off since it
/// repeats the first one.
fn get_resampled_coordinates(lons: &[f64], lats: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let num_coords = lons.len();
    let mut resampled_lons = vec![lons[0]];
    let mut resampled_lats = vec![lats[0]];
    for i in 0..num_coords {
        let next = (i + 1) % num_coords;
        let distance = geodetic::geodetic_distance(lons[i], lats[i], lons[next], lats[next]);
        let num_points = (distance / UPSAMPLING_STEP_KM) as usize + 1;
        if num_points >= 2 {
            let points =
                geodetic::npoints_between(lons[i], lats[i], 0.0, lons[next], lats[next], 0.0, num_points);
            for &(lon, lat, _) in &points[1..] {
                resampled_lons.push(lon);
                resampled_lats.push(lat);
            }
        } else {
            resampled_lons.push(lons[next]);
            resampled_lats.push(lats[next]);
        }
    }
    resampled_lons.pop();
    resampled_lats.pop();
    (resampled_lons, resampled_lats)
}
