//! Rupture surface implementations and the queries GMPE context builders
//! run against them.

pub mod complex_fault;
pub mod planar;
pub mod simple_fault;

pub use complex_fault::ComplexFaultSurface;
pub use planar::PlanarSurface;
pub use simple_fault::SimpleFaultSurface;

use crate::error::Result;
use crate::geodetic;
use crate::geometry::Point;
use crate::mesh::RectangularMesh;

/// Common interface of rupture surfaces.
///
/// Implementors provide the surface mesh (built at most once per instance)
/// together with strike and dip; every distance metric has a mesh-based
/// default implementation. [`PlanarSurface`] overrides most of them with
/// closed-form versions that do not need the mesh at all.
///
/// All distances are in km, all angles in decimal degrees.
pub trait Surface {
    /// The surface mesh: rows follow one another down the dip, columns
    /// along the strike, row 0 is the shallowest edge.
    fn get_mesh(&self) -> &RectangularMesh;

    /// Azimuth of the surface's horizontal trend, in [0, 360).
    fn get_strike(&self) -> f64;

    /// Angle between the surface and the Earth surface, in (0, 90].
    fn get_dip(&self) -> f64;

    /// Rrup: the shortest distance from the site to the rupture surface.
    fn get_min_distance(&self, point: &Point) -> f64 {
        self.get_mesh().get_min_distance(point)
    }

    /// The surface point closest to the site.
    fn get_closest_point(&self, point: &Point) -> Point {
        self.get_mesh().get_closest_point(point)
    }

    /// Rjb: the shortest distance from the site to the surface projection
    /// of the rupture. Zero for sites over the rupture footprint.
    fn get_joyner_boore_distance(&self, point: &Point) -> Result<f64> {
        self.get_mesh().get_joyner_boore_distance(point)
    }

    /// Rx: distance from the site to the great circle arc drawn through
    /// the centroid of the top edge along strike. Positive on the
    /// hanging-wall side (to the right of the strike direction), negative
    /// on the footwall side.
    fn get_rx_distance(&self, point: &Point) -> f64 {
        let centroid = self.get_top_edge_centroid();
        geodetic::distance_to_arc(
            centroid.longitude,
            centroid.latitude,
            self.get_strike(),
            point.longitude,
            point.latitude,
        )
    }

    /// Ztor: depth to the shallowest point of the rupture's top edge.
    fn get_top_edge_depth(&self) -> f64 {
        let mesh = self.get_mesh();
        match mesh.points().depths() {
            None => 0.0,
            Some(depths) => depths[..mesh.col_count()]
                .iter()
                .cloned()
                .fold(f64::INFINITY, f64::min),
        }
    }

    /// Middle point of the surface's top edge.
    fn get_top_edge_centroid(&self) -> Point {
        self.get_mesh().sub_mesh(0..1).get_middle_point()
    }

    /// Down-dip width of the surface, in km.
    fn get_width(&self) -> Result<f64> {
        self.get_mesh().get_mean_width()
    }

    /// Area of the surface, in squared km.
    fn get_area(&self) -> f64 {
        let (_, _, _, areas) = self.get_mesh().get_cell_dimensions();
        areas.iter().sum()
    }

    /// Middle point of the whole surface.
    fn get_middle_point(&self) -> Point {
        self.get_mesh().get_middle_point()
    }
}
