//! Fault surface built from a surface trace, a dip and a seismogenic
//! depth range.

use crate::error::{GeometryError, Result};
use crate::geodetic;
use crate::geometry::{Line, Point};
use crate::mesh::RectangularMesh;
use crate::surface::Surface;
use crate::utils;

/// Surface of a simple fault: the fault trace translated down dip between
/// the upper and lower seismogenic depths, perpendicular to the overall
/// trace direction.
#[derive(Debug, Clone)]
pub struct SimpleFaultSurface {
    mesh: RectangularMesh,
    strike: f64,
    dip: f64,
}

impl SimpleFaultSurface {
    /// Validates the fault geometry parameters without building anything.
    pub fn check_fault_data(
        fault_trace: &Line,
        upper_seismogenic_depth: f64,
        lower_seismogenic_depth: f64,
        dip: f64,
        mesh_spacing: f64,
    ) -> Result<()> {
        if fault_trace.len() < 2 {
            return Err(GeometryError::InvalidSurface(
                "the fault trace must have at least two points",
            ));
        }
        if !fault_trace.points().iter().all(Point::on_surface) {
            return Err(GeometryError::InvalidSurface(
                "the fault trace must be defined on the earth surface",
            ));
        }
        if !(dip > 0.0 && dip <= 90.0) {
            return Err(GeometryError::InvalidDip(dip));
        }
        if upper_seismogenic_depth < 0.0 {
            return Err(GeometryError::InvalidSurface(
                "upper seismogenic depth must be non-negative",
            ));
        }
        if lower_seismogenic_depth <= upper_seismogenic_depth {
            return Err(GeometryError::InvalidSurface(
                "lower seismogenic depth must be below upper seismogenic depth",
            ));
        }
        if mesh_spacing <= 0.0 {
            return Err(GeometryError::InvalidMeshSpacing(mesh_spacing));
        }
        Ok(())
    }

    /// Builds the surface mesh from the fault geometry.
    ///
    /// The trace is resampled to the mesh spacing and every resampled
    /// point is translated down dip, first to the upper seismogenic depth
    /// and then to the lower one, along the azimuth perpendicular to the
    /// overall trace direction. Points between the two depths form the
    /// mesh columns; rows follow the dip.
    pub fn from_fault_data(
        fault_trace: &Line,
        upper_seismogenic_depth: f64,
        lower_seismogenic_depth: f64,
        dip: f64,
        mesh_spacing: f64,
    ) -> Result<Self> {
        Self::check_fault_data(
            fault_trace,
            upper_seismogenic_depth,
            lower_seismogenic_depth,
            dip,
            mesh_spacing,
        )?;
        let tan_dip = dip.to_radians().tan();
        let hdist_top = upper_seismogenic_depth / tan_dip;
        let hdist_bottom = lower_seismogenic_depth / tan_dip;
        let trace_points = fault_trace.points();
        let overall_azimuth = trace_points[0].azimuth(trace_points.last().unwrap());
        let downdip_azimuth = (overall_azimuth + 90.0) % 360.0;

        // columns of the future mesh, one per resampled trace point
        let mut columns: Vec<Vec<Point>> = Vec::new();
        for point in fault_trace.resample(mesh_spacing).points() {
            let top = point.point_at(hdist_top, upper_seismogenic_depth, downdip_azimuth);
            let bottom = point.point_at(hdist_bottom, lower_seismogenic_depth, downdip_azimuth);
            columns.push(top.equally_spaced_points(&bottom, mesh_spacing));
        }
        let num_rows = columns[0].len();
        let rows: Vec<Vec<Point>> = (0..num_rows)
            .map(|i| columns.iter().map(|col| col[i]).collect())
            .collect();
        let mesh = RectangularMesh::from_points_list(&rows)?;

        let strike = top_edge_mean_azimuth(&mesh);
        let computed_dip = if mesh.row_count() > 1 && mesh.col_count() > 1 {
            // inclination of the shallowest band of cells
            let top_rows = mesh.sub_mesh(0..2.min(mesh.row_count()));
            let (inclination, _) = top_rows.get_mean_inclination_and_azimuth()?;
            inclination
        } else {
            dip
        };
        Ok(SimpleFaultSurface {
            mesh,
            strike,
            dip: computed_dip,
        })
    }
}

/// Length-weighted circular mean azimuth of the top edge segments.
fn top_edge_mean_azimuth(mesh: &RectangularMesh) -> f64 {
    let cols = mesh.col_count();
    if cols < 2 {
        unreachable!("fault trace resampling always yields at least two columns");
    }
    let mut azimuths = Vec::with_capacity(cols - 1);
    let mut lengths = Vec::with_capacity(cols - 1);
    for j in 0..cols - 1 {
        let p1 = mesh.get(0, j);
        let p2 = mesh.get(0, j + 1);
        azimuths.push(geodetic::azimuth(
            p1.longitude,
            p1.latitude,
            p2.longitude,
            p2.latitude,
        ));
        lengths.push(geodetic::geodetic_distance(
            p1.longitude,
            p1.latitude,
            p2.longitude,
            p2.latitude,
        ));
    }
    utils::azimuths_weighted_mean(&azimuths, &lengths)
}

impl Surface for SimpleFaultSurface {
    fn get_mesh(&self) -> &RectangularMesh {
        &self.mesh
    }

    fn get_strike(&self) -> f64 {
        self.strike
    }

    fn get_dip(&self) -> f64 {
        self.dip
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace(points: &[(f64, f64)]) -> Line {
        Line::new(
            points
                .iter()
                .map(|&(lon, lat)| Point::at_surface(lon, lat).unwrap())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn check_fault_data_failures() {
        let one_point = Line::new(vec![Point::at_surface(0.0, 0.0).unwrap()]).unwrap();
        assert!(SimpleFaultSurface::check_fault_data(&one_point, 0.0, 10.0, 45.0, 1.0).is_err());

        let buried = Line::new(vec![
            Point::new(0.0, 0.0, 1.0).unwrap(),
            Point::new(0.0, 0.1, 1.0).unwrap(),
        ])
        .unwrap();
        assert!(SimpleFaultSurface::check_fault_data(&buried, 0.0, 10.0, 45.0, 1.0).is_err());

        let t = trace(&[(0.0, 0.0), (0.0, 0.1)]);
        assert!(matches!(
            SimpleFaultSurface::check_fault_data(&t, 0.0, 10.0, 0.0, 1.0),
            Err(GeometryError::InvalidDip(_))
        ));
        assert!(matches!(
            SimpleFaultSurface::check_fault_data(&t, 0.0, 10.0, 90.1, 1.0),
            Err(GeometryError::InvalidDip(_))
        ));
        assert!(SimpleFaultSurface::check_fault_data(&t, -1.0, 10.0, 45.0, 1.0).is_err());
        assert!(SimpleFaultSurface::check_fault_data(&t, 10.0, 10.0, 45.0, 1.0).is_err());
        assert!(matches!(
            SimpleFaultSurface::check_fault_data(&t, 0.0, 10.0, 45.0, 0.0),
            Err(GeometryError::InvalidMeshSpacing(_))
        ));
        assert!(SimpleFaultSurface::check_fault_data(&t, 0.0, 10.0, 45.0, 1.0).is_ok());
    }

    #[test]
    fn vertical_fault_mesh_dimensions() {
        // ~10 km long trace at 45 degrees, dip 90, 1 km spacing
        let t = trace(&[(0.0, 0.0), (0.0635916, 0.0635916)]);
        let surface = SimpleFaultSurface::from_fault_data(&t, 0.0, 10.0, 90.0, 1.0).unwrap();
        let mesh = surface.get_mesh();
        assert_eq!(mesh.row_count(), 11);
        // ~10 km trace resampled at 1 km
        assert!((10..=12).contains(&mesh.col_count()), "{}", mesh.col_count());
        // rows go down the dip
        assert_eq!(mesh.get(0, 0).depth, 0.0);
        assert!((mesh.get(10, 0).depth - 10.0).abs() < 1e-6);
        // vertical fault: every row shares the trace's surface positions
        assert!((mesh.get(10, 0).longitude - mesh.get(0, 0).longitude).abs() < 1e-9);
    }

    #[test]
    fn strike_of_straight_trace() {
        let t = trace(&[(0.0, 0.0), (0.0635916, 0.0635916)]);
        let surface = SimpleFaultSurface::from_fault_data(&t, 0.0, 10.0, 90.0, 1.0).unwrap();
        assert!((surface.get_strike() - 45.0).abs() < 0.5, "{}", surface.get_strike());
    }

    #[test]
    fn strike_is_length_weighted() {
        // a 20 km segment at azimuth ~30 followed by a 10 km one at ~60:
        // the weighted mean sits twice as close to 30
        let p1 = Point::at_surface(0.0, 0.0).unwrap();
        let p2 = p1.point_at(20.0, 0.0, 30.0);
        let p3 = p2.point_at(10.0, 0.0, 60.0);
        let t = Line::new(vec![p1, p2, p3]).unwrap();
        let surface = SimpleFaultSurface::from_fault_data(&t, 0.0, 10.0, 90.0, 1.0).unwrap();
        assert!((surface.get_strike() - 40.0).abs() < 1.0, "{}", surface.get_strike());
    }

    #[test]
    fn dip_computed_from_mesh() {
        let t = trace(&[(0.0, 0.0), (0.0, 0.2)]);
        for &dip in &[30.0, 45.0, 60.0, 90.0] {
            let surface = SimpleFaultSurface::from_fault_data(&t, 0.0, 10.0, dip, 1.0).unwrap();
            assert!(
                (surface.get_dip() - dip).abs() < 1.0,
                "expected {dip}, got {}",
                surface.get_dip()
            );
        }
    }

    #[test]
    fn upper_seismogenic_depth_buries_top_edge() {
        let t = trace(&[(0.0, 0.0), (0.0, 0.2)]);
        let surface = SimpleFaultSurface::from_fault_data(&t, 3.0, 10.0, 45.0, 1.0).unwrap();
        assert!((surface.get_top_edge_depth() - 3.0).abs() < 1e-6);
        // top edge shifted horizontally off the trace by depth / tan(dip)
        let top = surface.get_mesh().get(0, 0);
        let offset = geodetic::geodetic_distance(0.0, 0.0, top.longitude, top.latitude);
        assert!((offset - 3.0).abs() < 0.01, "{offset}");
    }

    #[test]
    fn min_distance_to_vertical_fault() {
        let t = trace(&[(0.0, 0.0), (0.0, 0.2)]);
        let surface = SimpleFaultSurface::from_fault_data(&t, 0.0, 10.0, 90.0, 1.0).unwrap();
        // site due east of the middle of the fault
        let site = Point::at_surface(0.1, 0.1).unwrap();
        let expected = geodetic::geodetic_distance(0.0, 0.1, 0.1, 0.1);
        let rrup = surface.get_min_distance(&site);
        assert!((rrup - expected).abs() < 0.1, "{rrup} vs {expected}");
        // Rjb coincides with Rrup for a vertical fault seen from the side
        let rjb = surface.get_joyner_boore_distance(&site).unwrap();
        assert!((rjb - expected).abs() < 0.5, "{rjb} vs {expected}");
    }
}
