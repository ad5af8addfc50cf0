//! Fault surface built from explicit edge lines at increasing depths.

use crate::error::{GeometryError, Result};
use crate::geometry::{Line, Point};
use crate::mesh::RectangularMesh;
use crate::surface::Surface;

/// Surface described by a set of fault edges: the shallowest edge first,
/// each following one deeper, all running in the same along-strike
/// direction. Unlike a simple fault the geometry is free-form, so strike
/// and dip come from the triangulated mesh.
#[derive(Debug, Clone)]
pub struct ComplexFaultSurface {
    mesh: RectangularMesh,
    strike: f64,
    dip: f64,
}

impl ComplexFaultSurface {
    /// Wraps an already built mesh. Strike and dip are computed from the
    /// mesh triangulation once, here.
    pub fn new(mesh: RectangularMesh) -> Result<Self> {
        let (dip, strike) = mesh.get_mean_inclination_and_azimuth()?;
        Ok(ComplexFaultSurface { mesh, strike, dip })
    }

    /// Validates the edges without building anything.
    pub fn check_fault_data(edges: &[Line], mesh_spacing: f64) -> Result<()> {
        if edges.len() < 2 {
            return Err(GeometryError::InvalidSurface(
                "at least two edges are required",
            ));
        }
        if edges.iter().any(|edge| edge.len() < 2) {
            return Err(GeometryError::InvalidSurface(
                "at least two points must be defined in each edge",
            ));
        }
        if mesh_spacing <= 0.0 {
            return Err(GeometryError::InvalidMeshSpacing(mesh_spacing));
        }
        Ok(())
    }

    /// Builds the surface mesh from the fault edges.
    ///
    /// Every edge is resampled to a common number of points derived from
    /// the mean edge length; the lines connecting corresponding points of
    /// consecutive edges are then resampled the same way, using the mean
    /// width. The result is a grid with rows along dip and columns along
    /// strike.
    pub fn from_fault_data(edges: &[Line], mesh_spacing: f64) -> Result<Self> {
        Self::check_fault_data(edges, mesh_spacing)?;
        let mean_length =
            edges.iter().map(Line::length).sum::<f64>() / edges.len() as f64;
        let num_hor_points = (mean_length / mesh_spacing).round() as usize + 1;
        if num_hor_points <= 1 {
            return Err(GeometryError::InvalidSurface(
                "mesh spacing is too big for the mean length of the edges",
            ));
        }
        let resampled_edges: Vec<Vec<Point>> = edges
            .iter()
            .map(|edge| Ok(edge.resample_to_num_points(num_hor_points)?.points().to_vec()))
            .collect::<Result<_>>()?;

        // edges running down the dip, one per along-strike position
        let vert_edges: Vec<Line> = (0..num_hor_points)
            .map(|j| Line::new(resampled_edges.iter().map(|edge| edge[j]).collect()))
            .collect::<Result<_>>()?;
        let mean_width =
            vert_edges.iter().map(Line::length).sum::<f64>() / num_hor_points as f64;
        let num_vert_points = (mean_width / mesh_spacing).round() as usize + 1;
        if num_vert_points <= 1 {
            return Err(GeometryError::InvalidSurface(
                "mesh spacing is too big for the mean width of the surface",
            ));
        }
        let columns: Vec<Vec<Point>> = vert_edges
            .iter()
            .map(|edge| Ok(edge.resample_to_num_points(num_vert_points)?.points().to_vec()))
            .collect::<Result<_>>()?;
        let rows: Vec<Vec<Point>> = (0..num_vert_points)
            .map(|i| columns.iter().map(|col| col[i]).collect())
            .collect();
        ComplexFaultSurface::new(RectangularMesh::from_points_list(&rows)?)
    }
}

impl Surface for ComplexFaultSurface {
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
