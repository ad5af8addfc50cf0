//! Point collections: the unstructured [`Mesh`] and the grid-ordered
//! [`RectangularMesh`] that rupture surfaces are built from.

use geo::EuclideanDistance;
use geo_types::{coord, LineString, Polygon as PlanarPolygon};
use nalgebra::Vector3;

use crate::error::{GeometryError, Result};
use crate::geometry::Point;
use crate::utils::{self, OrthographicProjection};

/// Past this projected distance the planar Joyner-Boore measurement is not
/// trusted and the numerical fallback kicks in, in km.
const JB_PROJECTION_THRESHOLD: f64 = 500.0;

/// An unordered collection of points kept as flat coordinate arrays.
///
/// `depths` set to `None` means every point lies on the Earth surface;
/// that is distinct from an array of explicit zeros only in memory use,
/// not in behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    lons: Vec<f64>,
    lats: Vec<f64>,
    depths: Option<Vec<f64>>,
}

impl Mesh {
    pub fn new(lons: Vec<f64>, lats: Vec<f64>, depths: Option<Vec<f64>>) -> Self {
        debug_assert_eq!(lons.len(), lats.len());
        debug_assert!(depths.as_ref().map_or(true, |d| d.len() == lons.len()));
        Mesh { lons, lats, depths }
    }

    /// Builds a mesh from a point collection. An all-zero depth column is
    /// dropped.
    pub fn from_points_list(points: &[Point]) -> Self {
        let lons = points.iter().map(|p| p.longitude).collect();
        let lats = points.iter().map(|p| p.latitude).collect();
        let depths: Vec<f64> = points.iter().map(|p| p.depth).collect();
        let depths = if depths.iter().any(|&d| d != 0.0) {
            Some(depths)
        } else {
            None
        };
        Mesh { lons, lats, depths }
    }

    pub fn len(&self) -> usize {
        self.lons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lons.is_empty()
    }

    pub fn lons(&self) -> &[f64] {
        &self.lons
    }

    pub fn lats(&self) -> &[f64] {
        &self.lats
    }

    pub fn depths(&self) -> Option<&[f64]> {
        self.depths.as_deref()
    }

    pub fn get(&self, i: usize) -> Point {
        let depth = self.depths.as_ref().map_or(0.0, |d| d[i]);
        Point::new_unchecked(self.lons[i], self.lats[i], depth)
    }

    pub fn iter(&self) -> impl Iterator<Item = Point> + '_ {
        (0..self.len()).map(|i| self.get(i))
    }

    /// Minimum distance from the mesh to a point, in km. Brute force over
    /// every mesh point, combining horizontal and vertical separation the
    /// same way [`Point::distance`] does.
    pub fn get_min_distance(&self, point: &Point) -> f64 {
        self.iter()
            .map(|p| p.distance(point))
            .fold(f64::INFINITY, f64::min)
    }

    /// The mesh point closest to the given one.
    pub fn get_closest_point(&self, point: &Point) -> Point {
        let mut best = self.get(0);
        let mut best_dist = best.distance(point);
        for candidate in self.iter().skip(1) {
            let dist = candidate.distance(point);
            if dist < best_dist {
                best = candidate;
                best_dist = dist;
            }
        }
        best
    }
}

/// Cartesian-space decomposition of a rectangular mesh into triangles, two
/// per grid cell sharing the ↗ diagonal.
///
/// All vector arrays are stored row-major; `point(i, j)` addresses the
/// grid, edge arrays are one shorter in the dimension they span.
pub struct Triangulation {
    rows: usize,
    cols: usize,
    points: Vec<Vector3<f64>>,
    along_azimuth: Vec<Vector3<f64>>,
    updip: Vec<Vector3<f64>>,
    diag: Vec<Vector3<f64>>,
}

impl Triangulation {
    /// Position vector of grid point `(i, j)`, 1 km units.
    pub fn point(&self, i: usize, j: usize) -> Vector3<f64> {
        debug_assert!(i < self.rows && j < self.cols);
        self.points[i * self.cols + j]
    }

    /// Vector from point `(i, j)` to the next one in the same row.
    pub fn along_azimuth(&self, i: usize, j: usize) -> Vector3<f64> {
        debug_assert!(i < self.rows && j < self.cols - 1);
        self.along_azimuth[i * (self.cols - 1) + j]
    }

    /// Vector from point `(i + 1, j)` up to point `(i, j)`.
    pub fn updip(&self, i: usize, j: usize) -> Vector3<f64> {
        debug_assert!(i < self.rows - 1 && j < self.cols);
        self.updip[i * self.cols + j]
    }

    /// Vector across cell `(i, j)`, bottom-left corner to top-right.
    pub fn diag(&self, i: usize, j: usize) -> Vector3<f64> {
        debug_assert!(i < self.rows - 1 && j < self.cols - 1);
        self.diag[i * (self.cols - 1) + j]
    }
}

/// A grid of points where indexes relate neighbours: rows follow one
/// another down the dip of a surface, columns along its strike.
#[derive(Debug, Clone)]
pub struct RectangularMesh {
    mesh: Mesh,
    rows: usize,
    cols: usize,
}

impl RectangularMesh {
    /// Builds a rectangular mesh from rows of points. All rows must have
    /// the same length.
    pub fn from_points_list(rows: &[Vec<Point>]) -> Result<Self> {
        if rows.is_empty() || rows[0].is_empty() {
            return Err(GeometryError::InvalidSurface(
                "at least one non-empty row of points is required",
            ));
        }
        let num_cols = rows[0].len();
        if rows.iter().any(|row| row.len() != num_cols) {
            return Err(GeometryError::InvalidSurface(
                "rows of points are not of uniform length",
            ));
        }
        let points: Vec<Point> = rows.iter().flatten().copied().collect();
        Ok(RectangularMesh {
            mesh: Mesh::from_points_list(&points),
            rows: rows.len(),
            cols: num_cols,
        })
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn col_count(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.mesh.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mesh.is_empty()
    }

    /// The underlying flat point collection, row-major.
    pub fn points(&self) -> &Mesh {
        &self.mesh
    }

    pub fn get(&self, i: usize, j: usize) -> Point {
        debug_assert!(i < self.rows && j < self.cols);
        self.mesh.get(i * self.cols + j)
    }

    pub fn iter(&self) -> impl Iterator<Item = Point> + '_ {
        self.mesh.iter()
    }

    pub fn get_min_distance(&self, point: &Point) -> f64 {
        self.mesh.get_min_distance(point)
    }

    pub fn get_closest_point(&self, point: &Point) -> Point {
        self.mesh.get_closest_point(point)
    }

    /// Copies out the given range of rows as a new mesh.
    pub fn sub_mesh(&self, rows: std::ops::Range<usize>) -> RectangularMesh {
        debug_assert!(rows.end <= self.rows && !rows.is_empty());
        let start = rows.start * self.cols;
        let end = rows.end * self.cols;
        let depths = self
            .mesh
            .depths
            .as_ref()
            .map(|d| d[start..end].to_vec());
        RectangularMesh {
            mesh: Mesh::new(
                self.mesh.lons[start..end].to_vec(),
                self.mesh.lats[start..end].to_vec(),
                depths,
            ),
            rows: rows.len(),
            cols: self.cols,
        }
    }

    /// Extracts the points lying on the border of the grid, walking the
    /// perimeter clockwise from the top-left corner.
    ///
    /// Without depths a purely vertical mesh (bottom row repeating the top
    /// one) collapses to its top row, so points are not duplicated.
    fn get_bounding_mesh(&self, with_depths: bool) -> Mesh {
        let with_depths = with_depths && self.mesh.depths.is_some();
        let lons = &self.mesh.lons;
        let lats = &self.mesh.lats;
        let idx = |i: usize, j: usize| i * self.cols + j;

        if self.rows == 1 || self.cols == 1 {
            return Mesh::new(
                lons.clone(),
                lats.clone(),
                if with_depths {
                    self.mesh.depths.clone()
                } else {
                    None
                },
            );
        }

        let top_equals_bottom = (0..self.cols).all(|j| {
            lons[idx(0, j)] == lons[idx(self.rows - 1, j)]
                && lats[idx(0, j)] == lats[idx(self.rows - 1, j)]
        });
        if !with_depths && top_equals_bottom {
            return Mesh::new(
                lons[..self.cols].to_vec(),
                lats[..self.cols].to_vec(),
                None,
            );
        }

        let mut order = Vec::with_capacity(2 * self.rows + 2 * self.cols - 4);
        for j in 0..self.cols {
            order.push(idx(0, j));
        }
        for i in 1..self.rows - 1 {
            order.push(idx(i, self.cols - 1));
        }
        for j in (0..self.cols).rev() {
            order.push(idx(self.rows - 1, j));
        }
        for i in (1..self.rows - 1).rev() {
            order.push(idx(i, 0));
        }

        let blons = order.iter().map(|&k| lons[k]).collect();
        let blats = order.iter().map(|&k| lats[k]).collect();
        let bdepths = if with_depths {
            let depths = self.mesh.depths.as_ref().unwrap();
            Some(order.iter().map(|&k| depths[k]).collect())
        } else {
            None
        };
        Mesh::new(blons, blats, bdepths)
    }

    /// Joyner-Boore distance: the shortest distance from a site to the
    /// surface projection of the mesh, in km. Zero if the site falls
    /// inside the projected footprint or on its border; the site's depth
    /// is ignored.
    ///
    /// Measured on the orthographic projection of the perimeter points,
    /// which is accurate to about a kilometer out to several hundred km.
    /// Past [`JB_PROJECTION_THRESHOLD`] (or when the site falls outside
    /// the projection's validity range altogether) the numerical
    /// great-circle minimum over the perimeter is used instead.
    pub fn get_joyner_boore_distance(&self, point: &Point) -> Result<f64> {
        let bounding_mesh = self.get_bounding_mesh(false);
        let surface_point = Point::new_unchecked(point.longitude, point.latitude, 0.0);
        let proj =
            OrthographicProjection::from_lons_lats(bounding_mesh.lons(), bounding_mesh.lats())?;
        let site_2d = match proj.project(point.longitude, point.latitude) {
            Ok((x, y)) => geo_types::Point::new(x, y),
            Err(GeometryError::OutsideProjection { .. }) => {
                return Ok(bounding_mesh.get_min_distance(&surface_point));
            }
            Err(err) => return Err(err),
        };
        let (xx, yy) = proj.project_all(bounding_mesh.lons(), bounding_mesh.lats())?;
        let ring: Vec<_> = xx
            .iter()
            .zip(&yy)
            .map(|(&x, &y)| coord! { x: x, y: y })
            .collect();
        // Degenerate perimeters keep their degenerate geometry.
        let dist = match ring.len() {
            1 => geo_types::Point::from(ring[0]).euclidean_distance(&site_2d),
            2 => LineString::from(ring).euclidean_distance(&site_2d),
            _ => PlanarPolygon::new(LineString::from(ring), vec![]).euclidean_distance(&site_2d),
        };
        if dist < JB_PROJECTION_THRESHOLD {
            Ok(dist)
        } else {
            Ok(bounding_mesh.get_min_distance(&surface_point))
        }
    }

    /// The middle point of the grid: the center cell point when both
    /// dimensions are odd, otherwise the geodetic midpoint of the two or
    /// four central points.
    pub fn get_middle_point(&self) -> Point {
        let mid_row = self.rows / 2;
        let (p1, p2) = if self.rows % 2 == 1 {
            let mid_col = self.cols / 2;
            if self.cols % 2 == 1 {
                return self.get(mid_row, mid_col);
            }
            (self.get(mid_row, mid_col - 1), self.get(mid_row, mid_col))
        } else {
            (
                self.sub_mesh(mid_row - 1..mid_row).get_middle_point(),
                self.sub_mesh(mid_row..mid_row + 1).get_middle_point(),
            )
        };
        let (lon, lat) = utils::get_middle_point(p1.longitude, p1.latitude, p2.longitude, p2.latitude);
        Point::new_unchecked(lon, lat, (p1.depth + p2.depth) / 2.0)
    }

    /// Converts the grid to Cartesian space and builds the edge vectors of
    /// the triangles covering it.
    pub fn triangulate(&self) -> Triangulation {
        let points: Vec<Vector3<f64>> = self
            .iter()
            .map(|p| utils::spherical_to_cartesian(p.longitude, p.latitude, p.depth))
            .collect();
        let idx = |i: usize, j: usize| i * self.cols + j;
        let mut along_azimuth = Vec::with_capacity(self.rows * (self.cols - 1));
        for i in 0..self.rows {
            for j in 0..self.cols - 1 {
                along_azimuth.push(points[idx(i, j + 1)] - points[idx(i, j)]);
            }
        }
        let mut updip = Vec::with_capacity((self.rows - 1) * self.cols);
        for i in 0..self.rows - 1 {
            for j in 0..self.cols {
                updip.push(points[idx(i, j)] - points[idx(i + 1, j)]);
            }
        }
        let mut diag = Vec::with_capacity((self.rows - 1) * (self.cols - 1));
        for i in 0..self.rows - 1 {
            for j in 0..self.cols - 1 {
                diag.push(points[idx(i, j + 1)] - points[idx(i + 1, j)]);
            }
        }
        Triangulation {
            rows: self.rows,
            cols: self.cols,
            points,
            along_azimuth,
            updip,
            diag,
        }
    }

    /// Weighted average inclination and azimuth of the mesh surface, both
    /// in decimal degrees, inclination in [0, 90] and azimuth in [0, 360).
    ///
    /// Each triangle of the triangulated mesh contributes its inclination
    /// and azimuth weighted by its area; angles are combined as circular
    /// quantities. The azimuth is always chosen so that the inclination
    /// does not exceed 90 degrees, flipping both when it would.
    pub fn get_mean_inclination_and_azimuth(&self) -> Result<(f64, f64)> {
        if self.rows == 1 || self.cols == 1 {
            return Err(GeometryError::InvalidSurface(
                "inclination and azimuth are only defined for a mesh of more \
                 than one row and more than one column of points",
            ));
        }
        if let Some(depths) = self.mesh.depths() {
            debug_assert!(
                (0..(self.rows - 1) * self.cols)
                    .all(|k| depths[k + self.cols] >= depths[k]),
                "mesh rows must get deeper from top to bottom"
            );
        }

        let tri = self.triangulate();
        let z_unit = Vector3::new(0.0, 0.0, 1.0);

        let mut incl_xx = 0.0;
        let mut incl_yy = 0.0;
        let mut az_xx = 0.0;
        let mut az_yy = 0.0;

        let mut accumulate = |corner: Vector3<f64>,
                              e1: Vector3<f64>,
                              e2: Vector3<f64>,
                              diag: Vector3<f64>| {
            let area = utils::triangle_area(&e1, &e2, &diag);
            let normal = utils::normalized(&e1.cross(&e2));

            // The cosine of the triangle's inclination is the projection of
            // its plane normal onto the local vertical.
            let vertical = utils::normalized(&corner);
            let incl_cos = vertical.dot(&normal).clamp(-1.0, 1.0);
            incl_xx += area * incl_cos;
            incl_yy += area * (1.0 - incl_cos * incl_cos).sqrt();

            // Local east and north directions at the corner give the two
            // reference planes for the azimuth of the row edge.
            let east = utils::normalized(&(corner + z_unit).cross(&corner));
            let north = utils::normalized(&corner.cross(&east));
            let edge = utils::normalized(&e1);
            // The sign picks the hemisphere: edges projecting negatively on
            // the east direction point west. Edges pointing strictly north
            // or south keep the positive sign.
            let sign = if edge.dot(&east) < 0.0 { -1.0 } else { 1.0 };
            let az_cos = edge.dot(&north).clamp(-1.0, 1.0);
            az_xx += area * az_cos;
            az_yy += area * (1.0 - az_cos * az_cos).sqrt() * sign;
        };

        for i in 0..self.rows - 1 {
            for j in 0..self.cols - 1 {
                let diag = tri.diag(i, j);
                // top-left triangle of the cell
                accumulate(
                    tri.point(i, j),
                    tri.along_azimuth(i, j),
                    tri.updip(i, j),
                    diag,
                );
                // bottom-right triangle
                accumulate(
                    tri.point(i + 1, j + 1),
                    tri.along_azimuth(i + 1, j),
                    tri.updip(i, j + 1),
                    diag,
                );
            }
        }

        let mut inclination = if self.mesh.depths.is_none() {
            0.0
        } else {
            incl_yy.atan2(incl_xx).to_degrees()
        };
        let mut azimuth = az_yy.atan2(az_xx).to_degrees();
        if azimuth < 0.0 {
            azimuth += 360.0;
        }
        if inclination > 90.0 {
            // Flip the azimuthal direction so the inclination lands back in
            // the [0, 90] range.
            inclination = 180.0 - inclination;
            azimuth = (azimuth + 180.0) % 360.0;
        }
        Ok((inclination, azimuth))
    }

    /// Representative center, length, width and area of every mesh cell.
    ///
    /// Each cell is split into its two triangles; centroids and edge
    /// lengths are averaged weighted by triangle area. Returned arrays are
    /// row-major over the `(rows - 1) x (cols - 1)` cell grid.
    pub fn get_cell_dimensions(&self) -> (Vec<Vector3<f64>>, Vec<f64>, Vec<f64>, Vec<f64>) {
        let tri = self.triangulate();
        let cells = (self.rows - 1) * (self.cols - 1);
        let mut centers = Vec::with_capacity(cells);
        let mut lengths = Vec::with_capacity(cells);
        let mut widths = Vec::with_capacity(cells);
        let mut areas = Vec::with_capacity(cells);
        for i in 0..self.rows - 1 {
            for j in 0..self.cols - 1 {
                let diag = tri.diag(i, j);
                let top = tri.along_azimuth(i, j);
                let left = tri.updip(i, j);
                let tl_area = utils::triangle_area(&top, &left, &diag);
                let bottom = tri.along_azimuth(i + 1, j);
                let right = tri.updip(i, j + 1);
                let br_area = utils::triangle_area(&bottom, &right, &diag);
                let area = tl_area + br_area;

                let tl_center =
                    (tri.point(i, j) + tri.point(i, j + 1) + tri.point(i + 1, j)) / 3.0;
                let br_center =
                    (tri.point(i, j + 1) + tri.point(i + 1, j) + tri.point(i + 1, j + 1)) / 3.0;

                centers.push((tl_center * tl_area + br_center * br_area) / area);
                lengths.push((top.norm() * tl_area + bottom.norm() * br_area) / area);
                widths.push((left.norm() * tl_area + right.norm() * br_area) / area);
                areas.push(area);
            }
        }
        (centers, lengths, widths, areas)
    }

    /// Mean width of the mesh, in km: column widths averaged with weights
    /// proportional to the column's mean cell length.
    pub fn get_mean_width(&self) -> Result<f64> {
        if self.rows == 1 || self.cols == 1 {
            return Err(GeometryError::InvalidSurface(
                "mean width is only defined for a mesh of more than one row \
                 and more than one column of points",
            ));
        }
        let (_, cell_length, cell_width, cell_area) = self.get_cell_dimensions();
        let cell_cols = self.cols - 1;
        let cell_rows = self.rows - 1;
        let mut weighted_sum = 0.0;
        let mut weight_sum = 0.0;
        for j in 0..cell_cols {
            let mut width = 0.0;
            let mut length_by_area = 0.0;
            let mut area = 0.0;
            for i in 0..cell_rows {
                let k = i * cell_cols + j;
                width += cell_width[k];
                length_by_area += cell_length[k] * cell_area[k];
                area += cell_area[k];
            }
            let mean_length = length_by_area / area;
            weighted_sum += width * mean_length;
            weight_sum += mean_length;
        }
        Ok(weighted_sum / weight_sum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodetic;

    fn point(lon: f64, lat: f64, depth: f64) -> Point {
        Point::new(lon, lat, depth).unwrap()
    }

    fn grid(rows: usize, cols: usize, depth_step: f64) -> RectangularMesh {
        let rows: Vec<Vec<Point>> = (0..rows)
            .map(|i| {
                (0..cols)
                    .map(|j| point(j as f64 * 0.1, -(i as f64) * 0.1, i as f64 * depth_step))
                    .collect()
            })
            .collect();
        RectangularMesh::from_points_list(&rows).unwrap()
    }

    #[test]
    fn from_points_list_drops_zero_depths() {
        let mesh = Mesh::from_points_list(&[point(0.0, 0.0, 0.0), point(1.0, 1.0, 0.0)]);
        assert!(mesh.depths().is_none());
        let mesh = Mesh::from_points_list(&[point(0.0, 0.0, 0.0), point(1.0, 1.0, 2.0)]);
        assert_eq!(mesh.depths(), Some(&[0.0, 2.0][..]));
    }

    #[test]
    fn min_distance_and_closest_point() {
        let points = [point(0.0, 0.0, 0.0), point(1.0, 0.0, 0.0), point(2.0, 0.0, 5.0)];
        let mesh = Mesh::from_points_list(&points);
        let site = point(2.0, 0.1, 0.0);
        let expected = points
            .iter()
            .map(|p| p.distance(&site))
            .fold(f64::INFINITY, f64::min);
        assert_eq!(mesh.get_min_distance(&site), expected);
        assert_eq!(mesh.get_closest_point(&site), points[2]);
    }

    #[test]
    fn rectangular_mesh_requires_uniform_rows() {
        let rows = vec![
            vec![point(0.0, 0.0, 0.0), point(1.0, 0.0, 0.0)],
            vec![point(0.0, 1.0, 0.0)],
        ];
        assert!(RectangularMesh::from_points_list(&rows).is_err());
    }

    #[test]
    fn bounding_mesh_walks_perimeter() {
        let mesh = grid(3, 4, 1.0);
        let bounding = mesh.get_bounding_mesh(true);
        // 3x4 grid has 10 border points
        assert_eq!(bounding.len(), 10);
        assert_eq!(bounding.get(0), mesh.get(0, 0));
        assert_eq!(bounding.get(3), mesh.get(0, 3));
        assert_eq!(bounding.get(4), mesh.get(1, 3));
        assert_eq!(bounding.get(5), mesh.get(2, 3));
        assert_eq!(bounding.get(8), mesh.get(2, 0));
        assert_eq!(bounding.get(9), mesh.get(1, 0));
        // interior point must not appear
        let interior = mesh.get(1, 1);
        assert!(bounding.iter().all(|p| p != interior));
    }

    #[test]
    fn bounding_mesh_collapses_vertical_mesh() {
        // both rows share the same surface trace, only depths differ
        let rows = vec![
            vec![point(0.0, 0.0, 1.0), point(0.1, 0.0, 1.0), point(0.2, 0.0, 1.0)],
            vec![point(0.0, 0.0, 5.0), point(0.1, 0.0, 5.0), point(0.2, 0.0, 5.0)],
        ];
        let mesh = RectangularMesh::from_points_list(&rows).unwrap();
        let bounding = mesh.get_bounding_mesh(false);
        assert_eq!(bounding.len(), 3);
        assert!(bounding.depths().is_none());
    }

    #[test]
    fn joyner_boore_zero_inside_footprint() {
        let mesh = grid(5, 5, 2.0);
        let inside = point(0.2, -0.2, 0.0);
        assert_eq!(mesh.get_joyner_boore_distance(&inside).unwrap(), 0.0);
    }

    #[test]
    fn joyner_boore_matches_edge_distance() {
        let mesh = grid(5, 5, 2.0);
        // site due east of the eastern edge at the same latitude as a row
        let site = point(1.4, -0.2, 0.0);
        let jb = mesh.get_joyner_boore_distance(&site).unwrap();
        let expected = geodetic::geodetic_distance(0.4, -0.2, 1.4, -0.2);
        assert!((jb - expected).abs() < 0.5, "{jb} vs {expected}");
    }

    #[test]
    fn joyner_boore_ignores_site_depth() {
        let mesh = grid(5, 5, 2.0);
        let shallow = point(1.4, -0.2, 0.0);
        let deep = point(1.4, -0.2, 30.0);
        let d1 = mesh.get_joyner_boore_distance(&shallow).unwrap();
        let d2 = mesh.get_joyner_boore_distance(&deep).unwrap();
        assert!((d1 - d2).abs() < 1e-9);
    }

    #[test]
    fn joyner_boore_far_site_falls_back() {
        let mesh = grid(2, 2, 2.0);
        let site = point(60.0, -30.0, 0.0);
        let jb = mesh.get_joyner_boore_distance(&site).unwrap();
        let expected = mesh
            .get_bounding_mesh(false)
            .get_min_distance(&point(60.0, -30.0, 0.0));
        assert!((jb - expected).abs() < 1e-9);
    }

    #[test]
    fn middle_point_odd_grid() {
        let mesh = grid(3, 3, 1.0);
        assert_eq!(mesh.get_middle_point(), mesh.get(1, 1));
    }

    #[test]
    fn middle_point_even_grid() {
        let rows = vec![
            vec![point(0.0, 0.0, 0.0), point(1.0, 0.0, 0.0)],
            vec![point(0.0, -1.0, 4.0), point(1.0, -1.0, 4.0)],
        ];
        let mesh = RectangularMesh::from_points_list(&rows).unwrap();
        let middle = mesh.get_middle_point();
        assert!((middle.longitude - 0.5).abs() < 1e-3);
        assert!((middle.latitude + 0.5).abs() < 1e-3);
        assert!((middle.depth - 2.0).abs() < 1e-9);
    }

    #[test]
    fn mean_inclination_of_horizontal_mesh_is_zero() {
        let rows = vec![
            vec![point(0.0, 0.1, 5.0), point(0.1, 0.1, 5.0)],
            vec![point(0.0, 0.0, 5.0), point(0.1, 0.0, 5.0)],
        ];
        let mesh = RectangularMesh::from_points_list(&rows).unwrap();
        let (inclination, _) = mesh.get_mean_inclination_and_azimuth().unwrap();
        assert!(inclination < 0.5, "{inclination}");
    }

    #[test]
    fn mean_inclination_and_azimuth_of_vertical_mesh() {
        // vertical plane striking north
        let rows = vec![
            vec![point(0.0, 0.0, 1.0), point(0.0, 0.1, 1.0), point(0.0, 0.2, 1.0)],
            vec![point(0.0, 0.0, 5.0), point(0.0, 0.1, 5.0), point(0.0, 0.2, 5.0)],
        ];
        let mesh = RectangularMesh::from_points_list(&rows).unwrap();
        let (inclination, azimuth) = mesh.get_mean_inclination_and_azimuth().unwrap();
        assert!((inclination - 90.0).abs() < 0.1, "{inclination}");
        assert!(azimuth < 0.1 || azimuth > 359.9, "{azimuth}");
    }

    #[test]
    fn mean_inclination_of_dipping_mesh() {
        // top edge at the surface, bottom edge 10 km down and ~10 km south:
        // a plane dipping 45 degrees
        let bottom_lat = -(10.0 / 111.195);
        let rows = vec![
            vec![point(0.0, 0.0, 0.0), point(0.1, 0.0, 0.0)],
            vec![point(0.0, bottom_lat, 10.0), point(0.1, bottom_lat, 10.0)],
        ];
        let mesh = RectangularMesh::from_points_list(&rows).unwrap();
        let (inclination, azimuth) = mesh.get_mean_inclination_and_azimuth().unwrap();
        assert!((inclination - 45.0).abs() < 0.5, "{inclination}");
        assert!((azimuth - 90.0).abs() < 0.5, "{azimuth}");
    }

    #[test]
    fn cell_dimensions_of_uniform_grid() {
        let rows = vec![
            vec![point(0.0, 0.1, 0.0), point(0.1, 0.1, 0.0)],
            vec![point(0.0, 0.0, 0.0), point(0.1, 0.0, 0.0)],
        ];
        let mesh = RectangularMesh::from_points_list(&rows).unwrap();
        let (centers, lengths, widths, areas) = mesh.get_cell_dimensions();
        assert_eq!(centers.len(), 1);
        let expected_length = geodetic::geodetic_distance(0.0, 0.1, 0.1, 0.1);
        let expected_width = geodetic::geodetic_distance(0.0, 0.0, 0.0, 0.1);
        assert!((lengths[0] - expected_length).abs() < 0.05, "{}", lengths[0]);
        assert!((widths[0] - expected_width).abs() < 0.05, "{}", widths[0]);
        assert!((areas[0] - expected_length * expected_width).abs() < 1.0);
    }

    #[test]
    fn mean_width_of_constant_width_mesh() {
        let mesh = grid(4, 6, 3.0);
        let width = mesh.get_mean_width().unwrap();
        // three rows of cells, each spanning 0.1 degree of latitude plus
        // 3 km of depth
        let row_width = ((111.195f64 * 0.1).powi(2) + 9.0).sqrt();
        assert!((width - 3.0 * row_width).abs() < 0.3, "{width}");
    }
}
