//! Geometry engine for probabilistic seismic hazard analysis: geodetic
//! primitives, rupture surface models and the source-to-site distance
//! metrics ground-motion models consume.

pub mod error;
pub mod geodetic;
pub mod geometry;
pub mod mesh;
pub mod rupture;
pub mod surface;
pub mod utils;

pub use error::{GeometryError, Result};
pub use geometry::{Line, Point, Polygon};
pub use mesh::{Mesh, RectangularMesh};
pub use rupture::{DistanceContext, Rupture};
pub use surface::{ComplexFaultSurface, PlanarSurface, SimpleFaultSurface, Surface};
