//! Earthquake rupture and the distance context consumed by ground-motion
//! models.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::Point;
use crate::surface::Surface;

/// An earthquake rupture: a magnitude and a hypocenter tied to the
/// geometric surface the rupture occurred on.
#[derive(Debug, Clone)]
pub struct Rupture<S> {
    pub magnitude: f64,
    pub hypocenter: Point,
    pub surface: S,
}

/// Flat bag of the distance and orientation parameters ground-motion
/// prediction equations take as input, computed for one site. Distances
/// in km, angles in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceContext {
    /// Closest distance to the rupture surface.
    pub rrup: f64,
    /// Closest distance to the surface projection of the rupture.
    pub rjb: f64,
    /// Signed distance to the extended strike line, positive on the
    /// hanging-wall side.
    pub rx: f64,
    /// Depth to the top edge of the rupture.
    pub ztor: f64,
    pub strike: f64,
    pub dip: f64,
}

impl<S: Surface> Rupture<S> {
    pub fn new(magnitude: f64, hypocenter: Point, surface: S) -> Self {
        Rupture {
            magnitude,
            hypocenter,
            surface,
        }
    }

    /// Computes every distance metric of this rupture for one site.
    pub fn make_context(&self, site: &Point) -> Result<DistanceContext> {
        Ok(DistanceContext {
            rrup: self.surface.get_min_distance(site),
            rjb: self.surface.get_joyner_boore_distance(site)?,
            rx: self.surface.get_rx_distance(site),
            ztor: self.surface.get_top_edge_depth(),
            strike: self.surface.get_strike(),
            dip: self.surface.get_dip(),
        })
    }
}
