//! Dome shell model: ray intersection and slit occlusion.
//!
//! The dome interior is a "capsule": a vertical cylinder of radius `R` from
//! the floor up to the wall extent `E`, closed by a hemisphere of radius `R`
//! centered at `(0, 0, E)`. The slit is a strip of constant width running over
//! the cap, facing the dome azimuth.

pub mod intersection;
pub mod slit;

use serde::{Deserialize, Serialize};

pub use intersection::{intersect, intersection_point};
pub use slit::{classify, ray_azimuth, Occlusion};

/// Immutable dome dimensions, in the same linear unit as the mount.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomeGeometry {
    pub radius: f64,
    /// Height of the cylindrical wall below the hemispherical cap.
    pub extent: f64,
    pub slit_width: f64,
}

impl DomeGeometry {
    pub fn new(radius: f64, extent: f64, slit_width: f64) -> Self {
        Self {
            radius,
            extent,
            slit_width,
        }
    }

    /// Same dome with a different slit width.
    pub fn with_slit_width(self, slit_width: f64) -> Self {
        Self { slit_width, ..self }
    }

    pub fn half_slit(&self) -> f64 {
        0.5 * self.slit_width
    }
}
