//! Slit occlusion test.
//!
//! A hit point on the shell is clear when it falls inside the slit opening.
//! On the front side the slit is an angular window around the dome azimuth
//! whose half-width depends on the elevation of the hit point. On the rear
//! side (beyond +/-90 deg from the dome azimuth) the slit is treated as a flat
//! square opening of side `slit_width` around the vertical axis.

use nalgebra::Point3;
use qtty::{Degree, Degrees, Radians};
use serde::{Deserialize, Serialize};

use super::DomeGeometry;
use crate::error::{GeometryFault, PointDisplay};
use crate::geometry::Pose;

/// Outcome of the slit test for one ray.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Occlusion {
    Clear,
    Blocked,
}

impl Occlusion {
    pub fn is_blocked(self) -> bool {
        matches!(self, Occlusion::Blocked)
    }
}

/// Azimuth of a point seen from the dome axis, north-clockwise in `[0, 360)`.
///
/// North is `+y` and east is `+x`, hence `atan2(x, y)`.
pub fn ray_azimuth(point: &Point3<f64>) -> Degrees {
    Radians::new(point.x.atan2(point.y)).to::<Degree>().wrap_pos()
}

/// Decide whether a shell hit point lies inside the slit.
///
/// Returns a fault for non-finite input; callers classify faults as blocked.
pub fn classify(
    dome: &DomeGeometry,
    hit: &Point3<f64>,
    dome_azimuth: Degrees,
) -> Result<Occlusion, GeometryFault> {
    if !(hit.x.is_finite() && hit.y.is_finite() && hit.z.is_finite()) {
        return Err(GeometryFault::NonFiniteIntersection(PointDisplay([
            hit.x, hit.y, hit.z,
        ])));
    }
    if !dome_azimuth.value().is_finite() {
        return Err(GeometryFault::NonFiniteAzimuth(dome_azimuth.value()));
    }

    let dome_azimuth = dome_azimuth.wrap_pos();
    let relative = ray_azimuth(hit).signed_separation(dome_azimuth).value();

    let elevation = (hit.z - dome.extent).atan2(hit.x.hypot(hit.y));
    let above_wall = hit.z > dome.extent;
    let half_slit = dome.half_slit();

    let chord_sq = (dome.radius * elevation.cos()).powi(2) - half_slit * half_slit;
    if chord_sq < 0.0 {
        // The slit spans the whole parallel at this elevation.
        return Ok(if above_wall {
            Occlusion::Clear
        } else {
            Occlusion::Blocked
        });
    }

    let half_width = 90.0 - chord_sq.sqrt().atan2(half_slit).to_degrees();
    if !half_width.is_finite() {
        return Err(GeometryFault::NonFiniteSlitWidth {
            elevation_deg: elevation.to_degrees(),
        });
    }

    let in_slit = relative.abs() < half_width;
    if above_wall && in_slit {
        return Ok(Occlusion::Clear);
    }

    if !in_slit && relative.abs() > 90.0 {
        let local = Pose::rotate_z(dome_azimuth).apply(hit);
        if local.x.abs() < half_slit && local.y.abs() < half_slit {
            return Ok(Occlusion::Clear);
        }
    }

    Ok(Occlusion::Blocked)
}
