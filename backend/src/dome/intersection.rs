//! Ray / capsule intersection.
//!
//! Rays start inside the dome, so the solver always takes the exit root.
//! A missing real root (negative discriminant), a downward vertical ray, or a
//! non-positive parameter is reported as `None`; the caller treats such rays
//! as blocked.

use nalgebra::{Point3, Vector3};

use super::DomeGeometry;

/// Relative size of the horizontal direction component below which a ray is
/// treated as vertical.
const VERTICAL_TOLERANCE: f64 = 1e-8;

/// Parameter `t` of the first exit through the dome shell, if any.
///
/// The direction does not need to be normalized; the hit point is
/// `origin + t * direction`.
pub fn intersect(dome: &DomeGeometry, origin: &Point3<f64>, direction: &Vector3<f64>) -> Option<f64> {
    let r_sq = dome.radius * dome.radius;
    let horizontal = direction.xy().norm();

    let t = if horizontal <= VERTICAL_TOLERANCE * direction.norm() {
        vertical_cap_hit(dome, origin, direction.z, r_sq)?
    } else {
        let t_wall = wall_hit(origin, direction, r_sq)?;
        if origin.z + t_wall * direction.z >= dome.extent {
            cap_hit(dome, origin, direction, r_sq)?
        } else {
            t_wall
        }
    };

    (t.is_finite() && t > 0.0).then_some(t)
}

/// World point of an intersection found by [`intersect`].
pub fn intersection_point(origin: &Point3<f64>, direction: &Vector3<f64>, t: f64) -> Point3<f64> {
    origin + direction * t
}

fn vertical_cap_hit(dome: &DomeGeometry, origin: &Point3<f64>, dz: f64, r_sq: f64) -> Option<f64> {
    if dz <= 0.0 {
        return None;
    }
    let radicand = r_sq - origin.x * origin.x - origin.y * origin.y;
    if radicand < 0.0 {
        return None;
    }
    let z = dome.extent + radicand.sqrt();
    Some((z - origin.z) / dz)
}

fn wall_hit(origin: &Point3<f64>, direction: &Vector3<f64>, r_sq: f64) -> Option<f64> {
    let a2 = direction.x * direction.x + direction.y * direction.y;
    let a1 = origin.x * direction.x + origin.y * direction.y;
    let a0 = origin.x * origin.x + origin.y * origin.y - r_sq;

    larger_root(a2, a1, a0)
}

fn cap_hit(dome: &DomeGeometry, origin: &Point3<f64>, direction: &Vector3<f64>, r_sq: f64) -> Option<f64> {
    let dz0 = origin.z - dome.extent;
    let a2 = direction.norm_squared();
    let a1 = origin.x * direction.x + origin.y * direction.y + dz0 * direction.z;
    let a0 = origin.x * origin.x + origin.y * origin.y + dz0 * dz0 - r_sq;

    larger_root(a2, a1, a0)
}

/// Larger root of `a2 t^2 + 2 a1 t + a0 = 0`.
fn larger_root(a2: f64, a1: f64, a0: f64) -> Option<f64> {
    let delta = a1 * a1 - a0 * a2;
    if delta < 0.0 {
        return None;
    }
    Some((-a1 + delta.sqrt()) / a2)
}
