//! Homogeneous rigid transforms.
//!
//! A [`Pose`] wraps a 4x4 homogeneous matrix. Poses chain left-to-right from
//! the dome origin outward: `a.compose(&b)` first applies `b`, then `a`, to a
//! point expressed in `b`'s frame.

use std::ops::Mul;

use nalgebra::{Matrix4, Point3, Rotation3, Unit, Vector3};
use qtty::{Degrees, Radian};

/// Principal axis of a right-handed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn unit(self) -> Unit<Vector3<f64>> {
        match self {
            Axis::X => Vector3::x_axis(),
            Axis::Y => Vector3::y_axis(),
            Axis::Z => Vector3::z_axis(),
        }
    }
}

/// Rigid transform (rotation + translation) as a homogeneous matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose(Matrix4<f64>);

impl Pose {
    pub fn identity() -> Self {
        Self(Matrix4::identity())
    }

    /// Pure translation by `(x, y, z)`.
    pub fn translate(x: f64, y: f64, z: f64) -> Self {
        Self(Matrix4::new_translation(&Vector3::new(x, y, z)))
    }

    /// Right-handed rotation about a principal axis.
    ///
    /// # Examples
    ///
    /// ```
    /// use dome_vignetting::geometry::{Axis, Pose};
    /// use nalgebra::Point3;
    /// use qtty::Degrees;
    ///
    /// let quarter = Pose::rotate(Axis::Z, Degrees::new(90.0));
    /// let p = quarter.apply(&Point3::new(1.0, 0.0, 0.0));
    /// assert!((p.y - 1.0).abs() < 1e-12);
    /// ```
    pub fn rotate(axis: Axis, angle: Degrees) -> Self {
        let radians = angle.to::<Radian>().value();
        Self(Rotation3::from_axis_angle(&axis.unit(), radians).to_homogeneous())
    }

    pub fn rotate_x(angle: Degrees) -> Self {
        Self::rotate(Axis::X, angle)
    }

    pub fn rotate_y(angle: Degrees) -> Self {
        Self::rotate(Axis::Y, angle)
    }

    pub fn rotate_z(angle: Degrees) -> Self {
        Self::rotate(Axis::Z, angle)
    }

    /// Matrix product `self * other` (not commutative).
    pub fn compose(&self, other: &Pose) -> Pose {
        Pose(self.0 * other.0)
    }

    /// Map a point from this pose's local frame into the parent frame.
    pub fn apply(&self, point: &Point3<f64>) -> Point3<f64> {
        self.0.transform_point(point)
    }

    /// Map a direction (rotation only, translation ignored).
    pub fn apply_vector(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        self.0.transform_vector(vector)
    }

    /// Position of the local origin in the parent frame.
    pub fn translation(&self) -> Vector3<f64> {
        Vector3::new(self.0[(0, 3)], self.0[(1, 3)], self.0[(2, 3)])
    }

    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.0
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for Pose {
    type Output = Pose;

    fn mul(self, rhs: Pose) -> Pose {
        self.compose(&rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_translate_moves_origin() {
        let pose = Pose::translate(1.0, -2.0, 3.5);
        let p = pose.apply(&Point3::origin());
        assert_eq!(p, Point3::new(1.0, -2.0, 3.5));
    }

    #[test]
    fn test_translation_ignored_for_vectors() {
        let pose = Pose::translate(5.0, 5.0, 5.0);
        let v = pose.apply_vector(&Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(v, Vector3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_rotations_are_right_handed() {
        let y = Pose::rotate_x(Degrees::new(90.0)).apply(&Point3::new(0.0, 1.0, 0.0));
        assert_abs_diff_eq!(y.z, 1.0, epsilon = 1e-12);

        let z = Pose::rotate_y(Degrees::new(90.0)).apply(&Point3::new(0.0, 0.0, 1.0));
        assert_abs_diff_eq!(z.x, 1.0, epsilon = 1e-12);

        let x = Pose::rotate_z(Degrees::new(90.0)).apply(&Point3::new(1.0, 0.0, 0.0));
        assert_abs_diff_eq!(x.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_compose_order_matters() {
        let t = Pose::translate(1.0, 0.0, 0.0);
        let r = Pose::rotate_z(Degrees::new(90.0));

        // Rotate first, then translate.
        let tr = t.compose(&r).apply(&Point3::new(1.0, 0.0, 0.0));
        assert_abs_diff_eq!(tr.x, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(tr.y, 1.0, epsilon = 1e-12);

        // Translate first, then rotate.
        let rt = r.compose(&t).apply(&Point3::new(1.0, 0.0, 0.0));
        assert_abs_diff_eq!(rt.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(rt.y, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_compose_is_associative() {
        let a = Pose::rotate_x(Degrees::new(38.0));
        let b = Pose::translate(0.3, -0.1, 1.2);
        let c = Pose::rotate_z(Degrees::new(-71.0));

        let left = (a * b) * c;
        let right = a * (b * c);
        for (l, r) in left.matrix().iter().zip(right.matrix().iter()) {
            assert_abs_diff_eq!(*l, *r, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_translation_accessor() {
        let pose = Pose::rotate_z(Degrees::new(30.0)) * Pose::translate(0.0, 0.0, 2.0);
        assert_abs_diff_eq!(pose.translation().z, 2.0, epsilon = 1e-12);
    }
}
