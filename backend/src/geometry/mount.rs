//! Kinematic chain of the equatorial mount.
//!
//! Maps (hour angle, declination) to the pose of an aperture frame in dome
//! coordinates. The dome origin sits on the floor at the dome center, `z` up.
//! In the aperture frame the optical axis is `+y` and the aperture disk lies in
//! the local `x`-`z` plane.

use nalgebra::Vector3;
use qtty::{Degrees, Radian};
use serde::{Deserialize, Serialize};

use super::transform::Pose;
use crate::models::Instrument;

/// Fixed link lengths and mounting angles of the mount.
///
/// All lengths share the linear unit of the dome geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MountGeometry {
    /// Floor to hour-angle axis.
    pub floor_to_ha_axis: f64,
    /// Hour-angle axis to declination axis.
    pub ha_to_dec_axis: f64,
    /// Declination axis to the tube center.
    pub dec_to_tube: f64,
    /// Tube center to guider center.
    pub guider_offset: f64,
    pub guider_angle: Degrees,
    /// Guider center to finder center.
    pub finder_offset: f64,
    pub finder_angle: Degrees,
    /// Observatory latitude; tilts the polar axis.
    pub latitude: Degrees,
}

impl MountGeometry {
    /// Pose of the main tube aperture.
    pub fn tube_pose(&self, hour_angle: Degrees, declination: Degrees) -> Pose {
        let floor_to_ha = Pose::translate(0.0, 0.0, self.floor_to_ha_axis);
        let ha_to_dec = Pose::rotate_x(Degrees::new(90.0) - self.latitude)
            * Pose::rotate_z(Degrees::new(-hour_angle.value()))
            * Pose::translate(0.0, 0.0, self.ha_to_dec_axis);
        let dec_to_tube =
            Pose::rotate_x(declination) * Pose::translate(-self.dec_to_tube, 0.0, 0.0);

        floor_to_ha * ha_to_dec * dec_to_tube
    }

    /// Fixed transform from the tube aperture to the given instrument's aperture.
    pub fn instrument_offset(&self, instrument: Instrument) -> Pose {
        match instrument {
            Instrument::Telescope => Pose::identity(),
            Instrument::Guider => self.tube_to_guider(),
            Instrument::Finder => self.tube_to_guider() * self.guider_to_finder(),
        }
    }

    /// Pose of an instrument aperture in dome coordinates.
    ///
    /// Pure function of its inputs; safe to call from many threads at once.
    pub fn pose(&self, hour_angle: Degrees, declination: Degrees, instrument: Instrument) -> Pose {
        self.tube_pose(hour_angle, declination) * self.instrument_offset(instrument)
    }

    fn tube_to_guider(&self) -> Pose {
        let (sin, cos) = sin_cos(self.guider_angle);
        Pose::translate(self.guider_offset * cos, 0.0, self.guider_offset * sin)
    }

    fn guider_to_finder(&self) -> Pose {
        let (sin, cos) = sin_cos(self.finder_angle);
        Pose::translate(-self.finder_offset * cos, 0.0, self.finder_offset * sin)
    }
}

/// Optical axis of an aperture pose, in dome coordinates (unit length).
pub fn boresight(pose: &Pose) -> Vector3<f64> {
    pose.apply_vector(&Vector3::y())
}

fn sin_cos(angle: Degrees) -> (f64, f64) {
    angle.to::<Radian>().value().sin_cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::Point3;

    fn polar_mount() -> MountGeometry {
        MountGeometry {
            floor_to_ha_axis: 1.5,
            ha_to_dec_axis: 0.4,
            dec_to_tube: 0.6,
            guider_offset: 0.3,
            guider_angle: Degrees::new(30.0),
            finder_offset: 0.2,
            finder_angle: Degrees::new(60.0),
            latitude: Degrees::new(90.0),
        }
    }

    #[test]
    fn test_home_position_reproduces_link_lengths() {
        let mount = polar_mount();
        let pose = mount.pose(Degrees::new(0.0), Degrees::new(0.0), Instrument::Telescope);
        let origin = pose.apply(&Point3::origin());

        assert_abs_diff_eq!(origin.x, -0.6, epsilon = 1e-12);
        assert_abs_diff_eq!(origin.y, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(origin.z, 1.5 + 0.4, epsilon = 1e-12);
    }

    #[test]
    fn test_home_boresight_is_horizontal_at_pole() {
        let mount = polar_mount();
        let pose = mount.pose(Degrees::new(0.0), Degrees::new(0.0), Instrument::Telescope);
        let dir = boresight(&pose);

        assert_abs_diff_eq!(dir.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(dir.y, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(dir.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_declination_ninety_points_along_polar_axis() {
        let mount = MountGeometry {
            latitude: Degrees::new(52.0),
            ..polar_mount()
        };
        let pose = mount.tube_pose(Degrees::new(37.0), Degrees::new(90.0));
        let dir = boresight(&pose);

        // The polar axis is tilted by (90 - latitude) from the zenith towards -y.
        let colat = (90.0_f64 - 52.0).to_radians();
        assert_abs_diff_eq!(dir.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(dir.y, -colat.sin(), epsilon = 1e-12);
        assert_abs_diff_eq!(dir.z, colat.cos(), epsilon = 1e-12);
    }

    #[test]
    fn test_guider_offset_is_fixed_distance_from_tube() {
        let mount = MountGeometry {
            latitude: Degrees::new(40.0),
            ..polar_mount()
        };
        let ha = Degrees::new(-25.0);
        let dec = Degrees::new(12.0);

        let tube = mount.pose(ha, dec, Instrument::Telescope).translation();
        let guider = mount.pose(ha, dec, Instrument::Guider).translation();
        assert_abs_diff_eq!((guider - tube).norm(), 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_finder_chains_through_guider() {
        let mount = polar_mount();
        let offset = mount.instrument_offset(Instrument::Finder).translation();

        let g = 30.0_f64.to_radians();
        let f = 60.0_f64.to_radians();
        assert_abs_diff_eq!(offset.x, 0.3 * g.cos() - 0.2 * f.cos(), epsilon = 1e-12);
        assert_abs_diff_eq!(offset.y, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(offset.z, 0.3 * g.sin() + 0.2 * f.sin(), epsilon = 1e-12);
    }

    #[test]
    fn test_instruments_share_boresight() {
        let mount = polar_mount();
        let ha = Degrees::new(15.0);
        let dec = Degrees::new(-20.0);

        let tube = boresight(&mount.pose(ha, dec, Instrument::Telescope));
        for instrument in [Instrument::Guider, Instrument::Finder] {
            let dir = boresight(&mount.pose(ha, dec, instrument));
            assert_abs_diff_eq!((dir - tube).norm(), 0.0, epsilon = 1e-12);
        }
    }
}
