//! Rigid-body geometry: homogeneous transforms and the mount kinematic chain.

pub mod mount;
pub mod transform;

pub use mount::{boresight, MountGeometry};
pub use transform::{Axis, Pose};
