//! Query, sweep and planning services built on the geometry core.
//!
//! - [`obstruction`]: the per-pointing blocked-fraction estimator
//! - [`grid`]: parallel sweeps over hour angle and declination
//! - [`planner`]: best dome azimuth from a stack of grids

pub mod grid;
pub mod obstruction;
pub mod planner;

pub use grid::{azimuth_axis, sweep, sweep_azimuths, GridSpec, ObstructionGrid};
pub use obstruction::{
    aperture_point, Aperture, ObstructionEstimator, ObstructionResult, Pointing, RaySample,
    DEFAULT_SAMPLE_RATE,
};
pub use planner::{AzimuthChoice, AzimuthPlanner};
