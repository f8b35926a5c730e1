//! # Dome Vignetting
//!
//! Estimates how much of a telescope aperture is obstructed by the dome shell
//! for a given mount pointing and dome azimuth.
//!
//! The estimate is a blocked fraction in `[0, 1]`: the share of rays, sampled
//! over the aperture disk and sent along the optical axis, that do not leave
//! the dome through its slit. Three apertures ride on the mount: the main
//! telescope tube, a guider on the tube, and a finder on the guider.
//!
//! ## Architecture
//!
//! - [`config`]: TOML observatory configuration (mount, instruments, dome, site)
//! - [`geometry`]: homogeneous transforms and the equatorial mount chain
//! - [`sampling`]: uniform and equidistant disk sampling
//! - [`dome`]: ray/shell intersection and the slit occlusion test
//! - [`services`]: the estimator, grid sweeps and the azimuth planner
//! - [`models`]: instruments and azimuth conventions
//!
//! ## Example
//!
//! ```no_run
//! use dome_vignetting::config::ObservatoryConfig;
//! use dome_vignetting::models::Instrument;
//! use dome_vignetting::services::ObstructionEstimator;
//! use qtty::Degrees;
//!
//! let config = ObservatoryConfig::from_default_location()?;
//! let estimator = ObstructionEstimator::new(config)?;
//! let fraction = estimator.obstruction(
//!     Instrument::Telescope,
//!     Degrees::new(-15.0),
//!     Degrees::new(20.0),
//!     Degrees::new(170.0),
//!     500,
//! );
//! println!("{:.1}% blocked", 100.0 * fraction);
//! # Ok::<(), dome_vignetting::error::ObstructionError>(())
//! ```
//!
//! ## Concurrency
//!
//! Every query is a pure function of the immutable configuration and its
//! inputs. An [`ObstructionEstimator`](services::ObstructionEstimator) can be
//! shared by reference between threads; the grid sweeper does exactly that.

pub mod config;
pub mod dome;
pub mod error;
pub mod geometry;
pub mod models;
pub mod sampling;
pub mod services;

pub use config::ObservatoryConfig;
pub use error::{ConfigError, EngineResult, GridError, ObstructionError};
pub use models::Instrument;
pub use services::{ObstructionEstimator, ObstructionResult};
