//! Error types for configuration loading and engine setup.
//!
//! Configuration problems are fatal and surface before any query can run.
//! Numerical degeneracies found while tracing rays are [`GeometryFault`]s:
//! they are recovered inside the estimator and never cross a query boundary.

use std::fmt;

/// Result type for fallible engine operations.
pub type EngineResult<T> = Result<T, ObstructionError>;

/// Top-level error for the crate.
#[derive(Debug, thiserror::Error)]
pub enum ObstructionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Sampling(#[from] SamplingError),

    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Errors raised while reading or validating the observatory configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Configuration error: failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML or misses fields.
    #[error("Configuration error: failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is present but outside its allowed range.
    #[error("Configuration error: invalid value for '{field}': {reason}")]
    Invalid { field: String, reason: String },

    /// No configuration file was found in the standard locations.
    #[error("Configuration error: no {0} found in standard locations")]
    NotFound(String),
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised when a sampling policy is built with unusable parameters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SamplingError {
    #[error("inner exclusion fraction must lie in [0, 1), got {0}")]
    InnerFraction(f64),
}

/// Errors raised when laying out grid axes or planning over a set of grids.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    #[error("grid step must be positive and finite, got {0}")]
    InvalidStep(f64),

    #[error("grid would hold {requested:e} cells, more than the limit of {limit}")]
    TooManyCells { requested: f64, limit: usize },

    #[error("no obstruction grids supplied")]
    NoGrids,

    #[error("grid at azimuth {azimuth} deg does not share the hour-angle/declination axes")]
    AxisMismatch { azimuth: f64 },

    #[error("grids mix instruments {first} and {other}")]
    MixedInstruments { first: String, other: String },
}

/// A numerical degeneracy met while tracing one ray.
///
/// Faults are classified as blocked by the caller.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum GeometryFault {
    #[error("non-finite ray origin or direction")]
    NonFiniteRay,

    #[error("non-finite intersection point {0}")]
    NonFiniteIntersection(PointDisplay),

    #[error("non-finite dome azimuth {0} deg")]
    NonFiniteAzimuth(f64),

    #[error("non-finite slit half-width at elevation {elevation_deg} deg")]
    NonFiniteSlitWidth { elevation_deg: f64 },
}

/// Display wrapper so a 3-D point can be carried inside a `Copy` fault.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointDisplay(pub [f64; 3]);

impl fmt::Display for PointDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x, y, z] = self.0;
        write!(f, "({:.4}, {:.4}, {:.4})", x, y, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_message_names_field() {
        let err = ConfigError::invalid("dome.diameter", "must be positive");
        let msg = err.to_string();
        assert!(msg.contains("dome.diameter"));
        assert!(msg.contains("must be positive"));
    }

    #[test]
    fn test_config_error_converts_to_crate_error() {
        let err: ObstructionError = ConfigError::NotFound("observatory.toml".into()).into();
        assert!(matches!(err, ObstructionError::Config(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_fault_display_formats_point() {
        let fault = GeometryFault::NonFiniteIntersection(PointDisplay([1.0, f64::NAN, 2.5]));
        assert_eq!(
            fault.to_string(),
            "non-finite intersection point (1.0000, NaN, 2.5000)"
        );
    }
}
