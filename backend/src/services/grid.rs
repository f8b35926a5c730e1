//! Dense obstruction grids over hour angle and declination.
//!
//! A grid holds the blocked fraction of one instrument for every
//! (hour angle, declination) cell at a fixed dome azimuth. Rows are evaluated
//! in parallel; the estimator is shared by reference.

use chrono::{DateTime, Utc};
use qtty::Degrees;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::obstruction::ObstructionEstimator;
use crate::error::GridError;
use crate::models::Instrument;

/// Largest number of cells a grid may hold.
pub const MAX_GRID_CELLS: usize = 20_000_000;

/// Hour-angle and declination axes, in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub hour_angles: Vec<f64>,
    pub declinations: Vec<f64>,
}

impl Default for GridSpec {
    /// One-degree cells: HA from -179 to 180, Dec from -90 to 90.
    fn default() -> Self {
        Self {
            hour_angles: axis_values(-179.0, 1.0, 360),
            declinations: axis_values(-90.0, 1.0, 181),
        }
    }
}

impl GridSpec {
    /// Full-sky axes with the given steps, starting at HA -180 + step and Dec -90.
    pub fn with_steps(ha_step: f64, dec_step: f64) -> Result<Self, GridError> {
        let ha_len = axis_len(-180.0 + ha_step, 180.0, ha_step)?;
        let dec_len = axis_len(-90.0, 90.0, dec_step)?;
        let cells = ha_len as f64 * dec_len as f64;
        if cells > MAX_GRID_CELLS as f64 {
            return Err(GridError::TooManyCells {
                requested: cells,
                limit: MAX_GRID_CELLS,
            });
        }

        Ok(Self {
            hour_angles: axis_values(-180.0 + ha_step, ha_step, ha_len),
            declinations: axis_values(-90.0, dec_step, dec_len),
        })
    }

    pub fn cells(&self) -> usize {
        self.hour_angles.len() * self.declinations.len()
    }
}

/// Dome azimuths from 0 up to (excluding) 360 in `step` degrees.
pub fn azimuth_axis(step: f64) -> Result<Vec<f64>, GridError> {
    let len = axis_len(0.0, 360.0 - step, step)?;
    Ok(axis_values(0.0, step, len))
}

/// Number of points in `start, start + step, ...` up to and including `stop`.
fn axis_len(start: f64, stop: f64, step: f64) -> Result<usize, GridError> {
    if !(step.is_finite() && step > 0.0) {
        return Err(GridError::InvalidStep(step));
    }

    let len = ((stop - start) / step + 1e-9).floor().max(0.0) + 1.0;
    if !len.is_finite() || len > MAX_GRID_CELLS as f64 {
        return Err(GridError::TooManyCells {
            requested: len,
            limit: MAX_GRID_CELLS,
        });
    }
    Ok(len as usize)
}

fn axis_values(start: f64, step: f64, len: usize) -> Vec<f64> {
    (0..len).map(|i| start + i as f64 * step).collect()
}

/// Blocked fractions for one instrument at one dome azimuth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstructionGrid {
    pub instrument: Instrument,
    pub azimuth: Degrees,
    pub sample_rate: usize,
    pub hour_angles: Vec<f64>,
    pub declinations: Vec<f64>,
    /// Row-major, one row per hour angle.
    pub values: Vec<f64>,
    pub computed_at: DateTime<Utc>,
}

impl ObstructionGrid {
    pub fn get(&self, ha_idx: usize, dec_idx: usize) -> Option<f64> {
        if ha_idx >= self.hour_angles.len() || dec_idx >= self.declinations.len() {
            return None;
        }
        self.values.get(ha_idx * self.declinations.len() + dec_idx).copied()
    }

    /// Row of fractions for one hour angle.
    pub fn row(&self, ha_idx: usize) -> Option<&[f64]> {
        let width = self.declinations.len();
        self.values.get(ha_idx * width..(ha_idx + 1) * width)
    }

    pub fn min_value(&self) -> f64 {
        self.values.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Whether `other` shares this grid's axes.
    pub fn same_axes(&self, other: &ObstructionGrid) -> bool {
        self.hour_angles == other.hour_angles && self.declinations == other.declinations
    }
}

/// Evaluate every cell of `spec` at a fixed dome azimuth.
pub fn sweep(
    estimator: &ObstructionEstimator,
    instrument: Instrument,
    azimuth: Degrees,
    spec: &GridSpec,
    rate: usize,
) -> ObstructionGrid {
    let width = spec.declinations.len();
    let mut values = vec![0.0; spec.cells()];

    if width > 0 {
        values
            .par_chunks_mut(width)
            .zip(spec.hour_angles.par_iter())
            .for_each(|(row, &ha)| {
                for (cell, &dec) in row.iter_mut().zip(&spec.declinations) {
                    *cell = estimator.obstruction(
                        instrument,
                        Degrees::new(ha),
                        Degrees::new(dec),
                        azimuth,
                        rate,
                    );
                }
            });
    }

    log::info!(
        "Computed {} grid at az={} ({} cells, rate {})",
        instrument,
        azimuth.value(),
        values.len(),
        rate
    );

    ObstructionGrid {
        instrument,
        azimuth,
        sample_rate: rate,
        hour_angles: spec.hour_angles.clone(),
        declinations: spec.declinations.clone(),
        values,
        computed_at: Utc::now(),
    }
}

/// One grid per dome azimuth, in the order given.
pub fn sweep_azimuths(
    estimator: &ObstructionEstimator,
    instrument: Instrument,
    azimuths: &[f64],
    spec: &GridSpec,
    rate: usize,
) -> Vec<ObstructionGrid> {
    azimuths
        .iter()
        .map(|&az| sweep(estimator, instrument, Degrees::new(az), spec, rate))
        .collect()
}
