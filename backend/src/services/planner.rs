//! Dome azimuth planning over a stack of obstruction grids.
//!
//! Given one grid per dome azimuth, the planner answers: for a pointing that
//! is currently clear, at which azimuth can the dome stay parked for the
//! longest stretch of hour angle while the target drifts west?

use qtty::Degrees;
use serde::{Deserialize, Serialize};

use super::grid::ObstructionGrid;
use crate::error::GridError;
use crate::models::Instrument;

/// Tolerance when comparing a cell to the stack minimum.
const MIN_TOLERANCE: f64 = 1e-12;

/// Best parking azimuth for one (HA, Dec) cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AzimuthChoice {
    pub hour_angle: f64,
    pub declination: f64,
    pub azimuth: Degrees,
    /// Consecutive clear hour-angle steps starting at `hour_angle`.
    pub run: usize,
}

/// Optimal-azimuth lookup over grids that share their HA/Dec axes.
#[derive(Debug, Clone)]
pub struct AzimuthPlanner {
    grids: Vec<ObstructionGrid>,
    minimum: f64,
    threshold: Option<f64>,
}

impl AzimuthPlanner {
    /// Build a planner. All grids must share axes and instrument.
    pub fn new(grids: Vec<ObstructionGrid>) -> Result<Self, GridError> {
        let first = grids.first().ok_or(GridError::NoGrids)?;
        for grid in &grids[1..] {
            if !first.same_axes(grid) {
                return Err(GridError::AxisMismatch {
                    azimuth: grid.azimuth.value(),
                });
            }
            if grid.instrument != first.instrument {
                return Err(GridError::MixedInstruments {
                    first: first.instrument.to_string(),
                    other: grid.instrument.to_string(),
                });
            }
        }

        let minimum = grids
            .iter()
            .map(ObstructionGrid::min_value)
            .fold(f64::INFINITY, f64::min);

        Ok(Self {
            grids,
            minimum,
            threshold: None,
        })
    }

    /// Also treat cells with a fraction below `threshold` as clear.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn instrument(&self) -> Instrument {
        self.grids[0].instrument
    }

    /// Smallest fraction over the whole stack.
    pub fn minimum(&self) -> f64 {
        self.minimum
    }

    pub fn grids(&self) -> &[ObstructionGrid] {
        &self.grids
    }

    fn is_clear(&self, value: f64) -> bool {
        (value - self.minimum).abs() <= MIN_TOLERANCE
            || self.threshold.is_some_and(|t| value < t)
    }

    fn clear_at(&self, az_idx: usize, ha_idx: usize, dec_idx: usize) -> bool {
        self.grids[az_idx]
            .get(ha_idx, dec_idx)
            .is_some_and(|v| self.is_clear(v))
    }

    /// Number of hour-angle steps, starting at `ha_idx` and moving forward with
    /// wrap-around, that stay clear at one azimuth. Zero if the start is not
    /// clear; at most the number of hour angles.
    pub fn clear_run(&self, az_idx: usize, ha_idx: usize, dec_idx: usize) -> usize {
        let n_ha = self.grids[0].hour_angles.len();
        if az_idx >= self.grids.len() || n_ha == 0 {
            return 0;
        }
        (0..n_ha)
            .take_while(|k| self.clear_at(az_idx, (ha_idx + k) % n_ha, dec_idx))
            .count()
    }

    /// Azimuth with the longest clear run for a cell, or `None` if no azimuth
    /// is clear there. The first azimuth wins ties.
    pub fn optimal_azimuth(&self, ha_idx: usize, dec_idx: usize) -> Option<AzimuthChoice> {
        let axes = &self.grids[0];
        let hour_angle = *axes.hour_angles.get(ha_idx)?;
        let declination = *axes.declinations.get(dec_idx)?;

        let mut best: Option<(usize, usize)> = None;
        for az_idx in 0..self.grids.len() {
            let run = self.clear_run(az_idx, ha_idx, dec_idx);
            if run > 0 && best.map_or(true, |(_, r)| run > r) {
                best = Some((az_idx, run));
            }
        }

        best.map(|(az_idx, run)| AzimuthChoice {
            hour_angle,
            declination,
            azimuth: self.grids[az_idx].azimuth,
            run,
        })
    }

    /// Optimal azimuth for every cell that is clear at some azimuth.
    pub fn plan(&self) -> Vec<AzimuthChoice> {
        let axes = &self.grids[0];
        let plan: Vec<AzimuthChoice> = (0..axes.hour_angles.len())
            .flat_map(|ha_idx| {
                (0..axes.declinations.len())
                    .filter_map(move |dec_idx| self.optimal_azimuth(ha_idx, dec_idx))
            })
            .collect();

        log::info!(
            "Planned {} of {} cells for {} over {} azimuths",
            plan.len(),
            axes.values.len(),
            self.instrument(),
            self.grids.len()
        );
        plan
    }
}
