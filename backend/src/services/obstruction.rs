//! Blocked-fraction estimation for one pointing.
//!
//! For each query the estimator samples the instrument's aperture disk, moves
//! every sample into dome coordinates with the mount pose, shoots a ray along
//! the shared boresight and asks the dome whether that ray leaves through the
//! slit. The result is the fraction of rays that do not.
//!
//! Rays that miss the shell or run into a numerical degeneracy are counted as
//! blocked. A query always returns a fraction in `[0, 1]`.

use nalgebra::{Point2, Point3, Vector3};
use qtty::Degrees;
use serde::{Deserialize, Serialize};

use crate::config::ObservatoryConfig;
use crate::dome::{classify, intersect, intersection_point, ray_azimuth, DomeGeometry, Occlusion};
use crate::error::{EngineResult, GeometryFault, SamplingError};
use crate::geometry::{boresight, MountGeometry};
use crate::models::Instrument;
use crate::sampling::{DiskSampler, SamplingPolicy};

/// Sample rate used when a caller has no preference.
pub const DEFAULT_SAMPLE_RATE: usize = 500;

/// An instrument aperture: disk radius plus the sampler bound to its
/// central obstruction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aperture {
    pub instrument: Instrument,
    pub radius: f64,
    sampler: DiskSampler,
}

impl Aperture {
    /// Build the aperture of `instrument` from the configuration.
    pub fn from_config(
        config: &ObservatoryConfig,
        instrument: Instrument,
        policy: SamplingPolicy,
    ) -> Result<Self, SamplingError> {
        let radius = config.aperture_radius(instrument);
        let inner_fraction = config.secondary_radius(instrument) / radius;
        Ok(Self {
            instrument,
            radius,
            sampler: DiskSampler::new(policy, inner_fraction)?,
        })
    }

    pub fn sampler(&self) -> &DiskSampler {
        &self.sampler
    }

    /// Disk samples of the aperture, in the disk's own 2-D coordinates.
    pub fn disk_points(&self, rate: usize) -> Vec<Point2<f64>> {
        self.sampler.sample(self.radius, rate)
    }
}

/// Lift a disk sample into the aperture frame. The disk lies in the local
/// `x`-`z` plane with its `x` axis mirrored.
pub fn aperture_point(disk: &Point2<f64>) -> Point3<f64> {
    Point3::new(-disk.x, 0.0, disk.y)
}

/// One traced ray, kept for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RaySample {
    /// Sample position on the aperture disk.
    pub disk: [f64; 2],
    /// Ray origin in dome coordinates.
    pub origin: [f64; 3],
    /// Exit point through the shell, if the ray has one.
    pub hit: Option<[f64; 3]>,
    pub occlusion: Occlusion,
}

/// Outcome of one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstructionResult {
    pub instrument: Instrument,
    /// Blocked rays over traced rays.
    pub fraction: f64,
    pub total: usize,
    pub blocked: usize,
    /// Rays with no exit through the shell.
    pub missed: usize,
    /// Rays that hit a numerical degeneracy.
    pub faults: usize,
    /// Per-ray detail; empty unless requested.
    pub samples: Vec<RaySample>,
}

/// A pointing to evaluate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointing {
    pub hour_angle: Degrees,
    pub declination: Degrees,
    pub dome_azimuth: Degrees,
}

impl Pointing {
    pub fn new(hour_angle: Degrees, declination: Degrees, dome_azimuth: Degrees) -> Self {
        Self {
            hour_angle,
            declination,
            dome_azimuth,
        }
    }
}

/// Obstruction engine bound to one immutable observatory configuration.
///
/// The estimator holds no mutable state; share it by reference across threads.
#[derive(Debug, Clone)]
pub struct ObstructionEstimator {
    config: ObservatoryConfig,
    mount: MountGeometry,
    dome: DomeGeometry,
    policy: SamplingPolicy,
    /// Indexed in [`Instrument::ALL`] order.
    apertures: [Aperture; 3],
}

impl ObstructionEstimator {
    /// Validate `config` and build an estimator with equidistant sampling.
    pub fn new(config: ObservatoryConfig) -> EngineResult<Self> {
        config.validate()?;
        let policy = SamplingPolicy::default();
        let apertures = [
            Aperture::from_config(&config, Instrument::Telescope, policy)?,
            Aperture::from_config(&config, Instrument::Guider, policy)?,
            Aperture::from_config(&config, Instrument::Finder, policy)?,
        ];

        Ok(Self {
            mount: config.mount_geometry(),
            dome: config.dome_geometry(),
            config,
            policy,
            apertures,
        })
    }

    /// Use a different sampling policy for later queries.
    pub fn with_policy(mut self, policy: SamplingPolicy) -> Self {
        self.policy = policy;
        for aperture in &mut self.apertures {
            aperture.sampler = aperture.sampler.with_policy(policy);
        }
        self
    }

    pub fn config(&self) -> &ObservatoryConfig {
        &self.config
    }

    pub fn policy(&self) -> SamplingPolicy {
        self.policy
    }

    pub fn mount(&self) -> &MountGeometry {
        &self.mount
    }

    pub fn dome(&self) -> &DomeGeometry {
        &self.dome
    }

    pub fn aperture(&self, instrument: Instrument) -> &Aperture {
        match instrument {
            Instrument::Telescope => &self.apertures[0],
            Instrument::Guider => &self.apertures[1],
            Instrument::Finder => &self.apertures[2],
        }
    }

    /// Blocked fraction in `[0, 1]` for an instrument at a pointing.
    ///
    /// A `rate` of 0 is treated as 1.
    pub fn obstruction(
        &self,
        instrument: Instrument,
        hour_angle: Degrees,
        declination: Degrees,
        dome_azimuth: Degrees,
        rate: usize,
    ) -> f64 {
        let pointing = Pointing::new(hour_angle, declination, dome_azimuth);
        self.trace(instrument, &pointing, rate, false).fraction
    }

    /// Dome azimuth at which the slit faces the aperture: the azimuth where the
    /// aperture's center ray leaves the shell. `None` if that ray has no exit.
    pub fn facing_azimuth(
        &self,
        instrument: Instrument,
        hour_angle: Degrees,
        declination: Degrees,
    ) -> Option<Degrees> {
        let pose = self.mount.pose(hour_angle, declination, instrument);
        let origin = pose.apply(&Point3::origin());
        let direction = boresight(&pose);
        let t = intersect(&self.dome, &origin, &direction)?;
        Some(ray_azimuth(&intersection_point(&origin, &direction, t)))
    }

    /// Same as [`obstruction`](Self::obstruction) but keeps every traced ray.
    pub fn obstruction_detailed(
        &self,
        instrument: Instrument,
        pointing: &Pointing,
        rate: usize,
    ) -> ObstructionResult {
        self.trace(instrument, pointing, rate, true)
    }

    fn trace(
        &self,
        instrument: Instrument,
        pointing: &Pointing,
        rate: usize,
        keep_samples: bool,
    ) -> ObstructionResult {
        let aperture = self.aperture(instrument);
        let disk = aperture.disk_points(rate);

        let pose = self
            .mount
            .pose(pointing.hour_angle, pointing.declination, instrument);
        let direction = boresight(&pose);

        let mut result = ObstructionResult {
            instrument,
            fraction: 0.0,
            total: disk.len(),
            blocked: 0,
            missed: 0,
            faults: 0,
            samples: Vec::with_capacity(if keep_samples { disk.len() } else { 0 }),
        };
        let mut first_fault = None;

        for point in &disk {
            let origin = pose.apply(&aperture_point(point));
            let (hit, outcome) = self.trace_ray(&origin, &direction, pointing.dome_azimuth);

            let occlusion = match outcome {
                Ok(occlusion) => occlusion,
                Err(fault) => {
                    result.faults += 1;
                    if first_fault.is_none() {
                        first_fault = Some(fault);
                    }
                    Occlusion::Blocked
                }
            };
            if hit.is_none() && outcome.is_ok() {
                result.missed += 1;
            }
            if occlusion.is_blocked() {
                result.blocked += 1;
            }

            if keep_samples {
                result.samples.push(RaySample {
                    disk: [point.x, point.y],
                    origin: [origin.x, origin.y, origin.z],
                    hit: hit.map(|p| [p.x, p.y, p.z]),
                    occlusion,
                });
            }
        }

        result.fraction = result.blocked as f64 / result.total as f64;

        if let Some(fault) = first_fault {
            log::warn!(
                "Degenerate geometry for {} at ha={} dec={} az={}: {} of {} rays counted as blocked ({})",
                instrument,
                pointing.hour_angle.value(),
                pointing.declination.value(),
                pointing.dome_azimuth.value(),
                result.faults,
                result.total,
                fault
            );
        }
        log::debug!(
            "{} ha={} dec={} az={}: {}/{} blocked ({} missed the shell)",
            instrument,
            pointing.hour_angle.value(),
            pointing.declination.value(),
            pointing.dome_azimuth.value(),
            result.blocked,
            result.total,
            result.missed
        );

        result
    }

    /// Trace one ray: exit point (if any) and the slit decision.
    fn trace_ray(
        &self,
        origin: &Point3<f64>,
        direction: &Vector3<f64>,
        dome_azimuth: Degrees,
    ) -> (Option<Point3<f64>>, Result<Occlusion, GeometryFault>) {
        let finite = origin.coords.iter().chain(direction.iter()).all(|v| v.is_finite());
        if !finite {
            return (None, Err(GeometryFault::NonFiniteRay));
        }

        match intersect(&self.dome, origin, direction) {
            Some(t) => {
                let hit = intersection_point(origin, direction, t);
                (Some(hit), classify(&self.dome, &hit, dome_azimuth))
            }
            None => (None, Ok(Occlusion::Blocked)),
        }
    }
}
