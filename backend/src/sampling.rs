//! Aperture disk sampling.
//!
//! Two interchangeable policies produce a 2-D point set inside a disk:
//!
//! - [`SamplingPolicy::Uniform`]: independent random points, area-uniform
//!   (radius drawn as `sqrt(U)` so the center is not over-sampled).
//! - [`SamplingPolicy::Equidistant`]: concentric rings whose point counts keep
//!   neighbours roughly equidistant. Deterministic and low-discrepancy.
//!
//! Both accept an inner exclusion fraction (radius of a central obstruction,
//! such as a secondary mirror, relative to the disk radius).
//!
//! Uniform sampling returns exactly the requested count. Equidistant sampling
//! returns at least the requested count: whole rings are added until the
//! target is reached, so it overshoots by less than one ring.
//!
//! Counts below ~100 are accepted but give high-variance estimates.

use std::f64::consts::{PI, TAU};

use nalgebra::Point2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::SamplingError;

/// How points are placed on the aperture disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum SamplingPolicy {
    /// Random, area-uniform points. `seed` makes the draw reproducible.
    Uniform { seed: Option<u64> },
    /// Deterministic concentric rings.
    #[default]
    Equidistant,
}

/// Disk sampler bound to a policy and an inner exclusion fraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiskSampler {
    policy: SamplingPolicy,
    inner_fraction: f64,
}

impl DiskSampler {
    /// Build a sampler. `inner_fraction` must lie in `[0, 1)`.
    pub fn new(policy: SamplingPolicy, inner_fraction: f64) -> Result<Self, SamplingError> {
        if !(0.0..1.0).contains(&inner_fraction) {
            return Err(SamplingError::InnerFraction(inner_fraction));
        }
        Ok(Self {
            policy,
            inner_fraction,
        })
    }

    /// Same exclusion fraction under a different policy.
    pub fn with_policy(self, policy: SamplingPolicy) -> Self {
        Self { policy, ..self }
    }

    pub fn policy(&self) -> SamplingPolicy {
        self.policy
    }

    pub fn inner_fraction(&self) -> f64 {
        self.inner_fraction
    }

    /// Sample a disk of `radius`. A `count` of 0 is treated as 1.
    pub fn sample(&self, radius: f64, count: usize) -> Vec<Point2<f64>> {
        let count = count.max(1);
        match self.policy {
            SamplingPolicy::Uniform { seed } => {
                let mut rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_entropy(),
                };
                uniform_disk(&mut rng, radius, count, self.inner_fraction)
            }
            SamplingPolicy::Equidistant => equidistant_disk(radius, count, self.inner_fraction),
        }
    }
}

/// Area-uniform random points on a disk (or annulus when `inner_fraction > 0`).
pub fn uniform_disk<R: Rng + ?Sized>(
    rng: &mut R,
    radius: f64,
    count: usize,
    inner_fraction: f64,
) -> Vec<Point2<f64>> {
    let inner_sq = inner_fraction * inner_fraction;

    (0..count)
        .map(|_| {
            let u: f64 = rng.gen();
            let angle = rng.gen::<f64>() * TAU;
            let r = (inner_sq + u * (1.0 - inner_sq)).sqrt() * radius;
            Point2::new(r * angle.cos(), r * angle.sin())
        })
        .collect()
}

/// Points on ring `k` (1-based) so that neighbours are about equidistant.
pub fn ring_point_count(k: usize) -> usize {
    (PI / (1.0 / (2.0 * k as f64)).asin()).round() as usize
}

/// Ring layout for a target count: number of rings, index of the first ring,
/// and whether the center point is included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RingLayout {
    rings: usize,
    first_k: usize,
    center: bool,
}

impl RingLayout {
    fn for_count(count: usize, inner_fraction: f64) -> Self {
        let center = inner_fraction == 0.0;
        let mut rings = if center { 0 } else { 1 };

        loop {
            let layout = Self {
                rings,
                first_k: first_ring_index(rings, inner_fraction),
                center,
            };
            if layout.total() >= count {
                return layout;
            }
            rings += 1;
        }
    }

    fn total(&self) -> usize {
        let ring_points: usize = (0..self.rings)
            .map(|j| ring_point_count(self.first_k + j))
            .sum();
        ring_points + usize::from(self.center)
    }

    fn radius(&self, j: usize, inner_fraction: f64) -> f64 {
        if self.center {
            (j + 1) as f64 / self.rings as f64
        } else if self.rings == 1 {
            0.5 * (inner_fraction + 1.0)
        } else {
            inner_fraction + (1.0 - inner_fraction) * j as f64 / (self.rings - 1) as f64
        }
    }
}

fn first_ring_index(rings: usize, inner_fraction: f64) -> usize {
    if inner_fraction == 0.0 {
        1
    } else {
        ((inner_fraction * (rings + 1) as f64).ceil() as usize).max(1)
    }
}

/// Deterministic ring sampling of a disk (or annulus).
pub fn equidistant_disk(radius: f64, count: usize, inner_fraction: f64) -> Vec<Point2<f64>> {
    let layout = RingLayout::for_count(count.max(1), inner_fraction);
    let mut points = Vec::with_capacity(layout.total());

    if layout.center {
        points.push(Point2::origin());
    }

    for j in 0..layout.rings {
        let n = ring_point_count(layout.first_k + j);
        let r = layout.radius(j, inner_fraction) * radius;
        points.extend((0..n).map(|i| {
            let theta = TAU * i as f64 / n as f64;
            Point2::new(r * theta.cos(), r * theta.sin())
        }));
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_counts_follow_equidistant_rule() {
        assert_eq!(ring_point_count(1), 6);
        assert_eq!(ring_point_count(2), 12);
        assert_eq!(ring_point_count(3), 19);
    }

    #[test]
    fn test_uniform_returns_exact_count_inside_disk() {
        let sampler = DiskSampler::new(SamplingPolicy::Uniform { seed: Some(7) }, 0.0).unwrap();
        let points = sampler.sample(0.2, 500);

        assert_eq!(points.len(), 500);
        assert!(points.iter().all(|p| p.coords.norm() <= 0.2 + 1e-12));
    }

    #[test]
    fn test_uniform_with_seed_is_reproducible() {
        let sampler = DiskSampler::new(SamplingPolicy::Uniform { seed: Some(42) }, 0.0).unwrap();
        assert_eq!(sampler.sample(1.0, 64), sampler.sample(1.0, 64));
    }

    #[test]
    fn test_uniform_is_not_center_biased() {
        let mut rng = StdRng::seed_from_u64(3);
        let points = uniform_disk(&mut rng, 1.0, 20_000, 0.0);

        // Half the area lies inside r = 1/sqrt(2).
        let inside = points
            .iter()
            .filter(|p| p.coords.norm() < 1.0 / 2f64.sqrt())
            .count() as f64;
        let share = inside / points.len() as f64;
        assert!((share - 0.5).abs() < 0.02, "share inside = {}", share);
    }

    #[test]
    fn test_uniform_respects_inner_exclusion() {
        let sampler = DiskSampler::new(SamplingPolicy::Uniform { seed: Some(1) }, 0.4).unwrap();
        let points = sampler.sample(2.0, 1000);

        assert_eq!(points.len(), 1000);
        assert!(points.iter().all(|p| p.coords.norm() >= 0.8 - 1e-12));
    }

    #[test]
    fn test_equidistant_overshoots_by_less_than_one_ring() {
        for count in [1, 7, 50, 100, 500, 1234] {
            let points = equidistant_disk(1.0, count, 0.0);
            let layout = RingLayout::for_count(count, 0.0);

            assert!(points.len() >= count);
            assert_eq!(points.len(), layout.total());
            if layout.rings > 0 {
                let last = ring_point_count(layout.first_k + layout.rings - 1);
                assert!(points.len() - count < last);
            }
        }
    }

    #[test]
    fn test_equidistant_reaches_rim_and_includes_center() {
        let points = equidistant_disk(0.5, 100, 0.0);

        assert_eq!(points[0], Point2::origin());
        let max_r = points.iter().map(|p| p.coords.norm()).fold(0.0, f64::max);
        assert!((max_r - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_equidistant_with_exclusion_skips_center() {
        let points = equidistant_disk(1.0, 300, 0.3);

        assert!(points.len() >= 300);
        assert!(points.iter().all(|p| p.coords.norm() >= 0.3 - 1e-12));
    }

    #[test]
    fn test_zero_count_is_normalized_to_one() {
        let sampler = DiskSampler::new(SamplingPolicy::Equidistant, 0.0).unwrap();
        assert_eq!(sampler.sample(1.0, 0).len(), 1);

        let sampler = DiskSampler::new(SamplingPolicy::Uniform { seed: None }, 0.0).unwrap();
        assert_eq!(sampler.sample(1.0, 0).len(), 1);
    }

    #[test]
    fn test_invalid_inner_fraction_is_rejected() {
        assert_eq!(
            DiskSampler::new(SamplingPolicy::Equidistant, 1.0),
            Err(SamplingError::InnerFraction(1.0))
        );
        assert!(DiskSampler::new(SamplingPolicy::Equidistant, -0.1).is_err());
        assert!(DiskSampler::new(SamplingPolicy::Equidistant, f64::NAN).is_err());
    }
}
