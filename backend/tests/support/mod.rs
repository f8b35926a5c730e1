#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use dome_vignetting::config::ObservatoryConfig;
use dome_vignetting::services::ObstructionEstimator;
use qtty::{Degrees, Meters};

static CWD_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with the process working directory set to `dir`.
///
/// Panic-safe (restores the directory on unwind) and serialized, since the
/// working directory is process-global and tests run in parallel.
pub fn with_current_dir<F, R>(dir: &Path, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = CWD_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedDir::enter(dir);
    f()
}

struct ScopedDir {
    previous: PathBuf,
}

impl ScopedDir {
    fn enter(dir: &Path) -> Self {
        let previous = std::env::current_dir().expect("current dir");
        std::env::set_current_dir(dir).expect("enter test dir");
        Self { previous }
    }
}

impl Drop for ScopedDir {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.previous);
    }
}

/// The shipped sample configuration.
pub fn sample_config() -> ObservatoryConfig {
    ObservatoryConfig::default()
}

pub fn estimator(config: ObservatoryConfig) -> ObstructionEstimator {
    ObstructionEstimator::new(config).expect("valid test configuration")
}

/// Polar-aligned mount with every aperture pointing straight up at
/// HA 0 / Dec 90 and the instruments laid out along +x:
/// telescope at x = 0, finder at x = 0.2, guider at x = 0.3.
/// All apertures are 10 cm with no central obstruction.
pub fn inline_instruments_config(slit_width: f64) -> ObservatoryConfig {
    let mut config = ObservatoryConfig::default()
        .with_latitude(90.0)
        .with_mount_lengths(1.2, 0.3, 0.0)
        .with_slit_width(slit_width);

    config.telescope.diameter = Meters::new(0.1);
    config.telescope.sec_diameter = Meters::new(0.0);
    config.guider.offset = Meters::new(0.3);
    config.guider.angle = Degrees::new(0.0);
    config.guider.diameter = Meters::new(0.1);
    config.guider.sec_diameter = Meters::new(0.0);
    config.finder.offset = Meters::new(0.1);
    config.finder.angle = Degrees::new(0.0);
    config.finder.diameter = Meters::new(0.1);
    config
}

pub fn deg(value: f64) -> Degrees {
    Degrees::new(value)
}
