//! Observatory configuration file support.
//!
//! Mount, instrument and dome dimensions are read once from a TOML file and
//! validated before any query can run. The resulting [`ObservatoryConfig`] is
//! immutable and can be shared by reference across worker threads.
//!
//! ```toml
//! [mount]
//! length_1 = 1.60   # floor to hour-angle axis
//! length_2 = 0.45   # hour-angle axis to declination axis
//! length_3 = 0.55   # declination axis to tube center
//!
//! [telescope]
//! diameter = 0.40
//! sec_diameter = 0.15
//!
//! [guider]
//! offset = 0.32
//! angle = 35.0
//! diameter = 0.10
//! sec_diameter = 0.03
//!
//! [finder]
//! offset = 0.15
//! angle = 50.0
//! diameter = 0.05
//!
//! [dome]
//! diameter = 6.0
//! extent = 1.6
//! slit_width = 1.84
//!
//! [observatory]
//! latitude = 52.0
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use qtty::{Degrees, Meters};
use serde::{Deserialize, Serialize};

use crate::dome::DomeGeometry;
use crate::error::ConfigError;
use crate::geometry::MountGeometry;
use crate::models::Instrument;

/// File name searched by [`ObservatoryConfig::from_default_location`].
pub const DEFAULT_CONFIG_FILE: &str = "observatory.toml";

/// Observatory configuration from file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservatoryConfig {
    pub mount: MountSettings,
    pub telescope: TelescopeSettings,
    pub guider: GuiderSettings,
    pub finder: FinderSettings,
    pub dome: DomeSettings,
    pub observatory: SiteSettings,
}

/// Mount link lengths.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MountSettings {
    /// Floor to hour-angle axis.
    pub length_1: Meters,
    /// Hour-angle axis to declination axis.
    pub length_2: Meters,
    /// Declination axis to tube center.
    pub length_3: Meters,
}

/// Main tube aperture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelescopeSettings {
    pub diameter: Meters,
    #[serde(default = "zero_length")]
    pub sec_diameter: Meters,
}

/// Guider aperture, mounted on the main tube.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuiderSettings {
    /// Tube center to guider center.
    pub offset: Meters,
    pub angle: Degrees,
    pub diameter: Meters,
    #[serde(default = "zero_length")]
    pub sec_diameter: Meters,
}

/// Finder aperture, mounted on the guider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinderSettings {
    /// Guider center to finder center.
    pub offset: Meters,
    pub angle: Degrees,
    pub diameter: Meters,
}

/// Dome shell dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomeSettings {
    pub diameter: Meters,
    /// Height of the cylindrical wall.
    pub extent: Meters,
    pub slit_width: Meters,
}

/// Site settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SiteSettings {
    pub latitude: Degrees,
}

impl Default for ObservatoryConfig {
    /// A 6 m dome with a 40 cm telescope at latitude 52 deg; matches the
    /// shipped `observatory.toml`.
    fn default() -> Self {
        Self {
            mount: MountSettings {
                length_1: Meters::new(1.6),
                length_2: Meters::new(0.45),
                length_3: Meters::new(0.55),
            },
            telescope: TelescopeSettings {
                diameter: Meters::new(0.4),
                sec_diameter: Meters::new(0.15),
            },
            guider: GuiderSettings {
                offset: Meters::new(0.32),
                angle: Degrees::new(35.0),
                diameter: Meters::new(0.1),
                sec_diameter: Meters::new(0.03),
            },
            finder: FinderSettings {
                offset: Meters::new(0.15),
                angle: Degrees::new(50.0),
                diameter: Meters::new(0.05),
            },
            dome: DomeSettings {
                diameter: Meters::new(6.0),
                extent: Meters::new(1.6),
                slit_width: Meters::new(1.84),
            },
            observatory: SiteSettings {
                latitude: Degrees::new(52.0),
            },
        }
    }
}

fn zero_length() -> Meters {
    Meters::new(0.0)
}

impl ObservatoryConfig {
    /// Load and validate a configuration file.
    ///
    /// # Arguments
    /// * `path` - Path to the TOML configuration file
    ///
    /// # Returns
    /// * `Ok(ObservatoryConfig)` if the file was read, parsed and validated
    /// * `Err(ConfigError)` otherwise
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let config = Self::from_toml_str(&content)?;
        log::debug!("Loaded observatory configuration from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ObservatoryConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the configuration from the default location.
    ///
    /// Searches for `observatory.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> Result<Self, ConfigError> {
        let search_paths = [
            PathBuf::from(DEFAULT_CONFIG_FILE),
            PathBuf::from("backend").join(DEFAULT_CONFIG_FILE),
            PathBuf::from("..").join(DEFAULT_CONFIG_FILE),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(ConfigError::NotFound(DEFAULT_CONFIG_FILE.to_string()))
    }

    /// Check every dimension. Run by all loaders; call it again after
    /// building a configuration in code.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("mount.length_1", self.mount.length_1.value(), true)?;
        positive("mount.length_2", self.mount.length_2.value(), true)?;
        positive("mount.length_3", self.mount.length_3.value(), true)?;

        positive("telescope.diameter", self.telescope.diameter.value(), false)?;
        secondary(
            "telescope.sec_diameter",
            self.telescope.sec_diameter.value(),
            self.telescope.diameter.value(),
        )?;

        positive("guider.offset", self.guider.offset.value(), true)?;
        finite("guider.angle", self.guider.angle.value())?;
        positive("guider.diameter", self.guider.diameter.value(), false)?;
        secondary(
            "guider.sec_diameter",
            self.guider.sec_diameter.value(),
            self.guider.diameter.value(),
        )?;

        positive("finder.offset", self.finder.offset.value(), true)?;
        finite("finder.angle", self.finder.angle.value())?;
        positive("finder.diameter", self.finder.diameter.value(), false)?;

        positive("dome.diameter", self.dome.diameter.value(), false)?;
        positive("dome.extent", self.dome.extent.value(), false)?;
        positive("dome.slit_width", self.dome.slit_width.value(), false)?;
        if self.dome.slit_width.value() > self.dome.diameter.value() {
            return Err(ConfigError::invalid(
                "dome.slit_width",
                "must not exceed the dome diameter",
            ));
        }

        let latitude = self.observatory.latitude.value();
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(ConfigError::invalid(
                "observatory.latitude",
                format!("must lie in [-90, 90], got {}", latitude),
            ));
        }

        Ok(())
    }

    /// Same configuration with another slit width. Not validated.
    pub fn with_slit_width(mut self, slit_width: f64) -> Self {
        self.dome.slit_width = Meters::new(slit_width);
        self
    }

    /// Same configuration at another latitude. Not validated.
    pub fn with_latitude(mut self, latitude: f64) -> Self {
        self.observatory.latitude = Degrees::new(latitude);
        self
    }

    /// Same configuration with other mount link lengths. Not validated.
    pub fn with_mount_lengths(mut self, length_1: f64, length_2: f64, length_3: f64) -> Self {
        self.mount = MountSettings {
            length_1: Meters::new(length_1),
            length_2: Meters::new(length_2),
            length_3: Meters::new(length_3),
        };
        self
    }

    pub fn dome_geometry(&self) -> DomeGeometry {
        DomeGeometry::new(
            0.5 * self.dome.diameter.value(),
            self.dome.extent.value(),
            self.dome.slit_width.value(),
        )
    }

    pub fn mount_geometry(&self) -> MountGeometry {
        MountGeometry {
            floor_to_ha_axis: self.mount.length_1.value(),
            ha_to_dec_axis: self.mount.length_2.value(),
            dec_to_tube: self.mount.length_3.value(),
            guider_offset: self.guider.offset.value(),
            guider_angle: self.guider.angle,
            finder_offset: self.finder.offset.value(),
            finder_angle: self.finder.angle,
            latitude: self.observatory.latitude,
        }
    }

    /// Clear aperture radius of an instrument.
    pub fn aperture_radius(&self, instrument: Instrument) -> f64 {
        let diameter = match instrument {
            Instrument::Telescope => self.telescope.diameter,
            Instrument::Guider => self.guider.diameter,
            Instrument::Finder => self.finder.diameter,
        };
        0.5 * diameter.value()
    }

    /// Radius of the central obstruction (secondary mirror); zero for the finder.
    pub fn secondary_radius(&self, instrument: Instrument) -> f64 {
        let diameter = match instrument {
            Instrument::Telescope => self.telescope.sec_diameter.value(),
            Instrument::Guider => self.guider.sec_diameter.value(),
            Instrument::Finder => 0.0,
        };
        0.5 * diameter
    }
}

fn finite(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be finite, got {}", value)))
    }
}

fn positive(field: &str, value: f64, allow_zero: bool) -> Result<(), ConfigError> {
    finite(field, value)?;
    let ok = if allow_zero { value >= 0.0 } else { value > 0.0 };
    if ok {
        Ok(())
    } else if allow_zero {
        Err(ConfigError::invalid(field, format!("must not be negative, got {}", value)))
    } else {
        Err(ConfigError::invalid(field, format!("must be positive, got {}", value)))
    }
}

fn secondary(field: &str, value: f64, primary: f64) -> Result<(), ConfigError> {
    positive(field, value, true)?;
    if value < primary {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("must be smaller than the aperture diameter {}", primary),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[mount]
length_1 = 1.6
length_2 = 0.45
length_3 = 0.55

[telescope]
diameter = 0.4
sec_diameter = 0.15

[guider]
offset = 0.32
angle = 35.0
diameter = 0.1

[finder]
offset = 0.15
angle = 50.0
diameter = 0.05

[dome]
diameter = 6.0
extent = 1.6
slit_width = 1.84

[observatory]
latitude = 52.0
"#;

    #[test]
    fn test_parse_sample_config() {
        let config = ObservatoryConfig::from_toml_str(SAMPLE).unwrap();

        assert_eq!(config.mount.length_1.value(), 1.6);
        assert_eq!(config.guider.angle.value(), 35.0);
        assert_eq!(config.guider.sec_diameter.value(), 0.0);
        assert_eq!(config.observatory.latitude.value(), 52.0);
    }

    #[test]
    fn test_derived_geometry() {
        let config = ObservatoryConfig::from_toml_str(SAMPLE).unwrap();

        let dome = config.dome_geometry();
        assert_eq!(dome.radius, 3.0);
        assert_eq!(dome.extent, 1.6);
        assert_eq!(dome.slit_width, 1.84);

        let mount = config.mount_geometry();
        assert_eq!(mount.dec_to_tube, 0.55);
        assert_eq!(mount.finder_angle.value(), 50.0);

        assert_eq!(config.aperture_radius(Instrument::Telescope), 0.2);
        assert_eq!(config.secondary_radius(Instrument::Telescope), 0.075);
        assert_eq!(config.secondary_radius(Instrument::Finder), 0.0);
    }

    #[test]
    fn test_default_is_valid() {
        let config = ObservatoryConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_closed_slit_is_rejected() {
        for width in [0.0, -0.5] {
            match ObservatoryConfig::default().with_slit_width(width).validate() {
                Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, "dome.slit_width"),
                other => panic!("slit {width}: expected invalid field, got {other:?}"),
            }
        }
        assert!(ObservatoryConfig::default().with_slit_width(1e-9).validate().is_ok());
    }

    #[test]
    fn test_missing_section_is_parse_error() {
        let broken = SAMPLE.replace("[observatory]\nlatitude = 52.0\n", "");
        let err = ObservatoryConfig::from_toml_str(&broken).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_non_positive_dimension_is_rejected() {
        let broken = SAMPLE.replace("diameter = 6.0", "diameter = 0.0");
        let err = ObservatoryConfig::from_toml_str(&broken).unwrap_err();
        match err {
            ConfigError::Invalid { field, .. } => assert_eq!(field, "dome.diameter"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_secondary_must_be_smaller_than_primary() {
        let broken = SAMPLE.replace("sec_diameter = 0.15", "sec_diameter = 0.4");
        let err = ObservatoryConfig::from_toml_str(&broken).unwrap_err();
        assert!(err.to_string().contains("telescope.sec_diameter"));
    }

    #[test]
    fn test_latitude_range_is_checked() {
        let broken = SAMPLE.replace("latitude = 52.0", "latitude = 95.0");
        assert!(ObservatoryConfig::from_toml_str(&broken).is_err());
    }

    #[test]
    fn test_slit_wider_than_dome_is_rejected() {
        let broken = SAMPLE.replace("slit_width = 1.84", "slit_width = 7.0");
        assert!(ObservatoryConfig::from_toml_str(&broken).is_err());
    }
}
