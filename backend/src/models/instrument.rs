use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Optical aperture carried by the mount.
///
/// The guider is mounted on the main tube; the finder is mounted on the
/// guider. Each variant only adds a fixed offset to the tube pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Instrument {
    #[default]
    Telescope,
    Guider,
    Finder,
}

impl Instrument {
    pub const ALL: [Instrument; 3] = [Self::Telescope, Self::Guider, Self::Finder];

    /// Lowercase name, used in file names and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Telescope => "telescope",
            Self::Guider => "guider",
            Self::Finder => "finder",
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Instrument {
    type Err = String;

    /// Parse an instrument name ("telescope", "guider", "finder").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "telescope" | "tube" | "main" => Ok(Self::Telescope),
            "guider" => Ok(Self::Guider),
            "finder" => Ok(Self::Finder),
            _ => Err(format!("Unknown instrument: {}", s)),
        }
    }
}
