use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::IndexConfig;
use crate::error::IndexError;

/// Retrieval resolution, ordered from most precise to widest recall.
///
/// Each mode carries a 4-bit mask: POINT fixes every axis, the range modes
/// progressively free the phase axis, then neighbouring bands, then a wide
/// band window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Best single match in the 3×3 neighbourhood of the probe's bucket.
    #[default]
    Point,
    /// Every sector of the probe's own band.
    Line,
    /// LINE plus the adjacent band on each side.
    Plane,
    /// LINE widened to `space_radius` bands on each side.
    Space,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Point, Mode::Line, Mode::Plane, Mode::Space];

    pub fn mask(&self) -> u8 {
        match self {
            Self::Point => 0b1111,
            Self::Line => 0b0001,
            Self::Plane => 0b0011,
            Self::Space => 0b0111,
        }
    }

    pub fn from_mask(mask: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.mask() == mask)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Line => "line",
            Self::Plane => "plane",
            Self::Space => "space",
        }
    }

    /// Bands scanned on each side of the probe's band; `None` for POINT,
    /// which uses the fixed 3×3 neighbourhood instead of a range scan.
    pub fn band_radius(&self, config: &IndexConfig) -> Option<u32> {
        match self {
            Self::Point => None,
            Self::Line => Some(0),
            Self::Plane => Some(1),
            Self::Space => Some(config.space_radius),
        }
    }
}

impl FromStr for Mode {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "point" => Ok(Self::Point),
            "line" => Ok(Self::Line),
            "plane" => Ok(Self::Plane),
            "space" => Ok(Self::Space),
            _ => Err(IndexError::UnknownMode(s.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
