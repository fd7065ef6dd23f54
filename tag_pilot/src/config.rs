//! Tunables shared by the server and the capture tool.

use crate::core_modules::decision::DEFAULT_TOLERANCE;
use crate::core_modules::store::DEFAULT_STORE_FILE;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// AprilTag family the detector looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TagFamily {
    #[default]
    Tag36h11,
    Tag36h10,
    Tag25h9,
    Tag16h5,
}

impl fmt::Display for TagFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagFamily::Tag36h11 => write!(f, "36h11"),
            TagFamily::Tag36h10 => write!(f, "36h10"),
            TagFamily::Tag25h9 => write!(f, "25h9"),
            TagFamily::Tag16h5 => write!(f, "16h5"),
        }
    }
}

impl FromStr for TagFamily {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches("tag") {
            "36h11" => Ok(TagFamily::Tag36h11),
            "36h10" => Ok(TagFamily::Tag36h10),
            "25h9" => Ok(TagFamily::Tag25h9),
            "16h5" => Ok(TagFamily::Tag16h5),
            _ => Err(ConfigError::UnknownTagFamily(s.to_string())),
        }
    }
}

/// Runtime configuration for a steering deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PilotConfig {
    /// Dead-zone half-width as a fraction of half the frame width.
    pub tolerance: f64,
    /// Index of the camera opened by the capture tool.
    pub camera_index: i32,
    /// Location of the shared last-command record.
    pub store_path: PathBuf,
    /// Address the HTTP server binds to.
    pub bind_addr: String,
    pub tag_family: TagFamily,
}

impl PilotConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ConfigError::InvalidTolerance(self.tolerance));
        }
        Ok(())
    }
}

impl Default for PilotConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            camera_index: 0,
            store_path: PathBuf::from(DEFAULT_STORE_FILE),
            bind_addr: "0.0.0.0:5000".to_string(),
            tag_family: TagFamily::Tag36h11,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = PilotConfig::default();
        assert_eq!(config.tolerance, 0.15);
        assert_eq!(config.camera_index, 0);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn negative_tolerance_is_rejected() {
        let config = PilotConfig {
            tolerance: -0.5,
            ..PilotConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidTolerance(-0.5)));
    }

    #[test]
    fn tag_family_parsing() {
        assert_eq!("tag36h11".parse::<TagFamily>(), Ok(TagFamily::Tag36h11));
        assert_eq!("16h5".parse::<TagFamily>(), Ok(TagFamily::Tag16h5));
        assert!("36h12".parse::<TagFamily>().is_err());
        assert_eq!(TagFamily::Tag25h9.to_string().parse::<TagFamily>(), Ok(TagFamily::Tag25h9));
    }
}
