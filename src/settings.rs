//! Driver settings
//!
//! Persistent preferences for the driver binary, stored next to the
//! executable as `settings.ron`. Everything here is overridable from the
//! command line; the file just saves retyping.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// User-configurable driver settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DriverSettings {
    /// Default tracing filter when --log-filter is not given
    pub log_filter: String,
    /// Directory run reports land in when --output names a bare file
    pub output_dir: Option<PathBuf>,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            output_dir: None,
        }
    }
}

impl DriverSettings {
    fn settings_path() -> PathBuf {
        PathBuf::from("settings.ron")
    }

    /// Load settings from file, or return defaults if the file is missing
    /// or malformed. A bad settings file must not stop a run.
    pub fn load() -> Self {
        let path = Self::settings_path();
        if !path.exists() {
            return Self::default();
        }
        match fs::read_to_string(&path) {
            Ok(contents) => match ron::from_str(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    warn!("failed to parse settings file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("failed to read settings file: {}", e);
                Self::default()
            }
        }
    }

    /// Save settings to file
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let path = Self::settings_path();
        let contents = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        fs::write(&path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_round_trip_through_ron() {
        let settings = DriverSettings::default();
        let text = ron::ser::to_string_pretty(&settings, ron::ser::PrettyConfig::default())
            .expect("serializes");
        let back: DriverSettings = ron::from_str(&text).expect("parses");
        assert_eq!(back.log_filter, "info");
        assert!(back.output_dir.is_none());
    }
}
