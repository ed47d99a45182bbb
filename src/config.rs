//! Configuration types for the expedition scheduler.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::catalog::ExpeditionId;
use crate::error::{ExpeditionError, Result};
use crate::fleet::FleetId;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlotillaConfig {
    /// Control loop settings.
    pub schedule: ScheduleConfig,
    /// Which expeditions each fleet may run.
    pub expeditions: ExpeditionConfig,
}

/// Control loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Seconds to sleep between scheduler cycles.
    pub poll_interval_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 20,
        }
    }
}

/// Expedition rosters, one list per usable fleet slot.
///
/// Fleet 1 is the sortie fleet and never runs expeditions. A slot set to
/// an empty list is out of the rotation; a slot omitted from the file
/// keeps its default roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpeditionConfig {
    /// Expeditions fleet 2 may be sent on.
    pub fleet2: Option<Vec<ExpeditionId>>,
    /// Expeditions fleet 3 may be sent on.
    pub fleet3: Option<Vec<ExpeditionId>>,
    /// Expeditions fleet 4 may be sent on.
    pub fleet4: Option<Vec<ExpeditionId>>,
}

impl Default for ExpeditionConfig {
    fn default() -> Self {
        Self {
            fleet2: Some(vec![ExpeditionId::Numbered(2)]),
            fleet3: Some(vec![ExpeditionId::Numbered(5)]),
            fleet4: Some(vec![ExpeditionId::Numbered(21)]),
        }
    }
}

impl ExpeditionConfig {
    /// (fleet, roster) pairs for every fleet in the rotation, in fleet
    /// order. Empty and unset slots are skipped.
    pub fn rosters(&self) -> impl Iterator<Item = (FleetId, &[ExpeditionId])> {
        [
            (2, self.fleet2.as_deref()),
            (3, self.fleet3.as_deref()),
            (4, self.fleet4.as_deref()),
        ]
        .into_iter()
        .filter_map(|(id, roster)| roster.filter(|r| !r.is_empty()).map(|r| (id, r)))
    }
}

impl FlotillaConfig {
    /// Load configuration from a TOML file, falling back to defaults for
    /// missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a
    /// configured roster is invalid.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&content).map_err(|e| ExpeditionError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the rotation is not empty: at least one fleet must
    /// have expeditions to run.
    pub fn validate(&self) -> Result<()> {
        if self.expeditions.rosters().next().is_none() {
            return Err(ExpeditionError::Config(
                "no fleet has any expeditions configured".to_owned(),
            ));
        }
        Ok(())
    }

    /// Returns the default config file path: `~/.config/flotilla/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("flotilla").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("flotilla")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/flotilla-config/config.toml")
        }
    }
}
