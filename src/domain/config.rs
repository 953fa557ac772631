//! Device profiles
//!
//! A profile is a saved set of receiver settings (tuning, rate, gain, port
//! modes) that can be applied to an open device in one call. Profiles are
//! stored as `<name>.json` in a directory managed by [`ProfileStore`].

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::{Bb60Error, Bb60Result};
use super::types::{ApplyPolicy, GainMode};

/// A saved receiver profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceProfile {
    /// Profile name (e.g., "Default", "ISM 2.4 GHz survey")
    pub name: String,
    pub frequency_hz: f64,
    /// Requested sample rate; `None` keeps the device's current decimation
    #[serde(default)]
    pub sample_rate_hz: Option<f64>,
    /// Bandwidth ceiling; `None` keeps the current ceiling
    #[serde(default)]
    pub bandwidth_hz: Option<f64>,
    pub gain_mode: GainMode,
    pub rf_gain: i32,
    pub attenuation_db: f64,
    pub reference_level_db: f64,
    pub port1: String,
    pub port2: String,
    #[serde(default)]
    pub policy: ApplyPolicy,
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            frequency_hz: 100e6,
            sample_rate_hz: None,
            bandwidth_hz: None,
            gain_mode: GainMode::ReferenceLevel,
            rf_gain: 0,
            attenuation_db: 0.0,
            reference_level_db: -30.0,
            port1: "DEFAULT".to_string(),
            port2: "DEFAULT".to_string(),
            policy: ApplyPolicy::BestEffort,
        }
    }
}

/// Validate a profile name for use as a filename.
/// Rejects empty names, path separators and other special characters.
pub fn sanitize_name(name: &str) -> Bb60Result<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Bb60Error::Config("Profile name cannot be empty".into()));
    }
    let valid = trimmed
        .chars()
        .all(|c| c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' || c == '.');
    if !valid || trimmed.contains("..") {
        return Err(Bb60Error::Config(format!(
            "Invalid profile name '{trimmed}'"
        )));
    }
    Ok(trimmed)
}

/// Directory of JSON profiles
pub struct ProfileStore {
    dir: PathBuf,
}

impl ProfileStore {
    /// Open (and create if needed) a profile directory
    pub fn open(dir: impl AsRef<Path>) -> Bb60Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| {
            Bb60Error::Config(format!("Failed to create {}: {e}", dir.display()))
        })?;
        Ok(Self { dir })
    }

    fn path_for(&self, name: &str) -> Bb60Result<PathBuf> {
        let name = sanitize_name(name)?;
        Ok(self.dir.join(format!("{name}.json")))
    }

    pub fn save(&self, profile: &DeviceProfile) -> Bb60Result<()> {
        let path = self.path_for(&profile.name)?;
        let json = serde_json::to_string_pretty(profile)
            .map_err(|e| Bb60Error::Config(format!("Failed to serialize profile: {e}")))?;
        fs::write(&path, json).map_err(|e| {
            Bb60Error::Config(format!("Failed to write profile '{}': {e}", profile.name))
        })?;
        log::debug!("Saved profile to {}", path.display());
        Ok(())
    }

    pub fn load(&self, name: &str) -> Bb60Result<DeviceProfile> {
        let path = self.path_for(name)?;
        let json = fs::read_to_string(&path)
            .map_err(|e| Bb60Error::Config(format!("Failed to read profile '{name}': {e}")))?;
        serde_json::from_str(&json)
            .map_err(|e| Bb60Error::Config(format!("Failed to parse profile '{name}': {e}")))
    }

    /// Profile names, sorted
    pub fn list(&self) -> Bb60Result<Vec<String>> {
        let entries = fs::read_dir(&self.dir)
            .map_err(|e| Bb60Error::Config(format!("Failed to read profile dir: {e}")))?;
        let mut names: Vec<String> = entries
            .filter_map(|entry| {
                let path = entry.ok()?.path();
                if path.extension()?.to_str()? == "json" {
                    path.file_stem()?.to_str().map(String::from)
                } else {
                    None
                }
            })
            .collect();
        names.sort();
        Ok(names)
    }

    pub fn delete(&self, name: &str) -> Bb60Result<()> {
        if sanitize_name(name)? == "Default" {
            return Err(Bb60Error::Config(
                "Cannot delete the Default profile".to_string(),
            ));
        }
        let path = self.path_for(name)?;
        if !path.exists() {
            return Err(Bb60Error::Config(format!("Profile '{name}' not found")));
        }
        fs::remove_file(&path)
            .map_err(|e| Bb60Error::Config(format!("Failed to delete profile '{name}': {e}")))
    }
}
