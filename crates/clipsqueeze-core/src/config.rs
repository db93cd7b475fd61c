// crates/clipsqueeze-core/src/config.rs
//
// Application configuration, stored as JSON.
// Default location: see helpers::paths::default_config_path().
//
// {
//   "selected_profile": "high-quality",
//   "profiles": [ { "name": "tiny", "label": "Tiny", "settings": { ... } } ],
//   "staging_dir": "/var/tmp"
// }
//
// Custom profiles are merged over the built-ins by name. A missing file gives
// defaults; an unreadable or invalid file logs a warning and gives defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CompressError;
use crate::helpers::paths;
use crate::profile::{self, ExportProfile};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Name of the profile used for the next export.
    pub selected_profile: String,
    /// Extra or overriding profiles.
    pub profiles:         Vec<ExportProfile>,
    /// Where picked files are copied. `None` = OS temp dir.
    pub staging_dir:      Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            selected_profile: profile::LOW_BANDWIDTH.into(),
            profiles:         Vec::new(),
            staging_dir:      None,
        }
    }
}

impl AppConfig {
    /// Built-ins plus valid custom profiles; custom entries replace built-ins
    /// with the same name.
    pub fn all_profiles(&self) -> Vec<ExportProfile> {
        let mut all = ExportProfile::builtins();
        for custom in &self.profiles {
            if let Err(e) = custom.settings.validate() {
                log::warn!("[config] dropping profile '{}': {e}", custom.name);
                continue;
            }
            match all.iter_mut().find(|p| p.name.eq_ignore_ascii_case(&custom.name)) {
                Some(slot) => *slot = custom.clone(),
                None       => all.push(custom.clone()),
            }
        }
        all
    }

    /// The selected profile, falling back to the first built-in when the name
    /// is unknown.
    pub fn active_profile(&self) -> ExportProfile {
        let all = self.all_profiles();
        profile::find(&all, &self.selected_profile)
            .cloned()
            .unwrap_or_else(|| {
                log::warn!(
                    "[config] unknown profile '{}', using '{}'",
                    self.selected_profile,
                    profile::LOW_BANDWIDTH,
                );
                ExportProfile::default()
            })
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.staging_dir.clone().unwrap_or_else(paths::default_staging_dir)
    }

    /// Strict parse, for callers that want to surface errors.
    pub fn from_json(text: &str) -> Result<Self, CompressError> {
        serde_json::from_str(text).map_err(|e| CompressError::Config(e.to_string()))
    }

    pub fn save(&self, path: &Path) -> Result<(), CompressError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .map_err(|e| CompressError::Config(format!("create '{}': {e}", dir.display())))?;
        }
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| CompressError::Config(e.to_string()))?;
        std::fs::write(path, text)
            .map_err(|e| CompressError::Config(format!("write '{}': {e}", path.display())))
    }
}

/// Load configuration from a JSON file.
///
/// If the file doesn't exist, returns default config.
/// If the file exists but is invalid, logs a warning and returns default config.
pub fn load_config(path: &Path) -> AppConfig {
    log::info!("[config] loading {}", path.display());

    if !path.exists() {
        log::info!("[config] no config file, using defaults");
        return AppConfig::default();
    }

    match std::fs::read_to_string(path) {
        Ok(text) => match AppConfig::from_json(&text) {
            Ok(cfg) => {
                log::info!(
                    "[config] loaded: selected_profile={} custom_profiles={}",
                    cfg.selected_profile,
                    cfg.profiles.len(),
                );
                cfg
            }
            Err(e) => {
                log::warn!("[config] {e}; using defaults");
                AppConfig::default()
            }
        },
        Err(e) => {
            log::warn!("[config] could not read '{}': {e}; using defaults", path.display());
            AppConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{HIGH_QUALITY, LOW_BANDWIDTH};

    fn tiny() -> ExportProfile {
        let mut p = ExportProfile::low_bandwidth();
        p.name  = "tiny".into();
        p.label = "Tiny".into();
        p.settings.width  = 160;
        p.settings.height = 284;
        p
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(&dir.path().join("nope.json"));
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.active_profile().name, LOW_BANDWIDTH);
    }

    #[test]
    fn garbage_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_config(&path), AppConfig::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let cfg = AppConfig {
            selected_profile: "tiny".into(),
            profiles:         vec![tiny()],
            staging_dir:      Some(dir.path().to_path_buf()),
        };
        cfg.save(&path).unwrap();
        let back = load_config(&path);
        assert_eq!(back, cfg);
        assert_eq!(back.active_profile().settings.width, 160);
        assert_eq!(back.staging_dir(), dir.path());
    }

    #[test]
    fn custom_profile_overrides_builtin_by_name() {
        let mut hq = ExportProfile::high_quality();
        hq.settings.video_bitrate = 5_000_000;
        let cfg = AppConfig {
            selected_profile: HIGH_QUALITY.into(),
            profiles:         vec![hq],
            staging_dir:      None,
        };
        assert_eq!(cfg.all_profiles().len(), 2);
        assert_eq!(cfg.active_profile().settings.video_bitrate, 5_000_000);
    }

    #[test]
    fn invalid_custom_profile_is_dropped() {
        let mut bad = tiny();
        bad.settings.width = 161;
        let cfg = AppConfig {
            selected_profile: "tiny".into(),
            profiles:         vec![bad],
            staging_dir:      None,
        };
        assert_eq!(cfg.all_profiles().len(), 2);
        assert_eq!(cfg.active_profile().name, LOW_BANDWIDTH);
    }

    #[test]
    fn partial_json_uses_field_defaults() {
        let cfg = AppConfig::from_json(r#"{ "selected_profile": "high-quality" }"#).unwrap();
        assert!(cfg.profiles.is_empty());
        assert!(cfg.staging_dir.is_none());
        assert_eq!(cfg.active_profile().settings.height, 1280);
    }
}
