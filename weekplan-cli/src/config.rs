//! CLI-side settings: file locations and prompt backend knobs.

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::time::Duration;

use weekplan_core::Settings;

use crate::llm::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS};

pub const DEFAULT_SETTINGS_PATH: &str = "Data/Settings.json";

pub const KEY_OUTPUT_DIR: &str = "output-dir";
pub const KEY_TASKS_DIR: &str = "tasks-dir";
pub const KEY_TASK_TYPES: &str = "task-types";
pub const KEY_MOTD_FILE: &str = "motd-file";
pub const KEY_AI_ENDPOINT: &str = "ai-endpoint";
pub const KEY_AI_TIMEOUT_SECS: &str = "ai-timeout-secs";
pub const KEY_START_DATE: &str = "start-date";
pub const KEY_OUTPUT_FILE: &str = "output-file";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub output_dir: PathBuf,
    pub tasks_dir: PathBuf,
    pub task_types: PathBuf,
    pub motd_file: PathBuf,
    pub ai_endpoint: String,
    pub ai_timeout: Duration,
}

impl AppConfig {
    /// Relative paths are taken relative to `base`, the settings file's directory.
    pub fn from_settings(settings: &Settings, base: &Path) -> Result<Self> {
        let path = |key: &str, default: &str| {
            let raw = settings.get(key).unwrap_or(default);
            base.join(raw)
        };
        Ok(Self {
            output_dir: path(KEY_OUTPUT_DIR, "."),
            tasks_dir: path(KEY_TASKS_DIR, "Tasks"),
            task_types: path(KEY_TASK_TYPES, "TaskTypes.json"),
            motd_file: path(KEY_MOTD_FILE, "MessageOfTheDay.txt"),
            ai_endpoint: settings
                .get(KEY_AI_ENDPOINT)
                .unwrap_or(DEFAULT_ENDPOINT)
                .to_string(),
            ai_timeout: Duration::from_secs(
                settings
                    .parse(KEY_AI_TIMEOUT_SECS)?
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_resolve_against_base() {
        let cfg = AppConfig::from_settings(&Settings::new(), Path::new("Data")).unwrap();
        assert_eq!(cfg.tasks_dir, PathBuf::from("Data/Tasks"));
        assert_eq!(cfg.task_types, PathBuf::from("Data/TaskTypes.json"));
        assert_eq!(cfg.output_dir, PathBuf::from("Data/."));
        assert_eq!(cfg.ai_endpoint, DEFAULT_ENDPOINT);
        assert_eq!(cfg.ai_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_absolute_paths_win() {
        let settings = Settings::new()
            .with(KEY_OUTPUT_DIR, "/tmp/plans")
            .with(KEY_AI_TIMEOUT_SECS, "5");
        let cfg = AppConfig::from_settings(&settings, Path::new("Data")).unwrap();
        assert_eq!(cfg.output_dir, PathBuf::from("/tmp/plans"));
        assert_eq!(cfg.ai_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_bad_timeout_is_an_error() {
        let settings = Settings::new().with(KEY_AI_TIMEOUT_SECS, "soon");
        assert!(AppConfig::from_settings(&settings, Path::new(".")).is_err());
    }
}
