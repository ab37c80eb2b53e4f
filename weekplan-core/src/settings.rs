//! Run settings: a flat string map plus the typed view the planner needs.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

pub const KEY_LOG_LEVEL: &str = "log-level";
pub const KEY_DAYS_IN_WEEK: &str = "days-in-week";
pub const KEY_MAX_TASKS_PER_DAY: &str = "max-tasks-per-day";
pub const KEY_ADJUST_ITERATIONS: &str = "adjust-iterations";

pub const DEFAULT_DAYS_IN_WEEK: usize = 7;
pub const DEFAULT_MAX_TASKS_PER_DAY: usize = 5;
pub const DEFAULT_ADJUST_ITERATIONS: usize = 4024;
pub const DEFAULT_PLACEMENT_SCAN_LIMIT: usize = 1000;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings(BTreeMap<String, String>);

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `log-level = verbose` turns on the diagnostic trace.
    pub fn is_verbose(&self) -> bool {
        self.get(KEY_LOG_LEVEL)
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("verbose"))
    }

    /// Parse `key` when present.
    pub fn parse<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse()
                .map(Some)
                .with_context(|| format!("setting '{key}' has invalid value '{raw}'")),
        }
    }
}

impl FromIterator<(String, String)> for Settings {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Knobs of one planning run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannerConfig {
    pub days_in_week: usize,
    /// Occupied slots a day may hold before the repair loop trims it.
    pub max_tasks_per_day: usize,
    pub adjust_iterations: usize,
    pub placement_scan_limit: usize,
    pub verbose: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            days_in_week: DEFAULT_DAYS_IN_WEEK,
            max_tasks_per_day: DEFAULT_MAX_TASKS_PER_DAY,
            adjust_iterations: DEFAULT_ADJUST_ITERATIONS,
            placement_scan_limit: DEFAULT_PLACEMENT_SCAN_LIMIT,
            verbose: false,
        }
    }
}

impl PlannerConfig {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let defaults = Self::default();
        let days_in_week = settings
            .parse(KEY_DAYS_IN_WEEK)?
            .unwrap_or(defaults.days_in_week);
        if days_in_week == 0 {
            bail!("setting '{KEY_DAYS_IN_WEEK}' must be at least 1");
        }

        Ok(Self {
            days_in_week,
            max_tasks_per_day: settings
                .parse(KEY_MAX_TASKS_PER_DAY)?
                .unwrap_or(defaults.max_tasks_per_day),
            adjust_iterations: settings
                .parse(KEY_ADJUST_ITERATIONS)?
                .unwrap_or(defaults.adjust_iterations),
            placement_scan_limit: defaults.placement_scan_limit,
            verbose: settings.is_verbose(),
        })
    }
}
