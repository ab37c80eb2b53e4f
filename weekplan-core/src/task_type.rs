//! Task type catalogue: per-type frequency bounds and ordering.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Task types keyed by name.
pub type TaskTypes = BTreeMap<String, TaskType>;

/// Closed range `[from, to]`, serialized as a two-element array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(u32, u32)", into = "(u32, u32)")]
pub struct AmountRange {
    pub from: u32,
    pub to: u32,
}

impl AmountRange {
    pub const fn new(from: u32, to: u32) -> Self {
        Self { from, to }
    }

    pub const fn exactly(n: u32) -> Self {
        Self { from: n, to: n }
    }

    pub fn is_valid(&self) -> bool {
        self.from <= self.to
    }

    /// Integer midpoint, rounded down.
    pub fn midpoint(&self) -> u32 {
        self.from + self.to.saturating_sub(self.from) / 2
    }
}

impl From<(u32, u32)> for AmountRange {
    fn from((from, to): (u32, u32)) -> Self {
        Self { from, to }
    }
}

impl From<AmountRange> for (u32, u32) {
    fn from(r: AmountRange) -> Self {
        (r.from, r.to)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskType {
    pub description: String,

    /// On how many distinct days per week this type may appear.
    pub weekly_amount_days: AmountRange,

    /// How many instances of this type a single day may hold.
    pub daily_amount: AmountRange,

    /// Higher importance is served first when types compete.
    #[serde(default)]
    pub importance: f64,

    #[serde(default)]
    pub pick_up_priority: f64,

    #[serde(default)]
    pub sorting_index: i32,

    #[serde(default)]
    pub color: String,
}

impl TaskType {
    pub fn new(description: impl Into<String>, weekly: AmountRange, daily: AmountRange) -> Self {
        Self {
            description: description.into(),
            weekly_amount_days: weekly,
            daily_amount: daily,
            importance: 0.0,
            pick_up_priority: 0.0,
            sorting_index: 0,
            color: String::new(),
        }
    }

    pub fn with_importance(mut self, importance: f64) -> Self {
        self.importance = importance;
        self
    }

    pub fn with_pick_up_priority(mut self, priority: f64) -> Self {
        self.pick_up_priority = priority;
        self
    }

    pub fn with_sorting_index(mut self, index: i32) -> Self {
        self.sorting_index = index;
        self
    }
}

/// Types in display order: sorting index, then name.
pub fn display_order(types: &TaskTypes) -> Vec<(&str, &TaskType)> {
    let mut ordered: Vec<(&str, &TaskType)> =
        types.iter().map(|(name, t)| (name.as_str(), t)).collect();
    ordered.sort_by(|a, b| a.1.sorting_index.cmp(&b.1.sorting_index).then(a.0.cmp(b.0)));
    ordered
}
