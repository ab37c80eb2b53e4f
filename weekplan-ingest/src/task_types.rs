//! Task type catalogue stored as JSON.

use anyhow::{Context, Result, bail};
use std::path::Path;
use tracing::debug;

use weekplan_core::TaskTypes;

pub fn load_task_types(path: impl AsRef<Path>) -> Result<TaskTypes> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading task types from {}", path.display()))?;
    let types: TaskTypes = serde_json::from_str(&raw)
        .with_context(|| format!("parsing task types in {}", path.display()))?;
    validate(&types).with_context(|| format!("validating {}", path.display()))?;
    debug!(count = types.len(), path = %path.display(), "loaded task types");
    Ok(types)
}

pub fn save_task_types(path: impl AsRef<Path>, types: &TaskTypes) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(types)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Every range must satisfy `from <= to`.
pub fn validate(types: &TaskTypes) -> Result<()> {
    for (name, t) in types {
        if name.trim().is_empty() {
            bail!("task type with an empty name");
        }
        if !t.weekly_amount_days.is_valid() {
            bail!(
                "{name}: WeeklyAmountDays [{}, {}] is inverted",
                t.weekly_amount_days.from,
                t.weekly_amount_days.to
            );
        }
        if !t.daily_amount.is_valid() {
            bail!(
                "{name}: DailyAmount [{}, {}] is inverted",
                t.daily_amount.from,
                t.daily_amount.to
            );
        }
    }
    Ok(())
}
