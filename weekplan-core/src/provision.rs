//! Capacity provisioning: the empty slot grid every run starts from.

use tracing::debug;

use crate::task_type::{TaskTypes, display_order};
use crate::week::WeekDistribution;

/// Create `DailyAmount.to` empty slots for every type on every day.
///
/// Weekly bounds are not applied here; the repair loop trims later.
pub fn fill_to_maximum(task_types: &TaskTypes, days_in_week: usize) -> WeekDistribution {
    let mut week = WeekDistribution::new(days_in_week);

    for day in 0..days_in_week {
        for (name, task_type) in display_order(task_types) {
            for _ in 0..task_type.daily_amount.to {
                week.add_slot(day, name);
            }
        }
    }

    debug!(
        slots = week.slot_count(),
        types = task_types.len(),
        days = days_in_week,
        "provisioned capacity"
    );
    week
}
