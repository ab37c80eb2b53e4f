//! Repair loop: trims placements until every day fits the per-day cap.
//!
//! Each iteration samples a random slot. An occupied slot is vacated when its
//! type exceeds the current daily or weekly bound and the slot is not
//! protected. Bounds tighten over the run (see [`Strictness`]).

use tracing::{debug, warn};

use crate::rng::LinearCongruentialRng;
use crate::task::Task;
use crate::task_type::{TaskType, TaskTypes};
use crate::week::WeekDistribution;

/// How hard the repair loop pushes, by share of the iteration budget used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Strictness {
    /// First third: configured maxima, chained slots kept.
    Relaxed,
    /// Second third: weekly midpoint, daily maximum minus one.
    Tightened,
    /// Last third: weekly minimum, chained slots may go.
    Strict,
}

impl Strictness {
    pub fn at(iteration: usize, budget: usize) -> Self {
        let (i, budget) = (iteration as u128, budget as u128);
        if i * 3 < budget {
            Strictness::Relaxed
        } else if i * 3 < budget * 2 {
            Strictness::Tightened
        } else {
            Strictness::Strict
        }
    }

    pub fn weekly_cap(self, task_type: &TaskType) -> u32 {
        let weekly = task_type.weekly_amount_days;
        match self {
            Strictness::Relaxed => weekly.to,
            Strictness::Tightened => weekly.midpoint(),
            Strictness::Strict => weekly.from,
        }
    }

    pub fn daily_cap(self, task_type: &TaskType) -> u32 {
        let daily = task_type.daily_amount;
        match self {
            Strictness::Relaxed => daily.to,
            Strictness::Tightened | Strictness::Strict => daily.to.saturating_sub(1).max(daily.from),
        }
    }

    pub fn keeps_chains(self) -> bool {
        self != Strictness::Strict
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdjustReport {
    pub iterations: usize,
    pub removed: usize,
    /// Every day ended at or below the cap.
    pub converged: bool,
    pub days_over_cap: usize,
}

pub struct Adjuster<'a> {
    task_types: &'a TaskTypes,
    max_tasks_per_day: usize,
    budget: usize,
}

impl<'a> Adjuster<'a> {
    pub fn new(task_types: &'a TaskTypes, max_tasks_per_day: usize, budget: usize) -> Self {
        Self {
            task_types,
            max_tasks_per_day,
            budget,
        }
    }

    pub fn days_over_cap(&self, week: &WeekDistribution) -> usize {
        (0..week.days_in_week())
            .filter(|&d| week.occupied_count(d) > self.max_tasks_per_day)
            .count()
    }

    pub fn adjust(
        &self,
        week: &mut WeekDistribution,
        tasks: &[Task],
        rng: &mut LinearCongruentialRng,
    ) -> AdjustReport {
        let mut report = AdjustReport::default();

        for i in 0..self.budget {
            if self.days_over_cap(week) == 0 {
                break;
            }
            report.iterations = i + 1;
            let level = Strictness::at(i, self.budget);

            let day = rng.index(week.days_in_week());
            let ids = week.days()[day].slot_ids();
            if ids.is_empty() {
                continue;
            }
            let id = ids[rng.index(ids.len())];

            let slot = week.slot(id);
            if slot.is_empty() || week.occupied_count(day) <= self.max_tasks_per_day {
                continue;
            }
            if slot.is_protected() || (level.keeps_chains() && slot.is_chained()) {
                continue;
            }
            let Some(task_type) = self.task_types.get(slot.task_type()) else {
                continue;
            };

            let days_used = week
                .days_per_type()
                .get(slot.task_type())
                .copied()
                .unwrap_or(0);
            let over_daily = week.used_count(day, slot.task_type()) > level.daily_cap(task_type) as usize;
            let over_weekly = days_used > level.weekly_cap(task_type) as usize;
            if !(over_daily || over_weekly) {
                continue;
            }

            if let Some(task) = week.vacate(id) {
                report.removed += 1;
                debug!(
                    iteration = i,
                    ?level,
                    day,
                    task = tasks.get(task).map(|t| t.id.as_str()).unwrap_or("?"),
                    over_daily,
                    over_weekly,
                    "removed placement"
                );
            }
        }

        report.days_over_cap = self.days_over_cap(week);
        report.converged = report.days_over_cap == 0;
        if !report.converged {
            warn!(
                days_over_cap = report.days_over_cap,
                cap = self.max_tasks_per_day,
                iterations = report.iterations,
                "adjustment did not converge"
            );
        }
        report
    }
}
