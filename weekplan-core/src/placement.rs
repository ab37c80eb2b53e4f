//! Placement engine: greedy, priority-weighted assignment of tasks to slots.
//!
//! Two passes: FOCUS tasks first, then everything else. Each scan looks at
//! the types that both have remaining tasks and free slots, serves them in
//! importance order, and places one weighted-random task of the first type
//! that accepts one. A pass ends when a full scan places nothing.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::rng::LinearCongruentialRng;
use crate::task::{DayPreference, Task};
use crate::task_type::{TaskType, TaskTypes};
use crate::week::{Placement, SlotId, TaskRef, WeekDistribution};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacementReport {
    pub placed: usize,
    /// Ids of tasks that did not get any slot.
    pub unplaced: Vec<String>,
    /// Tasks that got fewer days than their minimum.
    pub below_minimum: usize,
    pub scans: usize,
    /// Scan limit hit before both passes finished.
    pub aborted: bool,
}

/// Slots chosen for one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedTask {
    pub slots: Vec<SlotId>,
    pub with_preference: bool,
}

pub struct PlacementEngine<'a> {
    task_types: &'a TaskTypes,
    scan_limit: usize,
}

impl<'a> PlacementEngine<'a> {
    pub fn new(task_types: &'a TaskTypes, scan_limit: usize) -> Self {
        Self {
            task_types,
            scan_limit,
        }
    }

    pub fn populate_with_tasks(
        &self,
        week: &mut WeekDistribution,
        tasks: &[Task],
        rng: &mut LinearCongruentialRng,
    ) -> PlacementReport {
        let (focus, rest): (Vec<TaskRef>, Vec<TaskRef>) =
            (0..tasks.len()).partition(|&i| tasks[i].is_focus());

        let mut report = PlacementReport::default();
        for (pool, focused) in [(focus, true), (rest, false)] {
            if report.aborted {
                report
                    .unplaced
                    .extend(pool.iter().map(|&i| tasks[i].id.clone()));
                continue;
            }
            self.run_pass(week, tasks, pool, focused, rng, &mut report);
        }

        debug!(
            placed = report.placed,
            unplaced = report.unplaced.len(),
            scans = report.scans,
            "placement finished"
        );
        report
    }

    fn run_pass(
        &self,
        week: &mut WeekDistribution,
        tasks: &[Task],
        mut remaining: Vec<TaskRef>,
        focused: bool,
        rng: &mut LinearCongruentialRng,
        report: &mut PlacementReport,
    ) {
        while !remaining.is_empty() {
            if report.scans >= self.scan_limit {
                warn!(
                    limit = self.scan_limit,
                    remaining = remaining.len(),
                    "placement aborted: scan limit reached"
                );
                report.aborted = true;
                break;
            }
            report.scans += 1;

            let mut placed = None;
            for type_name in self.competing_types(week, tasks, &remaining) {
                let candidates: Vec<TaskRef> = remaining
                    .iter()
                    .copied()
                    .filter(|&i| tasks[i].task_type == type_name)
                    .collect();

                let pick = match rng.spawn(&candidates, |&i| tasks[i].pick_up_priority) {
                    Some((_, &i)) => Some(i),
                    None => rng.choose(&candidates).copied(),
                };
                let Some(task_ref) = pick else { continue };

                let task = &tasks[task_ref];
                if let Some(done) = try_to_place(week, task, task_ref, focused, rng) {
                    if done.slots.len() < task.days.from as usize {
                        debug!(
                            task = %task.id,
                            got = done.slots.len(),
                            wanted = task.days.from,
                            "placed below minimum day count"
                        );
                        report.below_minimum += 1;
                    }
                    placed = Some(task_ref);
                    break;
                }
            }

            // A full scan without a placement ends the pass.
            let Some(task_ref) = placed else { break };
            remaining.retain(|&i| i != task_ref);
            report.placed += 1;
        }

        report
            .unplaced
            .extend(remaining.iter().map(|&i| tasks[i].id.clone()));
    }

    /// Types with both remaining tasks and free slots, most important first.
    fn competing_types(
        &self,
        week: &WeekDistribution,
        tasks: &[Task],
        remaining: &[TaskRef],
    ) -> Vec<String> {
        let wanted: BTreeSet<&str> = remaining
            .iter()
            .map(|&i| tasks[i].task_type.as_str())
            .collect();
        let free = week.types_with_empty_slots();

        let mut competing: Vec<(&str, &TaskType)> = wanted
            .intersection(&free)
            .filter_map(|name| self.task_types.get(*name).map(|t| (*name, t)))
            .collect();
        competing.sort_by(|a, b| compare_types(a, b));
        competing.into_iter().map(|(n, _)| n.to_string()).collect()
    }
}

fn compare_types(a: &(&str, &TaskType), b: &(&str, &TaskType)) -> Ordering {
    b.1.importance
        .total_cmp(&a.1.importance)
        .then(b.1.pick_up_priority.total_cmp(&a.1.pick_up_priority))
        .then(a.1.sorting_index.cmp(&b.1.sorting_index))
        .then(a.0.cmp(b.0))
}

/// Place one task. Returns the filled slots, or `None` when no slot was
/// found.
pub fn try_to_place(
    week: &mut WeekDistribution,
    task: &Task,
    task_ref: TaskRef,
    focused: bool,
    rng: &mut LinearCongruentialRng,
) -> Option<PlacedTask> {
    let week_len = i32::try_from(week.days_in_week()).unwrap_or(i32::MAX);
    let bound = |n: u32| i32::try_from(n).unwrap_or(i32::MAX).min(week_len);
    let days = rng.range_inclusive(bound(task.days.from), bound(task.days.to)) as usize;

    let preference = task.day_preference();
    let preferred = preferred_slots(week, &task.task_type, preference, days);

    let mut chosen = PlacedTask {
        slots: preferred,
        with_preference: true,
    };
    let has_scan = matches!(
        preference,
        DayPreference::WeekStart | DayPreference::WeekMiddle | DayPreference::WeekEnd
    );
    if !has_scan || chosen.slots.len() < task.days.from as usize {
        let fallback = fallback_slots(week, &task.task_type, days, rng);
        if fallback.len() > chosen.slots.len() {
            chosen = PlacedTask {
                slots: fallback,
                with_preference: false,
            };
        }
    }

    if chosen.slots.is_empty() {
        return None;
    }

    let placement = Placement {
        with_preference: chosen.with_preference,
        focused,
    };
    for id in &chosen.slots {
        week.assign(*id, task_ref, placement);
    }
    for pair in chosen.slots.windows(2) {
        week.link(pair[0], pair[1]);
    }

    debug!(
        task = %task.id,
        task_type = %task.task_type,
        days = chosen.slots.len(),
        with_preference = chosen.with_preference,
        focused,
        "placed task"
    );
    Some(chosen)
}

/// Scan the preferred days in order, one slot per day, stopping at the
/// first day without a free slot.
fn preferred_slots(
    week: &WeekDistribution,
    task_type: &str,
    preference: DayPreference,
    days: usize,
) -> Vec<SlotId> {
    let len = week.days_in_week();
    let candidates: Vec<usize> = match preference {
        DayPreference::WeekStart => (0..days.min(len)).collect(),
        DayPreference::WeekMiddle => {
            let start = len / 2;
            (start..(start + days).min(len)).collect()
        }
        DayPreference::WeekEnd => (len.saturating_sub(days)..len).rev().collect(),
        DayPreference::WeekDays | DayPreference::None => Vec::new(),
    };

    let mut slots = Vec::new();
    for day in candidates {
        match week.first_empty_slot(day, task_type) {
            Some(id) => slots.push(id),
            None => break,
        }
    }

    if preference == DayPreference::WeekEnd {
        slots.reverse();
    }
    slots
}

/// Visit all days in random order and take the first free slot of each,
/// up to `days` slots. Returned in day order.
fn fallback_slots(
    week: &WeekDistribution,
    task_type: &str,
    days: usize,
    rng: &mut LinearCongruentialRng,
) -> Vec<SlotId> {
    let mut order: Vec<usize> = (0..week.days_in_week()).collect();
    rng.shuffle(&mut order);

    let mut slots: Vec<SlotId> = order
        .into_iter()
        .filter_map(|day| week.first_empty_slot(day, task_type))
        .take(days)
        .collect();
    slots.sort_by_key(|id| week.slot(*id).day());
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provision::fill_to_maximum;
    use crate::task::PreferenceTag;
    use crate::task_type::AmountRange;

    fn gym_types(daily_max: u32) -> TaskTypes {
        let mut t = TaskTypes::new();
        t.insert(
            "Gym".into(),
            TaskType::new("Workout", AmountRange::new(2, 3), AmountRange::new(0, daily_max)),
        );
        t
    }

    fn rng(seed: i64) -> LinearCongruentialRng {
        LinearCongruentialRng::from_seed(seed).unwrap()
    }

    #[test]
    fn test_week_start_places_from_monday_in_chain() {
        let types = gym_types(1);
        let mut week = fill_to_maximum(&types, 7);
        let task = Task::new("Gym", "g1", "Lift")
            .with_days(2, 3)
            .with_preference(PreferenceTag::WeekStart);

        let placed = try_to_place(&mut week, &task, 0, false, &mut rng(42)).unwrap();
        assert!(placed.with_preference);
        let days: Vec<usize> = placed.slots.iter().map(|id| week.slot(*id).day()).collect();
        assert!(days == vec![0, 1] || days == vec![0, 1, 2], "got {days:?}");
        assert_eq!(week.chain(placed.slots[0]), placed.slots);
        assert!(week.links_are_symmetric());
    }

    #[test]
    fn test_week_end_is_chronological() {
        let types = gym_types(1);
        let mut week = fill_to_maximum(&types, 7);
        let task = Task::new("Gym", "g1", "Swim")
            .with_days(3, 3)
            .with_preference(PreferenceTag::WeekEnd);

        let placed = try_to_place(&mut week, &task, 0, false, &mut rng(1)).unwrap();
        let days: Vec<usize> = placed.slots.iter().map(|id| week.slot(*id).day()).collect();
        assert_eq!(days, vec![4, 5, 6]);
        assert_eq!(week.slot(placed.slots[0]).previous(), None);
        assert_eq!(week.slot(placed.slots[2]).next(), None);
    }

    #[test]
    fn test_week_middle_starts_mid_week() {
        let types = gym_types(1);
        let mut week = fill_to_maximum(&types, 7);
        let task = Task::new("Gym", "g1", "Yoga")
            .with_days(2, 2)
            .with_preference(PreferenceTag::WeekMiddle);

        let placed = try_to_place(&mut week, &task, 0, false, &mut rng(1)).unwrap();
        let days: Vec<usize> = placed.slots.iter().map(|id| week.slot(*id).day()).collect();
        assert_eq!(days, vec![3, 4]);
    }

    #[test]
    fn test_blocked_preference_falls_back() {
        let types = gym_types(1);
        let mut week = fill_to_maximum(&types, 7);
        // Monday already taken: the WEEK_START scan breaks immediately.
        let monday = week.first_empty_slot(0, "Gym").unwrap();
        week.assign(monday, 99, Placement::default());

        let task = Task::new("Gym", "g1", "Lift")
            .with_days(2, 2)
            .with_preference(PreferenceTag::WeekStart);
        let placed = try_to_place(&mut week, &task, 0, false, &mut rng(5)).unwrap();
        assert!(!placed.with_preference);
        assert_eq!(placed.slots.len(), 2);
        assert!(placed.slots.iter().all(|id| week.slot(*id).day() != 0));
        let d0 = week.slot(placed.slots[0]).day();
        let d1 = week.slot(placed.slots[1]).day();
        assert!(d0 < d1);
    }

    #[test]
    fn test_no_preference_uses_random_days_without_duplicates() {
        let types = gym_types(2);
        let mut week = fill_to_maximum(&types, 7);
        let task = Task::new("Gym", "g1", "Run").with_days(4, 4);
        let placed = try_to_place(&mut week, &task, 0, true, &mut rng(11)).unwrap();

        let days: BTreeSet<usize> = placed.slots.iter().map(|id| week.slot(*id).day()).collect();
        assert_eq!(days.len(), 4);
        assert!(placed.slots.iter().all(|id| week.slot(*id).placed_focused));
        assert!(placed.slots.iter().all(|id| !week.slot(*id).placed_with_preference));
    }

    #[test]
    fn test_focus_tasks_placed_first() {
        let types = gym_types(1);
        let mut week = fill_to_maximum(&types, 7);
        let tasks = vec![
            Task::new("Gym", "plain", "Walk").with_days(7, 7).with_priority(100.0),
            Task::new("Gym", "focus", "Lift")
                .with_days(7, 7)
                .with_preference(PreferenceTag::Focus),
        ];

        let engine = PlacementEngine::new(&types, 1000);
        let report = engine.populate_with_tasks(&mut week, &tasks, &mut rng(3));
        assert_eq!(report.placed, 1);
        assert_eq!(report.unplaced, vec!["plain".to_string()]);
        assert!(week.placed_tasks().contains(&1));
        assert!(!week.placed_tasks().contains(&0));
    }

    #[test]
    fn test_type_never_mismatched() {
        let mut types = gym_types(1);
        types.insert(
            "Read".into(),
            TaskType::new("Reading", AmountRange::new(3, 7), AmountRange::new(1, 2))
                .with_importance(5.0),
        );
        let mut week = fill_to_maximum(&types, 7);
        let tasks = vec![
            Task::new("Gym", "g1", "Lift").with_days(2, 3),
            Task::new("Read", "r1", "Novel").with_days(3, 5),
            Task::new("Read", "r2", "Paper").with_days(1, 2).with_priority(0.0),
            Task::new("Gym", "g2", "Swim").with_days(1, 1),
        ];

        let engine = PlacementEngine::new(&types, 1000);
        engine.populate_with_tasks(&mut week, &tasks, &mut rng(8));
        for day in 0..7 {
            for (_, slot) in week.day_slots(day) {
                if let Some(t) = slot.task() {
                    assert_eq!(tasks[t].task_type, slot.task_type());
                }
            }
        }
        for t in week.placed_tasks() {
            let slots = week.slots_of_task(t);
            assert_eq!(week.chain(slots[0]), slots);
        }
        assert!(week.links_are_symmetric());
    }

    #[test]
    fn test_day_range_wider_than_week_is_capped() {
        let types = gym_types(1);
        let mut week = fill_to_maximum(&types, 7);
        let task = Task::new("Gym", "g1", "Everything").with_days(2_147_483_648, 4_294_967_295);

        let placed = try_to_place(&mut week, &task, 0, false, &mut rng(42)).unwrap();
        assert_eq!(placed.slots.len(), 7);
        assert!(week.links_are_symmetric());
    }

    #[test]
    fn test_weightless_tasks_still_placed() {
        let types = gym_types(2);
        let mut week = fill_to_maximum(&types, 7);
        let tasks = vec![
            Task::new("Gym", "g0", "Lift").with_priority(0.0),
            Task::new("Gym", "g1", "Swim").with_priority(0.0),
            Task::new("Gym", "g2", "Row").with_priority(-3.0),
        ];

        let engine = PlacementEngine::new(&types, 1000);
        let report = engine.populate_with_tasks(&mut week, &tasks, &mut rng(6));
        assert_eq!(report.placed, 3);
        assert!(report.unplaced.is_empty());
        assert_eq!(week.placed_tasks(), BTreeSet::from([0, 1, 2]));
    }

    #[test]
    fn test_zero_capacity_type_terminates() {
        let types = gym_types(0);
        let mut week = fill_to_maximum(&types, 7);
        assert_eq!(week.slot_count(), 0);
        let tasks = vec![Task::new("Gym", "g1", "Lift").with_days(2, 3)];

        let engine = PlacementEngine::new(&types, 1000);
        let report = engine.populate_with_tasks(&mut week, &tasks, &mut rng(42));
        assert_eq!(report.placed, 0);
        assert_eq!(report.unplaced, vec!["g1".to_string()]);
        assert!(!report.aborted);
        assert!(report.scans <= 1);
    }

    #[test]
    fn test_scan_limit_aborts() {
        let types = gym_types(3);
        let mut week = fill_to_maximum(&types, 7);
        let tasks: Vec<Task> = (0..5)
            .map(|i| Task::new("Gym", format!("g{i}"), "Lift").with_days(1, 1))
            .collect();

        let engine = PlacementEngine::new(&types, 2);
        let report = engine.populate_with_tasks(&mut week, &tasks, &mut rng(42));
        assert!(report.aborted);
        assert_eq!(report.scans, 2);
        assert_eq!(report.placed, 2);
        assert_eq!(report.unplaced.len(), 3);
    }

    #[test]
    fn test_importance_order() {
        let mut types = TaskTypes::new();
        types.insert(
            "Low".into(),
            TaskType::new("", AmountRange::new(1, 7), AmountRange::new(0, 1)).with_importance(1.0),
        );
        types.insert(
            "High".into(),
            TaskType::new("", AmountRange::new(1, 7), AmountRange::new(0, 1)).with_importance(9.0),
        );
        types.insert(
            "Mid".into(),
            TaskType::new("", AmountRange::new(1, 7), AmountRange::new(0, 1)).with_importance(5.0),
        );
        let week = fill_to_maximum(&types, 7);
        let tasks = vec![
            Task::new("Low", "l", ""),
            Task::new("Mid", "m", ""),
            Task::new("High", "h", ""),
            Task::new("Unknown", "u", ""),
        ];
        let engine = PlacementEngine::new(&types, 1000);
        let order = engine.competing_types(&week, &tasks, &[0, 1, 2, 3]);
        assert_eq!(order, vec!["High", "Mid", "Low"]);
    }
}
