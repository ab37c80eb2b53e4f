//! The week as a graph of capacity slots.
//!
//! Slots live in a flat arena owned by the distribution and are addressed by
//! [`SlotId`]. Each [`Day`] keeps the ordered ids of its slots. A task that
//! spans several days occupies one slot per day; those slots are chained
//! through `previous` / `next` ids. Links are always set and cleared in pairs.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Index of a slot in the distribution's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotId(usize);

impl SlotId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Index of a task in the run's task catalogue.
pub type TaskRef = usize;

#[derive(Debug, Clone, PartialEq)]
pub struct TaskSlot {
    day: usize,
    task_type: String,
    task: Option<TaskRef>,
    previous: Option<SlotId>,
    next: Option<SlotId>,
    pub placed_with_preference: bool,
    pub placed_focused: bool,
}

impl TaskSlot {
    fn new(day: usize, task_type: &str) -> Self {
        Self {
            day,
            task_type: task_type.to_string(),
            task: None,
            previous: None,
            next: None,
            placed_with_preference: false,
            placed_focused: false,
        }
    }

    pub fn day(&self) -> usize {
        self.day
    }

    pub fn task_type(&self) -> &str {
        &self.task_type
    }

    pub fn task(&self) -> Option<TaskRef> {
        self.task
    }

    pub fn is_empty(&self) -> bool {
        self.task.is_none()
    }

    pub fn previous(&self) -> Option<SlotId> {
        self.previous
    }

    pub fn next(&self) -> Option<SlotId> {
        self.next
    }

    pub fn is_chained(&self) -> bool {
        self.previous.is_some() || self.next.is_some()
    }

    /// Focus- or preference-placed slots are kept by the repair loop.
    pub fn is_protected(&self) -> bool {
        self.placed_focused || self.placed_with_preference
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Day {
    slots: Vec<SlotId>,
}

impl Day {
    pub fn slot_ids(&self) -> &[SlotId] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Provenance stamped on every slot a placement fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Placement {
    pub with_preference: bool,
    pub focused: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeekDistribution {
    days: Vec<Day>,
    slots: Vec<TaskSlot>,
}

impl WeekDistribution {
    pub fn new(days_in_week: usize) -> Self {
        Self {
            days: vec![Day::default(); days_in_week],
            slots: Vec::new(),
        }
    }

    pub fn days_in_week(&self) -> usize {
        self.days.len()
    }

    pub fn days(&self) -> &[Day] {
        &self.days
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn add_slot(&mut self, day: usize, task_type: &str) -> SlotId {
        let id = SlotId(self.slots.len());
        self.slots.push(TaskSlot::new(day, task_type));
        self.days[day].slots.push(id);
        id
    }

    pub fn slot(&self, id: SlotId) -> &TaskSlot {
        &self.slots[id.0]
    }

    /// Slots of `day` in display order.
    pub fn day_slots(&self, day: usize) -> impl Iterator<Item = (SlotId, &TaskSlot)> + '_ {
        self.days[day]
            .slots
            .iter()
            .map(move |id| (*id, &self.slots[id.0]))
    }

    pub fn first_empty_slot(&self, day: usize, task_type: &str) -> Option<SlotId> {
        self.day_slots(day)
            .find(|(_, s)| s.is_empty() && s.task_type == task_type)
            .map(|(id, _)| id)
    }

    /// Types that still have at least one empty slot somewhere in the week.
    pub fn types_with_empty_slots(&self) -> BTreeSet<&str> {
        self.slots
            .iter()
            .filter(|s| s.is_empty())
            .map(|s| s.task_type.as_str())
            .collect()
    }

    /// Occupied slots of `task_type` on `day`.
    pub fn used_count(&self, day: usize, task_type: &str) -> usize {
        self.day_slots(day)
            .filter(|(_, s)| !s.is_empty() && s.task_type == task_type)
            .count()
    }

    /// Occupied slots on `day`, any type.
    pub fn occupied_count(&self, day: usize) -> usize {
        self.day_slots(day).filter(|(_, s)| !s.is_empty()).count()
    }

    /// For each type, on how many distinct days it holds a task.
    pub fn days_per_type(&self) -> BTreeMap<&str, usize> {
        let mut seen: BTreeSet<(&str, usize)> = BTreeSet::new();
        for s in self.slots.iter().filter(|s| !s.is_empty()) {
            seen.insert((s.task_type.as_str(), s.day));
        }
        let mut out = BTreeMap::new();
        for (task_type, _) in seen {
            *out.entry(task_type).or_insert(0) += 1;
        }
        out
    }

    pub fn assign(&mut self, id: SlotId, task: TaskRef, placement: Placement) {
        let slot = &mut self.slots[id.0];
        slot.task = Some(task);
        slot.placed_with_preference = placement.with_preference;
        slot.placed_focused = placement.focused;
    }

    /// Chain `a -> b`. Both ends are updated together.
    pub fn link(&mut self, a: SlotId, b: SlotId) {
        self.slots[a.0].next = Some(b);
        self.slots[b.0].previous = Some(a);
    }

    /// Clear the task from `id` and cut it out of its chain. The slot stays
    /// in its day as free capacity. Returns the task that was there.
    pub fn vacate(&mut self, id: SlotId) -> Option<TaskRef> {
        if let Some(prev) = self.slots[id.0].previous.take() {
            self.slots[prev.0].next = None;
        }
        if let Some(next) = self.slots[id.0].next.take() {
            self.slots[next.0].previous = None;
        }
        let slot = &mut self.slots[id.0];
        slot.placed_with_preference = false;
        slot.placed_focused = false;
        slot.task.take()
    }

    /// Slots of the chain containing `id`, head first.
    pub fn chain(&self, id: SlotId) -> Vec<SlotId> {
        let mut head = id;
        while let Some(prev) = self.slots[head.0].previous {
            head = prev;
        }
        let mut out = vec![head];
        let mut cur = head;
        while let Some(next) = self.slots[cur.0].next {
            out.push(next);
            cur = next;
        }
        out
    }

    /// Every slot holding `task`, in day order.
    pub fn slots_of_task(&self, task: TaskRef) -> Vec<SlotId> {
        let mut ids: Vec<SlotId> = (0..self.slots.len())
            .map(SlotId)
            .filter(|id| self.slots[id.0].task == Some(task))
            .collect();
        ids.sort_by_key(|id| self.slots[id.0].day);
        ids
    }

    /// Distinct tasks placed anywhere in the week.
    pub fn placed_tasks(&self) -> BTreeSet<TaskRef> {
        self.slots.iter().filter_map(|s| s.task).collect()
    }

    /// True when every link has its mirror on the other end.
    pub fn links_are_symmetric(&self) -> bool {
        self.slots.iter().enumerate().all(|(i, s)| {
            let next_ok = s.next.is_none_or(|n| self.slots[n.0].previous == Some(SlotId(i)));
            let prev_ok = s
                .previous
                .is_none_or(|p| self.slots[p.0].next == Some(SlotId(i)));
            next_ok && prev_ok
        })
    }
}

impl fmt::Display for WeekDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for day in 0..self.days.len() {
            write!(f, "Day {}:", day + 1)?;
            for (_, slot) in self.day_slots(day) {
                match slot.task {
                    Some(t) => write!(f, " {}#{}", slot.task_type, t)?,
                    None => write!(f, " {}[ ]", slot.task_type)?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
