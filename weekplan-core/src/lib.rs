//! weekplan-core: slot model, placement engine and repair loop for weekly plans

pub mod adjust;
pub mod placement;
pub mod provision;
pub mod rng;
pub mod settings;
pub mod suggestion;
pub mod task;
pub mod task_type;
pub mod week;

pub use adjust::{AdjustReport, Adjuster, Strictness};
pub use placement::{PlacedTask, PlacementEngine, PlacementReport, try_to_place};
pub use provision::fill_to_maximum;
pub use rng::{LinearCongruentialRng, RngState, SeedSource};
pub use settings::{PlannerConfig, Settings};
pub use suggestion::{Suggestion, SuggestionAlgorithm};
pub use task::{DayPreference, PreferenceTag, Task};
pub use task_type::{AmountRange, TaskType, TaskTypes, display_order};
pub use week::{Day, Placement, SlotId, TaskRef, TaskSlot, WeekDistribution};
