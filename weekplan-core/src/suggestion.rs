//! One planning run: provision, place, adjust.

use tracing::info;

use crate::adjust::{AdjustReport, Adjuster};
use crate::placement::{PlacementEngine, PlacementReport};
use crate::provision::fill_to_maximum;
use crate::rng::{LinearCongruentialRng, RngState};
use crate::settings::PlannerConfig;
use crate::task::Task;
use crate::task_type::TaskTypes;
use crate::week::WeekDistribution;

/// Outcome of a run. Slots reference tasks by index into `tasks`.
#[derive(Debug, Clone)]
pub struct Suggestion {
    pub week: WeekDistribution,
    pub tasks: Vec<Task>,
    /// Generator state the run started from; replays the same plan.
    pub seed: RngState,
    pub placement: PlacementReport,
    pub adjustment: AdjustReport,
}

impl Suggestion {
    /// Placed tasks with a prompt that has not been resolved yet.
    pub fn pending_prompts(&self) -> Vec<usize> {
        self.week
            .placed_tasks()
            .into_iter()
            .filter(|&i| {
                let t = &self.tasks[i];
                t.prompt.as_deref().is_some_and(|p| !p.trim().is_empty()) && t.prompt_result.is_none()
            })
            .collect()
    }
}

pub struct SuggestionAlgorithm {
    task_types: TaskTypes,
    config: PlannerConfig,
}

impl SuggestionAlgorithm {
    pub fn new(task_types: TaskTypes, config: PlannerConfig) -> Self {
        Self { task_types, config }
    }

    pub fn task_types(&self) -> &TaskTypes {
        &self.task_types
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn generate(&self, tasks: Vec<Task>, rng: &mut LinearCongruentialRng) -> Suggestion {
        let seed = rng.state();
        info!(seed = seed.as_number(), tasks = tasks.len(), "generating week plan");

        let mut week = fill_to_maximum(&self.task_types, self.config.days_in_week);
        if self.config.verbose {
            info!("capacity:\n{week}");
        }

        let placement = PlacementEngine::new(&self.task_types, self.config.placement_scan_limit)
            .populate_with_tasks(&mut week, &tasks, rng);
        info!(
            placed = placement.placed,
            unplaced = placement.unplaced.len(),
            below_minimum = placement.below_minimum,
            "placement done"
        );
        if self.config.verbose {
            info!("after placement:\n{week}");
        }

        let adjustment = Adjuster::new(
            &self.task_types,
            self.config.max_tasks_per_day,
            self.config.adjust_iterations,
        )
        .adjust(&mut week, &tasks, rng);
        info!(
            removed = adjustment.removed,
            iterations = adjustment.iterations,
            converged = adjustment.converged,
            "adjustment done"
        );
        if self.config.verbose {
            info!("after adjustment:\n{week}");
        }

        Suggestion {
            week,
            tasks,
            seed,
            placement,
            adjustment,
        }
    }
}
