//! weekplan-ingest: loaders for task CSV files, the task type catalogue and settings.

pub mod settings;
pub mod task_types;
pub mod tasks;

pub use settings::load_settings;
pub use task_types::{load_task_types, save_task_types};
pub use tasks::{load_tasks_csv, load_tasks_from_dir};
