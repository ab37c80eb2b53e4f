//! Task CSV loader.
//!
//! Task files are `;`-separated with one header row:
//!
//! ```text
//! TaskType;Task;Description;PickUpPriority;Days;Prefs;Remarks;Prompt
//! Gym;gym-1;Strength training;2;2-3;FOCUS WEEK_START;Bring towel;google: deadlift form
//! ```
//!
//! A cell holding only `-` counts as empty. Every `*.csv` in a directory is
//! read in file-name order so that a seed replays the same plan.

use anyhow::{Context, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use weekplan_core::{AmountRange, PreferenceTag, Task};

const COL_TYPE: usize = 0;
const COL_ID: usize = 1;
const COL_DESCRIPTION: usize = 2;
const COL_PRIORITY: usize = 3;
const COL_DAYS: usize = 4;
const COL_PREFS: usize = 5;
const COL_REMARKS: usize = 6;
const COL_PROMPT: usize = 7;

/// Load every task file in `dir`. A missing directory yields no tasks.
pub fn load_tasks_from_dir(dir: impl AsRef<Path>) -> Result<Vec<Task>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        warn!(dir = %dir.display(), "task directory does not exist; no tasks loaded");
        return Ok(Vec::new());
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("listing {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect();
    files.sort();

    let mut tasks = Vec::new();
    for file in files {
        match load_tasks_csv(&file) {
            Ok(mut loaded) => {
                debug!(file = %file.display(), count = loaded.len(), "loaded tasks");
                tasks.append(&mut loaded);
            }
            Err(e) => warn!(file = %file.display(), "skipping task file: {e:#}"),
        }
    }
    Ok(tasks)
}

/// Parse a single task file. Malformed rows are skipped with a warning.
pub fn load_tasks_csv(path: impl AsRef<Path>) -> Result<Vec<Task>> {
    let path = path.as_ref();
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let days_re = days_regex()?;
    let mut tasks = Vec::new();

    for (row, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("reading {}", path.display()))?;
        let cell = |i: usize| clean_cell(record.get(i).unwrap_or(""));

        let task_type = cell(COL_TYPE);
        if task_type.is_empty() {
            continue;
        }

        let prefs: Vec<String> = cell(COL_PREFS)
            .split(|c: char| c.is_whitespace() || c == ',' || c == '|')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if prefs
            .iter()
            .any(|p| PreferenceTag::parse(p) == Some(PreferenceTag::WeekDays))
        {
            warn!(
                file = %path.display(),
                row = row + 2,
                "WEEK_DAYS preference is not supported; task skipped"
            );
            continue;
        }

        let days = parse_days(&days_re, &cell(COL_DAYS));
        if !days.is_valid() {
            warn!(file = %path.display(), row = row + 2, "day range is inverted; task skipped");
            continue;
        }

        let prompt = cell(COL_PROMPT);
        tasks.push(Task {
            task_type,
            id: cell(COL_ID),
            description: cell(COL_DESCRIPTION),
            pick_up_priority: cell(COL_PRIORITY).parse().unwrap_or(0.0),
            days,
            prefs,
            remarks: cell(COL_REMARKS),
            prompt: (!prompt.is_empty()).then_some(prompt),
            prompt_result: None,
        });
    }

    Ok(tasks)
}

fn clean_cell(raw: &str) -> String {
    let s = raw.trim();
    if s == "-" { String::new() } else { s.to_string() }
}

fn days_regex() -> Result<Regex> {
    Ok(Regex::new(r"^(?P<from>\d+)\s*(?:-\s*(?P<to>\d+))?$")?)
}

/// `"3"` -> 3..=3, `"2-4"` -> 2..=4, anything else -> 0..=0.
fn parse_days(re: &Regex, s: &str) -> AmountRange {
    let Some(caps) = re.captures(s.trim()) else {
        return AmountRange::exactly(0);
    };
    let from: Option<u32> = caps["from"].parse().ok();
    let to: Option<u32> = match caps.name("to") {
        Some(m) => m.as_str().parse().ok(),
        None => from,
    };
    match (from, to) {
        (Some(f), Some(t)) => AmountRange::new(f, t),
        _ => AmountRange::exactly(0),
    }
}
