//! Week plan rendered as an Obsidian-flavoured Markdown note.

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};
use std::path::{Path, PathBuf};

use weekplan_core::{Suggestion, Task};

pub struct MarkdownWriter {
    start_date: NaiveDate,
    seed: u64,
}

impl MarkdownWriter {
    pub fn new(start_date: NaiveDate, seed: u64) -> Self {
        Self { start_date, seed }
    }

    /// `2024-11-04 Week Plan (421337).md`
    pub fn file_name(&self) -> String {
        format!("{} Week Plan ({}).md", self.start_date.format("%Y-%m-%d"), self.seed)
    }

    /// `tips[d]` is the tip shown under day `d`; missing entries render empty.
    pub fn render(&self, plan: &Suggestion, tips: &[String]) -> String {
        let mut out = String::from("\n");

        for day in 0..plan.week.days_in_week() {
            let date = self.start_date + Days::new(day as u64);
            let tip = tips.get(day).map(String::as_str).unwrap_or("");

            out.push_str("---\n");
            out.push_str(&format!("### Day {}. {}\n", day + 1, date.format("%A %d-%b-%Y")));
            out.push('\n');
            out.push_str("> [!Tip of the day]\n");
            out.push_str(&format!("> {tip}\n"));
            out.push('\n');

            for (_, slot) in plan.week.day_slots(day) {
                if let Some(task) = slot.task().and_then(|i| plan.tasks.get(i)) {
                    render_task(&mut out, task);
                }
            }
            out.push('\n');
        }

        out.push_str("---\n");
        out.push_str("## Week review\n");
        out.push_str("- I followed my plan throughout the week\n");
        out.push_str("- AI summarize\n");
        out.push('\n');
        out.push_str("#week-organizer #week-summary\n");
        out
    }

    pub fn write(&self, output_dir: &Path, plan: &Suggestion, tips: &[String]) -> Result<PathBuf> {
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("creating {}", output_dir.display()))?;
        let path = output_dir.join(self.file_name());
        std::fs::write(&path, self.render(plan, tips))
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }
}

fn render_task(out: &mut String, task: &Task) {
    out.push_str(&format!(
        "- [ ] **{}** ({}): {}",
        task.task_type, task.id, task.description
    ));
    if !task.remarks.is_empty() {
        out.push_str(&format!(". {}", task.remarks));
    }

    if let (Some(prompt), Some(result)) = (task.prompt.as_deref(), task.prompt_result.as_deref()) {
        if !result.is_empty() {
            if prompt.starts_with("google") {
                out.push_str(&format!(". {result}"));
            } else if prompt.starts_with("ai") {
                out.push_str(&format!("\n> [!TIP]- {prompt}\n"));
                let quoted: Vec<String> = result.lines().map(|l| format!("> {l}")).collect();
                out.push_str(&quoted.join("\n"));
            }
        }
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use weekplan_core::{Placement, RngState, WeekDistribution};

    fn plan() -> Suggestion {
        let tasks = vec![
            Task::new("Gym", "gym-1", "Strength training")
                .with_remarks("Bring towel")
                .with_prompt("google: deadlift form"),
            Task::new("Read", "read-1", "Novel").with_prompt("ai: summarize chapter one"),
        ];
        let mut week = WeekDistribution::new(2);
        let gym = week.add_slot(0, "Gym");
        week.add_slot(0, "Read");
        let read = week.add_slot(1, "Read");
        week.assign(gym, 0, Placement::default());
        week.assign(read, 1, Placement::default());

        let mut s = Suggestion {
            week,
            tasks,
            seed: RngState::load("42").unwrap(),
            placement: Default::default(),
            adjustment: Default::default(),
        };
        s.tasks[0].prompt_result = Some("[google it](https://www.google.com/search?q=deadlift+form)".into());
        s.tasks[1].prompt_result = Some("Line one\nLine two".into());
        s
    }

    fn writer() -> MarkdownWriter {
        MarkdownWriter::new(NaiveDate::from_ymd_opt(2024, 11, 4).unwrap(), 42)
    }

    #[test]
    fn test_file_name() {
        assert_eq!(writer().file_name(), "2024-11-04 Week Plan (42).md");
    }

    #[test]
    fn test_render_days_and_tasks() {
        let md = writer().render(&plan(), &["Drink water".into()]);
        let expected = "\n\
---\n\
### Day 1. Monday 04-Nov-2024\n\
\n\
> [!Tip of the day]\n\
> Drink water\n\
\n\
- [ ] **Gym** (gym-1): Strength training. Bring towel. [google it](https://www.google.com/search?q=deadlift+form)\n\
\n\
---\n\
### Day 2. Tuesday 05-Nov-2024\n\
\n\
> [!Tip of the day]\n\
> \n\
\n\
- [ ] **Read** (read-1): Novel\n\
> [!TIP]- ai: summarize chapter one\n\
> Line one\n\
> Line two\n\
\n\
---\n\
## Week review\n\
- I followed my plan throughout the week\n\
- AI summarize\n\
\n\
#week-organizer #week-summary\n";
        assert_eq!(md, expected);
    }

    #[test]
    fn test_write_creates_directory() {
        let dir = std::env::temp_dir()
            .join(format!("weekplan-md-{}", std::process::id()))
            .join("plans");
        let path = writer().write(&dir, &plan(), &[]).unwrap();
        assert!(path.ends_with("2024-11-04 Week Plan (42).md"));
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("### Day 2. Tuesday 05-Nov-2024"));
        std::fs::remove_dir_all(dir.parent().unwrap()).ok();
    }
}
