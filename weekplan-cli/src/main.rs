use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use weekplan_core::{PlannerConfig, SeedSource, SuggestionAlgorithm, display_order};
use weekplan_ingest::{load_settings, load_task_types, load_tasks_from_dir};

mod config;
mod dates;
mod llm;
mod markdown;
mod motd;
mod prompt;

use config::{AppConfig, DEFAULT_SETTINGS_PATH, KEY_OUTPUT_FILE, KEY_START_DATE};
use llm::LocalAi;
use markdown::MarkdownWriter;
use motd::MessageOfTheDay;
use prompt::PromptProcessor;

#[derive(Parser, Debug)]
#[command(name = "weekplan", version, about = "Weekly task plan generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a week plan and write it as Markdown
    Plan {
        /// Settings file (JSON, or TOML by extension)
        #[arg(long, default_value = DEFAULT_SETTINGS_PATH)]
        settings: PathBuf,

        /// First day of the plan, DD-MMM-YYYY (default: next Monday)
        #[arg(long)]
        start_date: Option<String>,

        /// Replay a previous plan by its seed
        #[arg(long)]
        seed: Option<i64>,

        /// Log placement and adjustment details
        #[arg(long)]
        verbose: bool,

        /// Skip resolving google:/ai: prompts
        #[arg(long)]
        no_prompts: bool,

        /// Print the plan instead of writing the file
        #[arg(long)]
        dry_run: bool,
    },

    /// List the configured task types in display order
    Types {
        #[arg(long, default_value = DEFAULT_SETTINGS_PATH)]
        settings: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Plan {
            settings,
            start_date,
            seed,
            verbose,
            no_prompts,
            dry_run,
        } => {
            let mut settings_map = load_settings(&settings)?;
            init_tracing(verbose || settings_map.is_verbose());

            let start = match start_date {
                Some(raw) => dates::parse_start_date(&raw)?,
                None => dates::next_monday(chrono::Local::now().date_naive()),
            };

            let base = settings_dir(&settings);
            let app = AppConfig::from_settings(&settings_map, &base)?;
            let mut config = PlannerConfig::from_settings(&settings_map)?;
            config.verbose |= verbose;

            let task_types = load_task_types(&app.task_types)?;
            let tasks = load_tasks_from_dir(&app.tasks_dir)?;
            info!(types = task_types.len(), tasks = tasks.len(), "inputs loaded");

            let mut rng = SeedSource::new().generator(seed)?;
            let algorithm = SuggestionAlgorithm::new(task_types, config);
            let mut plan = algorithm.generate(tasks, &mut rng);
            let seed_number = plan.seed.as_number();

            let writer = MarkdownWriter::new(start, seed_number);
            settings_map.set(KEY_START_DATE, dates::format_start_date(start));
            settings_map.set(
                KEY_OUTPUT_FILE,
                app.output_dir.join(writer.file_name()).display().to_string(),
            );
            if config.verbose {
                println!("Settings: {}\n", serde_json::to_string_pretty(&settings_map)?);
            }

            if !no_prompts {
                let backend = LocalAi::new(app.ai_endpoint.clone(), app.ai_timeout)?;
                let resolved = PromptProcessor::new(backend).enrich(&mut plan).await;
                info!(resolved, "prompts resolved");
            }

            let messages = MessageOfTheDay::load(&app.motd_file);
            debug!(count = messages.len(), "messages of the day");
            let tips: Vec<String> = (0..plan.week.days_in_week())
                .map(|_| messages.pick(&mut rng).to_string())
                .collect();

            println!("Seed: {seed_number}");
            if !plan.placement.unplaced.is_empty() {
                println!("Unplaced: {}", plan.placement.unplaced.join(", "));
            }
            if !plan.adjustment.converged {
                println!(
                    "Warning: {} day(s) still above {} tasks",
                    plan.adjustment.days_over_cap, config.max_tasks_per_day
                );
            }

            if dry_run {
                println!("{}", writer.render(&plan, &tips));
            } else {
                let path = writer.write(&app.output_dir, &plan, &tips)?;
                println!("Markdown file written to: {}", path.display());
            }
        }

        Command::Types { settings } => {
            let settings_map = load_settings(&settings)?;
            init_tracing(settings_map.is_verbose());
            let app = AppConfig::from_settings(&settings_map, &settings_dir(&settings))?;
            let task_types = load_task_types(&app.task_types)
                .with_context(|| format!("listing types from {}", settings.display()))?;

            for (name, t) in display_order(&task_types) {
                println!(
                    "{name:<16} weekly {}-{} daily {}-{} importance {:.1}  {}",
                    t.weekly_amount_days.from,
                    t.weekly_amount_days.to,
                    t.daily_amount.from,
                    t.daily_amount.to,
                    t.importance,
                    t.description
                );
            }
        }
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise `info`, or `debug` for verbose runs.
fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn settings_dir(settings: &Path) -> PathBuf {
    settings
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default()
}
