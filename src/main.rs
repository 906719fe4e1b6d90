use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use tasklist::app::AppController;
use tasklist::domain::task::DEFAULT_CATEGORY;
use tasklist::domain::{format_row, parse_timestamp, slot_time, week_start, Schema, Task};
use tasklist::persistence::{default_config_dir, default_data_dir, SettingsStore};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tasklist")]
#[command(about = "A per-user task list with timetable and workout schemas", long_about = None)]
struct Cli {
    /// Act as this user instead of the one saved in settings
    #[arg(short, long, global = true)]
    user: Option<String>,

    /// Directory holding task files and settings. Defaults to the platform data directory.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Enable accessibility support (accepted for compatibility, no effect here)
    #[arg(long, global = true)]
    accessibility: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show all tasks
    List,
    /// Add a task at the end of the list
    Add {
        title: String,
        /// Weekday 0-6 (0 = Sunday); makes this a timetable task
        #[arg(short, long)]
        day: Option<i32>,
        /// Hour-of-day slot
        #[arg(short = 'H', long)]
        hour: Option<i32>,
        /// Free-form category such as "Work" or "Workout"
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long)]
        notes: Option<String>,
        /// Timestamp for a timetable task. Defaults to the slot in the current week.
        #[arg(long)]
        at: Option<String>,
    },
    /// Flip the done flag of a task
    Toggle { index: usize },
    /// Remove a task
    Remove { index: usize },
    /// Replace a task's notes
    Notes { index: usize, text: String },
    /// Record reps, weight and sets for a workout task
    Workout {
        index: usize,
        reps: i32,
        #[arg(value_parser = parse_weight)]
        weight: f64,
        sets: i32,
    },
    /// Remove all completed tasks
    ClearCompleted,
    /// Remove every task
    Clear,
    /// Write the list to another file
    Export { path: PathBuf },
    /// Show tasks in a timetable cell
    Cell {
        day: i32,
        hour: i32,
        #[command(flatten)]
        week: WeekArgs,
    },
    /// Show tasks in an hour slot
    Hour {
        hour: i32,
        #[command(flatten)]
        week: WeekArgs,
    },
    /// Print the active user and their task file
    Whoami,
    /// Save the current list and switch to another user
    SetUser { name: String },
    /// Show or change which task fields are displayed
    Schema { name: Option<String> },
}

#[derive(clap::Args, Debug)]
struct WeekArgs {
    /// Only tasks timestamped in the week starting at this instant
    #[arg(long, conflicts_with = "this_week")]
    week: Option<String>,
    /// Only tasks timestamped in the current (Sunday-based) week
    #[arg(long)]
    this_week: bool,
}

impl WeekArgs {
    fn window(&self) -> Result<Option<NaiveDateTime>> {
        if self.this_week {
            return Ok(Some(current_week_start()));
        }
        match &self.week {
            Some(value) => parse_timestamp(value)
                .map(Some)
                .with_context(|| format!("Invalid week start: {}", value)),
            None => Ok(None),
        }
    }
}

fn current_week_start() -> NaiveDateTime {
    week_start(chrono::Local::now().date_naive())
}

/// Workout weight; must be a finite number
fn parse_weight(s: &str) -> Result<f64, String> {
    let weight: f64 = s.parse().map_err(|e| format!("{}", e))?;
    if weight.is_finite() {
        Ok(weight)
    } else {
        Err(format!("weight must be a finite number, got {}", s))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tasklist=warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let (data_dir, config_dir) = match &cli.data_dir {
        Some(dir) => (dir.clone(), dir.clone()),
        None => (default_data_dir()?, default_config_dir()?),
    };

    let mut settings = SettingsStore::open(&config_dir).unwrap_or_else(|e| {
        tracing::warn!(target: "settings", "Using default settings: {:#}", e);
        SettingsStore::in_memory()
    });

    let mut controller = AppController::new(data_dir);
    controller
        .model_mut()
        .subscribe(|event| tracing::trace!(target: "tasks", ?event, "model changed"));
    controller.subscribe_user_changed(|name| tracing::debug!(target: "tasks", user = name, "active user changed"));

    let username = cli
        .user
        .clone()
        .unwrap_or_else(|| settings.username().to_string());
    controller.set_current_user(&username);

    let command = cli.command.unwrap_or(Commands::List);
    let stdout = io::stdout();
    execute(&mut controller, &mut settings, command, &mut stdout.lock())
}

/// Run one command against the controller, writing output to `out`
fn execute<W: Write>(
    controller: &mut AppController,
    settings: &mut SettingsStore,
    command: Commands,
    out: &mut W,
) -> Result<()> {
    let schema = settings.schema();

    match command {
        Commands::List => {
            if controller.model().is_empty() {
                writeln!(out, "No tasks.")?;
            }
            for (index, task) in controller.model().items().iter().enumerate() {
                writeln!(out, "{}", format_row(schema, index, task))?;
            }
        }
        Commands::Add {
            title,
            day,
            hour,
            category,
            notes,
            at,
        } => {
            let category = category.unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
            let notes = notes.unwrap_or_default();
            let task = match day {
                Some(day) => {
                    if !(0..7).contains(&day) {
                        bail!("Day must be between 0 (Sunday) and 6 (Saturday)");
                    }
                    let hour = hour.unwrap_or(-1);
                    let date_time = match at {
                        Some(value) => Some(
                            parse_timestamp(&value)
                                .with_context(|| format!("Invalid timestamp: {}", value))?,
                        ),
                        None => Some(slot_time(current_week_start(), day, hour)),
                    };
                    Task::timetable(title, day, hour, category, notes, date_time)
                }
                None => Task {
                    notes,
                    ..Task::scheduled(title, hour.unwrap_or(-1), category)
                },
            };
            controller.model_mut().add(task);
            controller.save();
            writeln!(out, "Added task {}", controller.model().len() - 1)?;
        }
        Commands::Toggle { index } => {
            require_row(controller, index)?;
            controller.model_mut().toggle_task(index);
            controller.save();
        }
        Commands::Remove { index } => {
            require_row(controller, index)?;
            controller.model_mut().remove_task(index);
            controller.save();
        }
        Commands::Notes { index, text } => {
            require_row(controller, index)?;
            controller.model_mut().update_task_notes(index, text);
            controller.save();
        }
        Commands::Workout {
            index,
            reps,
            weight,
            sets,
        } => {
            require_row(controller, index)?;
            controller
                .model_mut()
                .update_workout_details(index, reps, weight, sets);
            controller.save();
        }
        Commands::ClearCompleted => {
            let before = controller.model().len();
            controller.model_mut().clear_completed();
            controller.save();
            writeln!(
                out,
                "Removed {} completed task(s)",
                before - controller.model().len()
            )?;
        }
        Commands::Clear => {
            controller.clear_tasks();
            controller.save();
        }
        Commands::Export { path } => {
            controller.try_export(&path)?;
            writeln!(out, "Exported {} task(s) to {}", controller.model().len(), path.display())?;
        }
        Commands::Cell { day, hour, week } => {
            let window = week.window()?;
            for (index, task) in controller.model().tasks_for_cell(day, hour, window) {
                writeln!(out, "{}", format_row(schema, index, task))?;
            }
        }
        Commands::Hour { hour, week } => {
            let window = week.window()?;
            for (index, task) in controller.model().tasks_for_hour(hour, window) {
                writeln!(out, "{}", format_row(schema, index, task))?;
            }
        }
        Commands::Whoami => {
            writeln!(out, "{}", controller.current_user())?;
            writeln!(out, "{}", controller.storage_path().display())?;
        }
        Commands::SetUser { name } => {
            settings.set_username(&name)?;
            controller.set_current_user(&name);
            writeln!(out, "Now using {}", controller.storage_path().display())?;
        }
        Commands::Schema { name } => match name {
            Some(name) => {
                let schema = Schema::from_name(&name)
                    .with_context(|| format!("Unknown schema '{}' (plain, timetable, workout)", name))?;
                settings.set_schema(schema)?;
                writeln!(out, "{}", schema.name())?;
            }
            None => writeln!(out, "{}", schema.name())?,
        },
    }

    Ok(())
}

fn require_row(controller: &AppController, index: usize) -> Result<()> {
    if index >= controller.model().len() {
        bail!("No task at index {}", index);
    }
    Ok(())
}
