use std::io;
use std::path::PathBuf;

use chrono::Utc;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::EnvFilter;

use pawcare::commands::*;
use pawcare::models::PeriodicityUnit;

#[derive(Parser)]
#[command(name = "pawcare", version)]
#[command(about = "Recurring care reminders for your dogs", long_about = None)]
struct Cli {
    /// Database file (overrides PAWCARE_DB)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered dogs
    Dogs,
    /// Register a dog with the starter task list
    AddDog {
        name: String,
        /// Age in years
        #[arg(short, long, default_value_t = 0)]
        years: u32,
        /// Additional months of age (0-11)
        #[arg(short, long, default_value_t = 0)]
        months: u32,
    },
    /// Select the dog used when --dog is omitted
    Select {
        /// Dog id, id prefix or name
        dog: String,
    },
    /// List a dog's tasks, soonest due first
    List {
        #[arg(short, long)]
        dog: Option<String>,
        /// Include inactive tasks
        #[arg(short, long)]
        all: bool,
    },
    /// Add a custom task
    Add {
        /// Task title (quoted if it has spaces)
        title: String,
        #[arg(short, long)]
        note: Option<String>,
        /// Repeat every N units
        #[arg(short, long)]
        every: Option<u32>,
        /// days, weeks, months or years
        #[arg(short, long)]
        unit: Option<PeriodicityUnit>,
        /// Create the task switched off
        #[arg(long)]
        inactive: bool,
        #[arg(short, long)]
        dog: Option<String>,
    },
    /// Edit a task
    Edit {
        /// Task id, id prefix or catalog key
        task: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        note: Option<String>,
        #[arg(short, long)]
        every: Option<u32>,
        #[arg(short, long)]
        unit: Option<PeriodicityUnit>,
        /// Turn the task on or off
        #[arg(long)]
        active: Option<bool>,
        /// Override the next due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
        #[arg(short, long)]
        dog: Option<String>,
    },
    /// Mark a task as done
    Done {
        task: String,
        /// Completion date in YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
        #[arg(short, long)]
        note: Option<String>,
        #[arg(short, long)]
        dog: Option<String>,
    },
    /// Show a task's completion history
    History {
        task: String,
        #[arg(short, long)]
        dog: Option<String>,
    },
    /// Delete a history entry
    Undo {
        task: String,
        /// History entry id or prefix
        entry: String,
        #[arg(short, long)]
        dog: Option<String>,
    },
    /// Show the starter task catalog
    Templates,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pawcare=warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let now = Utc::now();
    let today = now.date_naive();

    let command = match cli.command {
        Some(Commands::Templates) => return cmd_templates(),
        Some(Commands::Completions { shell }) => {
            let shell_enum = match shell.as_str() {
                "bash" => Shell::Bash,
                "zsh" => Shell::Zsh,
                "fish" => Shell::Fish,
                "powershell" => Shell::PowerShell,
                "elvish" => Shell::Elvish,
                _ => {
                    eprintln!("Unsupported shell: {}", shell);
                    return;
                }
            };
            let mut cmd = Cli::command();
            generate(shell_enum, &mut cmd, "pawcare", &mut io::stdout());
            return;
        }
        other => other,
    };

    let mut app = open_app(cli.db);
    match command {
        Some(Commands::Dogs) => cmd_dogs(&app, today),
        Some(Commands::AddDog { name, years, months }) => {
            cmd_add_dog(&mut app, name, years, months, now, false)
        }
        Some(Commands::Select { dog }) => cmd_select(&mut app, dog, false),
        Some(Commands::List { dog, all }) => cmd_list(&app, dog, all, today),
        Some(Commands::Add { title, note, every, unit, inactive, dog }) => {
            cmd_add(&mut app, dog, title, note, every, unit, inactive, now, false)
        }
        Some(Commands::Edit { task, title, note, every, unit, active, due, dog }) => {
            cmd_edit(&mut app, dog, task, title, note, every, unit, active, due, now, false)
        }
        Some(Commands::Done { task, date, note, dog }) => {
            cmd_done(&mut app, dog, task, date, note, now, false)
        }
        Some(Commands::History { task, dog }) => cmd_history(&app, dog, task),
        Some(Commands::Undo { task, entry, dog }) => {
            cmd_undo(&mut app, dog, task, entry, now, false)
        }
        None => {
            if app.dogs().is_empty() {
                cmd_dogs(&app, today);
            } else {
                cmd_list(&app, None, false, today);
            }
        }
        Some(Commands::Templates) | Some(Commands::Completions { .. }) => {}
    }
}
