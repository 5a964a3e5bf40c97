//! # taskdesk
//!
//! Assign tasks to employees, track their progress, and rank employees by
//! a simple performance score.
//!
//! ## Usage
//!
//! Most commands need a login. Pass it on the command line or through the
//! environment:
//!
//! ```bash
//! export TASKDESK_USER=alice TASKDESK_PASSWORD=secret
//! taskdesk login
//! ```
//!
//! **Managers**
//! ```bash
//! # Who can receive tasks
//! taskdesk employees
//!
//! # Assign a task
//! taskdesk assign 3 "Quarterly report" --description "Draft and review" --deadline 2026-11-01 --priority High
//!
//! # All tasks
//! taskdesk tasks
//!
//! # Per-employee breakdown and leaderboard
//! taskdesk report --top 5
//! ```
//!
//! **Employees**
//! ```bash
//! # Your tasks
//! taskdesk mine
//!
//! # Update a task: status, hours worked, reason it is not done yet
//! taskdesk update 4 --status "In Progress" --hours 1.5 --reason "Waiting on data"
//! ```
//!
//! **Administration**
//! ```bash
//! # Hash a password for users.json
//! taskdesk hash-password 'secret'
//! ```
//!
//! ## Data Storage
//!
//! `users.json`, `employees.json` and `tasks.json` are read from the data
//! directory, `~/.local/share/taskdesk` on Linux. Override it with
//! `--data-dir` or the `TASKDESK_DATA` environment variable.

use std::io;
use std::path::PathBuf;

use anyhow::{bail, Result};
use chrono::{Local, NaiveDate};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::EnvFilter;

use taskdesk::auth::Session;
use taskdesk::commands::*;
use taskdesk::models::{EmployeeId, Priority, Role, TaskStatus};
use taskdesk::storage::{default_data_dir, JsonStorage};
use taskdesk::tasks::TaskUpdate;

#[derive(Parser)]
#[command(name = "taskdesk")]
#[command(about = "Assign tasks to employees and track their performance", long_about = None)]
struct Cli {
    /// Directory holding users.json, employees.json and tasks.json
    #[arg(long, global = true, env = "TASKDESK_DATA")]
    data_dir: Option<PathBuf>,
    /// Username to log in with
    #[arg(short, long, global = true, env = "TASKDESK_USER")]
    user: Option<String>,
    /// Password to log in with
    #[arg(short, long, global = true, env = "TASKDESK_PASSWORD", hide_env_values = true)]
    password: Option<String>,
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check credentials and show the role
    Login,
    /// List employees
    Employees,
    /// Assign a new task to an employee
    Assign {
        /// Employee ID
        employee_id: String,
        /// Task title (quoted if it has spaces)
        title: String,
        /// Longer description
        #[arg(short, long, default_value = "")]
        description: String,
        /// Deadline in YYYY-MM-DD, today or later
        #[arg(short = 'D', long)]
        deadline: NaiveDate,
        /// High, Medium or Low
        #[arg(short = 'P', long, default_value = "High")]
        priority: Priority,
    },
    /// List all tasks
    Tasks,
    /// Show the tasks assigned to you
    Mine,
    /// Update one of your tasks
    Update {
        id: u64,
        /// New status (Assigned, In Progress, Done)
        #[arg(short, long)]
        status: Option<String>,
        /// Hours to add to the time spent
        #[arg(short = 'H', long, default_value_t = 0.0)]
        hours: f64,
        /// Why the task is not done yet
        #[arg(short, long)]
        reason: Option<String>,
    },
    /// Show per-employee performance and the leaderboard
    Report {
        /// Only rank the first N employees
        #[arg(short, long)]
        top: Option<usize>,
    },
    /// Print a salted hash of a password for users.json
    HashPassword {
        password: String,
    },
    /// Generate shell completions
    Completions {
        shell: Shell,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "taskdesk=debug,info"
    } else {
        "taskdesk=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn session(store: &JsonStorage, cli: &Cli, role: Role) -> Result<Session> {
    let (Some(user), Some(password)) = (&cli.user, &cli.password) else {
        bail!("This command needs --user and --password (or TASKDESK_USER and TASKDESK_PASSWORD)");
    };
    let session = taskdesk::auth::login(store, user, password)?;
    session.require(role)?;
    Ok(session)
}

fn employee_id(session: &Session) -> Result<&EmployeeId> {
    match &session.employee_id {
        Some(id) => Ok(id),
        None => bail!("User '{}' is not linked to an employee", session.username),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let store = JsonStorage::new(cli.data_dir.clone().unwrap_or_else(default_data_dir));

    match &cli.command {
        Commands::Login => {
            let (Some(user), Some(password)) = (&cli.user, &cli.password) else {
                bail!("login needs --user and --password");
            };
            cmd_login(&store, user, password)?;
        }
        Commands::Employees => {
            session(&store, &cli, Role::Manager)?;
            cmd_employees(&store)?;
        }
        Commands::Assign { employee_id, title, description, deadline, priority } => {
            session(&store, &cli, Role::Manager)?;
            cmd_assign(
                &store,
                EmployeeId::from(employee_id.as_str()),
                title.clone(),
                description.clone(),
                *deadline,
                *priority,
                Local::now().date_naive(),
            )?;
        }
        Commands::Tasks => {
            session(&store, &cli, Role::Manager)?;
            cmd_tasks(&store)?;
        }
        Commands::Mine => {
            let s = session(&store, &cli, Role::Employee)?;
            cmd_mine(&store, employee_id(&s)?)?;
        }
        Commands::Update { id, status, hours, reason } => {
            let s = session(&store, &cli, Role::Employee)?;
            let update = TaskUpdate {
                status: status.as_deref().map(TaskStatus::from),
                hours: *hours,
                reason: reason.clone(),
            };
            cmd_update(&store, employee_id(&s)?, *id, update)?;
        }
        Commands::Report { top } => {
            session(&store, &cli, Role::Manager)?;
            cmd_report(&store, local_now(), *top)?;
        }
        Commands::HashPassword { password } => cmd_hash_password(password)?,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(*shell, &mut cmd, "taskdesk", &mut io::stdout());
        }
    }
    Ok(())
}
