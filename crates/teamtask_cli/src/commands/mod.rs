//! CLI command dispatch and execution.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use teamtask_core::db::open_db;
use teamtask_core::{
    default_log_level, init_logging, load_config, EngineConfig, SqliteStore, WorkloadService,
};

mod task;
mod team;
mod workload;

/// Exit status used when an assignment was refused for capacity.
pub const EXIT_OVERCAPACITY: u8 = 2;

/// teamtask - capacity-aware task assignment for small teams
#[derive(Parser, Debug)]
#[command(
    name = "teamtask",
    version,
    about = "Capacity-aware task assignment and rebalancing for teams"
)]
pub struct Cli {
    /// SQLite database file
    #[arg(long, env = "TEAMTASK_DB", default_value = "teamtask.sqlite3")]
    db: PathBuf,

    /// Engine config file (TOML)
    #[arg(long, env = "TEAMTASK_CONFIG")]
    config: Option<PathBuf>,

    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long, env = "TEAMTASK_LOG_DIR")]
    log_dir: Option<String>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, env = "TEAMTASK_LOG_LEVEL")]
    log_level: Option<String>,

    /// Identity used for team ownership checks
    #[arg(long, env = "TEAMTASK_ACTOR", default_value = "local")]
    actor: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a team owned by the current actor
    CreateTeam(team::CreateTeamArgs),
    /// List teams owned by the current actor
    ListTeams,
    /// Add a member with a task capacity
    AddMember(team::AddMemberArgs),
    /// Create a project under a team
    CreateProject(team::CreateProjectArgs),
    /// Create a task, checking the assignee's capacity
    CreateTask(task::CreateTaskArgs),
    /// Point an existing task at another member
    AssignTask(task::AssignTaskArgs),
    /// Change a task's status
    SetStatus(task::SetStatusArgs),
    /// List tasks, newest first
    ListTasks(task::ListTasksArgs),
    /// Show each member's load, least loaded first
    TeamLoad(workload::TeamArgs),
    /// Suggest the best assignee for a new task
    Suggest(workload::TeamArgs),
    /// Move tasks off members at capacity
    Reassign(workload::TeamArgs),
    /// Show recent reassignment activity
    Activity(workload::ActivityArgs),
}

/// Rendered command result.
#[derive(Debug)]
pub struct CommandOutput {
    pub body: String,
    overcapacity: bool,
}

impl CommandOutput {
    pub fn json(value: &impl Serialize) -> Result<Self> {
        Ok(Self {
            body: serde_json::to_string_pretty(value).context("failed to render output")?,
            overcapacity: false,
        })
    }

    /// Output for a refused assignment; the process exits non-zero.
    pub fn overcapacity(value: &impl Serialize) -> Result<Self> {
        let mut output = Self::json(value)?;
        output.overcapacity = true;
        Ok(output)
    }

    pub fn is_overcapacity(&self) -> bool {
        self.overcapacity
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.overcapacity {
            ExitCode::from(EXIT_OVERCAPACITY)
        } else {
            ExitCode::SUCCESS
        }
    }
}

/// Open store plus resolved settings for one invocation.
pub struct Session {
    conn: Connection,
    config: EngineConfig,
    actor: String,
}

impl Session {
    pub fn service(&self) -> WorkloadService<SqliteStore<'_>> {
        WorkloadService::new(SqliteStore::new(&self.conn), self.config.clone())
    }

    pub fn actor(&self) -> &str {
        &self.actor
    }
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<CommandOutput> {
        if let Some(log_dir) = self.log_dir.as_deref() {
            let level = self.log_level.as_deref().unwrap_or(default_log_level());
            init_logging(level, log_dir)?;
        }

        let config = load_config(self.config.as_deref()).context("failed to load config")?;
        let conn = open_db(&self.db)
            .with_context(|| format!("failed to open database `{}`", self.db.display()))?;
        let session = Session {
            conn,
            config,
            actor: self.actor,
        };

        match self.command {
            Commands::CreateTeam(args) => team::create_team(&session, args),
            Commands::ListTeams => team::list_teams(&session),
            Commands::AddMember(args) => team::add_member(&session, args),
            Commands::CreateProject(args) => team::create_project(&session, args),
            Commands::CreateTask(args) => task::create_task(&session, args),
            Commands::AssignTask(args) => task::assign_task(&session, args),
            Commands::SetStatus(args) => task::set_status(&session, args),
            Commands::ListTasks(args) => task::list_tasks(&session, args),
            Commands::TeamLoad(args) => workload::team_load(&session, args),
            Commands::Suggest(args) => workload::suggest(&session, args),
            Commands::Reassign(args) => workload::reassign(&session, args),
            Commands::Activity(args) => workload::activity(&session, args),
        }
    }
}
