//! Command-line interface for tb
//!
//! This module defines the CLI structure using clap derive macros.
//! Each command group is implemented in its own submodule.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::board::Board;
use crate::config::{self, Config};
use crate::error::{Error, Result};

mod dashboard;
mod project;
mod session;
mod task;

/// tb - Taskboard
///
/// Track projects and their tasks in a local JSON store.
#[derive(Parser, Debug)]
#[command(name = "tb")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory (defaults to the platform data directory)
    #[arg(long, global = true, env = "TB_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Configuration file (defaults to taskboard.toml in the data directory)
    #[arg(long, global = true, env = "TB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start a session (any non-empty username and password)
    Login {
        /// Username to record
        username: String,

        /// Password (only checked for being non-empty)
        #[arg(long, env = "TB_PASSWORD")]
        password: String,
    },

    /// End the current session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Project management
    #[command(subcommand)]
    Project(ProjectCommands),

    /// Task management
    #[command(subcommand)]
    Task(TaskCommands),

    /// Projects with task counts, plus recent tasks across all projects
    Dashboard,
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// Create a project
    New {
        /// Project name
        name: String,

        /// Project description
        #[arg(short, long)]
        description: Option<String>,
    },

    /// List projects, newest first
    List,

    /// Show a project and its first page of tasks
    Show {
        /// Project ID
        id: String,
    },

    /// Delete a project and its tasks
    Delete {
        /// Project ID
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Create a task in a project
    New {
        /// Project ID
        project: String,

        /// Task title
        title: String,

        /// Task description
        #[arg(short, long)]
        description: Option<String>,

        /// Due date (YYYY-MM-DD or RFC 3339); defaults to now
        #[arg(long)]
        due: Option<String>,

        /// Priority (free-form, default "Medium")
        #[arg(long)]
        priority: Option<String>,

        /// Status (free-form, default "Not Started")
        #[arg(long)]
        status: Option<String>,
    },

    /// List a project's tasks, newest first
    List {
        /// Project ID
        project: String,

        /// Skip this many tasks
        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Window size (defaults to tasks.page_size)
        #[arg(long)]
        limit: Option<usize>,

        /// List every task, ignoring offset and limit
        #[arg(long, conflicts_with_all = ["offset", "limit"])]
        all: bool,
    },

    /// Count a project's tasks
    Count {
        /// Project ID
        project: String,

        /// Only count tasks with this status
        #[arg(long)]
        status: Option<String>,
    },

    /// Show one task
    Show {
        /// Project ID
        project: String,

        /// Task ID
        id: String,
    },

    /// Edit task fields
    Edit {
        /// Project ID
        project: String,

        /// Task ID
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New description
        #[arg(short, long)]
        description: Option<String>,

        /// New due date
        #[arg(long)]
        due: Option<String>,

        /// New priority
        #[arg(long)]
        priority: Option<String>,

        /// New status
        #[arg(long)]
        status: Option<String>,
    },

    /// Mark a task Completed
    Done {
        /// Project ID
        project: String,

        /// Task ID
        id: String,
    },

    /// Mark a completed task In Progress again
    Reopen {
        /// Project ID
        project: String,

        /// Task ID
        id: String,
    },

    /// Delete a task
    Delete {
        /// Project ID
        project: String,

        /// Task ID
        id: String,
    },
}

/// Where to find the board, as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct BoardArgs {
    pub data_dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

impl BoardArgs {
    /// Resolve configuration and open the file-backed board.
    ///
    /// An explicit `--config` must load cleanly; the implicit
    /// `taskboard.toml` falls back to defaults when invalid.
    pub fn open(&self) -> Result<Board> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => {
                let data_dir = match &self.data_dir {
                    Some(dir) => dir.clone(),
                    None => config::default_data_dir()?,
                };
                Config::load_from_dir(&data_dir)
            }
        };
        if let Some(dir) = &self.data_dir {
            config.storage.data_dir = Some(dir.clone());
        }
        Board::open(config)
    }
}

/// Route guard: every board command needs a session.
pub(crate) fn require_login(board: &Board) -> Result<String> {
    board
        .session()
        .current_user()?
        .ok_or(Error::NotAuthenticated)
}

impl Cli {
    fn board_args(&self) -> BoardArgs {
        BoardArgs {
            data_dir: self.data_dir.clone(),
            config: self.config.clone(),
        }
    }

    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let board = self.board_args();
        match self.command {
            Commands::Login { username, password } => session::run_login(session::LoginOptions {
                username,
                password,
                board,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Logout => session::run_logout(session::LogoutOptions {
                board,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Whoami => session::run_whoami(session::WhoamiOptions {
                board,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Project(cmd) => match cmd {
                ProjectCommands::New { name, description } => {
                    project::run_new(project::NewOptions {
                        name,
                        description,
                        board,
                        json: self.json,
                        quiet: self.quiet,
                    })
                }
                ProjectCommands::List => project::run_list(project::ListOptions {
                    board,
                    json: self.json,
                    quiet: self.quiet,
                }),
                ProjectCommands::Show { id } => project::run_show(project::ShowOptions {
                    id,
                    board,
                    json: self.json,
                    quiet: self.quiet,
                }),
                ProjectCommands::Delete { id } => project::run_delete(project::DeleteOptions {
                    id,
                    board,
                    json: self.json,
                    quiet: self.quiet,
                }),
            },
            Commands::Task(cmd) => match cmd {
                TaskCommands::New {
                    project,
                    title,
                    description,
                    due,
                    priority,
                    status,
                } => task::run_new(task::NewOptions {
                    project,
                    title,
                    description,
                    due,
                    priority,
                    status,
                    board,
                    json: self.json,
                    quiet: self.quiet,
                }),
                TaskCommands::List {
                    project,
                    offset,
                    limit,
                    all,
                } => task::run_list(task::ListOptions {
                    project,
                    offset,
                    limit,
                    all,
                    board,
                    json: self.json,
                    quiet: self.quiet,
                }),
                TaskCommands::Count { project, status } => task::run_count(task::CountOptions {
                    project,
                    status,
                    board,
                    json: self.json,
                    quiet: self.quiet,
                }),
                TaskCommands::Show { project, id } => task::run_show(task::ShowOptions {
                    project,
                    id,
                    board,
                    json: self.json,
                    quiet: self.quiet,
                }),
                TaskCommands::Edit {
                    project,
                    id,
                    title,
                    description,
                    due,
                    priority,
                    status,
                } => task::run_edit(task::EditOptions {
                    project,
                    id,
                    title,
                    description,
                    due,
                    priority,
                    status,
                    board,
                    json: self.json,
                    quiet: self.quiet,
                }),
                TaskCommands::Done { project, id } => task::run_complete(task::CompleteOptions {
                    project,
                    id,
                    completed: true,
                    board,
                    json: self.json,
                    quiet: self.quiet,
                }),
                TaskCommands::Reopen { project, id } => {
                    task::run_complete(task::CompleteOptions {
                        project,
                        id,
                        completed: false,
                        board,
                        json: self.json,
                        quiet: self.quiet,
                    })
                }
                TaskCommands::Delete { project, id } => task::run_delete(task::DeleteOptions {
                    project,
                    id,
                    board,
                    json: self.json,
                    quiet: self.quiet,
                }),
            },
            Commands::Dashboard => dashboard::run(dashboard::DashboardOptions {
                board,
                json: self.json,
                quiet: self.quiet,
            }),
        }
    }
}
