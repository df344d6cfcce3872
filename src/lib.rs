//! taskboard - local project and task tracking
//!
//! This library provides the storage and aggregation layer behind the `tb`
//! CLI: projects, the tasks grouped under them, and a dashboard view over
//! both, all persisted as JSON documents in a key-value substrate.
//!
//! # Core Concepts
//!
//! - **Substrate**: key-value store of string blobs (files or memory)
//! - **Collection**: everything stored under one key, read and written whole
//! - **Projects**: newest-first list of project records
//! - **Task mapping**: project id -> newest-first list of tasks
//! - **Recent tasks**: newest tasks of every project, ordered by due date
//!
//! # Module Organization
//!
//! - `storage`: Substrate trait plus file and in-memory backends
//! - `lock`: File locking and atomic writes for the file backend
//! - `codec`: Whole-collection JSON encode/decode
//! - `model`: Project and task records, timestamp handling
//! - `project` / `task`: Repositories over the two collections
//! - `dashboard`: Recent-task aggregation and per-project counts
//! - `pager`: Windowed loading of a project's tasks
//! - `session`: Current-user record
//! - `board`: Facade wiring a substrate to all of the above
//! - `config`: `taskboard.toml` loading
//! - `cli` / `output`: The `tb` command-line front-end

pub mod board;
pub mod cli;
pub mod codec;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod id;
pub mod lock;
pub mod model;
pub mod output;
pub mod pager;
pub mod project;
pub mod session;
pub mod storage;
pub mod task;

pub use board::Board;
pub use error::{Error, Result};
