//! Task repository.
//!
//! Tasks are grouped per project in a single mapping stored under one key:
//!
//! ```text
//! { "<project id>": [ <newest task>, ..., <oldest task> ], ... }
//! ```
//!
//! A project has no entry until its first task is created. An entry holding
//! an empty list is a distinct state (it is what clearing a project leaves).
//! Every mutation rewrites the whole mapping.

use std::collections::BTreeMap;

use crate::codec::{DocumentCodec, Outcome};
use crate::config::TasksConfig;
use crate::error::{Error, Result};
use crate::id::{self, TASK_ID_PREFIX};
use crate::model::{self, NewTask, Task, STATUS_COMPLETED, STATUS_IN_PROGRESS};

/// Project id -> tasks, newest first.
pub type TaskMapping = BTreeMap<String, Vec<Task>>;

/// Window size used when callers do not pass one
pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone)]
pub struct TaskRepository {
    codec: DocumentCodec,
    key: String,
    config: TasksConfig,
}

impl TaskRepository {
    pub fn new(codec: DocumentCodec, key: impl Into<String>, config: TasksConfig) -> Self {
        Self {
            codec,
            key: key.into(),
            config,
        }
    }

    pub fn config(&self) -> &TasksConfig {
        &self.config
    }

    /// Substrate key holding the mapping
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The whole mapping, every project included.
    pub fn mapping(&self) -> Result<TaskMapping> {
        self.codec.decode(&self.key)
    }

    /// Tasks `[offset, offset + limit)` of a project, in stored order.
    ///
    /// Unknown projects and offsets past the end give an empty window.
    pub fn load_tasks(&self, project_id: &str, offset: usize, limit: usize) -> Result<Vec<Task>> {
        let mut mapping = self.mapping()?;
        let tasks = mapping.remove(project_id).unwrap_or_default();
        Ok(tasks.into_iter().skip(offset).take(limit).collect())
    }

    /// First window using the configured page size.
    pub fn load_first_page(&self, project_id: &str) -> Result<Vec<Task>> {
        self.load_tasks(project_id, 0, self.config.page_size)
    }

    pub fn count_tasks(&self, project_id: &str) -> Result<usize> {
        Ok(self
            .mapping()?
            .get(project_id)
            .map(Vec::len)
            .unwrap_or(0))
    }

    /// Number of tasks with `status`, or all tasks when `status` is `None`.
    pub fn count_by_status(&self, project_id: &str, status: Option<&str>) -> Result<usize> {
        let mapping = self.mapping()?;
        let tasks = mapping.get(project_id).map(Vec::as_slice).unwrap_or(&[]);
        Ok(match status {
            None => tasks.len(),
            Some(status) => tasks.iter().filter(|task| task.status == status).count(),
        })
    }

    /// Build a full task from `input` and put it at the head of the project.
    pub fn create(&self, project_id: &str, input: NewTask) -> Result<Task> {
        let created_at = model::now();
        let due_date = match model::non_blank(input.due_date.as_deref()) {
            Some(raw) => model::parse_timestamp(raw)
                .ok_or_else(|| Error::InvalidDueDate(raw.to_string()))?,
            None => created_at,
        };
        let description = input.description.unwrap_or_default();
        let priority = model::non_blank(input.priority.as_deref())
            .unwrap_or(self.config.default_priority.as_str())
            .to_string();
        let status = model::non_blank(input.status.as_deref())
            .unwrap_or(self.config.default_status.as_str())
            .to_string();
        let title = input.title;

        let task = self.codec.update(&self.key, |mapping: &mut TaskMapping| {
            let tasks = mapping.entry(project_id.to_string()).or_default();
            let id = id::generate_unique(TASK_ID_PREFIX, |candidate| {
                tasks.iter().any(|task| task.id == candidate)
            });
            let task = Task {
                id,
                title,
                description,
                due_date,
                priority,
                status,
                created_at,
            };
            tasks.insert(0, task.clone());
            Ok(Outcome::Persist(task))
        })?;

        tracing::info!(%project_id, task_id = %task.id, "task created");
        Ok(task)
    }

    /// Overwrite the stored task with the same id.
    ///
    /// Returns `None` and writes nothing when the project has no such task.
    pub fn update(&self, project_id: &str, updated: Task) -> Result<Option<Task>> {
        let result = self.codec.update(&self.key, |mapping: &mut TaskMapping| {
            let Some(slot) = mapping
                .get_mut(project_id)
                .and_then(|tasks| tasks.iter_mut().find(|task| task.id == updated.id))
            else {
                return Ok(Outcome::Discard(None));
            };
            *slot = updated;
            Ok(Outcome::Persist(Some(slot.clone())))
        })?;

        match &result {
            Some(task) => tracing::debug!(%project_id, task_id = %task.id, "task updated"),
            None => tracing::debug!(%project_id, "update target not found"),
        }
        Ok(result)
    }

    /// Mark a task `Completed` (or back to `In Progress`).
    pub fn set_completed(
        &self,
        project_id: &str,
        task_id: &str,
        completed: bool,
    ) -> Result<Option<Task>> {
        let status = if completed {
            STATUS_COMPLETED
        } else {
            STATUS_IN_PROGRESS
        };

        // Only the status changes; other fields keep whatever is stored now
        let result = self.codec.update(&self.key, |mapping: &mut TaskMapping| {
            let Some(task) = mapping
                .get_mut(project_id)
                .and_then(|tasks| tasks.iter_mut().find(|task| task.id == task_id))
            else {
                return Ok(Outcome::Discard(None));
            };
            task.status = status.to_string();
            Ok(Outcome::Persist(Some(task.clone())))
        })?;

        if result.is_some() {
            tracing::debug!(%project_id, %task_id, status, "task status set");
        }
        Ok(result)
    }

    /// Remove a task. Missing ids are a no-op.
    pub fn delete(&self, project_id: &str, task_id: &str) -> Result<()> {
        self.codec.update(&self.key, |mapping: &mut TaskMapping| {
            mapping
                .entry(project_id.to_string())
                .or_default()
                .retain(|task| task.id != task_id);
            Ok(Outcome::Persist(()))
        })?;

        tracing::info!(%project_id, %task_id, "task deleted");
        Ok(())
    }

    pub fn get(&self, project_id: &str, task_id: &str) -> Result<Option<Task>> {
        Ok(self
            .get_all_for_project(project_id)?
            .into_iter()
            .find(|task| task.id == task_id))
    }

    /// Every task of a project, unpaginated.
    pub fn get_all_for_project(&self, project_id: &str) -> Result<Vec<Task>> {
        Ok(self.mapping()?.remove(project_id).unwrap_or_default())
    }

    /// Empty a project's task list, keeping its entry.
    pub fn clear_project(&self, project_id: &str) -> Result<()> {
        let removed = self.codec.update(&self.key, |mapping: &mut TaskMapping| {
            let previous = mapping.insert(project_id.to_string(), Vec::new());
            Ok(Outcome::Persist(previous.map(|tasks| tasks.len()).unwrap_or(0)))
        })?;

        tracing::info!(%project_id, removed, "project tasks cleared");
        Ok(())
    }
}
