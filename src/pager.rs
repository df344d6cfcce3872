//! Incremental loading of one project's tasks.

use crate::error::Result;
use crate::model::Task;
use crate::task::TaskRepository;

/// Loads a project's tasks one window at a time.
///
/// The offset advances by the number of tasks a window actually returned,
/// and `has_more` compares the stored count with what has been loaded.
#[derive(Debug, Clone)]
pub struct TaskPager {
    tasks: TaskRepository,
    project_id: String,
    page_size: usize,
    offset: usize,
    loaded: Vec<Task>,
}

impl TaskPager {
    pub fn new(tasks: TaskRepository, project_id: impl Into<String>) -> Self {
        let page_size = tasks.config().page_size;
        Self::with_page_size(tasks, project_id, page_size)
    }

    pub fn with_page_size(
        tasks: TaskRepository,
        project_id: impl Into<String>,
        page_size: usize,
    ) -> Self {
        Self {
            tasks,
            project_id: project_id.into(),
            page_size: page_size.max(1),
            offset: 0,
            loaded: Vec::new(),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn loaded(&self) -> &[Task] {
        &self.loaded
    }

    /// Forget everything loaded so far and fetch the first window.
    pub fn reset(&mut self) -> Result<&[Task]> {
        self.offset = 0;
        self.loaded.clear();
        self.load_more()
    }

    /// Append the next window. Returns just the newly loaded tasks.
    pub fn load_more(&mut self) -> Result<&[Task]> {
        let chunk = self
            .tasks
            .load_tasks(&self.project_id, self.offset, self.page_size)?;
        let start = self.loaded.len();
        self.offset += chunk.len();
        self.loaded.extend(chunk);
        Ok(&self.loaded[start..])
    }

    pub fn has_more(&self) -> Result<bool> {
        Ok(self.tasks.count_tasks(&self.project_id)? > self.loaded.len())
    }
}
