//! Entry point tying one substrate to the repositories.

use std::sync::Arc;

use crate::codec::DocumentCodec;
use crate::config::Config;
use crate::dashboard::{self, ProjectSummary, RecencyAggregator};
use crate::error::Result;
use crate::pager::TaskPager;
use crate::project::ProjectRepository;
use crate::session::SessionStore;
use crate::storage::{FileSubstrate, MemorySubstrate, SharedSubstrate};
use crate::task::TaskRepository;

#[derive(Debug, Clone)]
pub struct Board {
    config: Config,
    substrate: SharedSubstrate,
    projects: ProjectRepository,
    tasks: TaskRepository,
    session: SessionStore,
}

impl Board {
    /// Board over any substrate.
    pub fn new(substrate: SharedSubstrate, config: Config) -> Self {
        let codec = DocumentCodec::new(substrate.clone());
        let storage = &config.storage;
        let projects = ProjectRepository::new(codec.clone(), storage.projects_key.clone());
        let tasks = TaskRepository::new(
            codec.clone(),
            storage.tasks_key.clone(),
            config.tasks.clone(),
        );
        let session = SessionStore::new(codec, storage.session_key.clone());

        Self {
            config,
            substrate,
            projects,
            tasks,
            session,
        }
    }

    /// File-backed board in the configured data directory.
    pub fn open(config: Config) -> Result<Self> {
        let data_dir = config.data_dir()?;
        tracing::debug!(data_dir = %data_dir.display(), "opening board");
        let substrate =
            FileSubstrate::new(data_dir).with_lock_timeout(config.storage.lock_timeout_ms);
        Ok(Self::new(Arc::new(substrate), config))
    }

    /// Ephemeral board, used by tests.
    pub fn in_memory(config: Config) -> Self {
        Self::new(MemorySubstrate::shared(), config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn substrate(&self) -> &SharedSubstrate {
        &self.substrate
    }

    pub fn projects(&self) -> &ProjectRepository {
        &self.projects
    }

    pub fn tasks(&self) -> &TaskRepository {
        &self.tasks
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn aggregator(&self) -> RecencyAggregator {
        RecencyAggregator::new(
            self.projects.clone(),
            self.tasks.clone(),
            self.config.dashboard.recent_window,
        )
    }

    pub fn pager(&self, project_id: impl Into<String>) -> TaskPager {
        TaskPager::new(self.tasks.clone(), project_id)
    }

    pub fn project_summaries(&self) -> Result<Vec<ProjectSummary>> {
        dashboard::project_summaries(&self.projects, &self.tasks)
    }

    /// Delete a project together with its tasks.
    ///
    /// Two separate writes: the project record goes first, then the
    /// project's task list is emptied.
    pub fn delete_project(&self, project_id: &str) -> Result<()> {
        self.projects.delete(project_id)?;
        self.tasks.clear_project(project_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewProject, NewTask};
    use crate::storage::Substrate;

    #[test]
    fn test_delete_project_clears_tasks() {
        let board = Board::in_memory(Config::default());
        let alpha = board.projects().create(NewProject::new("Alpha")).unwrap();
        let beta = board.projects().create(NewProject::new("Beta")).unwrap();
        board.tasks().create(&alpha.id, NewTask::new("a")).unwrap();
        board.tasks().create(&beta.id, NewTask::new("b")).unwrap();

        board.delete_project(&alpha.id).unwrap();

        assert_eq!(board.projects().get(&alpha.id).unwrap(), None);
        assert!(board.tasks().get_all_for_project(&alpha.id).unwrap().is_empty());
        assert_eq!(board.tasks().count_tasks(&alpha.id).unwrap(), 0);
        assert_eq!(board.tasks().count_tasks(&beta.id).unwrap(), 1);

        // Deleting again changes nothing
        board.delete_project(&alpha.id).unwrap();
        assert_eq!(board.projects().list().unwrap().len(), 1);
    }

    #[test]
    fn test_custom_keys_are_used() {
        let mut config = Config::default();
        config.storage.projects_key = "projects".to_string();
        let board = Board::in_memory(config);

        board.projects().create(NewProject::new("Alpha")).unwrap();
        assert!(board.substrate().get("projects").unwrap().is_some());
        assert!(board.substrate().get("tm_projects").unwrap().is_none());
    }

    #[test]
    fn test_aggregator_uses_configured_window() {
        let mut config = Config::default();
        config.dashboard.recent_window = 2;
        let board = Board::in_memory(config);

        let alpha = board.projects().create(NewProject::new("Alpha")).unwrap();
        for idx in 0..4 {
            board
                .tasks()
                .create(&alpha.id, NewTask::new(format!("t{idx}")))
                .unwrap();
        }

        assert_eq!(board.aggregator().recent_tasks().unwrap().len(), 2);
    }
}
