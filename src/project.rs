//! Project repository.
//!
//! All projects live in one collection, newest first. Every call decodes the
//! whole collection; nothing is cached between calls.

use crate::codec::{DocumentCodec, Outcome};
use crate::error::Result;
use crate::id::{self, PROJECT_ID_PREFIX};
use crate::model::{NewProject, Project};

#[derive(Debug, Clone)]
pub struct ProjectRepository {
    codec: DocumentCodec,
    key: String,
}

impl ProjectRepository {
    pub fn new(codec: DocumentCodec, key: impl Into<String>) -> Self {
        Self {
            codec,
            key: key.into(),
        }
    }

    /// Substrate key holding the collection
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn list(&self) -> Result<Vec<Project>> {
        self.codec.decode(&self.key)
    }

    /// Create a project at the head of the collection.
    ///
    /// The name is stored as given; callers validate it.
    pub fn create(&self, input: NewProject) -> Result<Project> {
        let project = self.codec.update(&self.key, |projects: &mut Vec<Project>| {
            let id = id::generate_unique(PROJECT_ID_PREFIX, |candidate| {
                projects.iter().any(|project| project.id == candidate)
            });
            let project = Project {
                id,
                name: input.name,
                description: input.description.unwrap_or_default(),
            };
            projects.insert(0, project.clone());
            Ok(Outcome::Persist(project))
        })?;

        tracing::info!(project_id = %project.id, name = %project.name, "project created");
        Ok(project)
    }

    pub fn get(&self, id: &str) -> Result<Option<Project>> {
        Ok(self.list()?.into_iter().find(|project| project.id == id))
    }

    /// Remove the project with `id`. Missing ids are a no-op.
    pub fn delete(&self, id: &str) -> Result<()> {
        let removed = self.codec.update(&self.key, |projects: &mut Vec<Project>| {
            let before = projects.len();
            projects.retain(|project| project.id != id);
            Ok(Outcome::Persist(before - projects.len()))
        })?;

        tracing::info!(project_id = %id, removed, "project deleted");
        Ok(())
    }

    /// Replace the stored collection wholesale.
    pub fn save_all(&self, projects: &[Project]) -> Result<()> {
        let _guard = self.codec.substrate().exclusive(&self.key)?;
        self.codec.encode(&self.key, projects)
    }
}
