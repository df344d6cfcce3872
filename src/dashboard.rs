//! Dashboard aggregation across projects.
//!
//! `recent_tasks` takes the most recently *created* tasks of every project
//! (the head of each stored list), tags them with the project's name and
//! orders the merged list by due date, earliest first. Equal due dates are
//! ordered by task id so the output is reproducible.

use serde::Serialize;

use crate::error::Result;
use crate::model::{RecentTask, CONVENTIONAL_STATUSES};
use crate::project::ProjectRepository;
use crate::task::TaskRepository;

/// Tasks taken from the head of each project
pub const DEFAULT_RECENT_WINDOW: usize = 5;

#[derive(Debug, Clone)]
pub struct RecencyAggregator {
    projects: ProjectRepository,
    tasks: TaskRepository,
    window: usize,
}

impl RecencyAggregator {
    pub fn new(projects: ProjectRepository, tasks: TaskRepository, window: usize) -> Self {
        Self {
            projects,
            tasks,
            window,
        }
    }

    pub fn recent_tasks(&self) -> Result<Vec<RecentTask>> {
        let mut recent = Vec::new();
        for project in self.projects.list()? {
            let window = self.tasks.load_tasks(&project.id, 0, self.window)?;
            recent.extend(window.into_iter().map(|task| RecentTask {
                task,
                project_id: project.id.clone(),
                project_name: project.name.clone(),
            }));
        }

        recent.sort_by(|a, b| {
            a.task
                .due_date
                .cmp(&b.task.due_date)
                .then_with(|| a.task.id.cmp(&b.task.id))
        });

        tracing::debug!(count = recent.len(), window = self.window, "aggregated recent tasks");
        Ok(recent)
    }
}

/// Per-project task counts shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub total: usize,
    pub not_started: usize,
    pub in_progress: usize,
    pub completed: usize,
}

/// Count every project's tasks by the conventional statuses.
///
/// Tasks with any other status only show up in `total`.
pub fn project_summaries(
    projects: &ProjectRepository,
    tasks: &TaskRepository,
) -> Result<Vec<ProjectSummary>> {
    let mapping = tasks.mapping()?;
    let summaries = projects
        .list()?
        .into_iter()
        .map(|project| {
            let owned = mapping.get(&project.id).map(Vec::as_slice).unwrap_or(&[]);
            let [not_started, in_progress, completed] = CONVENTIONAL_STATUSES
                .map(|status| owned.iter().filter(|task| task.status == status).count());
            ProjectSummary {
                total: owned.len(),
                not_started,
                in_progress,
                completed,
                id: project.id,
                name: project.name,
                description: project.description,
            }
        })
        .collect();
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::DocumentCodec;
    use crate::config::TasksConfig;
    use crate::model::{NewProject, NewTask};
    use crate::storage::MemorySubstrate;
    use std::sync::Arc;

    fn setup(window: usize) -> (ProjectRepository, TaskRepository, RecencyAggregator) {
        let codec = DocumentCodec::new(Arc::new(MemorySubstrate::new()));
        let projects = ProjectRepository::new(codec.clone(), "tm_projects");
        let tasks = TaskRepository::new(codec, "tm_tasks", TasksConfig::default());
        let aggregator = RecencyAggregator::new(projects.clone(), tasks.clone(), window);
        (projects, tasks, aggregator)
    }

    #[test]
    fn test_empty_board() {
        let (_, _, aggregator) = setup(DEFAULT_RECENT_WINDOW);
        assert!(aggregator.recent_tasks().unwrap().is_empty());
    }

    #[test]
    fn test_takes_newest_created_not_soonest_due() {
        let (projects, tasks, aggregator) = setup(2);
        let alpha = projects.create(NewProject::new("Alpha")).unwrap();

        // Created first, due first: falls out of the window
        tasks
            .create(&alpha.id, NewTask::new("old").due("2024-01-01"))
            .unwrap();
        let mid = tasks
            .create(&alpha.id, NewTask::new("mid").due("2024-03-01"))
            .unwrap();
        let new = tasks
            .create(&alpha.id, NewTask::new("new").due("2024-02-01"))
            .unwrap();

        let recent = aggregator.recent_tasks().unwrap();
        let ids: Vec<&str> = recent.iter().map(|r| r.task.id.as_str()).collect();
        assert_eq!(ids, vec![new.id.as_str(), mid.id.as_str()]);
        assert!(recent.iter().all(|r| r.project_name == "Alpha"));
    }

    #[test]
    fn test_equal_due_dates_order_by_id() {
        let (projects, tasks, aggregator) = setup(DEFAULT_RECENT_WINDOW);
        let alpha = projects.create(NewProject::new("Alpha")).unwrap();
        let beta = projects.create(NewProject::new("Beta")).unwrap();

        for project in [&alpha, &beta] {
            for idx in 0..3 {
                tasks
                    .create(&project.id, NewTask::new(format!("t{idx}")).due("2024-06-01"))
                    .unwrap();
            }
        }

        let recent = aggregator.recent_tasks().unwrap();
        assert_eq!(recent.len(), 6);
        let ids: Vec<&String> = recent.iter().map(|r| &r.task.id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_aggregation_does_not_touch_storage() {
        let (projects, tasks, aggregator) = setup(DEFAULT_RECENT_WINDOW);
        let alpha = projects.create(NewProject::new("Alpha")).unwrap();
        tasks.create(&alpha.id, NewTask::new("x")).unwrap();
        let before = tasks.mapping().unwrap();

        aggregator.recent_tasks().unwrap();
        assert_eq!(tasks.mapping().unwrap(), before);
    }

    #[test]
    fn test_project_summaries_count_by_status() {
        let (projects, tasks, _) = setup(DEFAULT_RECENT_WINDOW);
        let alpha = projects.create(NewProject::new("Alpha")).unwrap();
        let empty = projects.create(NewProject::new("Empty")).unwrap();

        let first = tasks.create(&alpha.id, NewTask::new("a")).unwrap();
        let second = tasks.create(&alpha.id, NewTask::new("b")).unwrap();
        tasks
            .create(&alpha.id, NewTask::new("c").status("Blocked"))
            .unwrap();
        tasks.set_completed(&alpha.id, &first.id, true).unwrap();
        tasks.set_completed(&alpha.id, &second.id, false).unwrap();

        let summaries = project_summaries(&projects, &tasks).unwrap();
        assert_eq!(summaries.len(), 2);

        assert_eq!(summaries[0].id, empty.id);
        assert_eq!(summaries[0].total, 0);

        let alpha_summary = &summaries[1];
        assert_eq!(alpha_summary.total, 3);
        assert_eq!(alpha_summary.completed, 1);
        assert_eq!(alpha_summary.in_progress, 1);
        assert_eq!(alpha_summary.not_started, 0);
    }
}
