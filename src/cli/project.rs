//! tb project command implementations.

use crate::cli::task::task_line;
use crate::cli::{require_login, BoardArgs};
use crate::error::{Error, Result};
use crate::model::{NewProject, Project, Task};
use crate::output::{emit_success, HumanOutput, OutputOptions};

pub struct NewOptions {
    pub name: String,
    pub description: Option<String>,
    pub board: BoardArgs,
    pub json: bool,
    pub quiet: bool,
}

pub struct ListOptions {
    pub board: BoardArgs,
    pub json: bool,
    pub quiet: bool,
}

pub struct ShowOptions {
    pub id: String,
    pub board: BoardArgs,
    pub json: bool,
    pub quiet: bool,
}

pub struct DeleteOptions {
    pub id: String,
    pub board: BoardArgs,
    pub json: bool,
    pub quiet: bool,
}

#[derive(serde::Serialize)]
struct ProjectListOutput {
    total: usize,
    projects: Vec<Project>,
}

#[derive(serde::Serialize)]
struct ProjectShowOutput {
    project: Project,
    total_tasks: usize,
    has_more: bool,
    tasks: Vec<Task>,
}

#[derive(serde::Serialize)]
struct ProjectDeleteOutput {
    id: String,
    existed: bool,
}

pub fn run_new(options: NewOptions) -> Result<()> {
    let board = options.board.open()?;
    require_login(&board)?;

    let name = options.name.trim();
    if name.is_empty() {
        return Err(Error::InvalidArgument(
            "project name cannot be empty".to_string(),
        ));
    }
    let mut input = NewProject::new(name);
    input.description = options.description;
    let project = board.projects().create(input)?;

    let mut human = HumanOutput::new("Project created");
    human.push_summary("ID", project.id.clone());
    human.push_summary("Name", project.name.clone());
    if !project.description.is_empty() {
        human.push_summary("Description", project.description.clone());
    }
    human.push_next_step(format!("tb task new {} <title>", project.id));
    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "project new",
        &project,
        Some(&human),
    )
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let board = options.board.open()?;
    require_login(&board)?;

    let projects = board.projects().list()?;
    let output = ProjectListOutput {
        total: projects.len(),
        projects,
    };
    let mut human = HumanOutput::new("Projects");
    human.push_summary("Total", output.total.to_string());
    for project in &output.projects {
        human.push_detail(format!("{} {}", project.id, project.name));
    }
    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "project list",
        &output,
        Some(&human),
    )
}

pub fn run_show(options: ShowOptions) -> Result<()> {
    let board = options.board.open()?;
    require_login(&board)?;

    let project = board
        .projects()
        .get(&options.id)?
        .ok_or_else(|| Error::ProjectNotFound(options.id.clone()))?;
    let mut pager = board.pager(project.id.clone());
    let tasks = pager.reset()?.to_vec();
    let has_more = pager.has_more()?;
    let total_tasks = board.tasks().count_tasks(&project.id)?;

    let mut human = HumanOutput::new(format!("Project {}", project.id));
    human.push_summary("Name", project.name.clone());
    if !project.description.is_empty() {
        human.push_summary("Description", project.description.clone());
    }
    human.push_summary("Tasks", total_tasks.to_string());
    for task in &tasks {
        human.push_detail(task_line(task));
    }
    if has_more {
        human.push_next_step(format!(
            "tb task list {} --offset {}",
            project.id,
            pager.offset()
        ));
    }

    let output = ProjectShowOutput {
        project,
        total_tasks,
        has_more,
        tasks,
    };
    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "project show",
        &output,
        Some(&human),
    )
}

pub fn run_delete(options: DeleteOptions) -> Result<()> {
    let board = options.board.open()?;
    require_login(&board)?;

    let existed = board.projects().get(&options.id)?.is_some();
    board.delete_project(&options.id)?;

    let mut human = HumanOutput::new("Project deleted");
    human.push_summary("ID", options.id.clone());
    if !existed {
        human.push_warning(format!("no project with id {}", options.id));
    }
    let output = ProjectDeleteOutput {
        id: options.id,
        existed,
    };
    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "project delete",
        &output,
        Some(&human),
    )
}
