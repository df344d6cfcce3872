//! tb task command implementations.

use crate::board::Board;
use crate::cli::{require_login, BoardArgs};
use crate::error::{Error, Result};
use crate::model::{self, format_timestamp, NewTask, Project, Task};
use crate::output::{emit_success, HumanOutput, OutputOptions};

pub struct NewOptions {
    pub project: String,
    pub title: String,
    pub description: Option<String>,
    pub due: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub board: BoardArgs,
    pub json: bool,
    pub quiet: bool,
}

pub struct ListOptions {
    pub project: String,
    pub offset: usize,
    pub limit: Option<usize>,
    pub all: bool,
    pub board: BoardArgs,
    pub json: bool,
    pub quiet: bool,
}

pub struct CountOptions {
    pub project: String,
    pub status: Option<String>,
    pub board: BoardArgs,
    pub json: bool,
    pub quiet: bool,
}

pub struct ShowOptions {
    pub project: String,
    pub id: String,
    pub board: BoardArgs,
    pub json: bool,
    pub quiet: bool,
}

pub struct EditOptions {
    pub project: String,
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub due: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub board: BoardArgs,
    pub json: bool,
    pub quiet: bool,
}

pub struct CompleteOptions {
    pub project: String,
    pub id: String,
    pub completed: bool,
    pub board: BoardArgs,
    pub json: bool,
    pub quiet: bool,
}

pub struct DeleteOptions {
    pub project: String,
    pub id: String,
    pub board: BoardArgs,
    pub json: bool,
    pub quiet: bool,
}

#[derive(serde::Serialize)]
struct TaskListOutput {
    project_id: String,
    total: usize,
    offset: usize,
    has_more: bool,
    tasks: Vec<Task>,
}

#[derive(serde::Serialize)]
struct TaskCountOutput {
    project_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<String>,
    total: usize,
}

#[derive(serde::Serialize)]
struct TaskDeleteOutput {
    project_id: String,
    id: String,
    existed: bool,
}

/// Open the board, check the session and resolve the project.
fn load_project(board_args: &BoardArgs, project_id: &str) -> Result<(Board, Project)> {
    let board = board_args.open()?;
    require_login(&board)?;
    let project = board
        .projects()
        .get(project_id)?
        .ok_or_else(|| Error::ProjectNotFound(project_id.to_string()))?;
    Ok((board, project))
}

fn task_human(header: &str, project: &Project, task: &Task) -> HumanOutput {
    let mut human = HumanOutput::new(header);
    human.push_summary("ID", task.id.clone());
    human.push_summary("Project", format!("{} ({})", project.name, project.id));
    human.push_summary("Title", task.title.clone());
    if !task.description.is_empty() {
        human.push_summary("Description", task.description.clone());
    }
    human.push_summary("Due", format_timestamp(&task.due_date));
    human.push_summary("Priority", task.priority.clone());
    human.push_summary("Status", task.status.clone());
    human.push_summary("Created", format_timestamp(&task.created_at));
    human
}

pub(super) fn task_line(task: &Task) -> String {
    format!(
        "{} [{}] {} (due {}, {})",
        task.id,
        task.status,
        task.title,
        format_timestamp(&task.due_date),
        task.priority
    )
}

pub fn run_new(options: NewOptions) -> Result<()> {
    let (board, project) = load_project(&options.board, &options.project)?;

    let title = options.title.trim();
    if title.is_empty() {
        return Err(Error::InvalidArgument(
            "task title cannot be empty".to_string(),
        ));
    }
    let input = NewTask {
        title: title.to_string(),
        description: options.description,
        due_date: options.due,
        priority: options.priority,
        status: options.status,
    };
    let task = board.tasks().create(&project.id, input)?;

    let mut human = task_human("Task created", &project, &task);
    human.push_next_step(format!("tb task done {} {}", project.id, task.id));
    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task new",
        &task,
        Some(&human),
    )
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let (board, project) = load_project(&options.board, &options.project)?;
    let tasks_repo = board.tasks();

    let (offset, tasks) = match (options.all, options.offset, options.limit) {
        (true, _, _) => (0, tasks_repo.get_all_for_project(&project.id)?),
        (false, 0, None) => (0, tasks_repo.load_first_page(&project.id)?),
        (false, offset, limit) => {
            let limit = limit.unwrap_or(tasks_repo.config().page_size);
            (offset, tasks_repo.load_tasks(&project.id, offset, limit)?)
        }
    };
    let total = tasks_repo.count_tasks(&project.id)?;
    let has_more = total > offset + tasks.len();

    let mut human = HumanOutput::new(format!("Tasks in {}", project.name));
    human.push_summary("Total", total.to_string());
    human.push_summary("Showing", format!("{}..{}", offset, offset + tasks.len()));
    for task in &tasks {
        human.push_detail(task_line(task));
    }
    if has_more {
        human.push_next_step(format!(
            "tb task list {} --offset {}",
            project.id,
            offset + tasks.len()
        ));
    }

    let output = TaskListOutput {
        project_id: project.id,
        total,
        offset,
        has_more,
        tasks,
    };
    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task list",
        &output,
        Some(&human),
    )
}

pub fn run_count(options: CountOptions) -> Result<()> {
    let (board, project) = load_project(&options.board, &options.project)?;
    let total = board
        .tasks()
        .count_by_status(&project.id, options.status.as_deref())?;

    let mut human = HumanOutput::new(total.to_string());
    if let Some(status) = &options.status {
        human.push_summary("Status", status.clone());
    }
    let output = TaskCountOutput {
        project_id: project.id,
        status: options.status,
        total,
    };
    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task count",
        &output,
        Some(&human),
    )
}

pub fn run_show(options: ShowOptions) -> Result<()> {
    let (board, project) = load_project(&options.board, &options.project)?;
    let task = board
        .tasks()
        .get(&project.id, &options.id)?
        .ok_or_else(|| Error::TaskNotFound(options.id.clone()))?;

    let human = task_human(&format!("Task {}", task.id), &project, &task);
    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task show",
        &task,
        Some(&human),
    )
}

pub fn run_edit(options: EditOptions) -> Result<()> {
    let (board, project) = load_project(&options.board, &options.project)?;
    let mut task = board
        .tasks()
        .get(&project.id, &options.id)?
        .ok_or_else(|| Error::TaskNotFound(options.id.clone()))?;

    if let Some(title) = options.title {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::InvalidArgument(
                "task title cannot be empty".to_string(),
            ));
        }
        task.title = title.to_string();
    }
    if let Some(description) = options.description {
        task.description = description;
    }
    if let Some(raw) = options.due {
        task.due_date =
            model::parse_timestamp(&raw).ok_or_else(|| Error::InvalidDueDate(raw.clone()))?;
    }
    if let Some(priority) = options.priority {
        task.priority = priority;
    }
    if let Some(status) = options.status {
        task.status = status;
    }

    // The task can vanish between the read and the write
    let task = board
        .tasks()
        .update(&project.id, task)?
        .ok_or_else(|| Error::TaskNotFound(options.id.clone()))?;

    let human = task_human("Task updated", &project, &task);
    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task edit",
        &task,
        Some(&human),
    )
}

pub fn run_complete(options: CompleteOptions) -> Result<()> {
    let (board, project) = load_project(&options.board, &options.project)?;
    let task = board
        .tasks()
        .set_completed(&project.id, &options.id, options.completed)?
        .ok_or_else(|| Error::TaskNotFound(options.id.clone()))?;

    let (header, command) = if options.completed {
        ("Task completed", "task done")
    } else {
        ("Task reopened", "task reopen")
    };
    let human = task_human(header, &project, &task);
    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        command,
        &task,
        Some(&human),
    )
}

pub fn run_delete(options: DeleteOptions) -> Result<()> {
    let (board, project) = load_project(&options.board, &options.project)?;
    let existed = board.tasks().get(&project.id, &options.id)?.is_some();
    board.tasks().delete(&project.id, &options.id)?;

    let mut human = HumanOutput::new("Task deleted");
    human.push_summary("ID", options.id.clone());
    if !existed {
        human.push_warning(format!("no task with id {} in {}", options.id, project.id));
    }
    let output = TaskDeleteOutput {
        project_id: project.id,
        id: options.id,
        existed,
    };
    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task delete",
        &output,
        Some(&human),
    )
}
