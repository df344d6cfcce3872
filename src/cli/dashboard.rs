//! tb dashboard.

use crate::cli::{require_login, BoardArgs};
use crate::dashboard::ProjectSummary;
use crate::error::Result;
use crate::model::{format_timestamp, RecentTask};
use crate::output::{emit_success, HumanOutput, OutputOptions};

pub struct DashboardOptions {
    pub board: BoardArgs,
    pub json: bool,
    pub quiet: bool,
}

#[derive(serde::Serialize)]
struct DashboardOutput {
    user: String,
    projects: Vec<ProjectSummary>,
    recent_tasks: Vec<RecentTask>,
}

pub fn run(options: DashboardOptions) -> Result<()> {
    let board = options.board.open()?;
    let user = require_login(&board)?;

    let projects = board.project_summaries()?;
    let recent_tasks = board.aggregator().recent_tasks()?;

    let mut human = HumanOutput::new(format!("Dashboard for {user}"));
    for project in &projects {
        human.push_summary(
            format!("{} {}", project.id, project.name),
            format!(
                "{} tasks ({} not started, {} in progress, {} completed)",
                project.total, project.not_started, project.in_progress, project.completed
            ),
        );
    }
    for recent in &recent_tasks {
        human.push_detail(format!(
            "{} {} [{}] {} / {}",
            format_timestamp(&recent.task.due_date),
            recent.task.id,
            recent.task.status,
            recent.project_name,
            recent.task.title
        ));
    }
    if projects.is_empty() {
        human.push_next_step("tb project new <name>");
    }

    let output = DashboardOutput {
        user,
        projects,
        recent_tasks,
    };
    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "dashboard",
        &output,
        Some(&human),
    )
}
