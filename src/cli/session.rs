//! tb login / logout / whoami.

use crate::cli::BoardArgs;
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};

pub struct LoginOptions {
    pub username: String,
    pub password: String,
    pub board: BoardArgs,
    pub json: bool,
    pub quiet: bool,
}

pub struct LogoutOptions {
    pub board: BoardArgs,
    pub json: bool,
    pub quiet: bool,
}

pub struct WhoamiOptions {
    pub board: BoardArgs,
    pub json: bool,
    pub quiet: bool,
}

#[derive(serde::Serialize)]
struct SessionOutput {
    username: Option<String>,
    authenticated: bool,
}

pub fn run_login(options: LoginOptions) -> Result<()> {
    let board = options.board.open()?;
    let username = options.username.trim();
    if !board.session().login(username, &options.password)? {
        return Err(Error::InvalidArgument(
            "username and password must be non-empty".to_string(),
        ));
    }

    let output = SessionOutput {
        username: Some(username.to_string()),
        authenticated: true,
    };
    let mut human = HumanOutput::new(format!("Logged in as {username}"));
    human.push_next_step("tb project new <name>");
    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "login",
        &output,
        Some(&human),
    )
}

pub fn run_logout(options: LogoutOptions) -> Result<()> {
    let board = options.board.open()?;
    board.session().logout()?;

    let output = SessionOutput {
        username: None,
        authenticated: false,
    };
    let human = HumanOutput::new("Logged out");
    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "logout",
        &output,
        Some(&human),
    )
}

pub fn run_whoami(options: WhoamiOptions) -> Result<()> {
    let board = options.board.open()?;
    let username = board.session().current_user()?;

    let mut human = match &username {
        Some(name) => HumanOutput::new(name.clone()),
        None => HumanOutput::new("Not logged in"),
    };
    if username.is_none() {
        human.push_next_step("tb login <username> --password <password>");
    }
    let output = SessionOutput {
        authenticated: username.is_some(),
        username,
    };
    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "whoami",
        &output,
        Some(&human),
    )
}
