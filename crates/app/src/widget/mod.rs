pub mod controller;
pub mod host;
pub mod visibility;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use crate::render;
use crate::state::AppState;
use controller::{CommentsController, OpOutcome};
use host::WidgetHost;
use marginalia_core::types::post_id::PostId;
use marginalia_infra::api::ApiError;
use visibility::Immediate;

#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("api error: {0}")]
    Api(#[from] ApiError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub async fn run_list(
    state: &AppState,
    post: PostId,
    user: Option<i64>,
    pages: u32,
) -> Result<(), WidgetError> {
    let mut host = WidgetHost::new();
    let mut visibility = Immediate;
    host.connect(state, &mut visibility, post, user).await?;
    if let Some(controller) = host.controller_mut() {
        // The activation already loaded page one.
        for _ in 1..pages {
            if !controller.load_more().await? {
                break;
            }
        }
        println!("{}", render::render_feed(controller));
    }
    host.disconnect();
    Ok(())
}

pub async fn run_session(
    state: &AppState,
    post: PostId,
    user: Option<i64>,
) -> Result<(), WidgetError> {
    let mut host = WidgetHost::new();
    let mut visibility = Immediate;
    host.connect(state, &mut visibility, post, user).await?;
    if let Some(controller) = host.controller_mut() {
        println!("{}", render::render_feed(controller));
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let Some(command) = parse_command(&line) else {
                println!(
                    "commands: more | post <text> | edit <id> | save <id> <text> | cancel <id> | delete <id> | show | quit"
                );
                continue;
            };
            if matches!(command, SessionCommand::Quit) {
                break;
            }
            // Network failures leave the widget alive; the user may retry.
            if let Err(err) = apply_command(controller, command).await {
                warn!(error = %err, "widget command failed");
                println!("request failed: {err}");
            }
        }
    }
    host.disconnect();
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SessionCommand {
    More,
    Post(String),
    Edit(i64),
    Save(i64, String),
    Cancel(i64),
    Delete(i64),
    Show,
    Quit,
}

pub(crate) fn parse_command(line: &str) -> Option<SessionCommand> {
    let trimmed = line.trim();
    let (word, rest) = trimmed.split_once(' ').unwrap_or((trimmed, ""));
    let rest = rest.trim();
    match word {
        "more" => Some(SessionCommand::More),
        "show" => Some(SessionCommand::Show),
        "quit" | "exit" => Some(SessionCommand::Quit),
        "post" if !rest.is_empty() => Some(SessionCommand::Post(rest.to_string())),
        "edit" => rest.parse().ok().map(SessionCommand::Edit),
        "cancel" => rest.parse().ok().map(SessionCommand::Cancel),
        "delete" => rest.parse().ok().map(SessionCommand::Delete),
        "save" => {
            let (id, text) = rest.split_once(' ')?;
            let text = text.trim();
            if text.is_empty() {
                return None;
            }
            Some(SessionCommand::Save(id.parse().ok()?, text.to_string()))
        }
        _ => None,
    }
}

async fn apply_command(
    controller: &mut CommentsController,
    command: SessionCommand,
) -> Result<(), WidgetError> {
    match command {
        SessionCommand::More => {
            if !controller.load_more().await? {
                println!("no more comments");
            }
            println!("{}", render::render_feed(controller));
        }
        SessionCommand::Show => println!("{}", render::render_feed(controller)),
        SessionCommand::Post(text) => {
            if !controller.set_draft(&text) {
                println!("sign in to leave a comment");
                return Ok(());
            }
            match controller.submit_new().await? {
                OpOutcome::Done => println!("{}", render::render_feed(controller)),
                OpOutcome::Rejected => {
                    if let Some(form) = controller.form() {
                        println!("{}", render::render_errors(form.errors()));
                    }
                }
                other => report(other),
            }
        }
        SessionCommand::Edit(id) => match controller.begin_edit(id) {
            OpOutcome::Done => {
                let draft = controller
                    .edit_form(id)
                    .map(|form| form.draft().to_string())
                    .unwrap_or_default();
                println!("editing #{id}: {draft}");
            }
            other => report(other),
        },
        SessionCommand::Save(id, text) => {
            controller.set_edit_draft(id, &text);
            match controller.submit_edit(id).await? {
                OpOutcome::Done => println!("{}", render::render_feed(controller)),
                OpOutcome::Rejected => {
                    if let Some(form) = controller.edit_form(id) {
                        println!("{}", render::render_errors(form.errors()));
                    }
                }
                other => report(other),
            }
        }
        SessionCommand::Cancel(id) => match controller.cancel_edit(id) {
            OpOutcome::Done => println!("edit cancelled"),
            other => report(other),
        },
        SessionCommand::Delete(id) => match controller.delete(id).await? {
            OpOutcome::Done => println!("{}", render::render_feed(controller)),
            other => report(other),
        },
        SessionCommand::Quit => {}
    }
    Ok(())
}

fn report(outcome: OpOutcome) {
    match outcome {
        OpOutcome::Done => {}
        OpOutcome::Rejected => println!("submission rejected"),
        OpOutcome::NotPermitted => println!("only the author may do that"),
        OpOutcome::Unavailable => println!("no such comment here"),
        OpOutcome::Ignored => println!("previous request still running"),
    }
}
