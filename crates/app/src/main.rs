mod cli;
mod config;
mod http;
mod render;
mod state;
#[cfg(test)]
mod testsupport;
mod widget;
mod wiring;

use chrono::Utc;
use clap::Parser;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::config::ConfigError;
use crate::http::HttpError;
use crate::widget::WidgetError;
use crate::wiring::WiringError;
use marginalia_core::types::post_id::PostId;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid cli: {0}")]
    InvalidCli(String),
    #[error("wiring error: {0}")]
    Wiring(#[from] WiringError),
    #[error("http error: {0}")]
    Http(#[from] HttpError),
    #[error("widget error: {0}")]
    Widget(#[from] WidgetError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

const SEED_POST: i64 = 42;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    config::load_dotenv()?;
    let config = config::AppConfig::from_env()?;
    let state = wiring::build_state(config)?;

    match cli.command {
        Command::Serve { addr, seed } => {
            let addr = addr.unwrap_or(state.config.http_addr);
            let serve_state = http::ServeState::new(state.config.page_size);
            if seed > 0 {
                let post = PostId::try_from(SEED_POST)
                    .map_err(|err| AppError::InvalidCli(err.to_string()))?;
                serve_state.store.write().await.seed(post, seed, Utc::now());
                info!(count = seed, post = %post, "seeded fixture comments");
            }
            info!(%addr, "fixture comment api starting");
            http::serve(addr, serve_state).await?;
        }
        Command::List { post, user, pages } => {
            widget::run_list(&state, post, user, pages).await?;
        }
        Command::Run { post, user } => {
            widget::run_session(&state, post, user).await?;
        }
    }

    Ok(())
}
