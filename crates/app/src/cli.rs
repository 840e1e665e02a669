use std::net::SocketAddr;

use clap::{Parser, Subcommand};

use marginalia_core::types::post_id::PostId;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Serve {
        #[arg(long)]
        addr: Option<SocketAddr>,
        #[arg(long, default_value_t = 0)]
        seed: usize,
    },
    List {
        #[arg(long)]
        post: PostId,
        #[arg(long)]
        user: Option<i64>,
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    Run {
        #[arg(long)]
        post: PostId,
        #[arg(long)]
        user: Option<i64>,
    },
}
