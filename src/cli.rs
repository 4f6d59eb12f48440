use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Terminal client for the SmartTodo backend.
/// The backend defaults to http://127.0.0.1:8000 or the URL passed via --base-url.
#[derive(Parser)]
#[command(name = "todo", version, about = "SmartTodo task client with AI suggestions")]
pub struct Cli {
    /// Backend base URL (overrides config file and SMARTTODO_BASE_URL).
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Path to the JSON config file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Number of records fetched by list commands.
    #[arg(long, global = true)]
    pub page_size: Option<usize>,

    /// Log requests and workflow steps to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}
