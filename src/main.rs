//! # todo - SmartTodo terminal client
//!
//! A command-line client for the SmartTodo REST backend: tasks, categories and
//! context entries, with AI suggestions applied to every new task.
//!
//! ## Key Features
//!
//! - **Save-then-enrich**: new tasks are saved first, then sent to the
//!   suggestion service; its priority score, deadline, description and
//!   categories are applied in a second update
//! - **Lazy categories**: suggested categories that do not exist yet are
//!   created once, matched case-insensitively
//! - **Context capture**: record notes, emails and messages, and search them
//! - **Dashboard**: completion counts, upcoming deadlines, priority ranking
//!
//! ## Quick Start
//!
//! ```bash
//! # Add a task; AI suggestions are applied automatically
//! todo add "Buy milk" --desc "2% milk" --priority high
//!
//! # List tasks by AI priority
//! todo list --sort priority
//!
//! # Record a context note and search the history
//! todo context add --source email "Invoice due Friday"
//! todo context history --search invoice
//!
//! # Overview
//! todo dashboard
//! ```
//!
//! ## Configuration
//!
//! The backend URL defaults to `http://127.0.0.1:8000`. Override it in
//! `~/.smarttodo/config.json`, with `SMARTTODO_BASE_URL`, or with `--base-url`.
//! A CSRF token, when the backend wants one, comes from the config file or
//! `SMARTTODO_CSRF_TOKEN`. Set `RUST_LOG` or pass `-v` for request logs.

use clap::Parser;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub mod api;
pub mod category;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod context;
pub mod dashboard;
pub mod dates;
pub mod display;
pub mod error;
pub mod fields;
#[cfg(test)]
pub mod memory;
pub mod store;
pub mod suggestion;
pub mod task;
pub mod workflow;

use api::ApiClient;
use cli::Cli;
use cmd::*;
use config::Config;

/// Stderr subscriber. `RUST_LOG` wins over `-v`.
fn log_subscriber(verbose: bool) -> impl tracing::Subscriber + Send + Sync + 'static {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish()
}

fn main() {
    let cli = Cli::parse();
    log_subscriber(cli.verbose).init();

    // Completions need no backend.
    if let Commands::Completions { shell } = &cli.command {
        cmd_completions(*shell);
        return;
    }

    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    config.apply_flags(cli.base_url, cli.page_size);

    let client = ApiClient::new(&config);
    tracing::debug!(base_url = client.base_url(), "using backend");

    match cli.command {
        Commands::Add { title, desc, priority, deadline, categories } =>
            cmd_add(&client, title, desc, priority, deadline, categories),

        Commands::Edit { id, title, desc, priority, deadline, clear_deadline,
                         categories, clear_categories } =>
            cmd_edit(&client, &config, id, title, desc, priority, deadline,
                     clear_deadline, categories, clear_categories),

        Commands::List { status, sort, limit } => cmd_list(&client, &config, status, sort, limit),

        Commands::View { id } => cmd_view(&client, &config, id),

        Commands::Delete { id } => cmd_delete(&client, id),

        Commands::Suggest { task, context, priority, deadline } =>
            cmd_suggest(&client, task, context, priority, deadline),

        Commands::Categories { action } => cmd_categories(&client, action),

        Commands::Context { action } => cmd_context(&client, &config, action),

        Commands::Dashboard => cmd_dashboard(&client, &config),

        Commands::Completions { .. } => unreachable!("completions handled above"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_subscriber_records_debug_events() {
        tracing::subscriber::with_default(log_subscriber(true), || {
            tracing::debug!(id = 1, "task created");
            assert!(tracing::enabled!(tracing::Level::WARN));
        });
    }
}
