//! Command implementations for the CLI interface.
//!
//! Each handler binds one subcommand to the backend: build the request from
//! the arguments, call the store or workflow, print the result. Failures that
//! the user must see are printed to stderr and end the process with a
//! non-zero status; best-effort failures are printed as warnings.

use chrono::Utc;
use clap::{CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use crate::api::ApiClient;
use crate::category::{find_category, reconcile_categories, Category};
use crate::cli::Cli;
use crate::config::Config;
use crate::context::{search_entries, NewContextEntry};
use crate::dashboard::{rank_by_priority, summarise, RECENT_CONTEXT_LIMIT};
use crate::dates::parse_deadline_input;
use crate::display::*;
use crate::error::ApiError;
use crate::fields::*;
use crate::store::*;
use crate::suggestion::{SuggestionPriority, SuggestionRequest};
use crate::task::{Task, TaskForm};
use crate::workflow::{Enrichment, TaskEnrichmentWorkflow};

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new task and enrich it with AI suggestions.
    Add {
        /// Short title for the task.
        title: String,
        /// Task description (required).
        #[arg(long)]
        desc: String,
        /// Priority: low | medium | high.
        #[arg(long, value_enum, default_value_t = Priority::Medium)]
        priority: Priority,
        /// Deadline: YYYY-MM-DD, YYYY-MM-DDTHH:MM, "today", "tomorrow", "in Nd".
        #[arg(long, default_value = "")]
        deadline: String,
        /// Existing category ID or name. May be repeated.
        #[arg(long = "category")]
        categories: Vec<String>,
    },

    /// Edit an existing task. Edits are saved as-is, without AI enrichment.
    Edit {
        /// Task ID.
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        #[arg(long)]
        deadline: Option<String>,
        /// Clear the deadline.
        #[arg(long, conflicts_with = "deadline")]
        clear_deadline: bool,
        /// Replace the categories with these IDs or names. May be repeated.
        #[arg(long = "category")]
        categories: Vec<String>,
        /// Remove all categories.
        #[arg(long, conflicts_with = "categories")]
        clear_categories: bool,
    },

    /// List tasks.
    List {
        /// Filter by status.
        #[arg(long, value_enum)]
        status: Option<Status>,
        /// Sort key.
        #[arg(long, value_enum, default_value_t = SortKey::Server)]
        sort: SortKey,
        /// Limit number of rows printed.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// View a single task.
    View {
        /// Task ID.
        id: u64,
    },

    /// Delete a task.
    Delete {
        /// Task ID.
        id: u64,
    },

    /// Ask the suggestion service about arbitrary text without saving anything.
    Suggest {
        /// Task title.
        task: String,
        /// Context passed to the service (defaults to the title).
        #[arg(long)]
        context: Option<String>,
        #[arg(long, value_enum, default_value_t = Priority::Medium)]
        priority: Priority,
        /// Deadline sent with the request (defaults to now).
        #[arg(long)]
        deadline: Option<String>,
    },

    /// Manage categories.
    Categories {
        #[command(subcommand)]
        action: CategoryAction,
    },

    /// Record and browse context entries.
    Context {
        #[command(subcommand)]
        action: ContextAction,
    },

    /// Summary of tasks, deadlines and recent context.
    Dashboard,

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum CategoryAction {
    /// List all categories.
    List,
    /// Create a category unless one with the same name (any case) exists.
    Add {
        name: String,
    },
}

#[derive(Subcommand)]
pub enum ContextAction {
    /// Save a context entry and show AI suggestions for it.
    Add {
        /// Message, note or email text.
        content: String,
        /// Source: note | email | whatsapp.
        #[arg(long, value_enum, default_value_t = SourceType::Note)]
        source: SourceType,
    },
    /// Show recent context entries, optionally filtered.
    History {
        /// Case-insensitive text to search for.
        #[arg(long, default_value = "")]
        search: String,
        /// Number of entries to fetch.
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn fail(context: &str, err: &ApiError) -> ! {
    eprintln!("{context}: {err}");
    std::process::exit(1);
}

/// Resolve a category identifier (either ID or name) to a category ID.
pub fn resolve_category_identifier(identifier: &str, categories: &[Category]) -> Result<u64, String> {
    if let Ok(id) = identifier.trim().parse::<u64>() {
        return if categories.iter().any(|c| c.id == id) {
            Ok(id)
        } else {
            Err(format!("Category with ID {id} not found"))
        };
    }
    find_category(categories, identifier)
        .map(|c| c.id)
        .ok_or_else(|| format!("No category named '{}'. Create it with `todo categories add`.", identifier.trim()))
}

fn resolve_categories(client: &ApiClient, identifiers: &[String]) -> Vec<u64> {
    if identifiers.is_empty() {
        return Vec::new();
    }
    let categories = client
        .list_categories()
        .unwrap_or_else(|e| fail("Failed to load categories", &e));
    identifiers
        .iter()
        .map(|ident| {
            resolve_category_identifier(ident, &categories).unwrap_or_else(|msg| {
                eprintln!("{msg}");
                std::process::exit(1);
            })
        })
        .collect()
}

fn find_task(client: &ApiClient, config: &Config, id: u64) -> Task {
    let tasks = client
        .list_tasks(config.page_size)
        .unwrap_or_else(|e| fail("Failed to load tasks", &e));
    match tasks.into_iter().find(|t| t.id == id) {
        Some(t) => t,
        None => {
            eprintln!("Task {id} not found.");
            std::process::exit(1);
        }
    }
}

/// Create a task, then enrich it.
pub fn cmd_add(
    client: &ApiClient,
    title: String,
    desc: String,
    priority: Priority,
    deadline: String,
    categories: Vec<String>,
) {
    let form = TaskForm {
        title,
        description: desc,
        priority: Some(priority),
        deadline,
        category_ids: resolve_categories(client, &categories),
    };

    let workflow = TaskEnrichmentWorkflow::new(client, client, client);
    let submission = workflow
        .submit_task(&form, None)
        .unwrap_or_else(|e| fail("Failed to save task", &e));

    let now = Utc::now();
    println!("Added task {}", submission.persisted.id);
    if let Some(s) = submission.suggestion() {
        print_suggestion(s);
    }
    for c in submission.created_categories() {
        println!("Created category '{}' (#{})", c.name, c.id);
    }
    match &submission.enrichment {
        Enrichment::Applied { .. } => println!("Task updated with AI suggestions."),
        Enrichment::Failed { error, .. } => {
            eprintln!("Warning: AI enrichment failed, task kept as saved: {error}");
        }
        Enrichment::Unchanged { .. } | Enrichment::Skipped => {}
    }
    println!();
    print_task(submission.task(), now);
}

/// Update an existing task's fields.
pub fn cmd_edit(
    client: &ApiClient,
    config: &Config,
    id: u64,
    title: Option<String>,
    desc: Option<String>,
    priority: Option<Priority>,
    deadline: Option<String>,
    clear_deadline: bool,
    categories: Vec<String>,
    clear_categories: bool,
) {
    let current = find_task(client, config, id);
    let mut form = TaskForm::from_task(&current);
    if let Some(t) = title { form.title = t; }
    if let Some(d) = desc { form.description = d; }
    if priority.is_some() { form.priority = priority; }
    if let Some(d) = deadline { form.deadline = d; }
    if clear_deadline { form.deadline.clear(); }
    if clear_categories {
        form.category_ids.clear();
    } else if !categories.is_empty() {
        form.category_ids = resolve_categories(client, &categories);
    }

    let workflow = TaskEnrichmentWorkflow::new(client, client, client);
    let submission = workflow
        .submit_task(&form, Some(&current))
        .unwrap_or_else(|e| fail("Failed to save task", &e));
    println!("Updated task {}", submission.task().id);
}

/// List tasks with optional filtering and sorting.
pub fn cmd_list(client: &ApiClient, config: &Config, status: Option<Status>, sort: SortKey, limit: Option<usize>) {
    let mut tasks = client
        .list_tasks(config.page_size)
        .unwrap_or_else(|e| fail("Failed to load tasks", &e));

    if let Some(s) = status {
        tasks.retain(|t| t.status == s);
    }
    match sort {
        SortKey::Server => {}
        SortKey::Priority => rank_by_priority(&mut tasks),
        SortKey::Deadline => tasks.sort_by_key(|t| (t.deadline.is_none(), t.deadline, t.id)),
    }
    if let Some(n) = limit {
        tasks.truncate(n);
    }
    print_task_table(&tasks, Utc::now());
}

pub fn cmd_view(client: &ApiClient, config: &Config, id: u64) {
    let task = find_task(client, config, id);
    print_task(&task, Utc::now());
}

pub fn cmd_delete(client: &ApiClient, id: u64) {
    if let Err(e) = client.delete_task(id) {
        fail(&format!("Failed to delete task {id}"), &e);
    }
    println!("Deleted task {id}");
}

pub fn cmd_suggest(
    client: &ApiClient,
    task: String,
    context: Option<String>,
    priority: Priority,
    deadline: Option<String>,
) {
    let now = Utc::now();
    let deadline = match deadline {
        Some(raw) => parse_deadline_input(&raw, now).unwrap_or_else(|| {
            eprintln!("Unrecognised deadline. Use YYYY-MM-DD, 'today', 'tomorrow', or 'in Nd'.");
            std::process::exit(1);
        }),
        None => now,
    };
    let request = SuggestionRequest {
        context: context.unwrap_or_else(|| task.clone()),
        task,
        priority: SuggestionPriority::Score(priority.score()),
        deadline,
    };
    match client.suggest(&request) {
        Ok(s) => print_suggestion(&s),
        Err(e) => fail("Failed to get suggestions", &e),
    }
}

pub fn cmd_categories(client: &ApiClient, action: CategoryAction) {
    match action {
        CategoryAction::List => {
            let categories = client
                .list_categories()
                .unwrap_or_else(|e| fail("Failed to load categories", &e));
            print_categories(&categories);
        }
        CategoryAction::Add { name } => {
            if name.trim().is_empty() {
                eprintln!("Category name cannot be empty");
                std::process::exit(1);
            }
            let r = reconcile_categories(client, &[name.as_str()])
                .unwrap_or_else(|e| fail("Failed to load categories", &e));
            match (r.created.first(), r.ids.first()) {
                (Some(c), _) => println!("Created category '{}' (#{})", c.name, c.id),
                (None, Some(id)) => println!("Category '{}' already exists (#{id})", name.trim()),
                (None, None) => {
                    eprintln!("Failed to create category '{}'", name.trim());
                    std::process::exit(1);
                }
            }
        }
    }
}

pub fn cmd_context(client: &ApiClient, config: &Config, action: ContextAction) {
    match action {
        ContextAction::Add { content, source } => {
            if content.trim().is_empty() {
                eprintln!("Content cannot be empty");
                std::process::exit(1);
            }
            let entry = client
                .create_context(&NewContextEntry { source_type: source, content })
                .unwrap_or_else(|e| fail("Failed to add context", &e));
            println!("Added context entry {}", entry.id);

            let now = Utc::now();
            let request = SuggestionRequest {
                task: "New context added".into(),
                priority: SuggestionPriority::Label("medium".into()),
                deadline: now,
                context: entry.content_text(),
            };
            match client.suggest(&request) {
                Ok(s) => print_suggestion(&s),
                Err(e) => {
                    tracing::warn!(id = entry.id, error = %e, "suggestions for context entry failed");
                    eprintln!("Warning: could not get AI suggestions: {e}");
                }
            }
        }
        ContextAction::History { search, limit } => {
            let entries = client
                .list_context(limit.unwrap_or(config.page_size))
                .unwrap_or_else(|e| fail("Failed to load context entries", &e));
            let hits = search_entries(&entries, &search);
            print_context_entries(&hits);
        }
    }
}

pub fn cmd_dashboard(client: &ApiClient, config: &Config) {
    let tasks = client
        .list_tasks(config.page_size)
        .unwrap_or_else(|e| fail("Failed to load tasks", &e));
    let categories = client
        .list_categories()
        .unwrap_or_else(|e| fail("Failed to load categories", &e));
    let context = client
        .list_context(RECENT_CONTEXT_LIMIT)
        .unwrap_or_else(|e| fail("Failed to load context entries", &e));

    let now = Utc::now();
    let summary = summarise(tasks, &categories, context, now);
    print_dashboard(&summary, now);
}

pub fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cats() -> Vec<Category> {
        vec![
            Category { id: 1, name: "Groceries".into(), slug: None, usage_count: None },
            Category { id: 2, name: "Work".into(), slug: None, usage_count: None },
        ]
    }

    #[test]
    fn test_resolve_category_by_id_or_name() {
        assert_eq!(resolve_category_identifier("2", &cats()), Ok(2));
        assert_eq!(resolve_category_identifier("groceries", &cats()), Ok(1));
        assert!(resolve_category_identifier("7", &cats()).is_err());
        assert!(resolve_category_identifier("Errands", &cats()).is_err());
    }

    #[test]
    fn test_cli_parses_add() {
        use clap::Parser;
        let cli = Cli::try_parse_from([
            "todo", "add", "Buy milk", "--desc", "2% milk", "--priority", "high", "--category", "Groceries",
        ])
        .unwrap();
        match cli.command {
            Commands::Add { title, priority, deadline, categories, .. } => {
                assert_eq!(title, "Buy milk");
                assert_eq!(priority, Priority::High);
                assert_eq!(deadline, "");
                assert_eq!(categories, vec!["Groceries".to_string()]);
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_cli_rejects_conflicting_edit_flags() {
        use clap::Parser;
        let parsed = Cli::try_parse_from(["todo", "edit", "3", "--deadline", "today", "--clear-deadline"]);
        assert!(parsed.is_err());
    }
}
