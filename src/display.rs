//! Plain-text rendering of tasks, categories, suggestions, context entries
//! and the dashboard.

use chrono::{DateTime, Utc};

use crate::category::Category;
use crate::context::ContextEntry;
use crate::dashboard::{is_high_priority, DashboardSummary};
use crate::dates::{format_deadline_relative, format_timestamp};
use crate::fields::{Priority, SourceType, Status};
use crate::suggestion::SuggestionResult;
use crate::task::Task;

/// Format a task status for display.
pub fn format_status(s: Status) -> &'static str {
    match s {
        Status::Todo => "To Do",
        Status::InProgress => "In Progress",
        Status::Done => "Done",
    }
}

pub fn format_priority(p: Priority) -> &'static str {
    match p {
        Priority::Low => "low",
        Priority::Medium => "medium",
        Priority::High => "high",
    }
}

pub fn format_source(s: SourceType) -> &'static str {
    match s {
        SourceType::Note => "Note",
        SourceType::Email => "Email",
        SourceType::Whatsapp => "WhatsApp",
        SourceType::Unknown => "Unknown Source",
    }
}

/// Scores print without a fraction when they have none.
pub fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{score:.0}")
    } else {
        format!("{score:.1}")
    }
}

pub fn format_categories(task: &Task) -> String {
    if task.categories.is_empty() {
        "-".into()
    } else {
        task.categories.iter().map(|c| c.name.as_str()).collect::<Vec<_>>().join(", ")
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

/// Print tasks as a table.
pub fn print_task_table(tasks: &[Task], now: DateTime<Utc>) {
    if tasks.is_empty() {
        println!("No tasks.");
        return;
    }
    println!(
        "{:<5} {:<12} {:<6} {:<10} {:<20} {}",
        "ID", "Status", "Pri", "Due", "Categories", "Title"
    );
    for t in tasks {
        let flag = if is_high_priority(t) { "!" } else { "" };
        println!(
            "{:<5} {:<12} {:<6} {:<10} {:<20} {}{}",
            t.id,
            format_status(t.status),
            format_score(t.priority_score),
            format_deadline_relative(t.deadline, now),
            truncate(&format_categories(t), 20),
            t.title,
            flag
        );
    }
}

/// Print every field of one task.
pub fn print_task(task: &Task, now: DateTime<Utc>) {
    println!("ID:           {}", task.id);
    println!("Title:        {}", task.title);
    println!("Status:       {}", format_status(task.status));
    match Priority::from_score(task.priority_score) {
        Some(level) => println!("Priority:     {} ({})", format_score(task.priority_score), format_priority(level)),
        None => println!("Priority:     {}", format_score(task.priority_score)),
    }
    println!(
        "Deadline:     {}",
        match task.deadline {
            Some(d) => format!("{} ({})", format_timestamp(Some(d)), format_deadline_relative(Some(d), now)),
            None => "-".into(),
        }
    );
    println!("Categories:   {}", format_categories(task));
    println!("Description:\n{}\n", if task.description.is_empty() { "-" } else { task.description.as_str() });
}

pub fn print_suggestion(s: &SuggestionResult) {
    if s.is_empty() && s.tags().is_empty() && s.rationale().is_none() {
        println!("AI suggestions: none");
        return;
    }
    println!("AI suggestions:");
    if let Some(score) = s.priority_score() {
        println!("  Priority score:  {}", format_score(score));
    }
    let deadlines = s.deadlines();
    if !deadlines.is_empty() {
        println!("  Deadlines:");
        for d in deadlines {
            println!("    - {}", format_timestamp(Some(d)));
        }
    }
    if let Some(desc) = s.improved_description() {
        println!("  Description:     {desc}");
    }
    let names = s.category_names();
    if !names.is_empty() {
        println!("  Categories:      {}", names.join(", "));
    }
    let tags = s.tags();
    if !tags.is_empty() {
        println!("  Tags:            {}", tags.join(", "));
    }
    if let Some(why) = s.rationale() {
        println!("  Rationale:       {why}");
    }
}

pub fn print_categories(categories: &[Category]) {
    if categories.is_empty() {
        println!("No categories.");
        return;
    }
    println!("{:<5} {:<24} {}", "ID", "Name", "Used");
    for c in categories {
        let used = c.usage_count.map(|n| n.to_string()).unwrap_or_else(|| "-".into());
        println!("{:<5} {:<24} {}", c.id, truncate(&c.name, 24), used);
    }
}

pub fn print_context_entries(entries: &[&ContextEntry]) {
    if entries.is_empty() {
        println!("No context entries found.");
        return;
    }
    for e in entries {
        println!("[{}] {} (#{})", format_source(e.source_type), format_timestamp(e.created_at), e.id);
        let content = e.content_text();
        println!("  {}", if content.is_empty() { "No content available" } else { content.as_str() });
        if let Some(insights) = e.insights_text() {
            println!("  Insight: {insights}");
        }
    }
}

pub fn print_dashboard(s: &DashboardSummary, now: DateTime<Utc>) {
    println!("Total tasks:        {}", s.total);
    println!("Completed:          {}", s.completed);
    println!("Pending:            {}", s.pending);
    println!("Upcoming (7 days):  {}", s.upcoming.len());
    println!("Categories:         {}", s.category_count);
    println!();

    if let Some(top) = s.top_task() {
        println!("Highest priority: {} (score {})", top.title, format_score(top.priority_score));
        if let Some(d) = top.deadline {
            println!("  Due {}", format_timestamp(Some(d)));
        }
        println!();
    }

    if !s.upcoming.is_empty() {
        println!("Upcoming deadlines:");
        for t in &s.upcoming {
            println!("  {:<10} {}", format_deadline_relative(t.deadline, now), t.title);
        }
        println!();
    }

    println!("Tasks by priority:");
    print_task_table(&s.ranked, now);
    println!();

    println!("Recent context:");
    let recent: Vec<&ContextEntry> = s.recent_context.iter().collect();
    print_context_entries(&recent);
}
