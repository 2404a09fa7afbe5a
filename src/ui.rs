use colored::Colorize;
use nodecfg::engine::ExecuteReport;
use nodecfg::statemap::{ApplyResult, ApplySummary, DeclaredState};

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.len()).dimmed());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

pub fn symbol(result: &ApplyResult) -> String {
    match result {
        ApplyResult::NoChange => "○".dimmed().to_string(),
        ApplyResult::Created => "+".green().to_string(),
        ApplyResult::Modified => "~".yellow().to_string(),
        ApplyResult::Removed => "-".red().to_string(),
        ApplyResult::Failed { .. } => "✗".red().to_string(),
    }
}

pub fn describe(result: &ApplyResult) -> String {
    match result {
        ApplyResult::NoChange => "unchanged".to_string(),
        ApplyResult::Created => "created".to_string(),
        ApplyResult::Modified => "updated".to_string(),
        ApplyResult::Removed => "removed".to_string(),
        ApplyResult::Failed { error } => format!("failed: {error}"),
    }
}

/// One line per changed or failed resource, then the totals
pub fn print_report(report: &ExecuteReport) {
    let shown = report
        .outcomes
        .iter()
        .filter(|o| o.result.is_change() || !o.result.is_success());
    for outcome in shown {
        println!(
            "  {} {} {}",
            symbol(&outcome.result),
            outcome.label,
            describe(&outcome.result).dimmed()
        );
    }
    print_summary(&report.summary);
}

pub fn print_summary(summary: &ApplySummary) {
    println!();
    let line = summary_line(summary);
    if summary.is_success() {
        success(&line);
    } else {
        error(&line);
    }
}

fn summary_line(summary: &ApplySummary) -> String {
    if summary.total_changes() == 0 && summary.failed == 0 {
        return format!("No changes ({} unchanged)", summary.no_change);
    }
    format!(
        "{} changes: {} created, {} updated, {} removed, {} unchanged, {} failed",
        summary.total_changes(),
        summary.created,
        summary.modified,
        summary.removed,
        summary.no_change,
        summary.failed
    )
}

/// Line diff of two states rendered as JSON
///
/// Returns false when they are identical.
pub fn show_state_diff(before: &DeclaredState, after: &DeclaredState) -> bool {
    let text_a = render(before);
    let text_b = render(after);

    let diff = similar::TextDiff::from_lines(&text_a, &text_b);
    let mut has_changes = false;

    for change in diff.iter_all_changes() {
        match change.tag() {
            similar::ChangeTag::Delete => {
                has_changes = true;
                print!("    {}", format!("- {change}").red());
            }
            similar::ChangeTag::Insert => {
                has_changes = true;
                print!("    {}", format!("+ {change}").green());
            }
            similar::ChangeTag::Equal => {}
        }
    }

    if !has_changes {
        println!("    {}", "(no drift)".dimmed());
    }
    has_changes
}

fn render(state: &DeclaredState) -> String {
    let mut text = serde_json::to_string_pretty(state).unwrap_or_default();
    text.push('\n');
    text
}
