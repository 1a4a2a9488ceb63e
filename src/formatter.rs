//! Output formatting and display utilities

use colored::*;
use mdtidy_lib::document::{FileStatus, FormatResult, RunReport};
use similar::TextDiff;

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}

fn status_label(status: FileStatus, dry_run: bool) -> ColoredString {
    match status {
        FileStatus::Modified => "formatted".green(),
        FileStatus::Skipped if dry_run => "would format".yellow(),
        FileStatus::Skipped => "skipped".yellow(),
        FileStatus::Unchanged => "unchanged".normal(),
        FileStatus::Excluded => "excluded".dimmed(),
        FileStatus::Error => "error".red().bold(),
    }
}

fn print_file(result: &FormatResult, dry_run: bool) {
    println!("{} {}", status_label(result.status, dry_run), result.file.rel_path.bold());
    for rule in &result.rules_applied {
        println!("    {} {} ({})", rule.name.cyan(), rule.description, rule.fix_count);
    }
}

/// Print the run summary. Verbose mode lists every file and the per-category counts.
pub fn print_report(report: &RunReport, verbose: bool, dry_run: bool) {
    if verbose {
        for result in &report.results {
            print_file(result, dry_run);
        }
    }

    for error in &report.errors {
        eprintln!("{} {}: {}", "Error:".red().bold(), error.path.bold(), error.message);
    }

    if verbose && !report.rule_stats.is_empty() {
        println!("\n{}", "Fixes by category:".bold().underline());
        for (category, count) in &report.rule_stats {
            println!("  {:<16} {count}", category.as_str());
        }
    }

    let duration_ms = report.duration.as_millis();
    let changed = report.files_modified + report.files_skipped;
    if report.has_errors() {
        println!(
            "\n{} {} of {} {} failed, {} {} ({}ms)",
            "Errors:".red().bold(),
            report.files_errored,
            report.total_files,
            plural(report.total_files),
            changed,
            if dry_run { "would change" } else { "formatted" },
            duration_ms
        );
    } else if changed > 0 {
        let verb = if dry_run { "Would format" } else { "Formatted" };
        println!(
            "\n{} {verb} {changed}/{} {} with {} fixes ({duration_ms}ms)",
            "Done:".green().bold(),
            report.total_files,
            plural(report.total_files),
            report.total_fixes_applied,
        );
    } else {
        println!(
            "\n{} {} {} already formatted ({duration_ms}ms)",
            "Success:".green().bold(),
            report.total_files,
            plural(report.total_files),
        );
    }
}

/// Print the whole report as JSON.
pub fn print_json(report: &RunReport) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Generate a unified diff between original and formatted content
pub fn generate_diff(original: &str, formatted: &str, file_path: &str) -> String {
    TextDiff::from_lines(original, formatted)
        .unified_diff()
        .context_radius(3)
        .header(file_path, &format!("{file_path} (formatted)"))
        .to_string()
}

/// Print unified diffs for every changed file.
pub fn print_diffs(report: &RunReport) {
    for result in report.results.iter().filter(|result| result.status.is_change()) {
        let (Some(original), Some(formatted)) = (result.file.content(), result.file.formatted_content()) else {
            continue;
        };
        let original = String::from_utf8_lossy(original);
        for line in generate_diff(&original, formatted, &result.file.rel_path).lines() {
            let line = if line.starts_with("+++") || line.starts_with("---") {
                line.bold()
            } else if line.starts_with('+') {
                line.green()
            } else if line.starts_with('-') {
                line.red()
            } else if line.starts_with("@@") {
                line.cyan()
            } else {
                line.normal()
            };
            println!("{line}");
        }
    }
}
