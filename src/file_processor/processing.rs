//! The per-document pipeline: load, validate, format, compare, write.

use std::time::Instant;

use crate::config::FormatConfig;
use crate::document::{FileStatus, FormatError, FormatResult, LineChange, MarkdownFile};
use crate::utils::line_ending::LineEnding;
use crate::writer::write_atomic;

/// Formats one document and reports the outcome.
///
/// Never fails: every error is recorded on the returned result so the batch
/// can carry on with the next document.
pub fn format_file(mut file: MarkdownFile, config: &FormatConfig) -> FormatResult {
    let start = Instant::now();

    if config.excludes_document(&file.rel_path) {
        log::debug!("{} is excluded", file.rel_path);
        return FormatResult::new(file, FileStatus::Excluded, start.elapsed());
    }

    let (source, output) = match run_pipeline(&mut file, config) {
        Ok(formatted) => formatted,
        Err(err) => {
            log::debug!("{}: {err}", file.rel_path);
            if let FormatError::Parse(parse_error) = &err {
                file.parse_errors.push(parse_error.clone());
            }
            return FormatResult::failed(file, err, start.elapsed());
        }
    };

    if output.content == source {
        log::debug!("{} is already formatted", file.rel_path);
        return FormatResult::new(file, FileStatus::Unchanged, start.elapsed());
    }

    if output.source_line_ending != LineEnding::Lf {
        log::debug!(
            "{}: {} line endings normalised to lf",
            file.rel_path,
            output.source_line_ending.as_str()
        );
    }
    let line_changes = LineChange::between(&source, &output.content, &output.rules_applied);
    let status = if config.dry_run {
        FileStatus::Skipped
    } else {
        match write_atomic(&file.path, output.content.as_bytes()) {
            Ok(()) => FileStatus::Modified,
            Err(err) => {
                log::debug!("{}: {err}", file.rel_path);
                return FormatResult::failed(file, err.into(), start.elapsed());
            }
        }
    };
    log::debug!("{} {status} ({} line changes)", file.rel_path, line_changes.len());

    file.set_formatted(output.content);
    FormatResult {
        rules_applied: output.rules_applied,
        line_changes,
        ..FormatResult::new(file, status, start.elapsed())
    }
}

/// Load and format stages. Returns the source text alongside the output.
fn run_pipeline(
    file: &mut MarkdownFile,
    config: &FormatConfig,
) -> Result<(String, crate::FormattedOutput), FormatError> {
    let bytes = file.load()?;
    let source = std::str::from_utf8(bytes)
        .map_err(|err| FormatError::InvalidEncoding {
            valid_up_to: err.valid_up_to(),
        })?
        .to_string();
    let output = crate::format_markdown(&source, config.standard)?;
    Ok((source, output))
}
