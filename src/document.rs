//! Documents, per-file results and the run report.

use serde::{Serialize, Serializer};
use similar::TextDiff;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::exit_codes;
use crate::parser::ParseError;
use crate::rule::{AppliedRule, RuleCategory};
use crate::writer::WriteError;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("root directory error: {}: {reason}", path.display())]
    RootDirectory { path: PathBuf, reason: String },

    #[error("failed to read file: {0}")]
    Read(#[source] io::Error),

    #[error("file contains invalid UTF-8 (first bad byte at offset {valid_up_to})")]
    InvalidEncoding { valid_up_to: usize },

    #[error("failed to parse markdown: {0}")]
    Parse(#[from] ParseError),

    #[error("failed to write file: {0}")]
    Write(#[from] WriteError),
}

/// A Markdown file selected for formatting.
///
/// Content is loaded lazily, at most once, and the formatted text is kept
/// once it has been produced.
#[derive(Debug, Clone, Serialize)]
pub struct MarkdownFile {
    pub path: PathBuf,
    /// Path relative to the scan root, `/`-separated
    pub rel_path: String,
    pub size: u64,
    #[serde(skip)]
    content: Option<Vec<u8>>,
    #[serde(skip)]
    formatted: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parse_errors: Vec<ParseError>,
}

impl MarkdownFile {
    pub fn new(path: PathBuf, rel_path: impl Into<String>, size: u64) -> Self {
        Self {
            path,
            rel_path: rel_path.into(),
            size,
            content: None,
            formatted: None,
            parse_errors: Vec::new(),
        }
    }

    /// A document whose bytes are already in memory; the file is never read.
    pub fn with_content(path: PathBuf, rel_path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        let content = content.into();
        let mut file = Self::new(path, rel_path, content.len() as u64);
        file.content = Some(content);
        file
    }

    pub fn content(&self) -> Option<&[u8]> {
        self.content.as_deref()
    }

    /// Reads the file on first use and returns the cached bytes afterwards.
    pub fn load(&mut self) -> Result<&[u8], FormatError> {
        let bytes = match self.content.take() {
            Some(bytes) => bytes,
            None => {
                let bytes = fs::read(&self.path).map_err(FormatError::Read)?;
                self.size = bytes.len() as u64;
                bytes
            }
        };
        Ok(self.content.insert(bytes).as_slice())
    }

    pub fn formatted_content(&self) -> Option<&str> {
        self.formatted.as_deref()
    }

    pub(crate) fn set_formatted(&mut self, formatted: String) {
        self.formatted = Some(formatted);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Unchanged,
    Modified,
    Excluded,
    /// Would have been modified, but this is a dry run
    Skipped,
    Error,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Unchanged => "unchanged",
            FileStatus::Modified => "modified",
            FileStatus::Excluded => "excluded",
            FileStatus::Skipped => "skipped",
            FileStatus::Error => "error",
        }
    }

    /// Whether the document's formatted text differs from its source.
    pub fn is_change(&self) -> bool {
        matches!(self, FileStatus::Modified | FileStatus::Skipped)
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineChange {
    pub line_number: usize,
    pub before: String,
    pub after: String,
    /// Applied rule covering the kind of line that changed, if one fired
    pub rule: Option<&'static str>,
}

impl LineChange {
    /// Line-level differences between two versions of a document. Lines are
    /// numbered from 1 in `before`; an insertion takes the number of the line
    /// it precedes. Each change names the rule from `rules` that covers the
    /// kind of line involved.
    pub fn between(before: &str, after: &str, rules: &[AppliedRule]) -> Vec<LineChange> {
        let diff = TextDiff::from_lines(before, after);
        let old_lines = diff.old_slices();
        let new_lines = diff.new_slices();

        let mut changes = Vec::new();
        for op in diff.ops() {
            let (tag, old, new) = op.as_tag_tuple();
            if tag == similar::DiffTag::Equal {
                continue;
            }
            for offset in 0..old.len().max(new.len()) {
                let line = |lines: &[&str], range: &std::ops::Range<usize>| {
                    (offset < range.len())
                        .then(|| lines[range.start + offset].trim_end_matches(['\n', '\r']).to_string())
                        .unwrap_or_default()
                };
                let before = line(old_lines, &old);
                let after = line(new_lines, &new);
                let category = line_category(&before, &after);
                changes.push(LineChange {
                    line_number: old.start + offset.min(old.len()) + 1,
                    rule: rules.iter().find(|rule| rule.category == category).map(|rule| rule.name),
                    before,
                    after,
                });
            }
        }
        changes
    }
}

/// Node kind a changed line belongs to, judged from its canonical form.
fn line_category(before: &str, after: &str) -> RuleCategory {
    let removed = after.trim().is_empty();
    let line = if removed { before } else { after };
    let line = line.trim_start_matches(|c: char| c == '>' || c.is_whitespace());
    let rule_of = |marker: char| line.len() >= 3 && line.chars().all(|c| c == marker || c == ' ');

    if line.starts_with("```") || line.starts_with("~~~") {
        RuleCategory::Code
    } else if line.starts_with('#') || rule_of('=') || (removed && rule_of('-')) {
        RuleCategory::Heading
    } else if rule_of('-') || rule_of('*') || rule_of('_') {
        RuleCategory::HorizontalRule
    } else if line.starts_with('|') {
        RuleCategory::Table
    } else if starts_list_item(line) {
        RuleCategory::List
    } else if line.contains(['*', '_']) {
        RuleCategory::Emphasis
    } else {
        RuleCategory::Whitespace
    }
}

fn starts_list_item(line: &str) -> bool {
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    let rest = &line[digits..];
    let after_marker = if digits > 0 {
        rest.strip_prefix(['.', ')'])
    } else {
        rest.strip_prefix(['-', '*', '+'])
    };
    after_marker.is_some_and(|rest| rest.is_empty() || rest.starts_with(' '))
}

fn serialize_error<S: Serializer>(error: &Option<FormatError>, serializer: S) -> Result<S::Ok, S::Error> {
    match error {
        Some(error) => serializer.serialize_some(&error.to_string()),
        None => serializer.serialize_none(),
    }
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64() * 1000.0)
}

/// Outcome of formatting one document.
#[derive(Debug, Serialize)]
pub struct FormatResult {
    pub file: MarkdownFile,
    pub status: FileStatus,
    pub rules_applied: Vec<AppliedRule>,
    pub line_changes: Vec<LineChange>,
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<FormatError>,
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
}

impl FormatResult {
    pub fn new(file: MarkdownFile, status: FileStatus, duration: Duration) -> Self {
        Self {
            file,
            status,
            rules_applied: Vec::new(),
            line_changes: Vec::new(),
            error: None,
            duration,
        }
    }

    pub fn failed(file: MarkdownFile, error: FormatError, duration: Duration) -> Self {
        Self {
            error: Some(error),
            ..Self::new(file, FileStatus::Error, duration)
        }
    }

    pub fn fix_count(&self) -> usize {
        self.rules_applied.iter().map(|rule| rule.fix_count).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportedError {
    pub path: String,
    pub message: String,
}

/// Aggregate outcome of a batch run.
#[derive(Debug, Default, Serialize)]
pub struct RunReport {
    pub total_files: usize,
    pub files_modified: usize,
    pub files_unchanged: usize,
    pub files_excluded: usize,
    pub files_skipped: usize,
    pub files_errored: usize,
    pub total_fixes_applied: usize,
    pub rule_stats: BTreeMap<RuleCategory, usize>,
    pub results: Vec<FormatResult>,
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
    pub errors: Vec<ReportedError>,
}

impl RunReport {
    pub fn record(&mut self, result: FormatResult) {
        self.total_files += 1;
        match result.status {
            FileStatus::Unchanged => self.files_unchanged += 1,
            FileStatus::Modified => self.files_modified += 1,
            FileStatus::Excluded => self.files_excluded += 1,
            FileStatus::Skipped => self.files_skipped += 1,
            FileStatus::Error => self.files_errored += 1,
        }

        if result.status.is_change() {
            for rule in &result.rules_applied {
                self.total_fixes_applied += rule.fix_count;
                *self.rule_stats.entry(rule.category).or_default() += rule.fix_count;
            }
        }

        if let Some(error) = &result.error {
            self.errors.push(ReportedError {
                path: result.file.rel_path.clone(),
                message: error.to_string(),
            });
        }

        self.results.push(result);
    }

    /// Orders results by relative path and stamps the wall-clock time.
    pub fn finish(&mut self, duration: Duration) {
        self.results.sort_by(|a, b| a.file.rel_path.cmp(&b.file.rel_path));
        self.errors.sort_by(|a, b| a.path.cmp(&b.path));
        self.duration = duration;
    }

    pub fn has_errors(&self) -> bool {
        self.files_errored > 0
    }

    pub fn exit_code(&self) -> i32 {
        if self.has_errors() {
            exit_codes::FILES_FAILED
        } else {
            exit_codes::SUCCESS
        }
    }
}
