pub mod ast;
pub mod config;
pub mod document;
pub mod exit_codes;
pub mod file_processor;
pub mod parallel;
pub mod parser;
pub mod renderer;
pub mod rule;
pub mod rules;
pub mod utils;
pub mod writer;

pub use config::{FormatConfig, Standard};
pub use document::{FileStatus, FormatError, FormatResult, LineChange, MarkdownFile, RunReport};
pub use file_processor::{find_markdown_files, format_file};
pub use parallel::BatchProcessor;

use crate::parser::{MarkdownParser, ParseError};
use crate::renderer::MarkdownRenderer;
use crate::rule::AppliedRule;
use crate::utils::line_ending::{LineEnding, normalize_whitespace};

/// Canonical text for one document, with the rules that fired producing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedOutput {
    pub content: String,
    pub rules_applied: Vec<AppliedRule>,
    /// Rendering failed and `content` is the untouched source
    pub fell_back: bool,
    /// Line endings of the source; the output always uses `\n`
    pub source_line_ending: LineEnding,
}

/// Formats an in-memory document against the default standard.
pub fn format_source(source: &str) -> Result<FormattedOutput, ParseError> {
    format_markdown(source, Standard::default())
}

/// Parse, rewrite, render and normalise `source`.
///
/// A renderer failure is not an error: the source comes back unchanged with
/// no applied rules.
pub fn format_markdown(source: &str, standard: Standard) -> Result<FormattedOutput, ParseError> {
    let parser = MarkdownParser::new(standard.extensions());
    let (mut ast, mut ctx) = parser.parse(source)?;
    log::trace!("parsed {} top-level blocks", ast.blocks.len());

    let rules_applied = rules::apply_rules(&rules::all_rules(), &mut ast, &mut ctx, source);

    match MarkdownRenderer::new().render(&ast) {
        Ok(rendered) => Ok(FormattedOutput {
            content: normalize_whitespace(&rendered),
            rules_applied,
            fell_back: false,
            source_line_ending: ctx.line_ending,
        }),
        Err(err) => {
            log::warn!("Rendering failed, keeping original content: {err}");
            Ok(FormattedOutput {
                content: source.to_string(),
                rules_applied: Vec::new(),
                fell_back: true,
                source_line_ending: ctx.line_ending,
            })
        }
    }
}
