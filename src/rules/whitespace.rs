use crate::ast::MarkdownAst;
use crate::parser::ParseContext;
use crate::rule::{FormatRule, RuleCategory};

/// Stands for the whitespace pass that runs on the rendered text, so it
/// covers every document exactly once.
#[derive(Debug, Clone, Default)]
pub struct WhitespaceNormalization;

impl FormatRule for WhitespaceNormalization {
    fn name(&self) -> &'static str {
        "whitespace-normalization"
    }

    fn description(&self) -> &'static str {
        "Remove trailing whitespace and normalize line endings"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Whitespace
    }

    fn apply(&self, _ast: &mut MarkdownAst, _ctx: &mut ParseContext, _source: &str) -> usize {
        1
    }
}
