use crate::ast::{Inline, MarkdownAst};
use crate::parser::ParseContext;
use crate::rule::{FormatRule, RuleCategory};

/// Emphasis renders as `*text*` and strong emphasis as `**text**`, whatever
/// delimiter the source used.
#[derive(Debug, Clone, Default)]
pub struct EmphasisStyle;

impl FormatRule for EmphasisStyle {
    fn name(&self) -> &'static str {
        "emphasis-style"
    }

    fn description(&self) -> &'static str {
        "Consistent emphasis markers"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Emphasis
    }

    fn apply(&self, ast: &mut MarkdownAst, _ctx: &mut ParseContext, _source: &str) -> usize {
        let mut count = 0;
        ast.walk_inlines(&mut |inline| {
            if matches!(inline, Inline::Emphasis(_) | Inline::Strong(_)) {
                count += 1;
            }
        });
        count
    }
}
