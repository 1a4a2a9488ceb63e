use crate::ast::{Block, MarkdownAst};
use crate::parser::ParseContext;
use crate::rule::{FormatRule, RuleCategory};

/// Thematic breaks render as `---`.
#[derive(Debug, Clone, Default)]
pub struct HorizontalRuleStyle;

impl FormatRule for HorizontalRuleStyle {
    fn name(&self) -> &'static str {
        "horizontal-rule-style"
    }

    fn description(&self) -> &'static str {
        "Use triple dash for horizontal rules"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::HorizontalRule
    }

    fn apply(&self, ast: &mut MarkdownAst, _ctx: &mut ParseContext, _source: &str) -> usize {
        let mut count = 0;
        ast.walk(&mut |block| {
            if matches!(block, Block::ThematicBreak) {
                count += 1;
            }
        });
        count
    }
}
