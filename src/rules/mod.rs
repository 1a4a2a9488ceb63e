mod code_fence_style;
mod emphasis_style;
mod heading_style;
mod hr_style;
mod list_style;
mod table_format;
mod whitespace;

pub use code_fence_style::CodeFenceStyle;
pub use emphasis_style::EmphasisStyle;
pub use heading_style::HeadingAtxStyle;
pub use hr_style::HorizontalRuleStyle;
pub use list_style::ListFormatting;
pub use table_format::TableFormatting;
pub use whitespace::WhitespaceNormalization;

use crate::ast::MarkdownAst;
use crate::parser::ParseContext;
use crate::rule::{AppliedRule, FormatRule};

/// The standard rule set, in the order it is applied.
pub fn all_rules() -> Vec<Box<dyn FormatRule>> {
    vec![
        Box::new(CodeFenceStyle),
        Box::new(HeadingAtxStyle),
        Box::new(ListFormatting),
        Box::new(TableFormatting),
        Box::new(EmphasisStyle),
        Box::new(WhitespaceNormalization),
        Box::new(HorizontalRuleStyle),
    ]
}

/// Runs `rules` in order and keeps the ones that covered at least one node.
pub fn apply_rules(
    rules: &[Box<dyn FormatRule>],
    ast: &mut MarkdownAst,
    ctx: &mut ParseContext,
    source: &str,
) -> Vec<AppliedRule> {
    rules
        .iter()
        .filter_map(|rule| {
            let fix_count = rule.apply(ast, ctx, source);
            log::trace!("rule {} covered {fix_count} nodes", rule.name());
            (fix_count > 0).then(|| rule.applied(fix_count))
        })
        .collect()
}
