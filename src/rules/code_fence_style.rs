use crate::ast::{Block, CodeBlockKind, MarkdownAst};
use crate::parser::ParseContext;
use crate::rule::{FormatRule, RuleCategory};

/// Every code block is written with backtick fences; indented blocks are
/// converted, their content is never touched.
#[derive(Debug, Clone, Default)]
pub struct CodeFenceStyle;

impl FormatRule for CodeFenceStyle {
    fn name(&self) -> &'static str {
        "code-fence-style"
    }

    fn description(&self) -> &'static str {
        "Use fenced code blocks with backticks"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Code
    }

    fn apply(&self, ast: &mut MarkdownAst, _ctx: &mut ParseContext, _source: &str) -> usize {
        let mut count = 0;
        ast.walk_mut(&mut |block| {
            if let Block::CodeBlock(code) = block {
                if code.kind == CodeBlockKind::Indented {
                    code.kind = CodeBlockKind::Fenced { info: String::new() };
                }
                count += 1;
            }
        });
        count
    }
}
