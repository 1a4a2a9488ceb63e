use crate::ast::{Alignment, Block, MarkdownAst, Table};
use crate::parser::ParseContext;
use crate::rule::{FormatRule, RuleCategory};

/// Gives every row the header's column count so the renderer can align the
/// pipes. Missing cells are added empty; cells past the header are dropped,
/// as GFM never displays them.
#[derive(Debug, Clone, Default)]
pub struct TableFormatting;

impl TableFormatting {
    fn normalize(table: &mut Table) {
        let columns = table.header.len();
        table.alignments.resize(columns, Alignment::None);
        for row in &mut table.rows {
            row.resize_with(columns, Vec::new);
        }
    }
}

impl FormatRule for TableFormatting {
    fn name(&self) -> &'static str {
        "table-formatting"
    }

    fn description(&self) -> &'static str {
        "Proper table alignment and spacing"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Table
    }

    fn apply(&self, ast: &mut MarkdownAst, _ctx: &mut ParseContext, _source: &str) -> usize {
        let mut count = 0;
        ast.walk_mut(&mut |block| {
            if let Block::Table(table) = block {
                Self::normalize(table);
                count += 1;
            }
        });
        count
    }
}
