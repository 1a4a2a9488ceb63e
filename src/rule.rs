//! The FormatRule trait and the bookkeeping types the rule engine reports:
//! rule categories and per-rule fix counts.

use serde::Serialize;
use std::fmt;

use crate::ast::MarkdownAst;
use crate::parser::ParseContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleCategory {
    Heading,
    List,
    Code,
    Table,
    Emphasis,
    Whitespace,
    HorizontalRule,
}

impl RuleCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleCategory::Heading => "heading",
            RuleCategory::List => "list",
            RuleCategory::Code => "code",
            RuleCategory::Table => "table",
            RuleCategory::Emphasis => "emphasis",
            RuleCategory::Whitespace => "whitespace",
            RuleCategory::HorizontalRule => "horizontal-rule",
        }
    }
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rule's contribution to a formatted document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedRule {
    pub name: &'static str,
    pub description: &'static str,
    pub category: RuleCategory,
    pub fix_count: usize,
}

pub trait FormatRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn category(&self) -> RuleCategory;

    /// Brings the tree into this rule's canonical shape and returns how many
    /// nodes the rule covers. Rules whose style is fully expressed by the
    /// renderer only count. A rule never touches node kinds that an earlier
    /// rule in the standard order has already counted.
    fn apply(&self, ast: &mut MarkdownAst, ctx: &mut ParseContext, source: &str) -> usize;

    fn applied(&self, fix_count: usize) -> AppliedRule {
        AppliedRule {
            name: self.name(),
            description: self.description(),
            category: self.category(),
            fix_count,
        }
    }
}
