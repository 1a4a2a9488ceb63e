use regex::Regex;
use std::sync::LazyLock;

use crate::ast::{Block, Heading, Inline, MarkdownAst, Paragraph, plain_text};
use crate::parser::{HeadingRegistry, ParseContext};
use crate::rule::{FormatRule, RuleCategory};

// Two to six hashes glued to the heading text
static ATX_NO_SPACE_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(#{2,6})([^#\s]|$)").unwrap());
static CLOSING_SEQUENCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+#+\s*$").unwrap());

/// Headings render in ATX style with one space after the hashes. Setext
/// headings need no rewrite since the tree does not remember the underline;
/// paragraph lines written as `##Title` are promoted to real headings.
#[derive(Debug, Clone, Default)]
pub struct HeadingAtxStyle;

impl HeadingAtxStyle {
    /// Splits a paragraph around its promotable lines. Returns `None` when no
    /// line qualifies.
    fn split_paragraph(paragraph: &Paragraph, registry: &mut HeadingRegistry) -> Option<Vec<Block>> {
        if paragraph.hash_lines.is_empty() {
            return None;
        }

        let lines = split_lines(&paragraph.content);
        let levels: Vec<Option<u8>> = lines
            .iter()
            .enumerate()
            .map(|(index, line)| {
                if paragraph.hash_lines.contains(&index) {
                    promoted_level(&line.inlines)
                } else {
                    None
                }
            })
            .collect();
        if levels.iter().all(Option::is_none) {
            return None;
        }

        let mut blocks = Vec::new();
        let mut pending = Paragraph::default();
        for (index, line) in lines.into_iter().enumerate() {
            if let Some(level) = levels[index] {
                flush(&mut pending, &mut blocks);
                blocks.push(Block::Heading(promote(line.inlines, level, registry)));
                continue;
            }

            if !pending.content.is_empty() {
                pending.content.push(line.separator.unwrap_or(Inline::SoftBreak));
            }
            let line_number = pending.content.iter().filter(|inline| is_break(inline)).count();
            if paragraph.hash_lines.contains(&index) {
                pending.hash_lines.push(line_number);
            }
            pending.content.extend(line.inlines);
        }
        flush(&mut pending, &mut blocks);
        Some(blocks)
    }
}

impl FormatRule for HeadingAtxStyle {
    fn name(&self) -> &'static str {
        "heading-atx-style"
    }

    fn description(&self) -> &'static str {
        "Convert to ATX-style headings with proper spacing"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Heading
    }

    fn apply(&self, ast: &mut MarkdownAst, ctx: &mut ParseContext, _source: &str) -> usize {
        let registry = &mut ctx.headings;
        ast.walk_containers_mut(&mut |blocks| {
            let mut index = 0;
            while index < blocks.len() {
                let replacement = match &blocks[index] {
                    Block::Paragraph(paragraph) => Self::split_paragraph(paragraph, registry),
                    _ => None,
                };
                match replacement {
                    Some(replacement) => {
                        let added = replacement.len();
                        blocks.splice(index..=index, replacement);
                        index += added;
                    }
                    None => index += 1,
                }
            }
        });

        let mut count = 0;
        ast.walk(&mut |block| {
            if let Block::Heading(_) = block {
                count += 1;
            }
        });
        count
    }
}

struct Line {
    /// Break that ended the previous line
    separator: Option<Inline>,
    inlines: Vec<Inline>,
}

fn is_break(inline: &Inline) -> bool {
    matches!(inline, Inline::SoftBreak | Inline::HardBreak)
}

fn split_lines(content: &[Inline]) -> Vec<Line> {
    let mut lines = vec![Line {
        separator: None,
        inlines: Vec::new(),
    }];
    for inline in content {
        if is_break(inline) {
            lines.push(Line {
                separator: Some(inline.clone()),
                inlines: Vec::new(),
            });
        } else if let Some(line) = lines.last_mut() {
            line.inlines.push(inline.clone());
        }
    }
    lines
}

/// Heading level for a line starting with a glued hash run.
fn promoted_level(inlines: &[Inline]) -> Option<u8> {
    let Some(Inline::Text(text)) = inlines.first() else {
        return None;
    };
    let captures = ATX_NO_SPACE_PATTERN.captures(text)?;
    let hashes = captures.get(1)?.as_str().len();
    let glued_to_text = !captures.get(2)?.as_str().is_empty();
    (glued_to_text || inlines.len() > 1).then_some(hashes as u8)
}

fn promote(mut inlines: Vec<Inline>, level: u8, registry: &mut HeadingRegistry) -> Heading {
    if let Some(Inline::Text(text)) = inlines.first_mut() {
        text.drain(..usize::from(level));
        if text.is_empty() {
            inlines.remove(0);
        }
    }
    if let Some(Inline::Text(text)) = inlines.last_mut() {
        let kept = CLOSING_SEQUENCE_PATTERN.find(text).map(|closing| closing.start());
        if let Some(kept) = kept {
            text.truncate(kept);
        }
        if text.is_empty() {
            inlines.pop();
        }
    }

    let id = registry.register(&plain_text(&inlines), level);
    Heading {
        level,
        id,
        content: inlines,
    }
}

fn flush(pending: &mut Paragraph, blocks: &mut Vec<Block>) {
    if !pending.content.is_empty() {
        blocks.push(Block::Paragraph(std::mem::take(pending)));
    }
}
