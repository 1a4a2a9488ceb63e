//! Canonical Markdown serialisation of a [`MarkdownAst`].
//!
//! Every block renders to a string without a trailing newline; containers
//! indent or prefix the lines of their children. Text is escaped just enough
//! that parsing the output yields the same tree, which is what makes
//! formatting idempotent.

use thiserror::Error;
use unicode_width::UnicodeWidthStr;

use crate::ast::{
    Alignment, Block, BlockQuote, CodeBlock, Heading, Inline, Link, LinkDefinition, LinkKind, List, MarkdownAst, Table,
};

/// Deepest block or inline nesting the renderer writes.
pub const MAX_RENDER_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("document nests deeper than {limit} levels")]
    NestingTooDeep { limit: usize },
}

/// Where inline text ends up, which decides what needs escaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InlineContext {
    Paragraph,
    Heading,
    TableCell,
}

#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    max_depth: usize,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self {
            max_depth: MAX_RENDER_DEPTH,
        }
    }
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn render(&self, ast: &MarkdownAst) -> Result<String, RenderError> {
        let mut out = self.render_blocks(&ast.blocks, false, 0)?;
        if !out.is_empty() {
            out.push('\n');
        }
        Ok(out)
    }

    fn check_depth(&self, depth: usize) -> Result<(), RenderError> {
        if depth > self.max_depth {
            return Err(RenderError::NestingTooDeep { limit: self.max_depth });
        }
        Ok(())
    }

    fn render_blocks(&self, blocks: &[Block], tight: bool, depth: usize) -> Result<String, RenderError> {
        self.check_depth(depth)?;

        let mut out = String::new();
        let mut previous: Option<&Block> = None;
        // Marker style of the previous sibling list, if it was one
        let mut previous_list: Option<(bool, bool)> = None;

        for block in blocks {
            if let Some(previous) = previous {
                out.push_str(separator(previous, block, tight));
            }

            let rendered = match block {
                Block::List(list) => {
                    let alternate = match previous_list {
                        Some((ordered, alternate)) if ordered == list.is_ordered() => !alternate,
                        _ => false,
                    };
                    previous_list = Some((list.is_ordered(), alternate));
                    self.render_list(list, alternate, depth)?
                }
                other => {
                    previous_list = None;
                    self.render_block(other, depth)?
                }
            };
            out.push_str(&rendered);
            previous = Some(block);
        }

        Ok(out)
    }

    fn render_block(&self, block: &Block, depth: usize) -> Result<String, RenderError> {
        match block {
            Block::FrontMatter(yaml) => Ok(format!("---\n{}\n---", yaml.trim_end_matches('\n'))),
            Block::Heading(heading) => self.render_heading(heading, depth),
            Block::Paragraph(paragraph) => {
                let mut out = String::new();
                self.render_inlines(&paragraph.content, InlineContext::Paragraph, depth + 1, &mut out)?;
                Ok(out)
            }
            Block::List(list) => self.render_list(list, false, depth),
            Block::CodeBlock(code) => Ok(render_code_block(code)),
            Block::Table(table) => self.render_table(table, depth),
            Block::ThematicBreak => Ok("---".to_string()),
            Block::BlockQuote(quote) => self.render_blockquote(quote, depth),
            Block::Html(html) => Ok(html.trim_end_matches('\n').to_string()),
            Block::Definition(definition) => Ok(render_definition(definition)),
        }
    }

    fn render_heading(&self, heading: &Heading, depth: usize) -> Result<String, RenderError> {
        let mut text = String::new();
        self.render_inlines(&heading.content, InlineContext::Heading, depth + 1, &mut text)?;

        let mut out = "#".repeat(usize::from(heading.level.clamp(1, 6)));
        if !text.is_empty() {
            out.push(' ');
            out.push_str(&escape_closing_sequence(&text));
        }
        Ok(out)
    }

    fn render_blockquote(&self, quote: &BlockQuote, depth: usize) -> Result<String, RenderError> {
        let mut body = String::new();
        if let Some(kind) = quote.kind {
            body.push_str("[!");
            body.push_str(kind.as_str());
            body.push(']');
            if !quote.blocks.is_empty() {
                body.push('\n');
            }
        }
        body.push_str(&self.render_blocks(&quote.blocks, false, depth + 1)?);

        let lines: Vec<String> = body
            .split('\n')
            .map(|line| if line.is_empty() { ">".to_string() } else { format!("> {line}") })
            .collect();
        Ok(lines.join("\n"))
    }

    fn render_list(&self, list: &List, alternate: bool, depth: usize) -> Result<String, RenderError> {
        let tight = list.tight && !list.items.iter().any(|item| has_setext_hazard(&item.blocks));

        let mut out = String::new();
        for (index, item) in list.items.iter().enumerate() {
            if index > 0 {
                out.push_str(if tight { "\n" } else { "\n\n" });
            }

            let marker = match list.start {
                None => (if alternate { "*" } else { "-" }).to_string(),
                Some(start) => {
                    let number = start.saturating_add(index as u64);
                    format!("{number}{}", if alternate { ')' } else { '.' })
                }
            };

            let mut body = match item.checked {
                Some(true) => "[x] ".to_string(),
                Some(false) => "[ ] ".to_string(),
                None => String::new(),
            };
            body.push_str(&self.render_blocks(&item.blocks, tight, depth + 1)?);
            let body = body.trim_end_matches(' ');

            out.push_str(&marker);
            if body.is_empty() {
                continue;
            }
            out.push(' ');
            out.push_str(&indent_continuation(body, marker.len() + 1));
        }
        Ok(out)
    }

    fn render_table(&self, table: &Table, depth: usize) -> Result<String, RenderError> {
        let columns = table.header.len().max(1);

        let render_row = |cells: &[Vec<Inline>]| -> Result<Vec<String>, RenderError> {
            (0..columns)
                .map(|column| {
                    let mut cell = String::new();
                    if let Some(inlines) = cells.get(column) {
                        self.render_inlines(inlines, InlineContext::TableCell, depth + 1, &mut cell)?;
                    }
                    Ok(cell)
                })
                .collect()
        };

        let header = render_row(table.header.as_slice())?;
        let rows = table
            .rows
            .iter()
            .map(|row| render_row(row.as_slice()))
            .collect::<Result<Vec<_>, _>>()?;

        let mut widths = vec![3; columns];
        for row in std::iter::once(&header).chain(rows.iter()) {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.width());
            }
        }

        let alignment = |column: usize| table.alignments.get(column).copied().unwrap_or(Alignment::None);
        let format_row = |row: &[String]| -> String {
            let cells: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(column, cell)| pad_cell(cell, widths[column], alignment(column)))
                .collect();
            format!("| {} |", cells.join(" | "))
        };

        let delimiter: Vec<String> = (0..columns)
            .map(|column| delimiter_cell(widths[column], alignment(column)))
            .collect();

        let mut lines = vec![format_row(header.as_slice()), format!("| {} |", delimiter.join(" | "))];
        lines.extend(rows.iter().map(|row| format_row(row.as_slice())));
        Ok(lines.join("\n"))
    }

    fn render_inlines(
        &self,
        inlines: &[Inline],
        context: InlineContext,
        depth: usize,
        out: &mut String,
    ) -> Result<(), RenderError> {
        self.check_depth(depth)?;

        for (index, inline) in inlines.iter().enumerate() {
            match inline {
                Inline::Text(text) => {
                    let next = inlines.get(index + 1);
                    escape_text(text, context, next, out);
                }
                Inline::Code(code) => out.push_str(&code_span(code, context)),
                Inline::Emphasis(children) => {
                    let marker = emphasis_marker(out.as_str(), inlines.get(index + 1), "*", "_");
                    out.push_str(marker);
                    self.render_inlines(children, context, depth + 1, out)?;
                    out.push_str(marker);
                }
                Inline::Strong(children) => {
                    let marker = emphasis_marker(out.as_str(), inlines.get(index + 1), "**", "__");
                    out.push_str(marker);
                    self.render_inlines(children, context, depth + 1, out)?;
                    out.push_str(marker);
                }
                Inline::Strikethrough(children) => {
                    out.push_str("~~");
                    self.render_inlines(children, context, depth + 1, out)?;
                    out.push_str("~~");
                }
                Inline::Link(link) | Inline::Image(link) => {
                    if matches!(inline, Inline::Image(_)) {
                        out.push('!');
                    }
                    let followed_by_paren =
                        matches!(inlines.get(index + 1), Some(Inline::Text(next)) if next.starts_with('('));
                    self.render_link(link, context, followed_by_paren, depth, out)?;
                }
                Inline::Autolink(target) => {
                    out.push('<');
                    out.push_str(target);
                    out.push('>');
                }
                Inline::Html(html) => match context {
                    InlineContext::TableCell => out.push_str(&html.replace('|', "\\|")),
                    _ => out.push_str(html),
                },
                Inline::SoftBreak => match context {
                    InlineContext::Paragraph => out.push('\n'),
                    _ => out.push(' '),
                },
                Inline::HardBreak => match context {
                    InlineContext::Paragraph => out.push_str("\\\n"),
                    _ => out.push(' '),
                },
            }
        }
        Ok(())
    }

    fn render_link(
        &self,
        link: &Link,
        context: InlineContext,
        followed_by_paren: bool,
        depth: usize,
        out: &mut String,
    ) -> Result<(), RenderError> {
        let mut text = String::new();
        self.render_inlines(&link.content, context, depth + 1, &mut text)?;

        out.push('[');
        out.push_str(&text);
        out.push(']');

        let label_is_text = text.eq_ignore_ascii_case(&link.label);
        match link.kind {
            LinkKind::Inline => {
                out.push('(');
                let destination = link_destination(&link.destination);
                let title = (!link.title.is_empty()).then(|| link_title(&link.title));
                let target = match title {
                    Some(title) if destination.is_empty() => format!("<> {title}"),
                    Some(title) => format!("{destination} {title}"),
                    None => destination,
                };
                match context {
                    InlineContext::TableCell => out.push_str(&target.replace('|', "\\|")),
                    _ => out.push_str(&target),
                }
                out.push(')');
            }
            LinkKind::Shortcut if label_is_text && !followed_by_paren => {}
            LinkKind::Collapsed | LinkKind::Shortcut if label_is_text => out.push_str("[]"),
            _ => {
                out.push('[');
                out.push_str(&link.label);
                out.push(']');
            }
        }
        Ok(())
    }
}

/// Line break(s) between two sibling blocks.
fn separator(previous: &Block, next: &Block, tight: bool) -> &'static str {
    match (previous, next) {
        (Block::ThematicBreak, Block::ThematicBreak) | (Block::Definition(_), Block::Definition(_)) => "\n",
        (Block::Paragraph(_), Block::ThematicBreak) => "\n\n",
        _ if tight => "\n",
        _ => "\n\n",
    }
}

/// A paragraph directly followed by `---` would turn into a setext heading,
/// so such a list item cannot be written tight.
fn has_setext_hazard(blocks: &[Block]) -> bool {
    blocks
        .windows(2)
        .any(|pair| matches!(pair, [Block::Paragraph(_), Block::ThematicBreak]))
}

/// Delimiter for an emphasis node. `*` right after another `*` would merge
/// both delimiter runs, so the underscore form is used there unless the node
/// is followed by a word character, which would stop `_` from closing.
fn emphasis_marker<'m>(out: &str, next: Option<&Inline>, star: &'m str, underscore: &'m str) -> &'m str {
    let word_follows = matches!(next, Some(Inline::Text(text)) if text.starts_with(char::is_alphanumeric));
    if out.ends_with('*') && !word_follows {
        underscore
    } else {
        star
    }
}

fn indent_continuation(body: &str, width: usize) -> String {
    let padding = " ".repeat(width);
    let mut out = String::with_capacity(body.len());
    for (index, line) in body.split('\n').enumerate() {
        if index > 0 {
            out.push('\n');
            if !line.is_empty() {
                out.push_str(&padding);
            }
        }
        out.push_str(line);
    }
    out
}

fn escape_closing_sequence(text: &str) -> String {
    let trimmed = text.trim_end_matches('#');
    if trimmed.len() == text.len() || !(trimmed.is_empty() || trimmed.ends_with(' ')) {
        return text.to_string();
    }
    format!("{trimmed}\\{}", &text[trimmed.len()..])
}

fn longest_run(text: &str, marker: char) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in text.chars() {
        if c == marker {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

fn render_code_block(code: &CodeBlock) -> String {
    let info = code.info();
    // A backtick in the info string rules out a backtick fence
    let marker = if info.contains('`') { '~' } else { '`' };
    let fence = marker.to_string().repeat(longest_run(&code.content, marker).max(2) + 1);

    let mut out = format!("{fence}{info}\n");
    out.push_str(&code.content);
    if !code.content.is_empty() && !code.content.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(&fence);
    out
}

fn code_span(code: &str, context: InlineContext) -> String {
    let fence = "`".repeat(longest_run(code, '`') + 1);
    let needs_padding = code.starts_with('`')
        || code.ends_with('`')
        || (code.starts_with(' ') && code.ends_with(' ') && !code.chars().all(|c| c == ' '));
    let code = match context {
        InlineContext::TableCell => code.replace('|', "\\|"),
        _ => code.to_string(),
    };
    if needs_padding {
        format!("{fence} {code} {fence}")
    } else {
        format!("{fence}{code}{fence}")
    }
}

fn render_definition(definition: &LinkDefinition) -> String {
    let mut out = format!("[{}]: ", definition.label);
    let destination = link_destination(&definition.destination);
    out.push_str(if destination.is_empty() { "<>" } else { &destination });
    if let Some(title) = &definition.title {
        out.push(' ');
        out.push_str(&link_title(title));
    }
    out
}

fn link_destination(destination: &str) -> String {
    let bracketed = destination
        .chars()
        .any(|c| matches!(c, ' ' | '<' | '>' | '(' | ')') || c.is_control());
    let mut out = String::with_capacity(destination.len() + 2);
    if bracketed {
        out.push('<');
    }
    let chars: Vec<char> = destination.chars().collect();
    for (index, &c) in chars.iter().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '<' | '>' if bracketed => {
                out.push('\\');
                out.push(c);
            }
            '&' if looks_like_entity(&chars[index + 1..]) => out.push_str("\\&"),
            _ => out.push(c),
        }
    }
    if bracketed {
        out.push('>');
    }
    out
}

fn link_title(title: &str) -> String {
    let mut out = String::with_capacity(title.len() + 2);
    out.push('"');
    let chars: Vec<char> = title.chars().collect();
    for (index, &c) in chars.iter().enumerate() {
        match c {
            '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '&' if looks_like_entity(&chars[index + 1..]) => out.push_str("\\&"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Whether the characters after an `&` would be decoded as an entity.
fn looks_like_entity(rest: &[char]) -> bool {
    let Some(end) = rest.iter().take(33).position(|&c| c == ';') else {
        return false;
    };
    let name = &rest[..end];
    match name {
        ['#', 'x' | 'X', hex @ ..] => !hex.is_empty() && hex.len() <= 6 && hex.iter().all(char::is_ascii_hexdigit),
        ['#', digits @ ..] => !digits.is_empty() && digits.len() <= 7 && digits.iter().all(char::is_ascii_digit),
        [first, ..] => first.is_ascii_alphabetic() && name.iter().all(char::is_ascii_alphanumeric),
        [] => false,
    }
}

fn escape_text(text: &str, context: InlineContext, next: Option<&Inline>, out: &mut String) {
    let chars: Vec<char> = text.chars().collect();
    let text_ends_line = matches!(next, None | Some(Inline::SoftBreak | Inline::HardBreak));
    let boundary = |index: usize| match chars.get(index) {
        Some(c) => *c == ' ' || *c == '\t',
        None => text_ends_line,
    };

    let mut index = 0;
    while index < chars.len() {
        let c = chars[index];
        let line_start = context == InlineContext::Paragraph && (out.is_empty() || out.ends_with('\n'));

        if line_start {
            match c {
                '#' => {
                    let run = chars[index..].iter().take_while(|&&c| c == '#').count();
                    if run <= 6 && boundary(index + run) {
                        out.push('\\');
                    }
                }
                '>' | '+' | '-' | '=' => out.push('\\'),
                ' ' => {
                    out.push_str("&#32;");
                    index += 1;
                    continue;
                }
                '\t' => {
                    out.push_str("&#9;");
                    index += 1;
                    continue;
                }
                '0'..='9' => {
                    let digits = chars[index..].iter().take_while(|c| c.is_ascii_digit()).count();
                    let delimiter = index + digits;
                    if digits <= 9 && matches!(chars.get(delimiter), Some('.' | ')')) && boundary(delimiter + 1) {
                        out.extend(&chars[index..delimiter]);
                        out.push('\\');
                        out.push(chars[delimiter]);
                        index = delimiter + 1;
                        continue;
                    }
                }
                _ => {}
            }
        }

        match c {
            '\\' | '`' | '*' | '[' | ']' | '~' => {
                out.push('\\');
                out.push(c);
            }
            '_' => {
                let before = if index > 0 { Some(chars[index - 1]) } else { out.chars().next_back() };
                let intraword = before.is_some_and(char::is_alphanumeric)
                    && chars.get(index + 1).is_some_and(|c| c.is_alphanumeric());
                if !intraword {
                    out.push('\\');
                }
                out.push('_');
            }
            '<' => {
                if chars
                    .get(index + 1)
                    .is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'))
                {
                    out.push('\\');
                }
                out.push('<');
            }
            '&' => {
                if looks_like_entity(&chars[index + 1..]) {
                    out.push('\\');
                }
                out.push('&');
            }
            // Bare pipes on paragraph lines could form a table row
            '|' if context != InlineContext::Heading => out.push_str("\\|"),
            // `!` right before a link would turn it into an image
            '!' if index + 1 == chars.len() && matches!(next, Some(Inline::Link(_))) => out.push_str("\\!"),
            _ => out.push(c),
        }
        index += 1;
    }
}

fn pad_cell(cell: &str, width: usize, alignment: Alignment) -> String {
    let fill = width.saturating_sub(cell.width());
    let (left, right) = match alignment {
        Alignment::Right => (fill, 0),
        Alignment::Center => (fill / 2, fill - fill / 2),
        Alignment::None | Alignment::Left => (0, fill),
    };
    format!("{}{cell}{}", " ".repeat(left), " ".repeat(right))
}

fn delimiter_cell(width: usize, alignment: Alignment) -> String {
    match alignment {
        Alignment::None => "-".repeat(width),
        Alignment::Left => format!(":{}", "-".repeat(width - 1)),
        Alignment::Right => format!("{}:", "-".repeat(width - 1)),
        Alignment::Center => format!(":{}:", "-".repeat(width - 2)),
    }
}
