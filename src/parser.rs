//! GitHub Flavored Markdown parsing on top of pulldown-cmark.
//!
//! pulldown-cmark yields a flat stream of start/end events. [`TreeBuilder`]
//! folds that stream into the owned [`MarkdownAst`] with an explicit frame
//! stack, so the nesting depth of a document never becomes recursion depth.

use crate::ast::{
    AlertKind, Alignment, Block, BlockQuote, CodeBlock, CodeBlockKind, Heading, Inline, Link, LinkDefinition, LinkKind,
    List, ListItem, MarkdownAst, Paragraph, Table, TableCell, plain_text,
};
use crate::utils::anchor::heading_to_fragment;
use crate::utils::line_ending::{LineEnding, detect_line_ending_enum};
use pulldown_cmark::{
    Alignment as CmarkAlignment, BlockQuoteKind, CodeBlockKind as CmarkCodeBlockKind, CowStr, Event, LinkType, Options,
    Parser, Tag,
};
use serde::Serialize;
use std::collections::HashMap;
use std::ops::Range;
use thiserror::Error;

/// Deepest container nesting the builder accepts.
pub const MAX_NESTING_DEPTH: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ParseError {
    #[error("unbalanced markdown event stream at byte {offset}")]
    UnbalancedEvents { offset: usize },

    #[error("document nests deeper than {limit} levels (at byte {offset})")]
    NestingTooDeep { limit: usize, offset: usize },
}

/// Grammar extensions layered over CommonMark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extensions {
    pub tables: bool,
    pub strikethrough: bool,
    pub task_lists: bool,
    /// GitHub alert blockquotes (`> [!NOTE]`)
    pub alerts: bool,
    /// YAML front matter delimited by `---`
    pub front_matter: bool,
}

impl Extensions {
    /// GitHub Flavored Markdown.
    pub const fn gfm() -> Self {
        Self {
            tables: true,
            strikethrough: true,
            task_lists: true,
            alerts: true,
            front_matter: true,
        }
    }

    /// Plain CommonMark.
    pub const fn commonmark() -> Self {
        Self {
            tables: false,
            strikethrough: false,
            task_lists: false,
            alerts: false,
            front_matter: false,
        }
    }

    fn options(self) -> Options {
        let mut options = Options::empty();
        if self.tables {
            options.insert(Options::ENABLE_TABLES);
        }
        if self.strikethrough {
            options.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.task_lists {
            options.insert(Options::ENABLE_TASKLISTS);
        }
        if self.alerts {
            options.insert(Options::ENABLE_GFM);
        }
        if self.front_matter {
            options.insert(Options::ENABLE_YAML_STYLE_METADATA_BLOCKS);
        }
        options
    }
}

impl Default for Extensions {
    fn default() -> Self {
        Self::gfm()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingEntry {
    pub id: String,
    pub level: u8,
    pub text: String,
}

/// Unique heading anchors for one document.
#[derive(Debug, Clone, Default)]
pub struct HeadingRegistry {
    entries: Vec<HeadingEntry>,
    by_id: HashMap<String, usize>,
}

impl HeadingRegistry {
    /// Assigns the next free anchor for `text`: the plain slug first, then
    /// `slug-1`, `slug-2` and so on.
    pub fn register(&mut self, text: &str, level: u8) -> String {
        let mut base = heading_to_fragment(text);
        if base.is_empty() {
            base.push_str("heading");
        }

        let mut id = base.clone();
        let mut suffix = 0;
        while self.by_id.contains_key(&id) {
            suffix += 1;
            id = format!("{base}-{suffix}");
        }

        self.by_id.insert(id.clone(), self.entries.len());
        self.entries.push(HeadingEntry {
            id: id.clone(),
            level,
            text: text.to_string(),
        });
        id
    }

    pub fn get(&self, id: &str) -> Option<&HeadingEntry> {
        self.by_id.get(id).map(|&index| &self.entries[index])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &HeadingEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Per-document state produced alongside the tree.
#[derive(Debug, Clone, Default)]
pub struct ParseContext {
    pub headings: HeadingRegistry,
    pub line_ending: LineEnding,
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownParser {
    extensions: Extensions,
}

impl MarkdownParser {
    pub fn new(extensions: Extensions) -> Self {
        Self { extensions }
    }

    pub fn extensions(&self) -> Extensions {
        self.extensions
    }

    pub fn parse(&self, source: &str) -> Result<(MarkdownAst, ParseContext), ParseError> {
        let parser = Parser::new_ext(source, self.extensions.options());
        let definitions = collect_definitions(&parser);

        let mut builder = TreeBuilder::new(source);
        for (event, range) in parser.into_offset_iter() {
            builder.push(event, range)?;
        }
        let (blocks, starts, headings) = builder.finish()?;

        let ast = MarkdownAst::new(place_definitions(blocks, starts, definitions));
        log::debug!(
            "parsed {} top-level blocks, {} headings",
            ast.blocks.len(),
            headings.len()
        );

        let ctx = ParseContext {
            headings,
            line_ending: detect_line_ending_enum(source),
            extensions: self.extensions,
        };
        Ok((ast, ctx))
    }
}

fn collect_definitions(parser: &Parser<'_>) -> Vec<(usize, LinkDefinition)> {
    let mut definitions: Vec<_> = parser
        .reference_definitions()
        .iter()
        .map(|(label, def)| {
            (
                def.span.start,
                LinkDefinition {
                    label: label.to_string(),
                    destination: def.dest.to_string(),
                    title: def.title.as_ref().map(|title| title.to_string()),
                },
            )
        })
        .collect();
    definitions.sort_by_key(|(start, _)| *start);
    definitions
}

/// Interleaves definitions with the top-level blocks by source offset.
fn place_definitions(
    blocks: Vec<Block>,
    starts: Vec<usize>,
    definitions: Vec<(usize, LinkDefinition)>,
) -> Vec<Block> {
    let mut merged = Vec::with_capacity(blocks.len() + definitions.len());
    let mut definitions = definitions.into_iter().peekable();

    for (block, start) in blocks.into_iter().zip(starts) {
        while let Some((_, definition)) = definitions.next_if(|(offset, _)| *offset < start) {
            merged.push(Block::Definition(definition));
        }
        merged.push(block);
    }
    merged.extend(definitions.map(|(_, definition)| Block::Definition(definition)));
    merged
}

/// Inline nodes collected for the innermost open frame.
#[derive(Debug, Default)]
struct InlineBuf {
    inlines: Vec<Inline>,
    line: usize,
    line_started: bool,
    hash_lines: Vec<usize>,
}

impl InlineBuf {
    fn push(&mut self, inline: Inline) {
        match inline {
            Inline::SoftBreak | Inline::HardBreak => {
                self.line += 1;
                self.line_started = false;
            }
            _ => self.line_started = true,
        }

        match (self.inlines.last_mut(), inline) {
            (Some(Inline::Text(previous)), Inline::Text(next)) => previous.push_str(&next),
            (_, inline) => self.inlines.push(inline),
        }
    }

    fn push_text(&mut self, text: &str, starts_with_hash: bool) {
        if starts_with_hash && !self.line_started && self.hash_lines.last() != Some(&self.line) {
            self.hash_lines.push(self.line);
        }
        self.push(Inline::Text(text.to_string()));
    }

    fn is_empty(&self) -> bool {
        self.inlines.is_empty()
    }

    fn take(&mut self) -> InlineBuf {
        std::mem::take(self)
    }
}

#[derive(Debug)]
enum FrameKind {
    Document,
    BlockQuote(Option<AlertKind>),
    List { start: Option<u64>, items: Vec<ListItem>, loose: bool },
    Item { checked: Option<bool>, loose: bool },
    Paragraph,
    Heading { level: u8 },
    CodeBlock(CodeBlockKind, String),
    HtmlBlock(String),
    FrontMatter(String),
    Table { alignments: Vec<Alignment>, header: Vec<TableCell>, rows: Vec<Vec<TableCell>> },
    TableHead(Vec<TableCell>),
    TableRow(Vec<TableCell>),
    TableCell,
    Emphasis,
    Strong,
    Strikethrough,
    Link(Link),
    Autolink,
    Image(Link),
    /// Constructs the tree does not model; children are handed to the parent
    Transparent,
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    start: usize,
    blocks: Vec<Block>,
    block_starts: Vec<usize>,
    inline: InlineBuf,
}

impl Frame {
    fn new(kind: FrameKind, start: usize) -> Self {
        Self {
            kind,
            start,
            blocks: Vec::new(),
            block_starts: Vec::new(),
            inline: InlineBuf::default(),
        }
    }

    /// Inlines that arrived directly inside a container form a tight paragraph.
    fn flush_pending(&mut self) {
        if self.inline.is_empty() {
            return;
        }
        let buf = self.inline.take();
        self.blocks.push(Block::Paragraph(Paragraph {
            content: buf.inlines,
            hash_lines: buf.hash_lines,
        }));
        self.block_starts.push(self.start);
    }
}

/// Folds the offset event stream into blocks.
struct TreeBuilder<'a> {
    source: &'a str,
    stack: Vec<Frame>,
    headings: HeadingRegistry,
}

impl<'a> TreeBuilder<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            stack: vec![Frame::new(FrameKind::Document, 0)],
            headings: HeadingRegistry::default(),
        }
    }

    fn push(&mut self, event: Event<'_>, range: Range<usize>) -> Result<(), ParseError> {
        match event {
            Event::Start(tag) => self.open(tag, range.start),
            Event::End(_) => self.close(range.end),
            Event::Text(text) => {
                self.text(&text, range.start);
                Ok(())
            }
            Event::Code(code) => self.attach_inline(Inline::Code(code.to_string())),
            Event::Html(html) | Event::InlineHtml(html) => self.attach_inline(Inline::Html(html.to_string())),
            Event::SoftBreak => self.attach_inline(Inline::SoftBreak),
            Event::HardBreak => self.attach_inline(Inline::HardBreak),
            Event::Rule => self.attach_block(Block::ThematicBreak, range.start),
            Event::TaskListMarker(checked) => {
                self.mark_task(checked);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn open(&mut self, tag: Tag<'_>, start: usize) -> Result<(), ParseError> {
        if self.stack.len() >= MAX_NESTING_DEPTH {
            return Err(ParseError::NestingTooDeep {
                limit: MAX_NESTING_DEPTH,
                offset: start,
            });
        }

        let kind = match tag {
            Tag::Paragraph => FrameKind::Paragraph,
            Tag::Heading { level, .. } => FrameKind::Heading { level: level as u8 },
            Tag::BlockQuote(kind) => FrameKind::BlockQuote(kind.map(alert_kind)),
            Tag::CodeBlock(CmarkCodeBlockKind::Indented) => {
                FrameKind::CodeBlock(CodeBlockKind::Indented, String::new())
            }
            Tag::CodeBlock(CmarkCodeBlockKind::Fenced(info)) => FrameKind::CodeBlock(
                CodeBlockKind::Fenced {
                    info: info.trim().to_string(),
                },
                String::new(),
            ),
            Tag::HtmlBlock => FrameKind::HtmlBlock(String::new()),
            Tag::MetadataBlock(_) => FrameKind::FrontMatter(String::new()),
            Tag::List(start) => FrameKind::List {
                start,
                items: Vec::new(),
                loose: false,
            },
            Tag::Item => FrameKind::Item {
                checked: None,
                loose: false,
            },
            Tag::Table(alignments) => FrameKind::Table {
                alignments: alignments.into_iter().map(alignment).collect(),
                header: Vec::new(),
                rows: Vec::new(),
            },
            Tag::TableHead => FrameKind::TableHead(Vec::new()),
            Tag::TableRow => FrameKind::TableRow(Vec::new()),
            Tag::TableCell => FrameKind::TableCell,
            Tag::Emphasis => FrameKind::Emphasis,
            Tag::Strong => FrameKind::Strong,
            Tag::Strikethrough => FrameKind::Strikethrough,
            Tag::Link {
                link_type: LinkType::Autolink | LinkType::Email,
                ..
            } => FrameKind::Autolink,
            Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            } => FrameKind::Link(link(link_type, dest_url, title, id)),
            Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            } => FrameKind::Image(link(link_type, dest_url, title, id)),
            _ => FrameKind::Transparent,
        };

        self.stack.push(Frame::new(kind, start));
        Ok(())
    }

    fn close(&mut self, offset: usize) -> Result<(), ParseError> {
        if self.stack.len() < 2 {
            return Err(ParseError::UnbalancedEvents { offset });
        }
        let Some(mut frame) = self.stack.pop() else {
            return Err(ParseError::UnbalancedEvents { offset });
        };

        match frame.kind {
            FrameKind::Document => Err(ParseError::UnbalancedEvents { offset }),
            FrameKind::Paragraph => {
                let block = Block::Paragraph(Paragraph {
                    content: frame.inline.inlines,
                    hash_lines: frame.inline.hash_lines,
                });
                self.attach_block(block, frame.start)
            }
            FrameKind::Heading { level } => {
                let content = frame.inline.inlines;
                let id = self.headings.register(&plain_text(&content), level);
                self.attach_block(Block::Heading(Heading { level, id, content }), frame.start)
            }
            FrameKind::CodeBlock(kind, content) => {
                self.attach_block(Block::CodeBlock(CodeBlock { kind, content }), frame.start)
            }
            FrameKind::HtmlBlock(html) => self.attach_block(Block::Html(html), frame.start),
            FrameKind::FrontMatter(yaml) => self.attach_block(Block::FrontMatter(yaml), frame.start),
            FrameKind::BlockQuote(kind) => {
                frame.flush_pending();
                let block = Block::BlockQuote(BlockQuote {
                    kind,
                    blocks: frame.blocks,
                });
                self.attach_block(block, frame.start)
            }
            FrameKind::Item { checked, loose } => {
                frame.flush_pending();
                let item = ListItem {
                    checked,
                    blocks: frame.blocks,
                };
                match self.stack.last_mut().map(|parent| &mut parent.kind) {
                    Some(FrameKind::List {
                        items,
                        loose: list_loose,
                        ..
                    }) => {
                        items.push(item);
                        *list_loose |= loose;
                        Ok(())
                    }
                    _ => Err(ParseError::UnbalancedEvents { offset }),
                }
            }
            FrameKind::List { start, items, loose } => {
                let block = Block::List(List {
                    start,
                    tight: !loose,
                    items,
                });
                self.attach_block(block, frame.start)
            }
            FrameKind::TableCell => {
                let cell = frame.inline.inlines;
                match self.stack.last_mut().map(|parent| &mut parent.kind) {
                    Some(FrameKind::TableHead(cells) | FrameKind::TableRow(cells)) => {
                        cells.push(cell);
                        Ok(())
                    }
                    _ => Err(ParseError::UnbalancedEvents { offset }),
                }
            }
            FrameKind::TableHead(cells) => match self.stack.last_mut().map(|parent| &mut parent.kind) {
                Some(FrameKind::Table { header, .. }) => {
                    *header = cells;
                    Ok(())
                }
                _ => Err(ParseError::UnbalancedEvents { offset }),
            },
            FrameKind::TableRow(cells) => match self.stack.last_mut().map(|parent| &mut parent.kind) {
                Some(FrameKind::Table { rows, .. }) => {
                    rows.push(cells);
                    Ok(())
                }
                _ => Err(ParseError::UnbalancedEvents { offset }),
            },
            FrameKind::Table {
                alignments,
                header,
                rows,
            } => self.attach_block(
                Block::Table(Table {
                    alignments,
                    header,
                    rows,
                }),
                frame.start,
            ),
            FrameKind::Emphasis => self.attach_inline(Inline::Emphasis(frame.inline.inlines)),
            FrameKind::Strong => self.attach_inline(Inline::Strong(frame.inline.inlines)),
            FrameKind::Strikethrough => self.attach_inline(Inline::Strikethrough(frame.inline.inlines)),
            FrameKind::Autolink => self.attach_inline(Inline::Autolink(plain_text(&frame.inline.inlines))),
            FrameKind::Link(mut link) => {
                link.content = frame.inline.inlines;
                self.attach_inline(Inline::Link(link))
            }
            FrameKind::Image(mut link) => {
                link.content = frame.inline.inlines;
                self.attach_inline(Inline::Image(link))
            }
            FrameKind::Transparent => {
                for inline in frame.inline.inlines {
                    self.attach_inline(inline)?;
                }
                for (block, start) in frame.blocks.into_iter().zip(frame.block_starts) {
                    self.attach_block(block, start)?;
                }
                Ok(())
            }
        }
    }

    fn text(&mut self, text: &str, start: usize) {
        let bytes = self.source.as_bytes();
        let starts_with_hash = bytes.get(start) == Some(&b'#') && (start == 0 || bytes[start - 1] != b'\\');

        let Some(frame) = self.stack.last_mut() else {
            return;
        };
        match &mut frame.kind {
            FrameKind::CodeBlock(_, content) | FrameKind::HtmlBlock(content) | FrameKind::FrontMatter(content) => {
                content.push_str(text);
            }
            _ => frame.inline.push_text(text, starts_with_hash),
        }
    }

    fn attach_inline(&mut self, inline: Inline) -> Result<(), ParseError> {
        let Some(frame) = self.stack.last_mut() else {
            return Err(ParseError::UnbalancedEvents { offset: 0 });
        };
        match (&mut frame.kind, inline) {
            (
                FrameKind::CodeBlock(_, content) | FrameKind::HtmlBlock(content) | FrameKind::FrontMatter(content),
                Inline::Text(text) | Inline::Html(text),
            ) => content.push_str(&text),
            (_, inline) => frame.inline.push(inline),
        }
        Ok(())
    }

    fn attach_block(&mut self, block: Block, start: usize) -> Result<(), ParseError> {
        let Some(parent) = self.stack.last_mut() else {
            return Err(ParseError::UnbalancedEvents { offset: start });
        };
        parent.flush_pending();
        if let (FrameKind::Item { loose, .. }, Block::Paragraph(_)) = (&mut parent.kind, &block) {
            *loose = true;
        }
        parent.blocks.push(block);
        parent.block_starts.push(start);
        Ok(())
    }

    fn mark_task(&mut self, state: bool) {
        for frame in self.stack.iter_mut().rev() {
            if let FrameKind::Item { checked, .. } = &mut frame.kind {
                *checked = Some(state);
                return;
            }
        }
    }

    fn finish(mut self) -> Result<(Vec<Block>, Vec<usize>, HeadingRegistry), ParseError> {
        let offset = self.source.len();
        if self.stack.len() != 1 {
            return Err(ParseError::UnbalancedEvents { offset });
        }
        let Some(mut root) = self.stack.pop() else {
            return Err(ParseError::UnbalancedEvents { offset });
        };
        root.flush_pending();
        Ok((root.blocks, root.block_starts, self.headings))
    }
}

fn alert_kind(kind: BlockQuoteKind) -> AlertKind {
    match kind {
        BlockQuoteKind::Note => AlertKind::Note,
        BlockQuoteKind::Tip => AlertKind::Tip,
        BlockQuoteKind::Important => AlertKind::Important,
        BlockQuoteKind::Warning => AlertKind::Warning,
        BlockQuoteKind::Caution => AlertKind::Caution,
    }
}

fn alignment(alignment: CmarkAlignment) -> Alignment {
    match alignment {
        CmarkAlignment::None => Alignment::None,
        CmarkAlignment::Left => Alignment::Left,
        CmarkAlignment::Center => Alignment::Center,
        CmarkAlignment::Right => Alignment::Right,
    }
}

fn link(link_type: LinkType, destination: CowStr<'_>, title: CowStr<'_>, id: CowStr<'_>) -> Link {
    let kind = match link_type {
        LinkType::Reference | LinkType::ReferenceUnknown => LinkKind::Reference,
        LinkType::Collapsed | LinkType::CollapsedUnknown => LinkKind::Collapsed,
        LinkType::Shortcut | LinkType::ShortcutUnknown => LinkKind::Shortcut,
        _ => LinkKind::Inline,
    };
    Link {
        kind,
        destination: destination.to_string(),
        title: title.to_string(),
        label: if kind == LinkKind::Inline { String::new() } else { id.to_string() },
        content: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulldown_cmark::TagEnd;

    fn parse(source: &str) -> (MarkdownAst, ParseContext) {
        MarkdownParser::default().parse(source).unwrap()
    }

    fn text(s: &str) -> Inline {
        Inline::Text(s.to_string())
    }

    #[test]
    fn test_setext_heading_becomes_heading_node() {
        let (ast, ctx) = parse("Test\n===\n");
        assert_eq!(
            ast.blocks,
            vec![Block::Heading(Heading {
                level: 1,
                id: "test".into(),
                content: vec![text("Test")],
            })]
        );
        assert_eq!(ctx.headings.len(), 1);
    }

    #[test]
    fn test_duplicate_heading_ids_get_suffixes() {
        let (_, ctx) = parse("# Intro\n\n## Intro\n\n### Intro\n");
        let ids: Vec<_> = ctx.headings.iter().map(|entry| entry.id.as_str()).collect();
        assert_eq!(ids, vec!["intro", "intro-1", "intro-2"]);
        assert_eq!(ctx.headings.get("intro-1").map(|entry| entry.level), Some(2));
    }

    #[test]
    fn test_registry_skips_taken_suffixes() {
        let mut registry = HeadingRegistry::default();
        assert_eq!(registry.register("a-1", 1), "a-1");
        assert_eq!(registry.register("a", 1), "a");
        assert_eq!(registry.register("a", 1), "a-2");
        assert_eq!(registry.register("!!!", 2), "heading");
    }

    #[test]
    fn test_hash_lines_are_recorded() {
        let (ast, _) = parse("##No Space\n");
        let Block::Paragraph(paragraph) = &ast.blocks[0] else {
            panic!("expected paragraph, got {:?}", ast.blocks[0]);
        };
        assert_eq!(paragraph.hash_lines, vec![0]);
        assert_eq!(paragraph.content, vec![text("##No Space")]);
    }

    #[test]
    fn test_escaped_hash_is_not_recorded() {
        let (ast, _) = parse("\\##No Space\n");
        let Block::Paragraph(paragraph) = &ast.blocks[0] else {
            panic!("expected paragraph");
        };
        assert!(paragraph.hash_lines.is_empty());
    }

    #[test]
    fn test_hash_line_after_soft_break() {
        let (ast, _) = parse("intro\n##Second\n");
        let Block::Paragraph(paragraph) = &ast.blocks[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(paragraph.hash_lines, vec![1]);
    }

    #[test]
    fn test_tight_and_loose_lists() {
        let (ast, _) = parse("- a\n- b\n\n1. x\n\n2. y\n");
        let lists: Vec<_> = ast
            .blocks
            .iter()
            .filter_map(|block| match block {
                Block::List(list) => Some((list.start, list.tight, list.items.len())),
                _ => None,
            })
            .collect();
        assert_eq!(lists, vec![(None, true, 2), (Some(1), false, 2)]);
    }

    #[test]
    fn test_task_list_items() {
        let (ast, _) = parse("- [x] done\n- [ ] todo\n- plain\n");
        let Block::List(list) = &ast.blocks[0] else {
            panic!("expected list");
        };
        let states: Vec<_> = list.items.iter().map(|item| item.checked).collect();
        assert_eq!(states, vec![Some(true), Some(false), None]);
    }

    #[test]
    fn test_code_block_content_is_verbatim() {
        let (ast, _) = parse("```rust\nfn  main() {}  \n\n  *x*\n```\n");
        assert_eq!(
            ast.blocks,
            vec![Block::CodeBlock(CodeBlock {
                kind: CodeBlockKind::Fenced { info: "rust".into() },
                content: "fn  main() {}  \n\n  *x*\n".into(),
            })]
        );
    }

    #[test]
    fn test_indented_code_block() {
        let (ast, _) = parse("para\n\n    let x = 1;\n");
        assert!(matches!(
            &ast.blocks[1],
            Block::CodeBlock(CodeBlock { kind: CodeBlockKind::Indented, content }) if content == "let x = 1;\n"
        ));
    }

    #[test]
    fn test_table_structure() {
        let (ast, _) = parse("| a | b |\n|:--|--:|\n| 1 | 2 |\n");
        let Block::Table(table) = &ast.blocks[0] else {
            panic!("expected table");
        };
        assert_eq!(table.alignments, vec![Alignment::Left, Alignment::Right]);
        assert_eq!(table.header, vec![vec![text("a")], vec![text("b")]]);
        assert_eq!(table.rows, vec![vec![vec![text("1")], vec![text("2")]]]);
    }

    #[test]
    fn test_definitions_are_placed_by_position() {
        let (ast, _) = parse("See [docs][d].\n\n[d]: https://example.com \"Docs\"\n\n# After\n");
        let kinds: Vec<_> = ast.blocks.iter().map(Block::kind_name).collect();
        assert_eq!(kinds, vec!["paragraph", "link definition", "heading"]);
        let Block::Definition(definition) = &ast.blocks[1] else {
            panic!("expected definition");
        };
        assert_eq!(definition.destination, "https://example.com");
        assert_eq!(definition.title.as_deref(), Some("Docs"));
    }

    #[test]
    fn test_reference_links_keep_their_form() {
        let (ast, _) = parse("[text][d] and [d]\n\n[d]: /x\n");
        let Block::Paragraph(paragraph) = &ast.blocks[0] else {
            panic!("expected paragraph");
        };
        let kinds: Vec<_> = paragraph
            .content
            .iter()
            .filter_map(|inline| match inline {
                Inline::Link(link) => Some((link.kind, link.label.as_str())),
                _ => None,
            })
            .collect();
        assert_eq!(kinds, vec![(LinkKind::Reference, "d"), (LinkKind::Shortcut, "d")]);
    }

    #[test]
    fn test_autolink() {
        let (ast, _) = parse("<https://example.com>\n");
        let Block::Paragraph(paragraph) = &ast.blocks[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(paragraph.content, vec![Inline::Autolink("https://example.com".into())]);
    }

    #[test]
    fn test_front_matter_is_opaque() {
        let (ast, _) = parse("---\ntitle: x\n---\n\n# Doc\n");
        assert!(matches!(&ast.blocks[0], Block::FrontMatter(yaml) if yaml.trim_end() == "title: x"));
    }

    #[test]
    fn test_alert_blockquote() {
        let (ast, _) = parse("> [!NOTE]\n> Heads up\n");
        assert!(matches!(
            &ast.blocks[0],
            Block::BlockQuote(BlockQuote { kind: Some(AlertKind::Note), .. })
        ));
    }

    #[test]
    fn test_commonmark_extensions_disable_tables() {
        let parser = MarkdownParser::new(Extensions::commonmark());
        let (ast, _) = parser.parse("| a |\n|---|\n").unwrap();
        assert!(matches!(ast.blocks[0], Block::Paragraph(_)));
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let source = ">".repeat(MAX_NESTING_DEPTH + 5) + " deep\n";
        let err = MarkdownParser::default().parse(&source).unwrap_err();
        assert!(matches!(err, ParseError::NestingTooDeep { limit: MAX_NESTING_DEPTH, .. }));
    }

    #[test]
    fn test_unbalanced_end_event_is_an_error() {
        let mut builder = TreeBuilder::new("x");
        let err = builder.push(Event::End(TagEnd::Paragraph), 0..1).unwrap_err();
        assert_eq!(err, ParseError::UnbalancedEvents { offset: 1 });
    }

    #[test]
    fn test_unterminated_stream_is_an_error() {
        let mut builder = TreeBuilder::new("x");
        builder.push(Event::Start(Tag::Paragraph), 0..1).unwrap();
        assert!(builder.finish().is_err());
    }

    #[test]
    fn test_line_ending_detected() {
        let (_, ctx) = parse("a\r\nb\r\n");
        assert_eq!(ctx.line_ending, LineEnding::Crlf);
    }
}
