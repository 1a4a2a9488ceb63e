//! Owned Markdown syntax tree.
//!
//! Blocks and inlines are closed sum types. Each container owns its children
//! by value, so a structural rewrite is a value swap inside the parent's `Vec`
//! and no node ever points back at its parent.

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MarkdownAst {
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// YAML metadata, kept verbatim without the `---` delimiters
    FrontMatter(String),
    Heading(Heading),
    Paragraph(Paragraph),
    List(List),
    CodeBlock(CodeBlock),
    Table(Table),
    ThematicBreak,
    BlockQuote(BlockQuote),
    Html(String),
    Definition(LinkDefinition),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub level: u8,
    /// GitHub-compatible anchor, unique within the document
    pub id: String,
    pub content: Vec<Inline>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Paragraph {
    pub content: Vec<Inline>,
    /// Zero-based paragraph lines whose source text starts with an unescaped `#`
    pub hash_lines: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List {
    /// `Some(n)` for ordered lists starting at `n`
    pub start: Option<u64>,
    pub tight: bool,
    pub items: Vec<ListItem>,
}

impl List {
    pub fn is_ordered(&self) -> bool {
        self.start.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListItem {
    /// Task list state, `None` for a plain item
    pub checked: Option<bool>,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeBlockKind {
    Indented,
    Fenced { info: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    pub kind: CodeBlockKind,
    pub content: String,
}

impl CodeBlock {
    pub fn info(&self) -> &str {
        match &self.kind {
            CodeBlockKind::Fenced { info } => info,
            CodeBlockKind::Indented => "",
        }
    }

    /// First word of the info string.
    pub fn language(&self) -> Option<&str> {
        self.info().split_whitespace().next()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    None,
    Left,
    Center,
    Right,
}

pub type TableCell = Vec<Inline>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub alignments: Vec<Alignment>,
    pub header: Vec<TableCell>,
    pub rows: Vec<Vec<TableCell>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Note,
    Tip,
    Important,
    Warning,
    Caution,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Note => "NOTE",
            AlertKind::Tip => "TIP",
            AlertKind::Important => "IMPORTANT",
            AlertKind::Warning => "WARNING",
            AlertKind::Caution => "CAUTION",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockQuote {
    pub kind: Option<AlertKind>,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkDefinition {
    pub label: String,
    pub destination: String,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Code(String),
    Emphasis(Vec<Inline>),
    Strong(Vec<Inline>),
    Strikethrough(Vec<Inline>),
    Link(Link),
    Image(Link),
    /// `<https://...>` or `<user@example.com>`
    Autolink(String),
    Html(String),
    SoftBreak,
    HardBreak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Inline,
    /// `[text][label]`
    Reference,
    /// `[label][]`
    Collapsed,
    /// `[label]`
    Shortcut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub kind: LinkKind,
    pub destination: String,
    pub title: String,
    /// Reference label, empty for inline links
    pub label: String,
    pub content: Vec<Inline>,
}

impl MarkdownAst {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// Visits every block in document order, parents before children.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Block)) {
        walk_blocks(&self.blocks, f);
    }

    /// Like [`MarkdownAst::walk`], but a block replaced by `f` has its new
    /// children visited.
    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut Block)) {
        walk_blocks_mut(&mut self.blocks, f);
    }

    /// Visits every block sequence: the document itself, list items and quotes.
    ///
    /// This is the hook for rewrites that turn one block into several.
    pub fn walk_containers_mut(&mut self, f: &mut impl FnMut(&mut Vec<Block>)) {
        walk_containers(&mut self.blocks, f);
    }

    /// Visits every inline node, including nested emphasis and link text.
    pub fn walk_inlines<'a>(&'a self, f: &mut impl FnMut(&'a Inline)) {
        self.walk(&mut |block| {
            for inlines in block.inline_roots() {
                walk_inline_slice(inlines, f);
            }
        });
    }

    pub fn walk_inlines_mut(&mut self, f: &mut impl FnMut(&mut Inline)) {
        self.walk_mut(&mut |block| {
            for inlines in block.inline_roots_mut() {
                walk_inline_slice_mut(inlines, f);
            }
        });
    }
}

impl Block {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Block::FrontMatter(_) => "front matter",
            Block::Heading(_) => "heading",
            Block::Paragraph(_) => "paragraph",
            Block::List(_) => "list",
            Block::CodeBlock(_) => "code block",
            Block::Table(_) => "table",
            Block::ThematicBreak => "thematic break",
            Block::BlockQuote(_) => "block quote",
            Block::Html(_) => "html block",
            Block::Definition(_) => "link definition",
        }
    }

    /// Inline sequences owned directly by this block.
    fn inline_roots(&self) -> Vec<&[Inline]> {
        match self {
            Block::Heading(heading) => vec![heading.content.as_slice()],
            Block::Paragraph(paragraph) => vec![paragraph.content.as_slice()],
            Block::Table(table) => table
                .header
                .iter()
                .chain(table.rows.iter().flatten())
                .map(Vec::as_slice)
                .collect(),
            _ => Vec::new(),
        }
    }

    fn inline_roots_mut(&mut self) -> Vec<&mut Vec<Inline>> {
        match self {
            Block::Heading(heading) => vec![&mut heading.content],
            Block::Paragraph(paragraph) => vec![&mut paragraph.content],
            Block::Table(table) => table.header.iter_mut().chain(table.rows.iter_mut().flatten()).collect(),
            _ => Vec::new(),
        }
    }
}

impl Inline {
    pub fn children(&self) -> &[Inline] {
        match self {
            Inline::Emphasis(children) | Inline::Strong(children) | Inline::Strikethrough(children) => children,
            Inline::Link(link) | Inline::Image(link) => &link.content,
            _ => &[],
        }
    }

    fn children_mut(&mut self) -> Option<&mut Vec<Inline>> {
        match self {
            Inline::Emphasis(children) | Inline::Strong(children) | Inline::Strikethrough(children) => Some(children),
            Inline::Link(link) | Inline::Image(link) => Some(&mut link.content),
            _ => None,
        }
    }
}

fn walk_blocks<'a>(blocks: &'a [Block], f: &mut impl FnMut(&'a Block)) {
    for block in blocks {
        f(block);
        match block {
            Block::List(list) => {
                for item in &list.items {
                    walk_blocks(&item.blocks, f);
                }
            }
            Block::BlockQuote(quote) => walk_blocks(&quote.blocks, f),
            _ => {}
        }
    }
}

fn walk_blocks_mut(blocks: &mut [Block], f: &mut impl FnMut(&mut Block)) {
    for block in blocks {
        f(block);
        match block {
            Block::List(list) => {
                for item in &mut list.items {
                    walk_blocks_mut(&mut item.blocks, f);
                }
            }
            Block::BlockQuote(quote) => walk_blocks_mut(&mut quote.blocks, f),
            _ => {}
        }
    }
}

fn walk_containers(blocks: &mut Vec<Block>, f: &mut impl FnMut(&mut Vec<Block>)) {
    f(blocks);
    for block in blocks.iter_mut() {
        match block {
            Block::List(list) => {
                for item in &mut list.items {
                    walk_containers(&mut item.blocks, f);
                }
            }
            Block::BlockQuote(quote) => walk_containers(&mut quote.blocks, f),
            _ => {}
        }
    }
}

fn walk_inline_slice<'a>(inlines: &'a [Inline], f: &mut impl FnMut(&'a Inline)) {
    for inline in inlines {
        f(inline);
        walk_inline_slice(inline.children(), f);
    }
}

fn walk_inline_slice_mut(inlines: &mut [Inline], f: &mut impl FnMut(&mut Inline)) {
    for inline in inlines {
        f(inline);
        if let Some(children) = inline.children_mut() {
            walk_inline_slice_mut(children, f);
        }
    }
}

/// Concatenated text content, with breaks collapsed to a single space.
pub fn plain_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    push_plain_text(inlines, &mut out);
    out
}

fn push_plain_text(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Text(text) | Inline::Code(text) | Inline::Autolink(text) => out.push_str(text),
            Inline::SoftBreak | Inline::HardBreak => out.push(' '),
            Inline::Html(_) => {}
            other => push_plain_text(other.children(), out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Inline {
        Inline::Text(s.to_string())
    }

    fn sample() -> MarkdownAst {
        MarkdownAst::new(vec![
            Block::Heading(Heading {
                level: 1,
                id: "title".into(),
                content: vec![text("Title")],
            }),
            Block::List(List {
                start: None,
                tight: true,
                items: vec![ListItem {
                    checked: None,
                    blocks: vec![
                        Block::Paragraph(Paragraph {
                            content: vec![Inline::Emphasis(vec![text("deep")])],
                            hash_lines: vec![],
                        }),
                        Block::BlockQuote(BlockQuote {
                            kind: None,
                            blocks: vec![Block::ThematicBreak],
                        }),
                    ],
                }],
            }),
        ])
    }

    #[test]
    fn test_walk_is_preorder() {
        let ast = sample();
        let mut kinds = Vec::new();
        ast.walk(&mut |block| kinds.push(block.kind_name()));
        assert_eq!(
            kinds,
            vec!["heading", "list", "paragraph", "block quote", "thematic break"]
        );
    }

    #[test]
    fn test_walk_inlines_reaches_nested_nodes() {
        let ast = sample();
        let mut count = 0;
        ast.walk_inlines(&mut |inline| {
            if matches!(inline, Inline::Text(_)) {
                count += 1;
            }
        });
        assert_eq!(count, 2);
    }

    #[test]
    fn test_walk_containers_visits_every_sequence() {
        let mut ast = sample();
        let mut sizes = Vec::new();
        ast.walk_containers_mut(&mut |blocks| sizes.push(blocks.len()));
        assert_eq!(sizes, vec![2, 2, 1]);
    }

    #[test]
    fn test_plain_text_flattens_markup() {
        let inlines = vec![
            text("a "),
            Inline::Strong(vec![text("b")]),
            Inline::SoftBreak,
            Inline::Code("c".into()),
        ];
        assert_eq!(plain_text(&inlines), "a b c");
    }

    #[test]
    fn test_code_block_language() {
        let block = CodeBlock {
            kind: CodeBlockKind::Fenced {
                info: "rust ignore".into(),
            },
            content: String::new(),
        };
        assert_eq!(block.language(), Some("rust"));
    }
}
