//! Core editor types: blocks, points, selections and modes.
//!
//! The raw editor holds a document as a flat list of paragraph blocks, one per
//! line of markdown. Positions are character offsets into a block's flattened
//! text, never byte offsets.

/// Kind of a top-level block.
///
/// The raw editor only ever produces paragraphs; other kinds belong to the
/// visual editor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlockKind {
    #[default]
    Paragraph,
}

/// A run of text inside a block.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Leaf {
    pub text: String,
}

impl Leaf {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// A top-level document node.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Block {
    pub kind: BlockKind,
    pub children: Vec<Leaf>,
}

impl Block {
    /// Create a paragraph holding a single leaf.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Paragraph,
            children: vec![Leaf::new(text)],
        }
    }

    /// Concatenated text of all leaves.
    pub fn text(&self) -> String {
        self.children.iter().map(|leaf| leaf.text.as_str()).collect()
    }

    /// Length of the flattened text in characters.
    pub fn len_chars(&self) -> usize {
        self.children
            .iter()
            .map(|leaf| leaf.text.chars().count())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.children.iter().all(|leaf| leaf.text.is_empty())
    }
}

/// A position in the document.
///
/// Ordering is document order: by block, then by offset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point {
    /// Index of the block.
    pub block: usize,
    /// Character offset into the block's flattened text.
    pub offset: usize,
}

impl Point {
    pub fn new(block: usize, offset: usize) -> Self {
        Self { block, offset }
    }
}

/// Text selection with anchor and focus points.
///
/// The anchor is where the selection started, the focus is where the cursor is now.
/// They may be in any order - use `start()` and `end()` for ordered bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    pub anchor: Point,
    pub focus: Point,
}

impl Selection {
    pub fn new(anchor: Point, focus: Point) -> Self {
        Self { anchor, focus }
    }

    /// Create a collapsed selection (cursor position).
    pub fn collapsed(point: Point) -> Self {
        Self {
            anchor: point,
            focus: point,
        }
    }

    /// Get the start (lower bound) of the selection.
    pub fn start(&self) -> Point {
        self.anchor.min(self.focus)
    }

    /// Get the end (upper bound) of the selection.
    pub fn end(&self) -> Point {
        self.anchor.max(self.focus)
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// Check if the selection is backwards (focus before anchor).
    pub fn is_backwards(&self) -> bool {
        self.focus < self.anchor
    }
}

/// Which editor a markdown field is shown in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EditorMode {
    /// Plain text, one paragraph per line.
    #[default]
    Raw,
    /// Rich text editing.
    Visual,
}

impl EditorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditorMode::Raw => "raw",
            EditorMode::Visual => "visual",
        }
    }
}

impl std::fmt::Display for EditorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
