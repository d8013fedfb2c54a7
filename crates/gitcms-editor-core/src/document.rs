//! Core editor document trait and implementations.
//!
//! Defines the `EditorDocument` trait for abstracting the block editing
//! framework. Implementors supply storage for the value, selection and focus;
//! fragment handling and text editing are provided on top of those.

use crate::serialize::{blocks_from_markdown, blocks_to_markdown};
use crate::types::{Block, Leaf, Point, Selection};
use crate::undo::{DEFAULT_HISTORY_LIMIT, History, UndoManager};

/// Core trait for editor documents.
///
/// Every provided mutation computes a new value and hands it to `set_value`,
/// followed by `set_selection`. Blocks touched by an edit are rewritten as a
/// single leaf.
pub trait EditorDocument {
    // === Required: State access ===

    /// The current block value.
    fn value(&self) -> &[Block];

    /// Replace the block value.
    fn set_value(&mut self, value: Vec<Block>);

    /// Get the current selection, if any.
    fn selection(&self) -> Option<Selection>;

    /// Set the selection.
    fn set_selection(&mut self, selection: Option<Selection>);

    /// Give the document input focus.
    fn focus(&mut self);

    fn is_focused(&self) -> bool;

    // === Provided: Convenience accessors ===

    /// The value serialized as markdown, one line per block.
    fn markdown(&self) -> String {
        blocks_to_markdown(self.value())
    }

    /// The point after the last character of the document.
    fn end_point(&self) -> Point {
        end_of(self.value())
    }

    /// Set the selection, clamping both points into the document.
    fn select(&mut self, selection: Selection) {
        let value = self.value();
        let clamped = Selection::new(
            clamp_point(value, selection.anchor),
            clamp_point(value, selection.focus),
        );
        self.set_selection(Some(clamped));
    }

    // === Provided: Fragments ===

    /// The blocks covered by the selection, with the first and last trimmed
    /// to the selected text.
    ///
    /// Empty when there is no selection; a single empty paragraph when the
    /// selection is collapsed.
    fn fragment(&self) -> Vec<Block> {
        let value = self.value();
        let Some(selection) = self.selection() else {
            return Vec::new();
        };
        if value.is_empty() {
            return Vec::new();
        }

        let start = clamp_point(value, selection.start());
        let end = clamp_point(value, selection.end());

        if start.block == end.block {
            let text = value[start.block].text();
            return vec![retext(
                &value[start.block],
                char_slice(&text, start.offset, end.offset),
            )];
        }

        let mut fragment = Vec::with_capacity(end.block - start.block + 1);
        let first = value[start.block].text();
        fragment.push(retext(
            &value[start.block],
            char_slice(&first, start.offset, usize::MAX),
        ));
        fragment.extend(value[start.block + 1..end.block].iter().cloned());
        let last = value[end.block].text();
        fragment.push(retext(&value[end.block], char_slice(&last, 0, end.offset)));
        fragment
    }

    /// Delete the selected content, collapsing the selection to its start.
    ///
    /// Does nothing for a missing or collapsed selection.
    fn delete_fragment(&mut self) {
        let Some(selection) = self.selection() else {
            return;
        };
        if selection.is_collapsed() {
            return;
        }
        self.delete_range(selection.start(), selection.end());
    }

    /// Insert blocks at the selection, replacing any selected content.
    ///
    /// The first fragment block joins the text before the insertion point and
    /// the last joins the text after it. Without a selection the fragment is
    /// inserted at the end of the document.
    fn insert_fragment(&mut self, fragment: &[Block]) {
        if fragment.is_empty() {
            return;
        }

        let mut value = self.value().to_vec();
        if value.is_empty() {
            value.push(Block::paragraph(""));
        }

        let at = match self.selection() {
            Some(selection) => {
                let start = clamp_point(&value, selection.start());
                let end = clamp_point(&value, selection.end());
                remove_range(&mut value, start, end);
                start
            }
            None => end_of(&value),
        };

        let cursor = splice_fragment(&mut value, at, fragment);
        self.set_value(value);
        self.set_selection(Some(Selection::collapsed(cursor)));
    }

    // === Provided: Text editing ===

    /// Insert text at the selection, replacing any selected content.
    fn insert_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.insert_fragment(&[Block::paragraph(text)]);
    }

    /// Split the block at the selection.
    fn insert_break(&mut self) {
        self.insert_fragment(&[Block::paragraph(""), Block::paragraph("")]);
    }

    /// Delete the selection, or the character before the cursor.
    ///
    /// At the start of a block this merges it into the previous one.
    fn delete_backward(&mut self) {
        let Some(selection) = self.selection() else {
            return;
        };
        if !selection.is_collapsed() {
            return self.delete_fragment();
        }

        let value = self.value();
        if value.is_empty() {
            return;
        }
        let at = clamp_point(value, selection.focus);
        let start = if at.offset > 0 {
            Point::new(at.block, at.offset - 1)
        } else if at.block > 0 {
            Point::new(at.block - 1, value[at.block - 1].len_chars())
        } else {
            return;
        };
        self.delete_range(start, at);
    }

    /// Delete the selection, or the character after the cursor.
    ///
    /// At the end of a block this pulls the next one into it.
    fn delete_forward(&mut self) {
        let Some(selection) = self.selection() else {
            return;
        };
        if !selection.is_collapsed() {
            return self.delete_fragment();
        }

        let value = self.value();
        if value.is_empty() {
            return;
        }
        let at = clamp_point(value, selection.focus);
        let end = if at.offset < value[at.block].len_chars() {
            Point::new(at.block, at.offset + 1)
        } else if at.block + 1 < value.len() {
            Point::new(at.block + 1, 0)
        } else {
            return;
        };
        self.delete_range(at, end);
    }

    /// Delete everything between two points and put the cursor at the first.
    fn delete_range(&mut self, from: Point, to: Point) {
        let mut value = self.value().to_vec();
        if value.is_empty() {
            return;
        }
        let start = clamp_point(&value, from.min(to));
        let end = clamp_point(&value, from.max(to));
        if start == end {
            return;
        }

        remove_range(&mut value, start, end);
        self.set_value(value);
        self.set_selection(Some(Selection::collapsed(start)));
    }
}

/// Snapshot of everything undo restores.
#[derive(Debug, Clone)]
struct Snapshot {
    value: Vec<Block>,
    selection: Option<Selection>,
}

/// Simple field-based implementation of `EditorDocument`.
///
/// Every `set_value` that changes the value records the previous value and
/// selection for undo.
#[derive(Debug, Clone)]
pub struct PlainEditor {
    value: Vec<Block>,
    selection: Option<Selection>,
    focused: bool,
    history: History<Snapshot>,
}

impl Default for PlainEditor {
    fn default() -> Self {
        Self::new(vec![Block::paragraph("")])
    }
}

impl PlainEditor {
    pub fn new(value: Vec<Block>) -> Self {
        Self::with_history_limit(value, DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_history_limit(value: Vec<Block>, max_steps: usize) -> Self {
        Self {
            value,
            selection: None,
            focused: false,
            history: History::new(max_steps),
        }
    }

    pub fn from_markdown(markdown: &str) -> Self {
        Self::new(blocks_from_markdown(markdown))
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            value: self.value.clone(),
            selection: self.selection,
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.value = snapshot.value;
        self.selection = snapshot.selection;
    }
}

impl EditorDocument for PlainEditor {
    fn value(&self) -> &[Block] {
        &self.value
    }

    fn set_value(&mut self, value: Vec<Block>) {
        if value == self.value {
            return;
        }
        let previous = std::mem::replace(&mut self.value, value);
        self.history.record(Snapshot {
            value: previous,
            selection: self.selection,
        });
    }

    fn selection(&self) -> Option<Selection> {
        self.selection
    }

    fn set_selection(&mut self, selection: Option<Selection>) {
        self.selection = selection;
    }

    /// Focus the document. A document focused without a selection gets a
    /// cursor at its start.
    fn focus(&mut self) {
        self.focused = true;
        if self.selection.is_none() {
            self.selection = Some(Selection::collapsed(Point::default()));
        }
    }

    fn is_focused(&self) -> bool {
        self.focused
    }
}

impl UndoManager for PlainEditor {
    fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn undo(&mut self) -> bool {
        match self.history.undo(self.snapshot()) {
            Ok(previous) => {
                self.restore(previous);
                true
            }
            Err(_) => false,
        }
    }

    fn redo(&mut self) -> bool {
        match self.history.redo(self.snapshot()) {
            Ok(next) => {
                self.restore(next);
                true
            }
            Err(_) => false,
        }
    }

    fn clear_history(&mut self) {
        self.history.clear();
    }
}

// === Helpers ===

fn byte_index(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map_or(text.len(), |(index, _)| index)
}

/// Chars `from..to` of `text`; out-of-range bounds clamp to the end.
fn char_slice(text: &str, from: usize, to: usize) -> String {
    let start = byte_index(text, from);
    let end = byte_index(text, to).max(start);
    text[start..end].to_owned()
}

/// Same kind as `block`, with `text` as its only leaf.
fn retext(block: &Block, text: String) -> Block {
    Block {
        kind: block.kind,
        children: vec![Leaf { text }],
    }
}

fn end_of(value: &[Block]) -> Point {
    match value.last() {
        Some(block) => Point::new(value.len() - 1, block.len_chars()),
        None => Point::default(),
    }
}

fn clamp_point(value: &[Block], point: Point) -> Point {
    let Some(last) = value.len().checked_sub(1) else {
        return Point::default();
    };
    let block = point.block.min(last);
    Point::new(block, point.offset.min(value[block].len_chars()))
}

/// Remove `start..end` and merge the boundary blocks. Points must be clamped.
fn remove_range(value: &mut Vec<Block>, start: Point, end: Point) {
    if start >= end {
        return;
    }
    let head = value[start.block].text();
    let tail = value[end.block].text();
    let joined = char_slice(&head, 0, start.offset) + &char_slice(&tail, end.offset, usize::MAX);
    let merged = retext(&value[start.block], joined);
    value.splice(start.block..=end.block, [merged]);
}

/// Insert a non-empty fragment at a clamped point, returning the point after it.
fn splice_fragment(value: &mut Vec<Block>, at: Point, fragment: &[Block]) -> Point {
    let target = value[at.block].clone();
    let text = target.text();
    let before = char_slice(&text, 0, at.offset);
    let after = char_slice(&text, at.offset, usize::MAX);

    let (replacement, cursor) = match fragment {
        [] => return at,
        [only] => (
            vec![retext(&target, format!("{before}{}{after}", only.text()))],
            Point::new(at.block, at.offset + only.len_chars()),
        ),
        [first, middle @ .., last] => {
            let mut blocks = Vec::with_capacity(fragment.len());
            blocks.push(retext(&target, format!("{before}{}", first.text())));
            blocks.extend(middle.iter().cloned());
            blocks.push(retext(last, format!("{}{after}", last.text())));
            (
                blocks,
                Point::new(at.block + fragment.len() - 1, last.len_chars()),
            )
        }
    };

    value.splice(at.block..=at.block, replacement);
    cursor
}
