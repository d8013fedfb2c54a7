//! Conversion between markdown text and raw editor blocks.
//!
//! Every line becomes one paragraph and every paragraph becomes one line, so
//! `blocks_to_markdown(&blocks_from_markdown(s)) == s` for any `s`.

use crate::types::Block;

/// Split markdown on `\n` into paragraph blocks. Empty lines become empty
/// paragraphs; the empty string becomes a single empty paragraph.
pub fn blocks_from_markdown(markdown: &str) -> Vec<Block> {
    markdown.split('\n').map(Block::paragraph).collect()
}

/// Join the flattened text of each block with `\n`.
pub fn blocks_to_markdown(blocks: &[Block]) -> String {
    blocks.iter().map(Block::text).collect::<Vec<_>>().join("\n")
}
