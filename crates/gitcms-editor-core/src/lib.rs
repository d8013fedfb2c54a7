//! gitcms-editor-core: the raw markdown editor without any UI framework.
//!
//! This crate provides:
//! - `Block`, `Point`, `Selection` - the paragraph-per-line document model
//! - `EditorDocument` - editing operations over any document storage
//! - `PlainEditor` - field-based document with undo history
//! - `Debouncer` - clock-injected trailing debounce
//! - `MarkdownRenderer` - markdown to HTML with asset and widget hooks
//! - `RawEditor` - the markdown/document bridge with clipboard handling

pub mod clipboard;
pub mod debounce;
pub mod document;
pub mod error;
pub mod raw_editor;
pub mod render;
pub mod serialize;
pub mod types;
pub mod undo;

pub use clipboard::{ClipboardPlatform, MemoryClipboard, TEXT_HTML, TEXT_PLAIN};
pub use debounce::{DEFAULT_DEBOUNCE, DebounceState, Debouncer};
pub use document::{EditorDocument, PlainEditor};
pub use error::RenderError;
pub use raw_editor::{
    ClipboardOutcome, RICH_TEXT_LABEL_KEY, RawEditor, RawEditorHost, RawEditorOptions, RawToolbar,
    Translator,
};
pub use render::{AssetResolver, MarkdownRenderer, WidgetResolver, markdown_options};
pub use serialize::{blocks_from_markdown, blocks_to_markdown};
pub use types::{Block, BlockKind, EditorMode, Leaf, Point, Selection};
pub use undo::{DEFAULT_HISTORY_LIMIT, History, UndoManager};
pub use web_time::Instant;
