//! Raw markdown editor: the bridge between a block document and markdown text.
//!
//! The host owns the markdown string. `RawEditor` keeps a paragraph-per-line
//! document for editing and reports edits back to the host as markdown,
//! debounced. Clipboard handling copies the selection as markdown plus
//! rendered HTML, and pastes plain text line by line.
//!
//! Time is passed in by the caller; nothing here starts timers. A host calls
//! `tick` from its event loop (or when `next_deadline` passes).

use std::time::Duration;

use web_time::Instant;

use crate::clipboard::ClipboardPlatform;
use crate::debounce::{DEFAULT_DEBOUNCE, Debouncer};
use crate::document::{EditorDocument, PlainEditor};
use crate::render::{AssetResolver, MarkdownRenderer, WidgetResolver};
use crate::serialize::{blocks_from_markdown, blocks_to_markdown};
use crate::types::{Block, EditorMode, Selection};
use crate::undo::{DEFAULT_HISTORY_LIMIT, UndoManager};

/// Translation key for the toolbar's switch-to-rich-text toggle.
pub const RICH_TEXT_LABEL_KEY: &str = "editor.editorWidgets.markdown.richText";

/// Callbacks into the component hosting the editor.
pub trait RawEditorHost {
    /// Receives the document serialized as markdown after a quiet period.
    fn on_change(&mut self, markdown: String);

    /// Asked to switch the field to another editor.
    fn on_mode(&mut self, mode: EditorMode);
}

impl<T: RawEditorHost> RawEditorHost for &mut T {
    fn on_change(&mut self, markdown: String) {
        (**self).on_change(markdown)
    }

    fn on_mode(&mut self, mode: EditorMode) {
        (**self).on_mode(mode)
    }
}

/// Looks up UI strings by key.
pub trait Translator {
    fn translate(&self, key: &str) -> String;
}

impl<F: Fn(&str) -> String> Translator for F {
    fn translate(&self, key: &str) -> String {
        self(key)
    }
}

#[derive(Debug, Clone)]
pub struct RawEditorOptions {
    /// Quiet period before a change reaches `on_change`.
    pub debounce: Duration,
    /// Undo steps kept by the document.
    pub history_limit: usize,
    /// Toolbar buttons configured for the field. Shown disabled in raw mode.
    pub buttons: Vec<String>,
}

impl Default for RawEditorOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            history_limit: DEFAULT_HISTORY_LIMIT,
            buttons: Vec::new(),
        }
    }
}

/// What a copy or cut handler did with the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipboardOutcome {
    /// The platform's own copy behavior must be suppressed.
    pub prevent_default: bool,
    /// An HTML flavor was written next to the plain text.
    pub html_written: bool,
}

/// Toolbar state for a field in raw mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawToolbar<'a> {
    pub buttons: &'a [String],
    pub disabled: bool,
    pub raw_mode: bool,
    pub toggle_label: String,
}

pub struct RawEditor<H, A = (), W = ()> {
    document: PlainEditor,
    value: Vec<Block>,
    /// What the host last saw: the initial value or the last delivery.
    delivered: Vec<Block>,
    host: H,
    debouncer: Debouncer<Vec<Block>>,
    renderer: MarkdownRenderer<A, W>,
    options: RawEditorOptions,
    unmounted: bool,
}

impl<H: RawEditorHost> RawEditor<H> {
    /// Create an editor over `value`, one paragraph per line.
    pub fn new(value: Option<&str>, host: H, options: RawEditorOptions) -> Self {
        let blocks = blocks_from_markdown(value.unwrap_or_default());
        Self {
            document: PlainEditor::with_history_limit(blocks.clone(), options.history_limit),
            delivered: blocks.clone(),
            value: blocks,
            host,
            debouncer: Debouncer::new(options.debounce),
            renderer: MarkdownRenderer::new(),
            options,
            unmounted: false,
        }
    }
}

impl<H, A, W> RawEditor<H, A, W> {
    /// Render copied markdown with `renderer`.
    pub fn with_renderer<A2, W2>(self, renderer: MarkdownRenderer<A2, W2>) -> RawEditor<H, A2, W2> {
        RawEditor {
            document: self.document,
            value: self.value,
            delivered: self.delivered,
            host: self.host,
            debouncer: self.debouncer,
            renderer,
            options: self.options,
            unmounted: self.unmounted,
        }
    }

    /// The last value passed through the change gate.
    pub fn value(&self) -> &[Block] {
        &self.value
    }

    pub fn document(&self) -> &PlainEditor {
        &self.document
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn options(&self) -> &RawEditorOptions {
        &self.options
    }

    /// The current document as markdown, regardless of pending delivery.
    pub fn markdown(&self) -> String {
        blocks_to_markdown(&self.value)
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// When the pending change becomes due, if one is pending.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    pub fn is_mounted(&self) -> bool {
        !self.unmounted
    }
}

impl<H: RawEditorHost, A: AssetResolver, W: WidgetResolver> RawEditor<H, A, W> {
    // === Change gate ===

    /// Accept a new document value.
    ///
    /// Returns `false` when `value` equals the held value, in which case
    /// nothing is scheduled. Otherwise schedules delivery of `value` and
    /// returns `true`.
    pub fn handle_change(&mut self, value: Vec<Block>, now: Instant) -> bool {
        if value == self.value {
            return false;
        }

        if self.document.value() != value.as_slice() {
            self.document.set_value(value.clone());
        }
        if !self.unmounted {
            self.debouncer.schedule(value.clone(), now);
        }
        self.value = value;
        true
    }

    /// Deliver the pending change if its quiet period has elapsed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.debouncer.poll(now) {
            Some(value) => {
                self.deliver(&value);
                true
            }
            None => false,
        }
    }

    /// Deliver the pending change now.
    pub fn flush(&mut self) -> bool {
        match self.debouncer.flush() {
            Some(value) => {
                self.deliver(&value);
                true
            }
            None => false,
        }
    }

    fn deliver(&mut self, value: &[Block]) {
        self.delivered = value.to_vec();
        let markdown = blocks_to_markdown(value);
        tracing::debug!(
            lines = value.len(),
            bytes = markdown.len(),
            "delivering raw editor change"
        );
        self.host.on_change(markdown);
    }

    fn sync(&mut self, now: Instant) -> bool {
        let value = self.document.value().to_vec();
        self.handle_change(value, now)
    }

    // === Editing ===

    pub fn select(&mut self, selection: Selection) {
        self.document.select(selection);
    }

    pub fn insert_text(&mut self, text: &str, now: Instant) -> bool {
        self.document.insert_text(text);
        self.sync(now)
    }

    pub fn insert_break(&mut self, now: Instant) -> bool {
        self.document.insert_break();
        self.sync(now)
    }

    pub fn delete_backward(&mut self, now: Instant) -> bool {
        self.document.delete_backward();
        self.sync(now)
    }

    pub fn delete_forward(&mut self, now: Instant) -> bool {
        self.document.delete_forward();
        self.sync(now)
    }

    pub fn undo(&mut self, now: Instant) -> bool {
        self.document.undo() && self.sync(now)
    }

    pub fn redo(&mut self, now: Instant) -> bool {
        self.document.redo() && self.sync(now)
    }

    // === Clipboard ===

    /// Copy the selection as markdown, with an HTML rendering when one can be
    /// produced.
    ///
    /// Whatever the clipboard held before is dropped first, so a failed
    /// render never leaves an older HTML flavor next to the new text.
    pub fn handle_copy<C: ClipboardPlatform>(&self, clipboard: &C) -> ClipboardOutcome {
        let markdown = blocks_to_markdown(&self.document.fragment());
        clipboard.clear();
        clipboard.write_text(&markdown);

        let html_written = match self.renderer.render(&markdown) {
            Ok(html) => {
                clipboard.write_html(&html, &markdown);
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "copied selection as plain text only");
                false
            }
        };

        ClipboardOutcome {
            prevent_default: true,
            html_written,
        }
    }

    /// Copy the selection, then delete it.
    pub fn handle_cut<C: ClipboardPlatform>(
        &mut self,
        clipboard: &C,
        now: Instant,
    ) -> ClipboardOutcome {
        let outcome = self.handle_copy(clipboard);
        self.document.delete_fragment();
        self.sync(now);
        outcome
    }

    /// Paste the clipboard's plain text, one paragraph per line, ignoring any
    /// other flavor.
    pub fn insert_data<C: ClipboardPlatform>(&mut self, clipboard: &C, now: Instant) -> bool {
        let Some(text) = clipboard.read_text() else {
            return false;
        };
        self.document.insert_fragment(&blocks_from_markdown(&text));
        self.sync(now)
    }

    // === Toolbar ===

    /// Ask the host to switch this field to the visual editor.
    pub fn toggle_mode(&mut self) {
        self.host.on_mode(EditorMode::Visual);
    }

    pub fn mode_toggle_label(&self, translator: &impl Translator) -> String {
        translator.translate(RICH_TEXT_LABEL_KEY)
    }

    /// Toolbar state: the field's buttons, disabled, with the mode toggle.
    pub fn toolbar(&self, translator: &impl Translator) -> RawToolbar<'_> {
        RawToolbar {
            buttons: &self.options.buttons,
            disabled: true,
            raw_mode: true,
            toggle_label: self.mode_toggle_label(translator),
        }
    }

    // === Lifecycle ===

    /// Attach the editor. With `pending_focus`, focus the document and then
    /// call it once.
    ///
    /// Edits made while unmounted, and any change dropped by `unmount`, are
    /// delivered immediately.
    pub fn mount<F: FnOnce()>(&mut self, pending_focus: Option<F>) {
        self.unmounted = false;
        if self.value != self.delivered {
            let value = self.value.clone();
            self.deliver(&value);
        }
        if let Some(callback) = pending_focus {
            self.document.focus();
            callback();
        }
    }

    /// Detach the editor, dropping any undelivered change.
    pub fn unmount(&mut self) {
        self.unmounted = true;
        if self.debouncer.cancel() {
            tracing::debug!("dropped pending raw editor change on unmount");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Host {
        changes: Vec<String>,
        modes: Vec<EditorMode>,
    }

    impl RawEditorHost for Host {
        fn on_change(&mut self, markdown: String) {
            self.changes.push(markdown);
        }

        fn on_mode(&mut self, mode: EditorMode) {
            self.modes.push(mode);
        }
    }

    #[test]
    fn test_new_splits_value() {
        let editor = RawEditor::new(Some("a\n\nb"), Host::default(), RawEditorOptions::default());
        assert_eq!(editor.value().len(), 3);
        assert_eq!(editor.markdown(), "a\n\nb");

        let empty = RawEditor::new(None, Host::default(), RawEditorOptions::default());
        assert_eq!(empty.value(), &[Block::paragraph("")]);
    }

    #[test]
    fn test_equal_value_is_gated() {
        let now = Instant::now();
        let mut editor = RawEditor::new(Some("same"), Host::default(), RawEditorOptions::default());
        assert!(!editor.handle_change(blocks_from_markdown("same"), now));
        assert!(!editor.is_pending());
        assert!(!editor.flush());
        assert!(editor.host().changes.is_empty());
    }

    #[test]
    fn test_external_value_updates_document() {
        let now = Instant::now();
        let mut editor = RawEditor::new(Some("old"), Host::default(), RawEditorOptions::default());
        assert!(editor.handle_change(blocks_from_markdown("new\ntext"), now));
        assert_eq!(editor.document().markdown(), "new\ntext");
        assert!(editor.flush());
        assert_eq!(editor.host().changes, vec!["new\ntext"]);
    }

    #[test]
    fn test_toggle_mode_asks_for_visual() {
        let mut editor = RawEditor::new(None, Host::default(), RawEditorOptions::default());
        editor.toggle_mode();
        assert_eq!(editor.host().modes, vec![EditorMode::Visual]);
    }
}
