//! Clipboard abstraction.
//!
//! The editor never talks to a system clipboard directly. Hosts hand it a
//! `ClipboardPlatform` wrapping whatever the copy/cut/paste event carries;
//! `MemoryClipboard` stands in for hosts without one.

use std::cell::RefCell;
use std::collections::BTreeMap;

pub const TEXT_PLAIN: &str = "text/plain";
pub const TEXT_HTML: &str = "text/html";

/// Platform clipboard operations used by copy, cut and paste.
///
/// Writes are best-effort: implementations log failures rather than
/// returning them.
pub trait ClipboardPlatform {
    /// Drop every flavor currently held.
    fn clear(&self);

    /// Write plain text.
    fn write_text(&self, text: &str);

    /// Write HTML, with `plain_text` as the fallback flavor.
    fn write_html(&self, html: &str, plain_text: &str);

    /// Read the plain text flavor, if there is one.
    fn read_text(&self) -> Option<String>;
}

impl<T: ClipboardPlatform> ClipboardPlatform for &T {
    fn clear(&self) {
        (*self).clear()
    }

    fn write_text(&self, text: &str) {
        (*self).write_text(text)
    }

    fn write_html(&self, html: &str, plain_text: &str) {
        (*self).write_html(html, plain_text)
    }

    fn read_text(&self) -> Option<String> {
        (*self).read_text()
    }
}

/// In-memory clipboard keyed by MIME type.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    data: RefCell<BTreeMap<String, String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clipboard already holding `text` as plain text.
    pub fn with_text(text: impl Into<String>) -> Self {
        let clipboard = Self::new();
        clipboard.set(TEXT_PLAIN, text);
        clipboard
    }

    pub fn get(&self, mime: &str) -> Option<String> {
        self.data.borrow().get(mime).cloned()
    }

    pub fn set(&self, mime: impl Into<String>, data: impl Into<String>) {
        self.data.borrow_mut().insert(mime.into(), data.into());
    }
}

impl ClipboardPlatform for MemoryClipboard {
    fn clear(&self) {
        self.data.borrow_mut().clear();
    }

    fn write_text(&self, text: &str) {
        self.set(TEXT_PLAIN, text);
    }

    fn write_html(&self, html: &str, plain_text: &str) {
        self.set(TEXT_PLAIN, plain_text);
        self.set(TEXT_HTML, html);
    }

    fn read_text(&self) -> Option<String> {
        self.get(TEXT_PLAIN)
    }
}
