//! Markdown to HTML rendering for clipboard and preview output.
//!
//! Rendering goes through pulldown-cmark. Two host hooks take part:
//! - `WidgetResolver` may claim a blank-line separated chunk (an editor
//!   component shortcode, say) and supply its HTML directly
//! - `AssetResolver` maps image destinations to URLs the output can load

use std::ops::Range;

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag};

use crate::error::RenderError;

/// Resolves asset paths referenced from markdown.
pub trait AssetResolver {
    /// Map an image destination to the URL to emit.
    ///
    /// Returns `Ok(None)` to keep the destination unchanged.
    fn resolve_asset(&self, path: &str) -> Result<Option<String>, RenderError>;
}

/// Unit type implementation - no asset resolution.
impl AssetResolver for () {
    fn resolve_asset(&self, _path: &str) -> Result<Option<String>, RenderError> {
        Ok(None)
    }
}

/// Supplies preview HTML for chunks handled by editor components.
pub trait WidgetResolver {
    /// Returns `Some(html)` to replace `chunk` in the output verbatim,
    /// `None` to render it as markdown.
    fn preview_html(&self, chunk: &str) -> Result<Option<String>, RenderError>;
}

/// Unit type implementation - no widgets.
impl WidgetResolver for () {
    fn preview_html(&self, _chunk: &str) -> Result<Option<String>, RenderError> {
        Ok(None)
    }
}

impl<T: AssetResolver> AssetResolver for &T {
    fn resolve_asset(&self, path: &str) -> Result<Option<String>, RenderError> {
        (*self).resolve_asset(path)
    }
}

impl<T: WidgetResolver> WidgetResolver for &T {
    fn preview_html(&self, chunk: &str) -> Result<Option<String>, RenderError> {
        (*self).preview_html(chunk)
    }
}

impl<T: AssetResolver> AssetResolver for Option<T> {
    fn resolve_asset(&self, path: &str) -> Result<Option<String>, RenderError> {
        match self {
            Some(resolver) => resolver.resolve_asset(path),
            None => Ok(None),
        }
    }
}

impl<T: WidgetResolver> WidgetResolver for Option<T> {
    fn preview_html(&self, chunk: &str) -> Result<Option<String>, RenderError> {
        match self {
            Some(resolver) => resolver.preview_html(chunk),
            None => Ok(None),
        }
    }
}

/// Markdown extensions enabled for rendering.
pub fn markdown_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH
}

/// Markdown to HTML renderer with pluggable asset and widget resolution.
#[derive(Debug, Clone, Default)]
pub struct MarkdownRenderer<A = (), W = ()> {
    assets: A,
    widgets: W,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<A, W> MarkdownRenderer<A, W> {
    /// Use `assets` to resolve image destinations.
    pub fn with_assets<A2: AssetResolver>(self, assets: A2) -> MarkdownRenderer<A2, W> {
        MarkdownRenderer {
            assets,
            widgets: self.widgets,
        }
    }

    /// Offer chunks to `widgets` before rendering them as markdown.
    pub fn with_widgets<W2: WidgetResolver>(self, widgets: W2) -> MarkdownRenderer<A, W2> {
        MarkdownRenderer {
            assets: self.assets,
            widgets,
        }
    }
}

impl<A: AssetResolver, W: WidgetResolver> MarkdownRenderer<A, W> {
    /// Render `markdown` to an HTML string.
    ///
    /// Markdown between widget chunks is rendered piecewise, so reference
    /// definitions do not cross a widget. Chunks inside code blocks are never
    /// offered to the widget resolver.
    pub fn render(&self, markdown: &str) -> Result<String, RenderError> {
        let mut html = String::with_capacity(markdown.len() * 3 / 2);
        let mut rendered_to = 0;
        let code = code_blocks(markdown);

        for chunk in chunks(markdown) {
            if code.iter().any(|block| overlaps(block, &chunk)) {
                continue;
            }
            let Some(preview) = self.widgets.preview_html(markdown[chunk.clone()].trim_end())?
            else {
                continue;
            };
            self.push_markdown(&mut html, &markdown[rendered_to..chunk.start])?;
            html.push_str(&preview);
            if !preview.ends_with('\n') {
                html.push('\n');
            }
            rendered_to = chunk.end;
        }

        self.push_markdown(&mut html, &markdown[rendered_to..])?;
        Ok(html)
    }

    fn push_markdown(&self, html: &mut String, markdown: &str) -> Result<(), RenderError> {
        if markdown.trim().is_empty() {
            return Ok(());
        }

        let mut events = Vec::new();
        for event in Parser::new_ext(markdown, markdown_options()) {
            let event = match event {
                Event::Start(Tag::Image {
                    link_type,
                    dest_url,
                    title,
                    id,
                }) => {
                    let dest_url = match self.assets.resolve_asset(&dest_url)? {
                        Some(resolved) => {
                            tracing::trace!(from = %dest_url, to = %resolved, "resolved asset");
                            CowStr::from(resolved)
                        }
                        None => dest_url,
                    };
                    Event::Start(Tag::Image {
                        link_type,
                        dest_url,
                        title,
                        id,
                    })
                }
                other => other,
            };
            events.push(event);
        }

        pulldown_cmark::html::push_html(html, events.into_iter());
        Ok(())
    }
}

/// Byte ranges of fenced and indented code blocks.
fn code_blocks(source: &str) -> Vec<Range<usize>> {
    Parser::new_ext(source, markdown_options())
        .into_offset_iter()
        .filter_map(|(event, range)| match event {
            Event::Start(Tag::CodeBlock(_)) => Some(range),
            _ => None,
        })
        .collect()
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

/// Byte ranges of runs of non-blank lines, each including its final newline.
fn chunks(source: &str) -> Vec<Range<usize>> {
    let mut chunks = Vec::new();
    let mut current: Option<Range<usize>> = None;
    let mut offset = 0;

    for line in source.split_inclusive('\n') {
        let end = offset + line.len();
        if line.trim().is_empty() {
            chunks.extend(current.take());
        } else {
            match &mut current {
                Some(chunk) => chunk.end = end,
                None => current = Some(offset..end),
            }
        }
        offset = end;
    }

    chunks.extend(current);
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PublicFolder;

    impl AssetResolver for PublicFolder {
        fn resolve_asset(&self, path: &str) -> Result<Option<String>, RenderError> {
            if path.contains("://") {
                Ok(None)
            } else if path.ends_with(".exe") {
                Err(RenderError::asset(path, "not an image"))
            } else {
                Ok(Some(format!("/media/{path}")))
            }
        }
    }

    struct Shortcodes;

    impl WidgetResolver for Shortcodes {
        fn preview_html(&self, chunk: &str) -> Result<Option<String>, RenderError> {
            match chunk.strip_prefix("{{< youtube ") {
                Some(rest) => {
                    let id = rest.trim_end_matches(">}}").trim();
                    if id.is_empty() {
                        return Err(RenderError::widget("youtube needs a video id"));
                    }
                    Ok(Some(format!("<div class=\"youtube\" data-id=\"{id}\"></div>")))
                }
                None => Ok(None),
            }
        }
    }

    #[test]
    fn test_chunks_split_on_blank_lines() {
        let source = "a\nb\n\n  \nc\n\nd";
        let ranges = chunks(source);
        let parts: Vec<_> = ranges.iter().map(|r| &source[r.clone()]).collect();
        assert_eq!(parts, vec!["a\nb\n", "c\n", "d"]);
    }

    #[test]
    fn test_render_plain_markdown() {
        let html = MarkdownRenderer::new()
            .render("# Title\n\nSome *text* and ~~old~~ text")
            .unwrap();
        insta::assert_snapshot!(html, @r"
        <h1>Title</h1>
        <p>Some <em>text</em> and <del>old</del> text</p>
        ");
    }

    #[test]
    fn test_render_tables() {
        let html = MarkdownRenderer::new()
            .render("| a | b |\n|---|---|\n| 1 | 2 |")
            .unwrap();
        assert!(html.starts_with("<table>"));
        assert!(html.contains("<td>1</td><td>2</td>"));
    }

    #[test]
    fn test_image_destinations_resolve() {
        let renderer = MarkdownRenderer::new().with_assets(PublicFolder);
        let html = renderer
            .render("![cat](uploads/cat.png)\n\n![dog](https://example.com/dog.png)")
            .unwrap();
        insta::assert_snapshot!(html, @r#"
        <p><img src="/media/uploads/cat.png" alt="cat" /></p>
        <p><img src="https://example.com/dog.png" alt="dog" /></p>
        "#);
    }

    #[test]
    fn test_links_are_not_resolved() {
        let renderer = MarkdownRenderer::new().with_assets(PublicFolder);
        let html = renderer.render("[file](uploads/doc.pdf)").unwrap();
        assert_eq!(html, "<p><a href=\"uploads/doc.pdf\">file</a></p>\n");
    }

    #[test]
    fn test_asset_error_aborts() {
        let renderer = MarkdownRenderer::new().with_assets(PublicFolder);
        let err = renderer.render("text\n\n![x](setup.exe)").unwrap_err();
        assert!(matches!(err, RenderError::Asset { ref path, .. } if path == "setup.exe"));
    }

    #[test]
    fn test_widget_chunk_replaces_markdown() {
        let renderer = MarkdownRenderer::new().with_widgets(Shortcodes);
        let html = renderer
            .render("Intro\n\n{{< youtube abc123 >}}\n\nOutro *end*\n")
            .unwrap();
        insta::assert_snapshot!(html, @r#"
        <p>Intro</p>
        <div class="youtube" data-id="abc123"></div>
        <p>Outro <em>end</em></p>
        "#);
    }

    #[test]
    fn test_widget_shortcode_in_fence_stays_code() {
        let renderer = MarkdownRenderer::new().with_widgets(Shortcodes);
        let html = renderer
            .render("```\nexample:\n\n{{< youtube abc >}}\n\nend\n```\n")
            .unwrap();
        insta::assert_snapshot!(html, @r"
        <pre><code>example:

        {{&lt; youtube abc &gt;}}

        end
        </code></pre>
        ");
    }

    #[test]
    fn test_widget_after_fence_still_resolves() {
        let renderer = MarkdownRenderer::new().with_widgets(Shortcodes);
        let html = renderer
            .render("```\n{{< youtube a >}}\n```\n\n{{< youtube b >}}\n")
            .unwrap();
        insta::assert_snapshot!(html, @r#"
        <pre><code>{{&lt; youtube a &gt;}}
        </code></pre>
        <div class="youtube" data-id="b"></div>
        "#);
    }

    #[test]
    fn test_widget_error_aborts() {
        let renderer = MarkdownRenderer::new().with_widgets(Shortcodes);
        assert!(matches!(
            renderer.render("{{< youtube >}}"),
            Err(RenderError::Widget { .. })
        ));
    }

    #[test]
    fn test_unit_and_option_resolvers_pass_through() {
        let renderer = MarkdownRenderer::new()
            .with_assets(None::<PublicFolder>)
            .with_widgets(&());
        assert_eq!(
            renderer.render("![a](b.png)").unwrap(),
            "<p><img src=\"b.png\" alt=\"a\" /></p>\n"
        );
        assert_eq!(renderer.render("").unwrap(), "");
    }
}
