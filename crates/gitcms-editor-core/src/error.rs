//! Error types for markdown rendering.

use miette::Diagnostic;
use thiserror::Error;

/// Errors raised by render resolvers. Any of them aborts the render.
#[derive(Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum RenderError {
    /// An asset path could not be resolved.
    #[error("failed to resolve asset {path}: {reason}")]
    #[diagnostic(code(gitcms::render::asset))]
    Asset { path: String, reason: String },

    /// A widget failed to produce its preview.
    #[error("widget preview failed: {reason}")]
    #[diagnostic(code(gitcms::render::widget))]
    Widget { reason: String },
}

impl RenderError {
    pub fn asset(path: impl Into<String>, reason: impl Into<String>) -> Self {
        RenderError::Asset {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn widget(reason: impl Into<String>) -> Self {
        RenderError::Widget {
            reason: reason.into(),
        }
    }
}
