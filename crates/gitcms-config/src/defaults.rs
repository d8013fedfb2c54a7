//! Default resolution for a freshly loaded config.
//!
//! Every rule here only fills a value that is absent; anything the user set
//! explicitly is kept as-is. The input is never modified.

use crate::types::{Collection, ProjectConfig, PublishMode, SlugConfig, SlugEncoding};

/// Replacement for characters stripped out of generated slugs.
pub const DEFAULT_SANITIZE_REPLACEMENT: &str = "-";

/// Resolve all defaults, returning a new config.
pub fn apply_defaults(config: &ProjectConfig) -> ProjectConfig {
    let mut resolved = config.clone();

    resolved.publish_mode.get_or_insert(PublishMode::Simple);

    if resolved.public_folder.is_none() {
        resolved.public_folder = non_empty(&resolved.media_folder).map(site_public_folder);
    }

    for collection in &mut resolved.collections {
        apply_collection_defaults(collection);
    }

    let slug = resolved.slug.get_or_insert_with(SlugConfig::default);
    slug.encoding.get_or_insert(SlugEncoding::Unicode);
    slug.clean_accents.get_or_insert(false);
    slug.sanitize_replacement
        .get_or_insert_with(|| DEFAULT_SANITIZE_REPLACEMENT.to_owned());

    tracing::debug!(
        collections = resolved.collections.len(),
        publish_mode = ?resolved.publish_mode,
        "applied config defaults"
    );

    resolved
}

fn apply_collection_defaults(collection: &mut Collection) {
    if let Some(folder) = collection.folder.as_mut() {
        *folder = strip_leading_slashes(folder);
    }

    if let Some(files) = collection.files.as_mut() {
        for file in files.iter_mut().filter_map(|f| f.file.as_mut()) {
            *file = strip_leading_slashes(file);
        }
    }

    if let Some(media_folder) = non_empty(&collection.media_folder) {
        // Copied verbatim; only the site-wide value gets a leading slash.
        if collection.public_folder.is_none() {
            collection.public_folder = Some(media_folder.to_owned());
        }
    } else if collection.path.is_some() {
        // Path-based entries keep their media next to the entry file.
        collection.media_folder = Some(String::new());
        collection.public_folder.get_or_insert_with(String::new);
    }
}

/// An empty media folder counts as unset.
fn non_empty(folder: &Option<String>) -> Option<&str> {
    folder.as_deref().filter(|folder| !folder.is_empty())
}

fn strip_leading_slashes(path: &str) -> String {
    path.trim_start_matches('/').to_owned()
}

/// `path/to/media`, `/path/to/media` and `//path/to/media` all become `/path/to/media`.
fn site_public_folder(media_folder: &str) -> String {
    format!("/{}", media_folder.trim_start_matches('/'))
}
