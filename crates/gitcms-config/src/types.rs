//! The project config tree.
//!
//! Only the keys the admin acts on are modelled as fields. Everything else
//! (`site_url`, collection `fields`, widget options, ...) rides along in the
//! `extra` maps so a load/resolve/save cycle keeps it intact.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::lenient;

/// Top-level project configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional"
    )]
    pub publish_mode: Option<PublishMode>,

    /// Repository folder uploaded media is committed to.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional"
    )]
    pub media_folder: Option<String>,

    /// URL prefix media is served from on the published site.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional"
    )]
    pub public_folder: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional"
    )]
    pub slug: Option<SlugConfig>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional"
    )]
    pub backend: Option<BackendConfig>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional"
    )]
    pub local_backend: Option<LocalBackend>,

    pub collections: Vec<Collection>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProjectConfig {
    /// An empty config with no collections.
    pub fn new() -> Self {
        Self {
            publish_mode: None,
            media_folder: None,
            public_folder: None,
            slug: None,
            backend: None,
            local_backend: None,
            collections: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn with_collections(collections: Vec<Collection>) -> Self {
        Self {
            collections,
            ..Self::new()
        }
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishMode {
    Simple,
    Complex,
}

impl PublishMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Complex => "complex",
        }
    }
}

impl std::fmt::Display for PublishMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Slug generation settings. Each key is resolved independently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlugConfig {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional"
    )]
    pub encoding: Option<SlugEncoding>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional"
    )]
    pub clean_accents: Option<bool>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional"
    )]
    pub sanitize_replacement: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlugEncoding {
    Unicode,
    Ascii,
}

/// A collection of entries, stored either as a folder of files, a fixed
/// list of files, or (with `path`) one templated path per entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional"
    )]
    pub folder: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional"
    )]
    pub files: Option<Vec<CollectionFile>>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional"
    )]
    pub media_folder: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional"
    )]
    pub public_folder: Option<String>,

    /// Entry path template, e.g. `{{slug}}/index`.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional"
    )]
    pub path: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Collection {
    pub fn folder(folder: impl Into<String>) -> Self {
        Self {
            folder: Some(folder.into()),
            ..Self::default()
        }
    }

    pub fn files(files: Vec<CollectionFile>) -> Self {
        Self {
            files: Some(files),
            ..Self::default()
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.extra.get("name").and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionFile {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional"
    )]
    pub file: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CollectionFile {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: Some(file.into()),
            extra: Map::new(),
        }
    }
}

/// Git backend selection. `proxy_url` is only meaningful for the `proxy` backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional"
    )]
    pub name: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional"
    )]
    pub repo: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional"
    )]
    pub branch: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional"
    )]
    pub proxy_url: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `local_backend` key: either a plain switch or an explicit proxy endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocalBackend {
    Enabled(bool),
    Custom(LocalBackendOptions),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalBackendOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl LocalBackend {
    pub fn with_url(url: impl Into<String>) -> Self {
        Self::Custom(LocalBackendOptions {
            url: Some(url.into()),
        })
    }

    /// Whether this setting asks for a proxy probe regardless of host.
    ///
    /// `false` is the only value that does not; an options object always does,
    /// even without a `url`.
    pub fn is_enabled(&self) -> bool {
        match self {
            Self::Enabled(enabled) => *enabled,
            Self::Custom(_) => true,
        }
    }

    /// Explicit proxy endpoint, if one was configured.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Enabled(_) => None,
            Self::Custom(options) => options.url.as_deref(),
        }
    }
}

impl From<bool> for LocalBackend {
    fn from(enabled: bool) -> Self {
        Self::Enabled(enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_keys_survive_round_trip() {
        let json = r#"{
            "foo": "bar",
            "site_url": "https://example.com",
            "collections": [{"name": "posts", "folder": "content/posts", "fields": []}]
        }"#;
        let config: ProjectConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.extra.get("foo"), Some(&Value::from("bar")));
        assert_eq!(config.collections[0].name(), Some("posts"));
        assert!(config.collections[0].extra.contains_key("fields"));

        let back = serde_json::to_value(&config).unwrap();
        assert_eq!(back["site_url"], "https://example.com");
        assert_eq!(back["collections"][0]["folder"], "content/posts");
    }

    #[test]
    fn test_absent_keys_are_not_serialized() {
        let config = ProjectConfig::with_collections(vec![Collection::folder("foo")]);
        let back = serde_json::to_value(&config).unwrap();
        assert_eq!(back, serde_json::json!({ "collections": [{ "folder": "foo" }] }));
    }

    #[test]
    fn test_collections_are_required() {
        let result = serde_json::from_str::<ProjectConfig>(r#"{"media_folder": "static"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_optional_keys_are_unset() {
        let json = r#"{
            "publish_mode": "draft",
            "media_folder": 42,
            "collections": [{"folder": 5, "path": "{{slug}}"}]
        }"#;
        let config: ProjectConfig = serde_json::from_str(json).unwrap();
        assert!(config.publish_mode.is_none());
        assert!(config.media_folder.is_none());
        assert!(config.collections[0].folder.is_none());
        assert_eq!(config.collections[0].path.as_deref(), Some("{{slug}}"));
    }

    #[test]
    fn test_local_backend_forms() {
        let enabled: LocalBackend = serde_json::from_str("true").unwrap();
        assert_eq!(enabled, LocalBackend::Enabled(true));
        assert!(enabled.is_enabled());
        assert!(enabled.url().is_none());

        let disabled: LocalBackend = serde_json::from_str("false").unwrap();
        assert!(!disabled.is_enabled());

        let custom: LocalBackend =
            serde_json::from_str(r#"{"url": "http://localhost:8082/api/v1"}"#).unwrap();
        assert!(custom.is_enabled());
        assert_eq!(custom.url(), Some("http://localhost:8082/api/v1"));

        let bare: LocalBackend = serde_json::from_str("{}").unwrap();
        assert!(bare.is_enabled());
        assert!(bare.url().is_none());
    }

    #[test]
    fn test_publish_mode_display() {
        assert_eq!(PublishMode::Simple.to_string(), "simple");
        assert_eq!(PublishMode::Complex.as_str(), "complex");
    }
}
