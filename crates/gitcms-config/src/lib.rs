//! gitcms-config: project configuration for the gitcms admin.
//!
//! This crate provides:
//! - `ProjectConfig` and friends - the config tree as loaded from `config.yml`
//! - `apply_defaults` - pure default resolution over a loaded config
//! - `detect_proxy_server` / `handle_local_backend` - local git proxy discovery
//! - `FileStore` - JSON/YAML config loading behind the `Loader` trait

pub mod defaults;
pub mod error;
mod lenient;
pub mod loader;
pub mod proxy;
pub mod types;

pub use defaults::{DEFAULT_SANITIZE_REPLACEMENT, apply_defaults};
pub use error::{ConfigError, SyntaxError};
pub use loader::{FileStore, Loader, parse_json, parse_yaml, to_yaml};
pub use proxy::{
    DEFAULT_PROXY_URL, LOCALHOST, PROXY_BACKEND, ProxyClient, ProxyError, detect_proxy_server,
    handle_local_backend,
};
pub use types::{
    BackendConfig, Collection, CollectionFile, LocalBackend, LocalBackendOptions, ProjectConfig,
    PublishMode, SlugConfig, SlugEncoding,
};
