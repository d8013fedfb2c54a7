//! Local git proxy discovery.
//!
//! During local development the admin can talk to a proxy server that reads
//! and writes the working copy directly instead of going through a git host.
//! Detection is a single `info` request; any failure means "no proxy".

use std::future::Future;

use serde_json::{Value, json};

use crate::types::{BackendConfig, LocalBackend, ProjectConfig};

/// Endpoint probed when no explicit `local_backend.url` is configured.
pub const DEFAULT_PROXY_URL: &str = "http://localhost:8081/api/v1";

/// Host name on which the probe runs without being asked to.
pub const LOCALHOST: &str = "localhost";

/// Backend name switched to when a proxy answers.
pub const PROXY_BACKEND: &str = "proxy";

/// Errors from a proxy round trip. Never surfaced by [`detect_proxy_server`].
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum ProxyError {
    /// Request could not be sent or no response arrived.
    #[error("proxy request failed: {0}")]
    Request(String),

    /// Response body was not JSON.
    #[error("proxy response was not JSON: {0}")]
    Decode(String),
}

/// The network capability the detector needs: POST a JSON body, decode a JSON reply.
///
/// Implemented for `reqwest::Client`; tests substitute their own.
pub trait ProxyClient {
    fn post_json(
        &self,
        url: &str,
        body: &Value,
    ) -> impl Future<Output = Result<Value, ProxyError>> + Send;
}

impl ProxyClient for reqwest::Client {
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, ProxyError> {
        let response = self
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| ProxyError::Request(e.to_string()))?;

        response
            .json::<Value>()
            .await
            .map_err(|e| ProxyError::Decode(e.to_string()))
    }
}

/// Probe for a local proxy server.
///
/// Runs only when `hostname` is `localhost` or `options` is enabled; otherwise
/// returns `None` without touching the network. Returns the probed URL when the
/// server reports a non-empty `repo`.
pub async fn detect_proxy_server<C: ProxyClient>(
    hostname: &str,
    options: Option<&LocalBackend>,
    client: &C,
) -> Option<String> {
    let forced = options.is_some_and(LocalBackend::is_enabled);
    if hostname != LOCALHOST && !forced {
        return None;
    }

    let url = options
        .and_then(LocalBackend::url)
        .unwrap_or(DEFAULT_PROXY_URL);

    let info = match client.post_json(url, &json!({ "action": "info" })).await {
        Ok(info) => info,
        Err(err) => {
            tracing::debug!(%url, error = %err, "no local proxy server");
            return None;
        }
    };

    match info.get("repo").and_then(Value::as_str) {
        Some(repo) if !repo.is_empty() => {
            tracing::debug!(%url, %repo, "detected local proxy server");
            Some(url.to_owned())
        }
        _ => {
            tracing::debug!(%url, "proxy server response has no repo");
            None
        }
    }
}

/// Point the backend at a local proxy when `local_backend` is enabled and one answers.
///
/// The backend's other keys (`repo`, `branch`, ...) are kept.
pub async fn handle_local_backend<C: ProxyClient>(
    mut config: ProjectConfig,
    hostname: &str,
    client: &C,
) -> ProjectConfig {
    let Some(local_backend) = config
        .local_backend
        .clone()
        .filter(LocalBackend::is_enabled)
    else {
        return config;
    };

    let Some(proxy_url) = detect_proxy_server(hostname, Some(&local_backend), client).await else {
        return config;
    };

    let backend = config.backend.get_or_insert_with(BackendConfig::default);
    tracing::info!(
        previous = backend.name.as_deref().unwrap_or("none"),
        %proxy_url,
        "using local proxy backend"
    );
    backend.name = Some(PROXY_BACKEND.to_owned());
    backend.proxy_url = Some(proxy_url);

    config
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Records every call and answers with a canned result.
    struct FakeClient {
        reply: fn() -> Result<Value, ProxyError>,
        calls: Mutex<Vec<(String, Value)>>,
    }

    impl FakeClient {
        fn new(reply: fn() -> Result<Value, ProxyError>) -> Self {
            Self {
                reply,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(String, Value)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ProxyClient for FakeClient {
        async fn post_json(&self, url: &str, body: &Value) -> Result<Value, ProxyError> {
            self.calls
                .lock()
                .unwrap()
                .push((url.to_owned(), body.clone()));
            (self.reply)()
        }
    }

    fn info_request() -> Value {
        json!({ "action": "info" })
    }

    #[tokio::test]
    async fn test_not_localhost_makes_no_request() {
        let client = FakeClient::new(|| Ok(json!({ "repo": "test-repo" })));
        assert_eq!(detect_proxy_server("www.example.com", None, &client).await, None);
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_disabled_option_on_remote_host_makes_no_request() {
        let client = FakeClient::new(|| Ok(json!({ "repo": "test-repo" })));
        let options = LocalBackend::Enabled(false);
        assert_eq!(
            detect_proxy_server("cms.example.com", Some(&options), &client).await,
            None
        );
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_request_failure_is_none() {
        let client = FakeClient::new(|| Err(ProxyError::Request("connection refused".into())));
        let options = LocalBackend::Enabled(true);
        assert_eq!(detect_proxy_server(LOCALHOST, Some(&options), &client).await, None);
        assert_eq!(
            client.calls(),
            vec![(DEFAULT_PROXY_URL.to_owned(), info_request())]
        );
    }

    #[tokio::test]
    async fn test_non_string_repo_is_none() {
        let client = FakeClient::new(|| Ok(json!({ "repo": [] })));
        let options = LocalBackend::Enabled(true);
        assert_eq!(detect_proxy_server(LOCALHOST, Some(&options), &client).await, None);
        assert_eq!(client.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_repo_is_none() {
        let client = FakeClient::new(|| Ok(json!({ "repo": "" })));
        assert_eq!(detect_proxy_server(LOCALHOST, None, &client).await, None);
        assert_eq!(client.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_valid_response_returns_default_url() {
        let client = FakeClient::new(|| Ok(json!({ "repo": "test-repo", "type": "local_git" })));
        let options = LocalBackend::Enabled(true);
        assert_eq!(
            detect_proxy_server(LOCALHOST, Some(&options), &client).await,
            Some(DEFAULT_PROXY_URL.to_owned())
        );
        assert_eq!(
            client.calls(),
            vec![(DEFAULT_PROXY_URL.to_owned(), info_request())]
        );
    }

    #[tokio::test]
    async fn test_custom_url_is_probed_and_returned() {
        let url = "http://localhost:8082/api/v1";
        let client = FakeClient::new(|| Ok(json!({ "repo": "test-repo" })));
        let options = LocalBackend::with_url(url);
        assert_eq!(
            detect_proxy_server(LOCALHOST, Some(&options), &client).await,
            Some(url.to_owned())
        );
        assert_eq!(client.calls(), vec![(url.to_owned(), info_request())]);
    }

    #[tokio::test]
    async fn test_forced_probe_on_remote_host() {
        let client = FakeClient::new(|| Ok(json!({ "repo": "test-repo" })));
        let options = LocalBackend::Enabled(true);
        assert_eq!(
            detect_proxy_server("192.168.1.20", Some(&options), &client).await,
            Some(DEFAULT_PROXY_URL.to_owned())
        );
    }

    #[tokio::test]
    async fn test_handle_local_backend_switches_to_proxy() {
        let client = FakeClient::new(|| Ok(json!({ "repo": "site" })));
        let mut config = ProjectConfig::new();
        config.local_backend = Some(LocalBackend::Enabled(true));
        config.backend = Some(BackendConfig {
            name: Some("github".into()),
            repo: Some("owner/site".into()),
            ..BackendConfig::default()
        });

        let resolved = handle_local_backend(config, LOCALHOST, &client).await;
        let backend = resolved.backend.unwrap();
        assert_eq!(backend.name.as_deref(), Some(PROXY_BACKEND));
        assert_eq!(backend.proxy_url.as_deref(), Some(DEFAULT_PROXY_URL));
        assert_eq!(backend.repo.as_deref(), Some("owner/site"));
    }

    #[tokio::test]
    async fn test_handle_local_backend_without_setting_makes_no_request() {
        let client = FakeClient::new(|| Ok(json!({ "repo": "site" })));
        let config = ProjectConfig::new();
        let resolved = handle_local_backend(config.clone(), LOCALHOST, &client).await;
        assert_eq!(resolved, config);
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_handle_local_backend_keeps_backend_when_no_proxy() {
        let client = FakeClient::new(|| Err(ProxyError::Decode("expected value".into())));
        let mut config = ProjectConfig::new();
        config.local_backend = Some(LocalBackend::Enabled(true));
        config.backend = Some(BackendConfig {
            name: Some("git-gateway".into()),
            ..BackendConfig::default()
        });

        let resolved = handle_local_backend(config.clone(), LOCALHOST, &client).await;
        assert_eq!(resolved, config);
        assert_eq!(client.calls().len(), 1);
    }
}
