use std::env;

/// Generation backend configuration.
///
/// Reads from the `CADENCE_BACKEND_URL` environment variable, falling back
/// to `http://localhost:8000` when unset.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the backend, without a trailing slash.
    pub base_url: String,
    /// Optional per-request timeout in seconds. `None` means requests wait
    /// as long as the backend takes (generation calls run tens of seconds).
    pub timeout_secs: Option<u64>,
}

impl BackendConfig {
    /// The default base URL used when no environment variable is set.
    pub const DEFAULT_URL: &str = "http://localhost:8000";

    /// Build a config from the environment.
    ///
    /// Priority: `CADENCE_BACKEND_URL` / `CADENCE_BACKEND_TIMEOUT_SECS`
    /// env vars, then the compile-time defaults.
    pub fn from_env() -> Self {
        let base_url =
            env::var("CADENCE_BACKEND_URL").unwrap_or_else(|_| Self::DEFAULT_URL.to_owned());
        let timeout_secs = env::var("CADENCE_BACKEND_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok());
        Self {
            base_url: normalize_base_url(base_url),
            timeout_secs,
        }
    }

    /// Build a config from an explicit URL (useful for tests and CLI flags).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(base_url.into()),
            timeout_secs: None,
        }
    }

    /// Full URL for an endpoint path relative to the base.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

fn normalize_base_url(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_url() {
        let cfg = BackendConfig::new(BackendConfig::DEFAULT_URL);
        assert_eq!(cfg.base_url, "http://localhost:8000");
    }

    #[test]
    fn endpoint_join() {
        let cfg = BackendConfig::new("http://localhost:8000");
        assert_eq!(
            cfg.endpoint("extract_content"),
            "http://localhost:8000/extract_content"
        );
        assert_eq!(
            cfg.endpoint("/config/instagram_agent"),
            "http://localhost:8000/config/instagram_agent"
        );
    }

    #[test]
    fn trailing_slash_stripped() {
        let cfg = BackendConfig::new("http://backend.example/");
        assert_eq!(cfg.base_url, "http://backend.example");
        assert_eq!(cfg.endpoint("generate_image"), "http://backend.example/generate_image");
    }

    #[test]
    fn explicit_new_has_no_timeout() {
        let cfg = BackendConfig::new("http://remotehost:9000");
        assert_eq!(cfg.base_url, "http://remotehost:9000");
        assert!(cfg.timeout_secs.is_none());
    }
}
