use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Baked in at build time; a WASM bundle has no process environment.
const BUILD_API_URL: Option<&str> = option_env!("INTELLIDASH_API_URL");

/// Where the API lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    base_url: String,
    timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// `INTELLIDASH_API_URL` from the build environment, else [`DEFAULT_API_URL`].
    pub fn from_env() -> Self {
        let url = BUILD_API_URL
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(DEFAULT_API_URL);
        Self::new(url)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slashes_trimmed() {
        let config = ClientConfig::new("http://api.local:5000//");
        assert_eq!(config.base_url(), "http://api.local:5000");
        assert_eq!(config.url("/api/auth/me"), "http://api.local:5000/api/auth/me");
        assert_eq!(config.url("api/auth/me"), "http://api.local:5000/api/auth/me");
    }

    #[test]
    fn test_default_timeout() {
        let config = ClientConfig::new(DEFAULT_API_URL);
        assert_eq!(config.timeout(), Duration::from_secs(15));
        let config = config.with_timeout(Duration::from_millis(200));
        assert_eq!(config.timeout(), Duration::from_millis(200));
    }
}
