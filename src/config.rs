//! Client configuration.

use std::env;
use std::time::Duration;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL joined with every endpoint path.
    pub base_url: Option<String>,
    /// Default request timeout.
    pub timeout: Duration,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Retry-timeout sequence: index `i` is the delay before retry `i + 1`.
    /// Empty means a single attempt per call.
    pub retry_timeouts: Vec<Duration>,
    /// Default headers for all requests.
    pub default_headers: Vec<(String, String)>,
    /// User agent string.
    pub user_agent: String,
    /// Enable gzip compression.
    pub gzip: bool,
    /// Enable brotli compression.
    pub brotli: bool,
    /// Follow redirects.
    pub follow_redirects: bool,
    /// Maximum redirects to follow.
    pub max_redirects: usize,
    /// Connection pool idle timeout.
    pub pool_idle_timeout: Duration,
    /// Maximum idle connections per host.
    pub pool_max_idle_per_host: usize,
    /// Outbound proxy URL.
    pub proxy_url: Option<String>,
    /// Basic credentials applied to every request.
    pub basic_credentials: Option<(String, String)>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            retry_timeouts: Vec::new(),
            default_headers: Vec::new(),
            user_agent: format!("restbind/{}", env!("CARGO_PKG_VERSION")),
            gzip: true,
            brotli: true,
            follow_redirects: true,
            max_redirects: 10,
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 32,
            proxy_url: None,
            basic_credentials: None,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Apply overrides from `RESTBIND_*` environment variables.
    ///
    /// Recognized: `RESTBIND_BASE_URL`, `RESTBIND_TIMEOUT_MS`,
    /// `RESTBIND_CONNECT_TIMEOUT_MS`, `RESTBIND_RETRY_TIMEOUTS_MS` (comma
    /// separated), `RESTBIND_PROXY_URL`, `RESTBIND_USER_AGENT`. Unset or
    /// unparsable variables leave the existing value in place.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = env::var("RESTBIND_BASE_URL") {
            self.base_url = Some(url);
        }
        if let Some(ms) = env_millis("RESTBIND_TIMEOUT_MS") {
            self.timeout = ms;
        }
        if let Some(ms) = env_millis("RESTBIND_CONNECT_TIMEOUT_MS") {
            self.connect_timeout = ms;
        }
        if let Ok(list) = env::var("RESTBIND_RETRY_TIMEOUTS_MS") {
            let parsed: Option<Vec<Duration>> = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| s.parse::<u64>().ok().map(Duration::from_millis))
                .collect();
            if let Some(timeouts) = parsed {
                self.retry_timeouts = timeouts;
            }
        }
        if let Ok(url) = env::var("RESTBIND_PROXY_URL") {
            self.proxy_url = Some(url);
        }
        if let Ok(agent) = env::var("RESTBIND_USER_AGENT") {
            self.user_agent = agent;
        }
        self
    }
}

fn env_millis(key: &str) -> Option<Duration> {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Builder for client configuration.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the base URL joined with every endpoint path.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Set the default request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the retry-timeout sequence.
    pub fn retry_timeouts(mut self, timeouts: impl Into<Vec<Duration>>) -> Self {
        self.config.retry_timeouts = timeouts.into();
        self
    }

    /// Add a default header for all requests.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.push((name.into(), value.into()));
        self
    }

    /// Set the user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Enable or disable gzip compression.
    pub fn gzip(mut self, enable: bool) -> Self {
        self.config.gzip = enable;
        self
    }

    /// Enable or disable brotli compression.
    pub fn brotli(mut self, enable: bool) -> Self {
        self.config.brotli = enable;
        self
    }

    /// Enable or disable following redirects.
    pub fn follow_redirects(mut self, enable: bool) -> Self {
        self.config.follow_redirects = enable;
        self
    }

    /// Set the maximum number of redirects to follow.
    pub fn max_redirects(mut self, max: usize) -> Self {
        self.config.max_redirects = max;
        self
    }

    /// Set the connection pool idle timeout.
    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.pool_idle_timeout = timeout;
        self
    }

    /// Set the maximum idle connections per host.
    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.config.pool_max_idle_per_host = max;
        self
    }

    /// Route all requests through the given proxy.
    pub fn proxy_url(mut self, url: impl Into<String>) -> Self {
        self.config.proxy_url = Some(url.into());
        self
    }

    /// Apply basic credentials to every request.
    pub fn basic_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.config.basic_credentials = Some((username.into(), password.into()));
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}
