//! The bound HTTP client.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::ClientConfig;
use crate::endpoint::Endpoint;
use crate::error::{ClientError, Result};
use crate::registry::AdapterRegistry;
use crate::request::RequestTemplate;
use crate::response::Response;
use crate::strategy::{AsyncExecuteStrategy, DefaultRetryPolicy, RetryPolicy};

/// HTTP client executing declarative endpoints through a retrying execute
/// strategy.
#[derive(Clone)]
pub struct Client {
    inner: reqwest::Client,
    config: Arc<ClientConfig>,
    strategy: AsyncExecuteStrategy<Arc<dyn RetryPolicy<ClientError>>>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a client with the given configuration and the default retry
    /// policy.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_policy(config, Arc::new(DefaultRetryPolicy))
    }

    /// Create a client with a custom retry policy.
    ///
    /// The policy replaces the default classification entirely and receives
    /// the retrying/rethrowing hook calls.
    pub fn with_policy(
        config: ClientConfig,
        policy: Arc<dyn RetryPolicy<ClientError>>,
    ) -> Result<Self> {
        let inner = build_transport(&config)?;
        let strategy = AsyncExecuteStrategy::with_policy(config.retry_timeouts.clone(), policy);

        Ok(Self {
            inner,
            config: Arc::new(config),
            strategy,
        })
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Call a declarative endpoint.
    ///
    /// The whole build/send/decode pipeline is the unit of work handed to the
    /// execute strategy, so each retry rebuilds the request from the template.
    pub async fn call<E: Endpoint>(&self, endpoint: &E, params: &E::Params) -> Result<E::Output> {
        self.strategy
            .execute((self, endpoint, params), |(client, endpoint, params)| async move {
                let template = endpoint.request(params)?;
                let response = client.send_once(&template).await?;
                endpoint.decode(response)
            })
            .await
    }

    /// Call a declarative endpoint with cancellation support.
    ///
    /// A cancellation request aborts any pending inter-attempt delay and
    /// surfaces as [`ClientError::Cancelled`].
    pub async fn call_cancellable<E: Endpoint>(
        &self,
        endpoint: &E,
        params: &E::Params,
        token: &CancellationToken,
    ) -> Result<E::Output> {
        self.strategy
            .execute_cancellable(
                (self, endpoint, params),
                |(client, endpoint, params)| async move {
                    let template = endpoint.request(params)?;
                    let response = client.send_once(&template).await?;
                    endpoint.decode(response)
                },
                token,
            )
            .await
    }

    /// Send a raw request template, with retries.
    pub async fn send(&self, template: &RequestTemplate) -> Result<Response> {
        self.strategy
            .execute((self, template), |(client, template)| async move {
                client.send_once(template).await
            })
            .await
    }

    /// Invoke an operation by name through an adapter registry.
    ///
    /// An operation with no registered adapter is a usage error on the
    /// `action` parameter; the unit of work is never invoked.
    pub async fn invoke(
        &self,
        registry: &AdapterRegistry,
        operation: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value> {
        let Some(adapter) = registry.get(operation) else {
            return Err(ClientError::invalid_argument(
                "action",
                format!("no adapter registered for operation `{operation}`"),
            ));
        };
        adapter.call(self, params).await
    }

    /// One transport attempt: resolve, send, buffer.
    async fn send_once(&self, template: &RequestTemplate) -> Result<Response> {
        let url = template.build_url(self.config.base_url.as_deref())?;

        let mut request = self.inner.request(template.method().clone(), url.clone());

        for (name, value) in &self.config.default_headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some((username, password)) = &self.config.basic_credentials {
            request = request.basic_auth(username, Some(password));
        }
        for (name, value) in template.headers() {
            request = request.header(name, value);
        }
        if let Some(body) = template.body_bytes() {
            request = request.body(body.to_vec());
        }
        if let Some(timeout) = template.timeout_override() {
            request = request.timeout(timeout);
        }

        debug!(method = %template.method(), url = %url, "sending request");
        let response = request
            .send()
            .await
            .map_err(|e| self.classify_transport(e))?;
        Response::from_reqwest(response).await
    }

    /// Fold transport failures into the client taxonomy.
    fn classify_transport(&self, error: reqwest::Error) -> ClientError {
        if error.is_timeout() {
            ClientError::Timeout(self.config.timeout)
        } else if error.is_connect() {
            ClientError::Connection(error.to_string())
        } else {
            ClientError::Transport(error)
        }
    }
}

fn build_transport(config: &ClientConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .pool_idle_timeout(config.pool_idle_timeout)
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .user_agent(&config.user_agent);

    if config.gzip {
        builder = builder.gzip(true);
    }
    if config.brotli {
        builder = builder.brotli(true);
    }
    builder = if config.follow_redirects {
        builder.redirect(reqwest::redirect::Policy::limited(config.max_redirects))
    } else {
        builder.redirect(reqwest::redirect::Policy::none())
    };

    if let Some(proxy_url) = &config.proxy_url {
        let mut proxy = reqwest::Proxy::all(proxy_url)
            .map_err(|e| ClientError::invalid_argument("proxy_url", e.to_string()))?;
        if let Some((username, password)) = &config.basic_credentials {
            proxy = proxy.basic_auth(username, password);
        }
        builder = builder.proxy(proxy);
    }

    builder.build().map_err(ClientError::Transport)
}
