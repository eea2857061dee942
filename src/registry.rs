//! Injectable adapter registry.
//!
//! The registry maps operation names to type-erased call adapters. It is an
//! explicit, injectable value rather than process-wide static state: callers
//! construct one, register the endpoints they need, and hand it to
//! [`Client::invoke`](crate::Client::invoke) for by-name dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::client::Client;
use crate::endpoint::Endpoint;
use crate::error::{ClientError, Result};

/// Type-erased call adapter: JSON params in, JSON result out.
#[async_trait]
pub trait CallAdapter: Send + Sync {
    /// Execute the operation against the given client.
    async fn call(&self, client: &Client, params: serde_json::Value)
    -> Result<serde_json::Value>;
}

/// Registry of named call adapters.
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: RwLock<HashMap<String, Arc<dyn CallAdapter>>>,
}

impl AdapterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a typed endpoint under its operation name.
    ///
    /// Replaces any adapter previously registered under the same name.
    pub fn register<E>(&self, endpoint: E)
    where
        E: Endpoint + 'static,
        E::Params: DeserializeOwned,
        E::Output: Serialize + Send,
    {
        let name = endpoint.name().to_string();
        self.adapters
            .write()
            .insert(name, Arc::new(EndpointAdapter(endpoint)));
    }

    /// Look up the adapter for an operation name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn CallAdapter>> {
        self.adapters.read().get(name).cloned()
    }

    /// Names of all registered operations.
    pub fn operation_names(&self) -> Vec<String> {
        self.adapters.read().keys().cloned().collect()
    }
}

/// Adapter erasing a typed [`Endpoint`] behind JSON values.
struct EndpointAdapter<E>(E);

#[async_trait]
impl<E> CallAdapter for EndpointAdapter<E>
where
    E: Endpoint + 'static,
    E::Params: DeserializeOwned,
    E::Output: Serialize + Send,
{
    async fn call(
        &self,
        client: &Client,
        params: serde_json::Value,
    ) -> Result<serde_json::Value> {
        let params: E::Params = serde_json::from_value(params)
            .map_err(|e| ClientError::invalid_argument("params", e.to_string()))?;
        let output = client.call(&self.0, &params).await?;
        serde_json::to_value(output).map_err(|e| ClientError::Json(e.to_string()))
    }
}
