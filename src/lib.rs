//! # restbind
//!
//! A declarative HTTP client: describe an endpoint once — method, path
//! template, typed query/body mapping, response shape — and call it as a
//! typed operation. Every call runs through a retrying execute strategy
//! with a configurable failure classification.
//!
//! ## Features
//!
//! - **Execute Strategy**: retry loop over an opaque unit of work, with a
//!   fixed retry-timeout sequence, overridable classification, and
//!   retrying/rethrowing hooks; synchronous and asynchronous variants
//! - **Declarative Endpoints**: typed endpoint definitions instead of
//!   hand-rolled request code
//! - **Request Templates**: `{name}` path placeholders, typed query models,
//!   JSON/form bodies, auth helpers
//! - **Adapter Registry**: injectable by-name dispatch for dynamically
//!   resolved operations
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use restbind::{Client, ClientConfig, JsonEndpoint};
//! use http::Method;
//! use serde::{Deserialize, Serialize};
//! use std::time::Duration;
//!
//! #[derive(Serialize)]
//! struct ListParams {
//!     page: u32,
//! }
//!
//! #[derive(Deserialize)]
//! struct Item {
//!     id: u32,
//!     name: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::builder()
//!         .base_url("https://api.example.com")
//!         .retry_timeouts(vec![Duration::from_millis(100), Duration::from_millis(200)])
//!         .build();
//!     let client = Client::new(config)?;
//!
//!     let list_items: JsonEndpoint<ListParams, Vec<Item>> =
//!         JsonEndpoint::new("list_items", Method::GET, "/items");
//!
//!     // Transient failures are retried per the timeout sequence; usage and
//!     // semantic HTTP errors surface immediately.
//!     let items = client.call(&list_items, &ListParams { page: 1 }).await?;
//!     println!("fetched {} items", items.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Standalone retry
//!
//! The execute strategy is transport-agnostic and usable on its own:
//!
//! ```rust
//! use restbind::{ClientError, ExecuteStrategy};
//! use std::time::Duration;
//!
//! let strategy = ExecuteStrategy::new(vec![Duration::from_millis(10)]);
//! let result: Result<u32, ClientError> = strategy.execute(21, |n| Ok(n * 2));
//! assert_eq!(result.unwrap(), 42);
//! ```

mod client;
mod config;
mod endpoint;
mod error;
mod registry;
mod request;
mod response;
mod strategy;

pub use client::Client;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use endpoint::{Endpoint, JsonEndpoint};
pub use error::{ClientError, Result};
pub use registry::{AdapterRegistry, CallAdapter};
pub use request::RequestTemplate;
pub use response::Response;
pub use strategy::{
    AsyncExecuteStrategy, Cancelled, DefaultRetryPolicy, ExecuteStrategy, RetryPolicy,
};

// Re-export common types
pub use http::{HeaderMap, HeaderValue, Method, StatusCode, header};
pub use tokio_util::sync::CancellationToken;
pub use url::Url;

/// Prelude for common imports.
///
/// ```
/// use restbind::prelude::*;
/// ```
pub mod prelude {
    pub use crate::client::Client;
    pub use crate::config::{ClientConfig, ClientConfigBuilder};
    pub use crate::endpoint::{Endpoint, JsonEndpoint};
    pub use crate::error::{ClientError, Result};
    pub use crate::registry::{AdapterRegistry, CallAdapter};
    pub use crate::request::RequestTemplate;
    pub use crate::response::Response;
    pub use crate::strategy::{
        AsyncExecuteStrategy, DefaultRetryPolicy, ExecuteStrategy, RetryPolicy,
    };
    pub use http::{HeaderMap, HeaderValue, Method, StatusCode, header};
    pub use tokio_util::sync::CancellationToken;
}
