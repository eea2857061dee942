//! Declarative endpoint definitions.
//!
//! An [`Endpoint`] describes one client operation: it names the operation,
//! builds a [`RequestTemplate`] from a typed params model, and decodes the
//! typed response. One endpoint value is reusable across calls and clients.

use http::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;

use crate::error::Result;
use crate::request::RequestTemplate;
use crate::response::Response;

/// A declarative endpoint definition.
pub trait Endpoint: Send + Sync {
    /// Request model supplied by the caller.
    type Params: Send + Sync;
    /// Decoded response type.
    type Output: DeserializeOwned;

    /// Operation name, used as the registry key and in logging.
    fn name(&self) -> &str;

    /// Build the outbound request template for a set of parameters.
    fn request(&self, params: &Self::Params) -> Result<RequestTemplate>;

    /// Decode the response.
    ///
    /// Default: require a success status, then parse the body as JSON.
    fn decode(&self, response: Response) -> Result<Self::Output> {
        response.error_for_status()?.into_json()
    }
}

/// A JSON-in/JSON-out endpoint over a path template.
///
/// GET and DELETE operations map the params model onto query parameters;
/// other methods serialize it as the JSON body. Covers the common case
/// without a hand-written [`Endpoint`] impl.
pub struct JsonEndpoint<P, O> {
    name: String,
    method: Method,
    path: String,
    _marker: PhantomData<fn(P) -> O>,
}

impl<P, O> JsonEndpoint<P, O> {
    /// Define an endpoint with the given operation name, method, and path
    /// template.
    pub fn new(name: impl Into<String>, method: Method, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method,
            path: path.into(),
            _marker: PhantomData,
        }
    }

    /// The path template this endpoint targets.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl<P, O> Endpoint for JsonEndpoint<P, O>
where
    P: Serialize + Send + Sync,
    O: DeserializeOwned + Send,
{
    type Params = P;
    type Output = O;

    fn name(&self) -> &str {
        &self.name
    }

    fn request(&self, params: &P) -> Result<RequestTemplate> {
        let template = RequestTemplate::new(self.method.clone(), self.path.clone());
        if self.method == Method::GET || self.method == Method::DELETE || self.method == Method::HEAD
        {
            template.query_model(params)
        } else {
            template.json(params)
        }
    }
}
