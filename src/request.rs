//! Declarative request templates.
//!
//! A [`RequestTemplate`] is the statically typed mapping layer between a
//! request model and the outbound HTTP request: `{name}` path placeholders,
//! typed query models, JSON/form bodies, and auth headers. Templates are plain
//! data; the client turns them into transport requests at send time.

use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::Serialize;
use std::time::Duration;

use crate::error::{ClientError, Result};

/// Declarative outbound request description.
#[derive(Debug, Clone)]
pub struct RequestTemplate {
    method: Method,
    path: String,
    path_params: Vec<(String, String)>,
    headers: HeaderMap,
    query: Vec<(String, String)>,
    body: Option<Vec<u8>>,
    timeout: Option<Duration>,
}

impl RequestTemplate {
    /// Create a template for the given method and path.
    ///
    /// The path may contain `{name}` placeholders resolved via
    /// [`path_param`](Self::path_param).
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            path_params: Vec::new(),
            headers: HeaderMap::new(),
            query: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    /// Create a GET template.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Create a POST template.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Create a PUT template.
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// Create a PATCH template.
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    /// Create a DELETE template.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Supply a value for a `{name}` path placeholder.
    pub fn path_param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.path_params.push((name.into(), value.to_string()));
        self
    }

    /// Add a header to the request.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_ref()),
            HeaderValue::try_from(value.as_ref()),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Add a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Map a typed model onto query parameters.
    ///
    /// Each serializable field becomes one query pair.
    pub fn query_model<T: Serialize>(mut self, model: &T) -> Result<Self> {
        let encoded = serde_urlencoded::to_string(model)
            .map_err(|e| ClientError::invalid_argument("query", e.to_string()))?;
        for (key, value) in url::form_urlencoded::parse(encoded.as_bytes()) {
            self.query.push((key.into_owned(), value.into_owned()));
        }
        Ok(self)
    }

    /// Set the request body as raw bytes.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize a model as the JSON request body.
    pub fn json<T: Serialize>(mut self, model: &T) -> Result<Self> {
        let bytes = serde_json::to_vec(model).map_err(|e| ClientError::Json(e.to_string()))?;
        self.headers.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        self.body = Some(bytes);
        Ok(self)
    }

    /// Serialize a model as a form-urlencoded request body.
    pub fn form<T: Serialize>(mut self, model: &T) -> Result<Self> {
        let encoded = serde_urlencoded::to_string(model)
            .map_err(|e| ClientError::invalid_argument("form", e.to_string()))?;
        self.headers.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        self.body = Some(encoded.into_bytes());
        Ok(self)
    }

    /// Set a per-request timeout overriding the client default.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set bearer authentication.
    pub fn bearer_auth(self, token: impl AsRef<str>) -> Self {
        self.header("Authorization", format!("Bearer {}", token.as_ref()))
    }

    /// Set basic authentication.
    pub fn basic_auth(self, username: impl AsRef<str>, password: impl AsRef<str>) -> Self {
        use base64::Engine;
        let credentials = format!("{}:{}", username.as_ref(), password.as_ref());
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
        self.header("Authorization", format!("Basic {encoded}"))
    }

    /// The request method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The request body, if any.
    pub fn body_bytes(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// The per-request timeout override, if any.
    pub fn timeout_override(&self) -> Option<Duration> {
        self.timeout
    }

    /// Resolve `{name}` placeholders against the supplied path parameters.
    ///
    /// An unresolved placeholder is a usage error naming the placeholder.
    pub fn resolve_path(&self) -> Result<String> {
        let mut resolved = self.path.clone();
        for (name, value) in &self.path_params {
            resolved = resolved.replace(&format!("{{{name}}}"), value);
        }

        if let (Some(start), Some(end)) = (resolved.find('{'), resolved.find('}'))
            && start < end
        {
            return Err(ClientError::invalid_argument(
                "path",
                format!("unresolved placeholder `{}`", &resolved[start + 1..end]),
            ));
        }

        Ok(resolved)
    }

    /// Build the full request URL, joining against `base` when present.
    pub fn build_url(&self, base: Option<&str>) -> Result<url::Url> {
        let path = self.resolve_path()?;

        let mut url = if let Some(base) = base {
            let base = url::Url::parse(base).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
            base.join(&path)
                .map_err(|e| ClientError::InvalidUrl(e.to_string()))?
        } else {
            url::Url::parse(&path).map_err(|e| ClientError::InvalidUrl(e.to_string()))?
        };

        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }
}
