//! Description of one call.

use http::HeaderMap;
use http::header::{HeaderName, HeaderValue};

use crate::{CancellationToken, Method, PathParameters, QueryParameters};

/// Everything a call needs besides the client: verb, operation path,
/// parameters, payload, per-call headers and cancellation.
///
/// `D` is the payload type; calls without a body keep the default `()`.
///
/// # Example
///
/// ```
/// use restkit::{Operation, path_params, query_params};
///
/// # fn main() -> restkit::Result<()> {
/// let operation = Operation::get("users/{id}/orders")
///     .path(path_params! { "id" => 42 }?)
///     .query(query_params! { "status" => ["open", "late"] }?);
///
/// assert_eq!(operation.relative_url(), "users/42/orders?status=open&status=late");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Operation<'a, D: ?Sized = ()> {
    method: Method,
    template: &'a str,
    data: Option<&'a D>,
    path: PathParameters,
    query: QueryParameters,
    headers: HeaderMap,
    cancellation: CancellationToken,
}

impl<'a> Operation<'a> {
    /// Operation with the given verb and path template.
    #[must_use]
    pub fn new(method: Method, template: &'a str) -> Self {
        Self {
            method,
            template,
            data: None,
            path: PathParameters::new(),
            query: QueryParameters::new(),
            headers: HeaderMap::new(),
            cancellation: CancellationToken::new(),
        }
    }

    /// `GET` operation.
    #[must_use]
    pub fn get(template: &'a str) -> Self {
        Self::new(Method::Get, template)
    }

    /// `POST` operation.
    #[must_use]
    pub fn post(template: &'a str) -> Self {
        Self::new(Method::Post, template)
    }

    /// `PUT` operation.
    #[must_use]
    pub fn put(template: &'a str) -> Self {
        Self::new(Method::Put, template)
    }

    /// `PATCH` operation.
    #[must_use]
    pub fn patch(template: &'a str) -> Self {
        Self::new(Method::Patch, template)
    }

    /// `DELETE` operation.
    #[must_use]
    pub fn delete(template: &'a str) -> Self {
        Self::new(Method::Delete, template)
    }
}

impl<'a, D: ?Sized> Operation<'a, D> {
    /// Attach a payload, serialized as the request body.
    #[must_use]
    pub fn data<E: ?Sized>(self, data: &'a E) -> Operation<'a, E> {
        Operation {
            method: self.method,
            template: self.template,
            data: Some(data),
            path: self.path,
            query: self.query,
            headers: self.headers,
            cancellation: self.cancellation,
        }
    }

    /// Set the path parameters.
    #[must_use]
    pub fn path(mut self, path: PathParameters) -> Self {
        self.path = path;
        self
    }

    /// Set the query parameters.
    #[must_use]
    pub fn query(mut self, query: QueryParameters) -> Self {
        self.query = query;
        self
    }

    /// Set the per-call headers.
    #[must_use]
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Add a per-call header value.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Use a cancellation token for this call.
    #[must_use]
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// HTTP verb.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Path template, e.g. `users/{id}`.
    #[must_use]
    pub const fn template(&self) -> &'a str {
        self.template
    }

    /// Payload, if any.
    #[must_use]
    pub const fn payload(&self) -> Option<&'a D> {
        self.data
    }

    /// Per-call headers.
    #[must_use]
    pub const fn header_map(&self) -> &HeaderMap {
        &self.headers
    }

    /// Cancellation token of the call.
    #[must_use]
    pub const fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Operation path with parameters applied, relative to the base URL.
    #[must_use]
    pub fn relative_url(&self) -> String {
        crate::compose_url(self.template, &self.path, &self.query)
    }
}
