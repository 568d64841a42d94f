//! Prelude module for convenient imports.
//!
//! ```ignore
//! use restkit_core::prelude::*;
//! ```

pub use crate::{
    Authentication, CancellationToken, Credential, Error, JsonSerializer, Method,
    PathAwareJsonSerializer, PathParameters, QueryParameter, QueryParameters, QueryValue, Request,
    Response, Result, Serializer, TimeSpan, Transport, compose_url, path_params, query_params,
};
