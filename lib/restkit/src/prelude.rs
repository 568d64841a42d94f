//! Prelude module for convenient imports.
//!
//! ```ignore
//! use restkit::prelude::*;
//! ```

pub use crate::{
    Authentication, Call, CallInfo, CancellationToken, Credential, Error, Hooks, HyperTransport,
    Method, Operation, PathParameters, QueryParameters, QueryValue, Response, RestClient,
    RestServiceSettings, Result, StatusCode, TimeSpan, Transport, header, path_params,
    query_params,
};
pub use serde::{Deserialize, Serialize};
