//! Sends composed requests and classifies what came back.
//!
//! Every call ends in exactly one [`Outcome`]; the after-call interceptor
//! then decides whether an error outcome is raised or swallowed.

use std::time::{Duration, Instant};

use http::StatusCode;
use tracing::{Instrument, debug, info_span, warn};
use url::Url;

use crate::{
    CancellationToken, Completion, Error, Hooks, Method, Request, Response, Result, Transport,
};

/// Metadata of one finished call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallInfo {
    method: Method,
    url: Url,
    status: StatusCode,
    elapsed: Duration,
    has_response: bool,
}

impl CallInfo {
    /// Method of the request.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Absolute URL of the request.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Status of the response; `205 Reset Content` when none was obtained.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Wall-clock time from dispatch to the outcome.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Whether the server actually answered.
    #[must_use]
    pub const fn has_response(&self) -> bool {
        self.has_response
    }

    /// The server answered with a 2xx status.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.has_response && self.status.is_success()
    }
}

/// A call's value together with its [`CallInfo`].
#[derive(Debug, Clone)]
pub struct Call<T> {
    value: T,
    info: CallInfo,
}

impl<T> Call<T> {
    pub(crate) const fn new(value: T, info: CallInfo) -> Self {
        Self { value, info }
    }

    /// The call's value.
    #[must_use]
    pub const fn value(&self) -> &T {
        &self.value
    }

    /// Call metadata.
    #[must_use]
    pub const fn info(&self) -> &CallInfo {
        &self.info
    }

    /// Take the value, dropping the metadata.
    #[must_use]
    pub fn into_value(self) -> T {
        self.value
    }

    /// Split into value and metadata.
    #[must_use]
    pub fn into_parts(self) -> (T, CallInfo) {
        (self.value, self.info)
    }

    /// Transform the value, keeping the metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Call<U> {
        Call {
            value: f(self.value),
            info: self.info,
        }
    }
}

enum Outcome {
    /// 2xx.
    Completed(Response),
    /// Non-2xx.
    Rejected { response: Response, error: Error },
    /// Transport failure or cancellation; no response.
    Failed(Error),
}

/// Result of a dispatch: the metadata is known even when the call is raised.
#[derive(Debug)]
pub struct Dispatched {
    /// Call metadata.
    pub info: CallInfo,
    /// Response (possibly a placeholder) or the raised error.
    pub result: Result<Response>,
}

impl Dispatched {
    /// Attach the metadata to the response.
    ///
    /// # Errors
    ///
    /// Returns the raised error.
    pub fn into_call(self) -> Result<Call<Response>> {
        let info = self.info;
        self.result.map(|response| Call::new(response, info))
    }
}

/// Dispatches requests through a transport, applying the interceptors.
#[derive(Debug)]
pub struct Dispatcher<'a> {
    hooks: &'a Hooks,
    throw_on_cancellation: bool,
}

impl<'a> Dispatcher<'a> {
    /// Create a dispatcher.
    #[must_use]
    pub const fn new(hooks: &'a Hooks, throw_on_cancellation: bool) -> Self {
        Self {
            hooks,
            throw_on_cancellation,
        }
    }

    /// Send `request` and settle its outcome.
    ///
    /// The transport only buffers the response headers within its timeout.
    pub async fn dispatch<T: Transport>(
        &self,
        transport: &T,
        mut request: Request,
        cancel: &CancellationToken,
    ) -> Dispatched {
        let start = Instant::now();
        self.hooks.before_call(&mut request);
        request
            .extensions_mut()
            .insert(Completion::ResponseHeadersRead);

        let method = request.method();
        let url = request.url().clone();
        let span = info_span!("http_call", %method, %url);

        async move {
            let outcome = match transport.send(request, cancel).await {
                Ok(response) if response.is_success() => Outcome::Completed(response),
                Ok(response) => {
                    let body = response.text_lossy();
                    let mut error = Error::http(
                        response.status(),
                        method,
                        url.clone(),
                        (!body.is_empty()).then_some(body),
                    );
                    if let Some(reason) = response.reason() {
                        error = error.with_reason(reason);
                    }
                    Outcome::Rejected { response, error }
                }
                Err(error) => Outcome::Failed(error),
            };
            let elapsed = start.elapsed();
            self.settle(outcome, method, url, elapsed)
        }
        .instrument(span)
        .await
    }

    fn settle(&self, outcome: Outcome, method: Method, url: Url, elapsed: Duration) -> Dispatched {
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        let info = |status: StatusCode, has_response: bool| CallInfo {
            method,
            url: url.clone(),
            status,
            elapsed,
            has_response,
        };

        match outcome {
            Outcome::Completed(response) => {
                let status = response.status();
                debug!(status = status.as_u16(), elapsed_ms, "call completed");
                self.hooks.after_call(Some(&response), None);
                Dispatched {
                    info: info(status, true),
                    result: Ok(response),
                }
            }
            Outcome::Rejected { response, error } => {
                let status = response.status();
                warn!(status = status.as_u16(), elapsed_ms, "call rejected");
                let result = if self.hooks.after_call(Some(&response), Some(&error)) {
                    Err(error)
                } else {
                    debug!(status = status.as_u16(), "rejection suppressed by interceptor");
                    Ok(response)
                };
                Dispatched {
                    info: info(status, true),
                    result,
                }
            }
            Outcome::Failed(error) => {
                warn!(error = %error, elapsed_ms, "call failed without response");
                let rethrow = self.hooks.after_call(None, Some(&error));
                let raise = if error.is_cancelled() {
                    rethrow && self.throw_on_cancellation
                } else {
                    rethrow
                };
                let result = if raise {
                    Err(error)
                } else {
                    debug!(error = %error, "failure suppressed");
                    Ok(Response::placeholder(method, url.clone()))
                };
                Dispatched {
                    info: info(StatusCode::RESET_CONTENT, false),
                    result,
                }
            }
        }
    }
}
