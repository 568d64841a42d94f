//! In-process transport double for unit tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, StatusCode};
use url::Url;

use crate::{CancellationToken, Error, Request, Response, Result, Transport};

enum Reply {
    Respond(StatusCode, &'static str),
    Fail(fn() -> Error),
    WaitForCancel,
}

/// Transport answering every request with a canned reply and recording what
/// it was sent.
pub(crate) struct StubTransport {
    base_url: Url,
    default_headers: HeaderMap,
    reason: Option<&'static str>,
    reply: Reply,
    sent: Mutex<Vec<Request>>,
    calls: AtomicUsize,
}

impl StubTransport {
    pub(crate) fn new(base_url: &str) -> Self {
        Self {
            base_url: Url::parse(base_url).expect("valid base url"),
            default_headers: HeaderMap::new(),
            reason: None,
            reply: Reply::Respond(StatusCode::NO_CONTENT, ""),
            sent: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn with_default_header(mut self, name: &'static str, value: &'static str) -> Self {
        self.default_headers
            .append(HeaderName::from_static(name), HeaderValue::from_static(value));
        self
    }

    pub(crate) fn responding(mut self, status: u16, body: &'static str) -> Self {
        self.reply = Reply::Respond(StatusCode::from_u16(status).expect("valid status"), body);
        self
    }

    pub(crate) fn with_reason(mut self, reason: &'static str) -> Self {
        self.reason = Some(reason);
        self
    }

    pub(crate) fn failing(mut self, error: fn() -> Error) -> Self {
        self.reply = Reply::Fail(error);
        self
    }

    pub(crate) fn waiting_for_cancel(mut self) -> Self {
        self.reply = Reply::WaitForCancel;
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_request(&self) -> Option<Request> {
        self.sent.lock().expect("lock").last().cloned()
    }
}

impl Transport for StubTransport {
    fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    async fn send(&self, request: Request, cancel: &CancellationToken) -> Result<Response> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let method = request.method();
        let url = request.url().clone();
        self.sent.lock().expect("lock").push(request);

        match &self.reply {
            Reply::Respond(status, body) => {
                let response =
                    Response::new(*status, HeaderMap::new(), Bytes::from_static(body.as_bytes()))
                        .with_origin(method, url);
                Ok(match self.reason {
                    Some(reason) => response.with_reason(reason),
                    None => response,
                })
            }
            Reply::Fail(error) => Err(error()),
            Reply::WaitForCancel => {
                cancel.cancelled().await;
                Err(Error::Cancelled)
            }
        }
    }
}
