//! Scripted transport for unit tests: replays canned responses in order and
//! records what was sent.
use std::cell::RefCell;
use std::collections::VecDeque;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::{HeaderName, AUTHORIZATION, CONTENT_TYPE};
use hyper::{Method, Request, StatusCode};

use crate::client::{RawResponse, Transport};
use crate::error::TransportError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SentRequest {
    pub method: Method,
    pub uri: String,
    pub content_type: Option<String>,
    pub authorization: Option<String>,
    pub body: String,
}

#[derive(Default)]
pub(crate) struct ScriptedTransport {
    responses: RefCell<VecDeque<RawResponse>>,
    sent: RefCell<Vec<SentRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, body: &str) -> Self {
        self.responses.borrow_mut().push_back(RawResponse {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.as_bytes().to_vec(),
        });
        self
    }

    pub fn sent(&self) -> Vec<SentRequest> {
        self.sent.borrow().clone()
    }
}

impl Transport for ScriptedTransport {
    async fn send(&self, request: Request<Full<Bytes>>) -> Result<RawResponse, TransportError> {
        let (parts, body) = request.into_parts();
        let header = |name: HeaderName| {
            parts
                .headers
                .get(name)
                .and_then(|hv| hv.to_str().ok())
                .map(str::to_owned)
        };
        let sent = SentRequest {
            method: parts.method.clone(),
            uri: parts.uri.to_string(),
            content_type: header(CONTENT_TYPE),
            authorization: header(AUTHORIZATION),
            body: String::from_utf8(body.collect().await?.to_bytes().to_vec())?,
        };
        self.sent.borrow_mut().push(sent);
        self.responses
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| "script exhausted".into())
    }
}
