use std::future::Future;
use std::time::{Duration, Instant};

use bot_api::drain::DrainBodyFuture;
use bot_api::{
    byte_body, empty_body, form_body, like_path, Credentials, Endpoint, LikedPost, NewPost, Post,
    PostId, PostSummary, SignupResponse, TokenResponse, POSTS_PATH, SIGNUP_PATH, TOKEN_PATH,
};
use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{HeaderMap, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE};
use hyper::{Method, Request, StatusCode};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde::de::DeserializeOwned;

use crate::error::{ApiError, TransportError};
use crate::statistics::RequestStatistics;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";
/// Upper bound on the preallocated body buffer; larger bodies grow as they arrive.
const MAX_BODY_HINT: usize = 64 * 1024;
const DEFAULT_BODY_HINT: usize = 1024;

/// Status and fully read body of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

/// Sends one request and reads the whole response.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn send(&self, request: Request<Full<Bytes>>) -> Result<RawResponse, TransportError>;
}

#[derive(Clone)]
pub struct HttpClient {
    client: Client<HttpConnector, Full<Bytes>>,
}

impl HttpClient {
    #[must_use]
    pub fn new() -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self { client }
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpClient {
    async fn send(&self, request: Request<Full<Bytes>>) -> Result<RawResponse, TransportError> {
        let resp = self.client.request(request).await?;
        let status = resp.status();
        let capacity = body_capacity_hint(resp.headers());
        let body = DrainBodyFuture::new_trusted_length(resp.into_body(), capacity).await?;
        Ok(RawResponse { status, body })
    }
}

/// The advertised `Content-Length`, clamped so a bogus header cannot force a huge allocation.
fn body_capacity_hint(headers: &HeaderMap) -> usize {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|hv| hv.to_str().ok())
        .and_then(|hv| hv.parse::<usize>().ok())
        .map_or(DEFAULT_BODY_HINT, |n| n.min(MAX_BODY_HINT))
}

/// Typed calls against the social API rooted at `base_url`.
pub struct ApiClient<T> {
    transport: T,
    base_url: String,
    statistics: RequestStatistics,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self {
            transport,
            base_url,
            statistics: RequestStatistics::default(),
        }
    }

    #[must_use]
    pub fn statistics(&self) -> &RequestStatistics {
        &self.statistics
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn signup(&mut self, credentials: &Credentials) -> Result<SignupResponse, ApiError> {
        let request = self.form_request(Endpoint::Signup, SIGNUP_PATH, credentials)?;
        self.call(Endpoint::Signup, request).await
    }

    pub async fn login(&mut self, credentials: &Credentials) -> Result<TokenResponse, ApiError> {
        let request = self.form_request(Endpoint::Token, TOKEN_PATH, credentials)?;
        self.call(Endpoint::Token, request).await
    }

    pub async fn create_post(&mut self, token: &str, post: &NewPost) -> Result<Post, ApiError> {
        let endpoint = Endpoint::CreatePost;
        let payload = serde_json::to_vec(post).map_err(|e| ApiError::Encode {
            endpoint,
            source: e.into(),
        })?;
        let request = self
            .authorized(Method::POST, POSTS_PATH, token)
            .body(byte_body(payload))
            .map_err(|source| ApiError::Request { endpoint, source })?;
        self.call(endpoint, request).await
    }

    pub async fn list_posts(&mut self, token: &str) -> Result<Vec<PostSummary>, ApiError> {
        let endpoint = Endpoint::ListPosts;
        let request = self
            .authorized(Method::GET, POSTS_PATH, token)
            .body(empty_body())
            .map_err(|source| ApiError::Request { endpoint, source })?;
        self.call(endpoint, request).await
    }

    pub async fn like_post(&mut self, token: &str, id: PostId) -> Result<LikedPost, ApiError> {
        let endpoint = Endpoint::LikePost;
        let request = self
            .authorized(Method::POST, &like_path(id), token)
            .body(empty_body())
            .map_err(|source| ApiError::Request { endpoint, source })?;
        self.call(endpoint, request).await
    }

    fn uri(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn form_request(
        &self,
        endpoint: Endpoint,
        path: &str,
        credentials: &Credentials,
    ) -> Result<Request<Full<Bytes>>, ApiError> {
        let body = form_body(credentials).map_err(|e| ApiError::Encode {
            endpoint,
            source: e.into(),
        })?;
        Request::builder()
            .method(Method::POST)
            .uri(self.uri(path))
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body)
            .map_err(|source| ApiError::Request { endpoint, source })
    }

    fn authorized(&self, method: Method, path: &str, token: &str) -> hyper::http::request::Builder {
        Request::builder()
            .method(method)
            .uri(self.uri(path))
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .header(AUTHORIZATION, format!("Bearer {token}"))
    }

    async fn call<R: DeserializeOwned>(
        &mut self,
        endpoint: Endpoint,
        request: Request<Full<Bytes>>,
    ) -> Result<R, ApiError> {
        let (rtt, resp) = run_timed(self.transport.send(request)).await;
        self.statistics.record(endpoint, rtt);
        let resp = resp.map_err(|source| ApiError::Transport { endpoint, source })?;
        tracing::debug!(%endpoint, status = %resp.status, rtt_us = rtt.as_micros() as u64, "Round-trip");
        if !resp.status.is_success() {
            return Err(ApiError::Status {
                endpoint,
                status: resp.status,
                body: String::from_utf8_lossy(&resp.body).into_owned(),
            });
        }
        serde_json::from_slice(&resp.body).map_err(|source| ApiError::Decode { endpoint, source })
    }
}

#[inline]
async fn run_timed<T, F: Future<Output = T>>(fut: F) -> (Duration, T) {
    let start = Instant::now();
    let res = fut.await;
    (start.elapsed(), res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;
    use hyper::header::HeaderValue;
    use pretty_assertions::assert_eq;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn content_length(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn body_hint_is_clamped() {
        assert_eq!(DEFAULT_BODY_HINT, body_capacity_hint(&HeaderMap::new()));
        assert_eq!(DEFAULT_BODY_HINT, body_capacity_hint(&content_length("lots")));
        assert_eq!(512, body_capacity_hint(&content_length("512")));
        assert_eq!(MAX_BODY_HINT, body_capacity_hint(&content_length("1000000000000000")));
    }

    #[tokio::test]
    async fn oversized_content_length_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            socket
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 1000000000000000\r\n\r\n[]")
                .await
                .unwrap();
        });

        let mut api = ApiClient::new(HttpClient::new(), format!("http://{addr}"));
        let err = api.list_posts("abc").await.unwrap_err();
        assert!(matches!(err, ApiError::Transport { endpoint: Endpoint::ListPosts, .. }), "{err:?}");
    }

    #[tokio::test]
    async fn signup_posts_form_to_base_url() {
        let transport = ScriptedTransport::new().respond(201, r#"{"username":"bot_1"}"#);
        let mut api = ApiClient::new(transport, "http://api.test/");
        let resp = api
            .signup(&Credentials::new("bot_1", "Secret"))
            .await
            .unwrap();
        assert_eq!("bot_1", resp.username);
        let sent = api.transport().sent();
        assert_eq!(1, sent.len());
        assert_eq!(Method::POST, sent[0].method);
        assert_eq!("http://api.test/accounts/signup/", sent[0].uri);
        assert_eq!(Some(FORM_CONTENT_TYPE.to_owned()), sent[0].content_type);
        assert_eq!(None, sent[0].authorization);
        assert_eq!("username=bot_1&password=Secret", sent[0].body);
    }

    #[tokio::test]
    async fn authorized_calls_carry_bearer_token() {
        let transport = ScriptedTransport::new().respond(200, r#"[{"id":1},{"id":2}]"#);
        let mut api = ApiClient::new(transport, "http://api.test");
        let posts = api.list_posts("abc").await.unwrap();
        assert_eq!(vec![PostSummary { id: 1 }, PostSummary { id: 2 }], posts);
        let sent = api.transport().sent();
        assert_eq!(Method::GET, sent[0].method);
        assert_eq!(Some("Bearer abc".to_owned()), sent[0].authorization);
    }

    #[tokio::test]
    async fn non_success_status_is_typed() {
        let transport = ScriptedTransport::new().respond(400, r#"{"detail":"exists"}"#);
        let mut api = ApiClient::new(transport, "http://api.test");
        let err = api
            .signup(&Credentials::new("bot_1", "Secret"))
            .await
            .unwrap_err();
        assert_eq!(Some(StatusCode::BAD_REQUEST), err.status());
        assert_eq!(Endpoint::Signup, err.endpoint());
        assert!(err.to_string().contains("exists"), "{err}");
    }

    #[tokio::test]
    async fn unexpected_body_is_decode_error() {
        let transport = ScriptedTransport::new().respond(200, r#"{"token":"abc"}"#);
        let mut api = ApiClient::new(transport, "http://api.test");
        let err = api
            .login(&Credentials::new("bot_1", "Secret"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode { endpoint: Endpoint::Token, .. }), "{err:?}");
    }

    #[tokio::test]
    async fn every_call_is_timed() {
        let transport = ScriptedTransport::new()
            .respond(200, r#"{"title":"t","user":"u"}"#)
            .respond(500, "");
        let mut api = ApiClient::new(transport, "http://api.test");
        api.like_post("abc", 3).await.unwrap();
        api.like_post("abc", 4).await.unwrap_err();
        assert_eq!(2, api.statistics().get(Endpoint::LikePost).unwrap().count);
        let sent = api.transport().sent();
        assert_eq!("http://api.test/posts/4/like/", sent[1].uri);
    }

    #[tokio::test]
    async fn transport_failure_is_reported() {
        let mut api = ApiClient::new(ScriptedTransport::new(), "http://api.test");
        let err = api.list_posts("abc").await.unwrap_err();
        assert!(matches!(err, ApiError::Transport { endpoint: Endpoint::ListPosts, .. }), "{err:?}");
    }
}
