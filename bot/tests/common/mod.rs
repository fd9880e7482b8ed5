use std::cell::Cell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::Router;
use bot::credentials::Clock;
use bot::{ApiClient, Bot, RawResponse, Transport, TransportError};
use bot_api::drain::DrainBodyFuture;
use bytes::Bytes;
use http_body_util::Full;
use hyper::Request;
use mock_api::MockState;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tower::ServiceExt;

/// Dispatches requests straight into the mock router, no sockets involved.
#[derive(Clone)]
pub struct RouterTransport {
    router: Router,
    sent: Arc<AtomicUsize>,
}

impl RouterTransport {
    pub fn new(state: MockState) -> Self {
        Self {
            router: mock_api::router(state),
            sent: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Requests sent through this transport or any of its clones.
    pub fn sent(&self) -> usize {
        self.sent.load(Ordering::Acquire)
    }
}

impl Transport for RouterTransport {
    async fn send(&self, request: Request<Full<Bytes>>) -> Result<RawResponse, TransportError> {
        self.sent.fetch_add(1, Ordering::AcqRel);
        let resp = self.router.clone().oneshot(request).await?;
        let status = resp.status();
        let body = DrainBodyFuture::new_trusted_length(resp.into_body(), 256).await?;
        Ok(RawResponse { status, body })
    }
}

pub fn api(state: &MockState) -> ApiClient<RouterTransport> {
    ApiClient::new(RouterTransport::new(state.clone()), "http://mock.test")
}

/// Advances one second per reading, so generated usernames never collide.
pub struct SteppingClock {
    now: Cell<u64>,
}

impl SteppingClock {
    pub fn starting_at(now: u64) -> Self {
        Self { now: Cell::new(now) }
    }
}

impl Clock for SteppingClock {
    fn unix_secs(&self) -> u64 {
        let now = self.now.get();
        self.now.set(now + 1);
        now
    }
}

pub fn bot(state: &MockState, now: u64) -> Bot<RouterTransport, StdRng, SteppingClock> {
    Bot::new(api(state), StdRng::seed_from_u64(now), SteppingClock::starting_at(now))
}
