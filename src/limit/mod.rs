//! Request-pacing gate for outbound calls
//!
//! Every outbound request acquires the gate before proceeding. The gate
//! enforces a minimum inter-request delay and a request-count ceiling per
//! fixed window. The window is reset on the first call after a full window
//! has elapsed since the last grant; this is a deliberate fixed-window
//! approximation of a sliding window, and callers depend on exactly this
//! coarser guarantee.
//!
//! Concurrent callers queue on the internal mutex in arrival order; the
//! holder sleeps with the guard held, so grants are strictly FIFO and only
//! one caller ever computes or mutates the window state at a time.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::debug;

/// Mutable window state, private to the limiter
#[derive(Debug)]
struct RateWindow {
    /// When the last request was granted
    last_request: Option<Instant>,
    /// Requests granted in the current window
    count: u32,
}

/// FIFO request-pacing gate
#[derive(Debug)]
pub struct RateLimiter {
    state: Mutex<RateWindow>,
    /// Minimum delay between any two grants
    min_interval: Duration,
    /// Length of the request-count window
    window: Duration,
    /// Maximum grants per window
    max_requests: u32,
}

impl RateLimiter {
    /// Create a limiter with the given pacing parameters
    pub fn new(min_interval: Duration, window: Duration, max_requests: u32) -> Self {
        Self {
            state: Mutex::new(RateWindow {
                last_request: None,
                count: 0,
            }),
            min_interval,
            window,
            max_requests,
        }
    }

    /// Create a limiter from settings
    pub fn from_settings(settings: &crate::config::RateLimitSettings) -> Self {
        Self::new(
            Duration::from_millis(settings.min_interval_ms),
            Duration::from_secs(settings.window_secs),
            settings.max_requests,
        )
    }

    /// Wait until the next request may be issued
    ///
    /// Suspends the caller as long as pacing requires; rate limiting is
    /// absorbed as waiting and never surfaces as an error.
    pub async fn wait_for_next(&self) {
        let mut state = self.state.lock().await;

        if let Some(last) = state.last_request {
            let elapsed = last.elapsed();

            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }

            let elapsed = last.elapsed();
            if elapsed > self.window {
                debug!("Rate window elapsed, resetting request counter");
                state.count = 0;
            } else if state.count >= self.max_requests {
                let wait = self.window - elapsed;
                debug!("Rate ceiling reached, waiting {:?} for window boundary", wait);
                sleep(wait).await;
                state.count = 0;
            }
        }

        state.count += 1;
        state.last_request = Some(Instant::now());
    }
}
