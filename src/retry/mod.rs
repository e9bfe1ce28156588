//! Retry policy objects for backoff loops
//!
//! Retries are written as explicit bounded loops at call sites, driven by
//! a [`RetryPolicy`] that answers one question: after a failed attempt,
//! how long to wait before the next one, if any. Flow steps and posting
//! use an exponential schedule; only the two-factor challenge uses a
//! linear schedule, because one-time codes are time-windowed and a fixed
//! increment rides out clock skew better than doubling.

use std::time::Duration;

/// Backoff schedule between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Delay doubles per attempt: `base * 2^attempt`
    Exponential {
        /// Base delay multiplied by the schedule
        base: Duration,
    },
    /// Delay grows by a fixed increment per attempt: `step * attempt`
    Linear {
        /// Increment added per attempt
        step: Duration,
    },
}

/// Bounded retry policy: maximum attempts plus a backoff schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts allowed, including the first
    pub max_attempts: u32,
    /// Backoff schedule between attempts
    pub backoff: Backoff,
}

impl RetryPolicy {
    /// Policy for retryable network steps: exponential backoff
    pub fn exponential(max_attempts: u32, base: Duration) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::Exponential { base },
        }
    }

    /// Policy for the two-factor challenge: linear backoff
    pub fn linear(max_attempts: u32, step: Duration) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::Linear { step },
        }
    }

    /// Delay to wait after the given failed attempt (1-based), or `None`
    /// when the budget is exhausted
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }
        let delay = match self.backoff {
            Backoff::Exponential { base } => base * 2u32.saturating_pow(attempt),
            Backoff::Linear { step } => step * attempt,
        };
        Some(delay)
    }
}
