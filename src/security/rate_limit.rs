//! Rate limiting for flood protection.
//!
//! Uses the `governor` crate's token bucket: each connection gets its own
//! direct limiter, refilled at `message_rate` lines per second with a burst
//! of `message_burst`.

use crate::config::LimitsConfig;
use crate::state::Uid;
use dashmap::DashMap;
use governor::{Quota, RateLimiter as GovRateLimiter};
use std::num::NonZeroU32;
use tracing::debug;

/// Type alias for governor's direct rate limiter.
type DirectRateLimiter = governor::DefaultDirectRateLimiter;

/// Per-connection inbound line limiter.
#[derive(Debug)]
pub struct RateLimitManager {
    message_limiters: DashMap<Uid, DirectRateLimiter>,
    quota: Quota,
}

impl RateLimitManager {
    pub fn new(limits: &LimitsConfig) -> Self {
        let rate = NonZeroU32::new(limits.message_rate).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(limits.message_burst).unwrap_or(rate);
        Self {
            message_limiters: DashMap::new(),
            quota: Quota::per_second(rate).allow_burst(burst),
        }
    }

    /// Check if a client can send another line.
    ///
    /// Returns `true` if allowed, `false` if rate limited.
    pub fn check_message_rate(&self, uid: &str) -> bool {
        let allowed = match self.message_limiters.get(uid) {
            Some(limiter) => limiter.check().is_ok(),
            None => {
                let limiter = GovRateLimiter::direct(self.quota);
                let allowed = limiter.check().is_ok();
                self.message_limiters.insert(uid.to_string(), limiter);
                allowed
            }
        };
        if !allowed {
            debug!(uid = %uid, "message rate limit exceeded");
        }
        allowed
    }

    /// Remove a client's limiter (on disconnect).
    pub fn remove_client(&self, uid: &str) {
        self.message_limiters.remove(uid);
    }
}
