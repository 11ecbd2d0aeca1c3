use governor::{
    Quota, RateLimiter as GovernorRateLimiter,
    clock::{QuantaClock, QuantaInstant},
    middleware::NoOpMiddleware,
    state::{InMemoryState, NotKeyed},
};
use nonzero_ext::nonzero;
use std::num::NonZeroU32;

// Hard floor on request spacing: no two requests closer than 1/20 s,
// whatever the configured average rate.
const MAX_BURST_PER_SEC: NonZeroU32 = nonzero!(20u32);

type SpecificGovernorRateLimiter =
    GovernorRateLimiter<NotKeyed, InMemoryState, QuantaClock, NoOpMiddleware<QuantaInstant>>;

pub struct RateLimiter {
    req_per_sec: SpecificGovernorRateLimiter,
    min_spacing: SpecificGovernorRateLimiter,
}

impl RateLimiter {
    pub fn new(requests_per_second: NonZeroU32) -> Self {
        // Limit to X total req/sec on average.
        let req_per_sec = GovernorRateLimiter::direct(Quota::per_second(requests_per_second));

        // A burst of one means every caller waits out the full period.
        let min_spacing = GovernorRateLimiter::direct(
            Quota::per_second(MAX_BURST_PER_SEC).allow_burst(nonzero!(1u32)),
        );

        RateLimiter {
            req_per_sec,
            min_spacing,
        }
    }

    pub async fn wait_until_ready(&self) {
        // Average rate first, spacing second: callers released together by
        // the average limiter are then let through one at a time.
        self.req_per_sec.until_ready().await;
        self.min_spacing.until_ready().await;
    }
}
