use governor::{
    Quota, RateLimiter as GovernorRateLimiter,
    clock::{QuantaClock, QuantaInstant},
    middleware::NoOpMiddleware,
    state::{InMemoryState, NotKeyed},
};
use nonzero_ext::nonzero;
use std::{num::NonZeroU32, time::Duration};

// The timetable site is a single university server, so stay polite.
const REQ_PER_SEC: NonZeroU32 = nonzero!(10u32);
const MS_BETWEEN_REQ: Duration = Duration::from_millis(50);

type SpecificGovernorRateLimiter =
    GovernorRateLimiter<NotKeyed, InMemoryState, QuantaClock, NoOpMiddleware<QuantaInstant>>;

pub struct RateLimiter {
    req_per_sec: SpecificGovernorRateLimiter,
    ms_between_req: Option<SpecificGovernorRateLimiter>,
}

impl RateLimiter {
    pub fn new() -> Self {
        let req_per_sec = GovernorRateLimiter::direct(Quota::per_second(REQ_PER_SEC));
        // No two requests closer than MS_BETWEEN_REQ.
        let ms_between_req = Quota::with_period(MS_BETWEEN_REQ).map(GovernorRateLimiter::direct);
        RateLimiter {
            req_per_sec,
            ms_between_req,
        }
    }

    pub async fn wait_until_ready(&self) {
        // Average rate first, then spacing, so a burst released by the
        // average limiter still leaves one request per period.
        self.req_per_sec.until_ready().await;
        if let Some(ms_between_req) = &self.ms_between_req {
            ms_between_req.until_ready().await;
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
