use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Sliding-window request limiter keyed on a client id.
pub struct RateLimiter {
    /// Stores timestamps of requests for each client ID.
    requests: HashMap<String, Vec<Instant>>,
    /// The maximum number of requests allowed within the `window`.
    limit: usize,
    /// The duration of the sliding window.
    window: Duration,
}

impl RateLimiter {
    pub fn new(limit: usize, window: Duration) -> Self {
        RateLimiter {
            requests: HashMap::new(),
            limit,
            window,
        }
    }

    /// Records and allows the request if the client is within its limit.
    pub fn check(&mut self, id: &str) -> bool {
        let now = Instant::now();

        let client_requests = self.requests.entry(id.to_string()).or_default();

        // Remove timestamps older than the window. The monotonic clock may
        // not reach back a full window yet (shortly after boot), in which
        // case every recorded timestamp is still inside it.
        if let Some(window_start) = now.checked_sub(self.window) {
            client_requests.retain(|&timestamp| timestamp > window_start);
        }

        if client_requests.len() < self.limit {
            client_requests.push(now);
            true
        } else {
            false
        }
    }
}

/// The assistant proxy's two budgets: per client and overall.
pub struct AssistantRateLimits {
    per_client: RateLimiter,
    global: RateLimiter,
}

const PER_CLIENT_LIMIT: usize = 5;
const PER_CLIENT_WINDOW: Duration = Duration::from_secs(60);
const GLOBAL_LIMIT: usize = 100;
const GLOBAL_WINDOW: Duration = Duration::from_secs(3600);
const GLOBAL_KEY: &str = "_global";

impl AssistantRateLimits {
    pub fn new() -> Self {
        AssistantRateLimits {
            per_client: RateLimiter::new(PER_CLIENT_LIMIT, PER_CLIENT_WINDOW),
            global: RateLimiter::new(GLOBAL_LIMIT, GLOBAL_WINDOW),
        }
    }

    pub fn check(&mut self, client: &str) -> bool {
        self.per_client.check(client) && self.global.check(GLOBAL_KEY)
    }
}

impl Default for AssistantRateLimits {
    fn default() -> Self {
        Self::new()
    }
}
