//! Request rate limiting for shared API quotas.
//!
//! Several model workers may talk to the same provider. The limiter is shared
//! behind a reference; only its counter is locked, never a request.

use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// At most `max_requests` per `window`, counted in consecutive fixed windows.
#[derive(Debug)]
pub struct FixedWindowLimiter {
    max_requests: usize,
    window: Duration,
    state: Mutex<WindowState>,
}

#[derive(Debug)]
struct WindowState {
    started: Option<Instant>,
    used: usize,
}

impl FixedWindowLimiter {
    /// Limiter allowing `max_requests` per `window`. A zero limit is raised to 1.
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests: max_requests.max(1),
            window,
            state: Mutex::new(WindowState {
                started: None,
                used: 0,
            }),
        }
    }

    /// OpenRouter's free-tier quota: 20 requests a minute.
    pub fn openrouter() -> Self {
        Self::new(20, Duration::from_secs(60))
    }

    /// Requests allowed per window.
    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    /// Take a slot at `now`, or return how long to wait for the next window.
    pub fn try_acquire_at(&self, now: Instant) -> Result<(), Duration> {
        let mut state = self.state.lock();
        let expired = state
            .started
            .map_or(true, |start| now.saturating_duration_since(start) >= self.window);
        if expired {
            state.started = Some(now);
            state.used = 0;
        }
        if state.used < self.max_requests {
            state.used += 1;
            return Ok(());
        }
        let elapsed = state
            .started
            .map_or(Duration::ZERO, |start| now.saturating_duration_since(start));
        Err(self.window.saturating_sub(elapsed))
    }

    /// Block until a slot is free.
    pub fn acquire(&self) {
        loop {
            match self.try_acquire_at(Instant::now()) {
                Ok(()) => return,
                Err(wait) => {
                    log::debug!("rate limit reached, sleeping {:?}", wait);
                    std::thread::sleep(wait.max(Duration::from_millis(1)));
                }
            }
        }
    }
}
