use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Failed attempts allowed per email inside one window.
pub const MAX_LOGIN_FAILURES: u32 = 5;
pub const LOGIN_WINDOW: Duration = Duration::from_secs(15 * 60);

/// Per-email login brute force limiter.
pub struct LoginRateLimiter {
    /// email -> (failed_count, window_start)
    entries: DashMap<String, (u32, Instant)>,
    max_failures: u32,
    window: Duration,
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginRateLimiter {
    pub fn new() -> Self {
        Self::with_limits(MAX_LOGIN_FAILURES, LOGIN_WINDOW)
    }

    pub fn with_limits(max_failures: u32, window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            max_failures,
            window,
        }
    }

    /// Returns retry-after seconds once the email has exhausted its failures.
    /// Does not count the attempt; call `record_failure()` on a bad password.
    pub fn check(&self, email: &str) -> Result<(), u64> {
        let now = Instant::now();

        let Some(entry) = self.entries.get(&email.to_lowercase()) else {
            return Ok(());
        };
        let (count, start) = entry.value();

        if now.duration_since(*start) > self.window {
            return Ok(());
        }

        if *count >= self.max_failures {
            let elapsed = now.duration_since(*start).as_secs();
            return Err(self.window.as_secs().saturating_sub(elapsed));
        }

        Ok(())
    }

    pub fn record_failure(&self, email: &str) {
        let now = Instant::now();

        let mut entry = self.entries.entry(email.to_lowercase()).or_insert((0, now));
        let (count, start) = entry.value_mut();

        if now.duration_since(*start) > self.window {
            *count = 1;
            *start = now;
        } else {
            *count += 1;
        }
    }

    /// Forget failures after a successful login.
    pub fn clear(&self, email: &str) {
        self.entries.remove(&email.to_lowercase());
    }

    /// Drop windows that have expired.
    pub fn cleanup(&self) {
        let now = Instant::now();
        let window = self.window;
        self.entries
            .retain(|_, (_, start)| now.duration_since(*start) < window);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locks_after_max_failures() {
        let limiter = LoginRateLimiter::with_limits(2, Duration::from_secs(60));
        assert!(limiter.check("a@example.com").is_ok());
        limiter.record_failure("a@example.com");
        assert!(limiter.check("a@example.com").is_ok());
        limiter.record_failure("A@Example.com");
        assert!(limiter.check("a@example.com").is_err());
        assert!(limiter.check("b@example.com").is_ok());
    }

    #[test]
    fn clear_resets_counter() {
        let limiter = LoginRateLimiter::with_limits(1, Duration::from_secs(60));
        limiter.record_failure("a@example.com");
        assert!(limiter.check("a@example.com").is_err());
        limiter.clear("a@example.com");
        assert!(limiter.check("a@example.com").is_ok());
    }
}
