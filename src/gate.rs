//! Notification rate limiting
//!
//! At most one surfaced banner per rolling minute and at most three per
//! ten-minute window; the ten-minute window resets wholesale once ten minutes
//! have elapsed since it began. A denied detection is still recorded to the
//! quip log by the caller.

use chrono::{DateTime, Utc};

/// Minimum spacing between surfaced banners
pub const BANNER_MIN_INTERVAL_MS: i64 = 60_000;

/// Length of the wholesale-reset banner window
pub const BANNER_WINDOW_MS: i64 = 600_000;

/// Banners admitted per window
pub const BANNER_WINDOW_LIMIT: u32 = 3;

/// The banner rate limiter.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotificationGate {
    last_banner: Option<DateTime<Utc>>,
    window_start: Option<DateTime<Utc>>,
    window_count: u32,
}

impl NotificationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether a detection at `now` may surface as a banner, and
    /// account for it if so.
    pub fn admit(&mut self, now: DateTime<Utc>) -> bool {
        match self.window_start {
            Some(start) if (now - start).num_milliseconds() <= BANNER_WINDOW_MS => {}
            _ => {
                self.window_start = Some(now);
                self.window_count = 0;
            }
        }

        if let Some(last) = self.last_banner {
            if (now - last).num_milliseconds() < BANNER_MIN_INTERVAL_MS {
                return false;
            }
        }
        if self.window_count >= BANNER_WINDOW_LIMIT {
            return false;
        }

        self.last_banner = Some(now);
        self.window_count += 1;
        true
    }
}
