//! Remaining API quota, fetched after GitHub rejects a status write.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Snapshot of the core API quota.
///
/// Carried by [`GitHubError::RateLimitExceeded`] so a failed status write
/// can say when the next one will be accepted.
///
/// ```
/// use std::time::Duration;
///
/// use beacon::github::RateLimitInfo;
///
/// let quota = RateLimitInfo::new(5000, 0, 1_700_000_060);
/// assert!(!quota.allows_requests());
/// assert_eq!(quota.retry_after(1_700_000_000), Duration::from_secs(60));
/// ```
///
/// [`GitHubError::RateLimitExceeded`]: super::GitHubError::RateLimitExceeded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitInfo {
    limit: u32,
    remaining: u32,
    reset_at: u64,
}

impl RateLimitInfo {
    /// Builds a snapshot; `reset_at` is a Unix timestamp in seconds.
    #[must_use]
    pub const fn new(limit: u32, remaining: u32, reset_at: u64) -> Self {
        Self {
            limit,
            remaining,
            reset_at,
        }
    }

    /// Octocrab reports counters as `usize`; oversized values are dropped.
    pub(crate) fn from_counters(limit: usize, remaining: usize, reset_at: u64) -> Option<Self> {
        let limit = u32::try_from(limit).ok()?;
        let remaining = u32::try_from(remaining).ok()?;
        Some(Self::new(limit, remaining, reset_at))
    }

    /// Unix timestamp at which the quota refills.
    #[must_use]
    pub const fn reset_at(&self) -> u64 {
        self.reset_at
    }

    /// Whether any request can still be made in this window.
    #[must_use]
    pub const fn allows_requests(&self) -> bool {
        self.remaining > 0
    }

    /// Time left until the refill, measured from `now` (Unix seconds).
    #[must_use]
    pub const fn retry_after(&self, now: u64) -> Duration {
        Duration::from_secs(self.reset_at.saturating_sub(now))
    }

    /// [`retry_after`](Self::retry_after) against the system clock.
    #[must_use]
    pub fn retry_after_now(&self) -> Duration {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs());
        self.retry_after(now)
    }
}

impl fmt::Display for RateLimitInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} requests left, resets in {}s",
            self.remaining,
            self.limit,
            self.retry_after_now().as_secs()
        )
    }
}
