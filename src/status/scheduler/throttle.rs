//! Leading-edge throttle state machine.

use std::time::Duration;

use tokio::time::Instant;

/// Admits at most one offer per window, immediately on the first one.
///
/// Offers inside an open window are dropped, not queued. The first offer at
/// or after the window end is admitted and starts a new window.
#[derive(Debug, Clone)]
pub struct Throttle {
    window: Duration,
    last_fired: Option<Instant>,
    disposed: bool,
}

impl Throttle {
    /// Creates a throttle with the given window.
    #[must_use]
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            last_fired: None,
            disposed: false,
        }
    }

    /// Length of one window.
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Decides whether an offer made at `now` fires.
    pub fn offer(&mut self, now: Instant) -> bool {
        if self.disposed {
            return false;
        }
        let open = self
            .last_fired
            .is_none_or(|fired| now.saturating_duration_since(fired) >= self.window);
        if open {
            self.last_fired = Some(now);
        }
        open
    }

    /// Refuses every later offer.
    pub const fn dispose(&mut self) {
        self.disposed = true;
    }

    /// Returns true once [`Self::dispose`] has run.
    #[must_use]
    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }
}
