//! Trailing-edge debounce state machine.

use std::time::Duration;

use tokio::task::JoinHandle;

/// Holds the latest value of a burst until a quiet period passes.
///
/// Every [`Debounce::arm`] replaces the pending value, cancels the previous
/// timer and returns a new generation. The caller's timer passes that
/// generation back to [`Debounce::fire`]; a stale generation yields nothing,
/// so a timer that lost a race with a newer `arm` cannot deliver.
#[derive(Debug)]
pub struct Debounce<T> {
    quiet: Duration,
    pending: Option<T>,
    timer: Option<JoinHandle<()>>,
    generation: u64,
    disposed: bool,
}

impl<T> Debounce<T> {
    /// Creates a debounce with the given quiet period.
    #[must_use]
    pub const fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
            timer: None,
            generation: 0,
            disposed: false,
        }
    }

    /// Length of the quiet period.
    #[must_use]
    pub const fn quiet(&self) -> Duration {
        self.quiet
    }

    /// Replaces the pending value and cancels the running timer.
    ///
    /// Returns the generation the next timer must present, or `None` once
    /// disposed.
    pub fn arm(&mut self, value: T) -> Option<u64> {
        if self.disposed {
            return None;
        }
        self.cancel_timer();
        self.pending = Some(value);
        self.generation = self.generation.wrapping_add(1);
        Some(self.generation)
    }

    /// Attaches the timer task for the current generation.
    pub fn set_timer(&mut self, timer: JoinHandle<()>) {
        self.cancel_timer();
        self.timer = Some(timer);
    }

    /// Takes the pending value if `generation` is still current.
    pub fn fire(&mut self, generation: u64) -> Option<T> {
        if self.disposed || generation != self.generation {
            return None;
        }
        self.timer = None;
        self.pending.take()
    }

    /// Cancels the timer and takes the pending value now.
    pub fn take_pending(&mut self) -> Option<T> {
        self.cancel_timer();
        self.pending.take()
    }

    /// Returns true while a value waits for its quiet period.
    #[must_use]
    pub const fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Cancels the timer, drops the pending value and refuses later arms.
    pub fn dispose(&mut self) {
        self.cancel_timer();
        self.pending = None;
        self.disposed = true;
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::Debounce;

    const QUIET: Duration = Duration::from_millis(2500);

    #[test]
    fn latest_value_wins() {
        let mut debounce = Debounce::new(QUIET);

        let first = debounce.arm("first").expect("should arm");
        let second = debounce.arm("second").expect("should arm");

        assert_eq!(debounce.fire(first), None);
        assert_eq!(debounce.fire(second), Some("second"));
        assert!(!debounce.has_pending());
    }

    #[test]
    fn fire_delivers_once() {
        let mut debounce = Debounce::new(QUIET);
        let generation = debounce.arm(1).expect("should arm");

        assert_eq!(debounce.fire(generation), Some(1));
        assert_eq!(debounce.fire(generation), None);
    }

    #[test]
    fn take_pending_empties_the_slot() {
        let mut debounce = Debounce::new(QUIET);
        let generation = debounce.arm(7).expect("should arm");

        assert_eq!(debounce.take_pending(), Some(7));
        assert_eq!(debounce.fire(generation), None);
    }

    #[test]
    fn disposed_debounce_refuses_arms_and_drops_pending() {
        let mut debounce = Debounce::new(QUIET);
        let generation = debounce.arm(1).expect("should arm");

        debounce.dispose();

        assert_eq!(debounce.fire(generation), None);
        assert_eq!(debounce.arm(2), None);
        assert!(!debounce.has_pending());
    }
}
