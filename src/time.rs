//! Millisecond timestamps.
//!
//! The clock is an external, monotonically non-decreasing `u32` counter that
//! wraps after ~49.7 days. Every interval in the crate is measured with
//! [`elapsed`], never by comparing absolute timestamps.

/// Milliseconds since an arbitrary epoch, wrapping.
pub type Millis = u32;

/// Time passed from `since` to `now`, correct across counter wraparound.
#[inline]
pub const fn elapsed(now: Millis, since: Millis) -> Millis {
    now.wrapping_sub(since)
}

/// Source of the current time for the tick loop.
pub trait Clock {
    fn now_ms(&self) -> Millis;
}

/// Repeating deadline anchored at a start timestamp.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Interval {
    since: Millis,
}

impl Interval {
    /// Interval anchored at `now`.
    pub const fn starting_at(now: Millis) -> Self {
        Self { since: now }
    }

    /// Re-anchors the interval at `now`.
    pub fn restart(&mut self, now: Millis) {
        self.since = now;
    }

    /// Returns `true` once at least `period` has passed since the last expiry,
    /// re-anchoring at `now` when it fires.
    pub fn expired(&mut self, now: Millis, period: Millis) -> bool {
        if elapsed(now, self.since) >= period {
            self.since = now;
            true
        } else {
            false
        }
    }

    /// Time since the anchor, wraparound-safe.
    pub fn elapsed(&self, now: Millis) -> Millis {
        elapsed(now, self.since)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_survives_wraparound() {
        assert_eq!(elapsed(5, u32::MAX - 4), 10);
        assert_eq!(elapsed(1000, 400), 600);
    }

    #[test]
    fn interval_fires_and_reanchors() {
        let mut iv = Interval::starting_at(u32::MAX - 50);
        assert!(!iv.expired(u32::MAX, 100));
        assert!(iv.expired(49, 100));
        assert_eq!(iv.elapsed(60), 11);
        assert!(!iv.expired(100, 100));
    }
}
