//! Time source for note timestamps.

use chrono::{DateTime, SubsecRound, Utc};

/// Supplies "now" to the store.
///
/// Implementations must return millisecond-precision values so that a
/// persisted note decodes back to an equal value.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock, truncated to milliseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now().trunc_subsecs(3)
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, SystemClock};
    use chrono::Timelike;

    #[test]
    fn system_clock_has_millisecond_precision() {
        let now = SystemClock.now();
        assert_eq!(now.nanosecond() % 1_000_000, 0);
    }
}
