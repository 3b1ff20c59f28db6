// Time source for cache expiry.
// Injectable so TTL behavior can be tested without sleeping.

use chrono::{DateTime, Utc};

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
pub use fake::FakeClock;

#[cfg(test)]
mod fake {
    use std::sync::atomic::{AtomicI64, Ordering};

    use chrono::{DateTime, Duration, Utc};

    use super::Clock;

    /// Manually advanced clock for tests.
    #[derive(Debug)]
    pub struct FakeClock {
        millis: AtomicI64,
    }

    impl FakeClock {
        pub fn new(start: DateTime<Utc>) -> Self {
            Self {
                millis: AtomicI64::new(start.timestamp_millis()),
            }
        }

        pub fn advance(&self, by: Duration) {
            self.millis
                .fetch_add(by.num_milliseconds(), Ordering::SeqCst);
        }
    }

    impl Default for FakeClock {
        fn default() -> Self {
            Self::new(Utc::now())
        }
    }

    impl Clock for FakeClock {
        fn now(&self) -> DateTime<Utc> {
            DateTime::from_timestamp_millis(self.millis.load(Ordering::SeqCst))
                .unwrap_or_default()
        }
    }
}
