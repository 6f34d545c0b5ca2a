use jiff::Timestamp;

/// Time source for the limiter, swappable so window arithmetic can be
/// tested against simulated time.
pub trait Clock: Send + Sync {
    /// Returns the current time of the clock.
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

#[cfg(test)]
pub(crate) mod test_clock {
    use super::Clock;
    use jiff::{SignedDuration, Timestamp};
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    pub(crate) struct TestClock {
        now: Arc<Mutex<Timestamp>>,
    }

    impl TestClock {
        pub(crate) fn new(now: Timestamp) -> Self {
            Self {
                now: Arc::new(Mutex::new(now)),
            }
        }

        pub(crate) fn advance(&self, by: SignedDuration) {
            let mut now = self
                .now
                .lock()
                .expect("test clock lock should not be poisoned");
            *now = *now + by;
        }
    }

    impl Clock for TestClock {
        fn now(&self) -> Timestamp {
            *self
                .now
                .lock()
                .expect("test clock lock should not be poisoned")
        }
    }

    #[test]
    fn test_clock_advances() {
        let base = Timestamp::from_second(0).unwrap();
        let clock = TestClock::new(base);
        assert_eq!(clock.now(), base);

        clock.advance(SignedDuration::from_secs(100));
        assert_eq!(clock.now(), base + SignedDuration::from_secs(100));
    }
}
