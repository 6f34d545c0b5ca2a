use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use jiff::{SignedDuration, Timestamp};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, warn};
use typed_builder::TypedBuilder;

/// Default call budget per window.
pub const DEFAULT_BUDGET: u32 = 10;

/// Default window length.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(180);

/// Settings for a [`CallLimiter`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct LimiterSettings {
    /// Maximum admissions per window.
    #[builder(default = DEFAULT_BUDGET)]
    pub budget: u32,
    /// Window length.
    #[builder(default = DEFAULT_WINDOW)]
    pub window: Duration,
}

impl Default for LimiterSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Rolling window state, owned exclusively by the limiter.
#[derive(Debug)]
struct RateWindow {
    count: u32,
    window_start: Timestamp,
}

/// Fixed-window call limiter.
///
/// Admits up to `budget` calls per `window`; when the window's start lies
/// further back than the window length, the counter resets and the window
/// restarts at the current instant. This is a fixed-window counter, not a
/// sliding log: bursts straddling a window boundary can admit up to twice
/// the budget across the boundary. That looseness is accepted and
/// documented, not a bug.
///
/// Counter state is process-local; horizontally scaled instances each
/// enforce their own budget.
pub struct CallLimiter<C = SystemClock> {
    budget: u32,
    window: SignedDuration,
    state: Mutex<RateWindow>,
    clock: C,
}

impl CallLimiter<SystemClock> {
    /// Creates a limiter over the wall clock.
    pub fn new(settings: LimiterSettings) -> Self {
        Self::with_clock(settings, SystemClock)
    }
}

impl<C: Clock> CallLimiter<C> {
    /// Creates a limiter over a custom clock.
    pub fn with_clock(settings: LimiterSettings, clock: C) -> Self {
        let window_start = clock.now();
        Self {
            budget: settings.budget,
            window: SignedDuration::from_secs(settings.window.as_secs() as i64),
            state: Mutex::new(RateWindow {
                count: 0,
                window_start,
            }),
            clock,
        }
    }

    /// Admits one call, or fails with `TooManyRequests` if the budget for
    /// the current window is spent.
    pub fn allow(&self) -> Result<()> {
        let mut state = self.state.lock().map_err(|_| Error::StatePoisoned)?;

        let now = self.clock.now();
        if now.duration_since(state.window_start) > self.window {
            debug!(spent = state.count, "window elapsed, resetting call budget");
            state.count = 0;
            state.window_start = now;
        }

        if state.count >= self.budget {
            warn!(budget = self.budget, "call budget exhausted for current window");
            return Err(Error::TooManyRequests);
        }

        state.count += 1;
        Ok(())
    }
}
