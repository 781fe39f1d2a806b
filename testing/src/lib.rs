//! # FreshCart Testing
//!
//! Testing utilities and helpers for the FreshCart fulfillment core.
//!
//! This crate provides:
//! - Deterministic [`Clock`] implementations ([`FixedClock`], [`TestClock`], [`InstantClock`])
//! - [`ReducerTest`], a Given-When-Then harness for reducers
//! - Effect assertion helpers
//!
//! ## Example
//!
//! ```ignore
//! use freshcart_testing::{test_clock, ReducerTest};
//!
//! ReducerTest::new(TrackingReducer::new())
//!     .with_env(test_environment())
//!     .given_state(TrackingState::default())
//!     .when_action(TrackingAction::StartTracking { order })
//!     .then_effects(|effects| assertions::assert_has_delay_effect(effects))
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use freshcart_core::environment::Clock;

/// Given-When-Then testing for reducers
pub mod reducer_test;

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use std::sync::{Arc, Mutex, PoisonError};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use freshcart_testing::mocks::FixedClock;
    /// use freshcart_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Manually advanced clock
    ///
    /// Clones share the same time, so a test can keep one handle and hand
    /// another to the environment.
    ///
    /// ```
    /// use freshcart_testing::mocks::TestClock;
    /// use freshcart_core::environment::Clock;
    ///
    /// let clock = TestClock::default();
    /// let start = clock.now();
    /// clock.advance(chrono::Duration::seconds(5));
    /// assert_eq!(clock.now() - start, chrono::Duration::seconds(5));
    /// ```
    #[derive(Debug, Clone)]
    pub struct TestClock {
        time: Arc<Mutex<DateTime<Utc>>>,
    }

    impl TestClock {
        /// Create a clock starting at `time`
        #[must_use]
        pub fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Arc::new(Mutex::new(time)),
            }
        }

        /// Move the clock forward
        pub fn advance(&self, by: chrono::Duration) {
            let mut time = self.time.lock().unwrap_or_else(PoisonError::into_inner);
            *time += by;
        }

        /// Jump to an absolute time
        pub fn set(&self, to: DateTime<Utc>) {
            *self.time.lock().unwrap_or_else(PoisonError::into_inner) = to;
        }
    }

    impl Default for TestClock {
        fn default() -> Self {
            Self::new(epoch())
        }
    }

    impl Clock for TestClock {
        fn now(&self) -> DateTime<Utc> {
            *self.time.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    /// Clock that follows tokio's clock from a fixed wall-clock origin
    ///
    /// Under `#[tokio::test(start_paused = true)]` tokio time only moves when
    /// the runtime auto-advances to the next timer, so `now()` stays in step
    /// with `Effect::Delay` executions in the Store.
    ///
    /// Must be created inside a tokio runtime.
    #[derive(Debug, Clone)]
    pub struct InstantClock {
        origin: DateTime<Utc>,
        started: tokio::time::Instant,
    }

    impl InstantClock {
        /// Create a clock reading `origin` at the current tokio instant
        #[must_use]
        pub fn new(origin: DateTime<Utc>) -> Self {
            Self {
                origin,
                started: tokio::time::Instant::now(),
            }
        }
    }

    impl Clock for InstantClock {
        fn now(&self) -> DateTime<Utc> {
            let elapsed = chrono::Duration::from_std(self.started.elapsed())
                .unwrap_or_else(|_| chrono::Duration::zero());
            self.origin + elapsed
        }
    }

    /// 2025-01-01 00:00:00 UTC
    #[must_use]
    pub fn epoch() -> DateTime<Utc> {
        DateTime::from_timestamp(1_735_689_600, 0).unwrap_or_default()
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(epoch())
    }
}

/// Install a `tracing` subscriber that writes through the test harness
///
/// Honors `RUST_LOG`; safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use mocks::{FixedClock, InstantClock, TestClock, epoch, test_clock};
pub use reducer_test::{ReducerTest, assertions};
