//! Timing configuration for the status engine.

use std::time::Duration;

/// Timing of a tracked order's status engine
///
/// # Example
///
/// ```
/// use fulfillment::tracking::TrackingConfig;
/// use std::time::Duration;
///
/// let config = TrackingConfig::default().with_tick(Duration::from_millis(50));
/// assert_eq!(config.initial_delay, Duration::from_secs(2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackingConfig {
    /// Wait before the first tick
    pub initial_delay: Duration,
    /// Interval between ticks, also the elapsed time each tick adds
    pub tick: Duration,
    /// Time budget for orders without a usable delivery estimate
    pub fallback_duration: Duration,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(2),
            tick: Duration::from_secs(5),
            fallback_duration: Duration::from_secs(25 * 60),
        }
    }
}

impl TrackingConfig {
    /// Set the delay before the first tick
    #[must_use]
    pub const fn with_initial_delay(mut self, initial_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self
    }

    /// Set the tick interval
    #[must_use]
    pub const fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Set the fallback time budget
    #[must_use]
    pub const fn with_fallback_duration(mut self, fallback_duration: Duration) -> Self {
        self.fallback_duration = fallback_duration;
        self
    }
}
