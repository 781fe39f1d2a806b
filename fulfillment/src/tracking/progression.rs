//! Stepped status progression for a single order.
//!
//! Each tick adds one tick interval of simulated elapsed time and then maps
//! `elapsed / total` onto the canonical status sequence. Status only moves
//! forward; a computed status at or behind the current one is ignored.

use crate::types::{Order, OrderStatus, StatusUpdate};
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Outcome of evaluating a progression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// No status change; schedule the next tick
    Unchanged,
    /// Moved to a non-terminal status
    Advanced(StatusUpdate),
    /// Reached `Delivered`; `None` when it was already delivered at start
    Completed(Option<StatusUpdate>),
}

/// Time-driven status state of one tracked order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusProgression {
    status: OrderStatus,
    total: Duration,
    elapsed: Duration,
    tick: Duration,
}

impl StatusProgression {
    /// Start from the order's current status with zero elapsed time
    ///
    /// The time budget is `estimated_delivery - created_at` when that is
    /// positive, otherwise `fallback`.
    #[must_use]
    pub fn new(order: &Order, tick: Duration, fallback: Duration) -> Self {
        Self {
            status: order.status,
            total: total_duration(order, fallback),
            elapsed: Duration::ZERO,
            tick,
        }
    }

    /// Evaluate before any tick
    ///
    /// Completes immediately when the order is already delivered (without an
    /// update) or the time budget is zero (with a single `Delivered` update).
    pub fn start(&mut self, now: DateTime<Utc>) -> Step {
        if self.status.is_terminal() {
            return Step::Completed(None);
        }
        if self.total.is_zero() {
            return self.evaluate(now);
        }
        Step::Unchanged
    }

    /// Add one tick of elapsed time and evaluate
    pub fn advance(&mut self, now: DateTime<Utc>) -> Step {
        if self.status.is_terminal() {
            return Step::Completed(None);
        }
        self.elapsed = self.elapsed.saturating_add(self.tick);
        self.evaluate(now)
    }

    /// Move to an externally reported status if it is ahead
    ///
    /// Returns `false` and leaves the progression untouched otherwise.
    pub fn override_status(&mut self, status: OrderStatus) -> bool {
        if status <= self.status {
            return false;
        }
        self.status = status;
        true
    }

    /// Current status
    #[must_use]
    pub const fn status(&self) -> OrderStatus {
        self.status
    }

    /// Simulated time elapsed so far
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Total time budget
    #[must_use]
    pub const fn total(&self) -> Duration {
        self.total
    }

    /// Time budget not yet consumed
    #[must_use]
    pub const fn remaining(&self) -> Duration {
        self.total.saturating_sub(self.elapsed)
    }

    /// `elapsed / total`, clamped to `0.0..=1.0`
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.total.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f64() / self.total.as_secs_f64()).min(1.0)
    }

    /// Index the current elapsed time maps to
    ///
    /// Integer arithmetic keeps `floor(progress * (N - 1))` exact at stage
    /// boundaries.
    fn target_index(&self) -> usize {
        let last = OrderStatus::COUNT - 1;
        if self.total.is_zero() {
            return last;
        }
        let scaled = self.elapsed.as_nanos().saturating_mul(last as u128) / self.total.as_nanos();
        usize::try_from(scaled).map_or(last, |index| index.min(last))
    }

    fn evaluate(&mut self, now: DateTime<Utc>) -> Step {
        let target = OrderStatus::from_index(self.target_index());
        if target <= self.status {
            return Step::Unchanged;
        }

        self.status = target;
        let remaining = chrono::Duration::from_std(self.remaining())
            .unwrap_or_else(|_| chrono::Duration::zero());
        let update = StatusUpdate {
            status: target,
            estimated_delivery: now + remaining,
        };

        if target.is_terminal() {
            Step::Completed(Some(update))
        } else {
            Step::Advanced(update)
        }
    }
}

fn total_duration(order: &Order, fallback: Duration) -> Duration {
    order
        .estimated_delivery
        .filter(|estimate| *estimate > order.created_at)
        .and_then(|estimate| (estimate - order.created_at).to_std().ok())
        .unwrap_or(fallback)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap
mod tests {
    use super::*;
    use crate::types::{CustomerId, OrderId};
    use freshcart_testing::epoch;

    const TICK: Duration = Duration::from_secs(5);
    const FALLBACK: Duration = Duration::from_secs(25 * 60);

    fn order_due_in(minutes: i64) -> Order {
        Order::new(OrderId::new("order-1"), CustomerId::new("cust-1"), Vec::new(), epoch())
            .with_estimated_delivery(epoch() + chrono::Duration::minutes(minutes))
    }

    fn run_to_completion(progression: &mut StatusProgression) -> Vec<StatusUpdate> {
        let mut updates = Vec::new();
        let mut now = epoch();
        loop {
            now += chrono::Duration::seconds(5);
            match progression.advance(now) {
                Step::Unchanged => {},
                Step::Advanced(update) => updates.push(update),
                Step::Completed(update) => {
                    updates.extend(update);
                    return updates;
                },
            }
        }
    }

    #[test]
    fn budget_comes_from_estimate() {
        let progression = StatusProgression::new(&order_due_in(10), TICK, FALLBACK);
        assert_eq!(progression.total(), Duration::from_secs(600));
    }

    #[test]
    fn missing_or_past_estimate_uses_fallback() {
        let no_estimate = Order::new(OrderId::new("o"), CustomerId::new("c"), Vec::new(), epoch());
        assert_eq!(StatusProgression::new(&no_estimate, TICK, FALLBACK).total(), FALLBACK);
        assert_eq!(StatusProgression::new(&order_due_in(-3), TICK, FALLBACK).total(), FALLBACK);
        assert_eq!(StatusProgression::new(&order_due_in(0), TICK, FALLBACK).total(), FALLBACK);
    }

    #[test]
    fn walks_every_status_once_in_order() {
        let mut progression = StatusProgression::new(&order_due_in(25), TICK, FALLBACK);
        let statuses: Vec<_> = run_to_completion(&mut progression)
            .into_iter()
            .map(|update| update.status)
            .collect();

        assert_eq!(statuses, OrderStatus::ALL[1..].to_vec());
        assert_eq!(progression.elapsed(), Duration::from_secs(1500));
    }

    #[test]
    fn first_advance_happens_at_stage_boundary() {
        let mut progression = StatusProgression::new(&order_due_in(25), TICK, FALLBACK);
        // 1500s budget, 250s per stage, 50 ticks of 5s
        for _ in 0..49 {
            assert_eq!(progression.advance(epoch()), Step::Unchanged);
        }
        let step = progression.advance(epoch());
        assert!(matches!(
            step,
            Step::Advanced(StatusUpdate {
                status: OrderStatus::Confirmed,
                ..
            })
        ));
    }

    #[test]
    fn estimated_delivery_is_now_plus_remaining_budget() {
        let mut progression = StatusProgression::new(&order_due_in(25), TICK, FALLBACK);
        let updates = run_to_completion(&mut progression);

        // the test clock moves with elapsed time, so the projection holds still
        let due = epoch() + chrono::Duration::seconds(1500);
        assert!(updates.iter().all(|update| update.estimated_delivery == due));
        assert_eq!(updates.last().map(|update| update.status), Some(OrderStatus::Delivered));
    }

    #[test]
    fn starts_from_current_status() {
        let order = order_due_in(25).with_status(OrderStatus::Ready);
        let mut progression = StatusProgression::new(&order, TICK, FALLBACK);
        let statuses: Vec<_> = run_to_completion(&mut progression)
            .into_iter()
            .map(|update| update.status)
            .collect();

        assert_eq!(
            statuses,
            vec![OrderStatus::Picked, OrderStatus::Delivering, OrderStatus::Delivered]
        );
    }

    #[test]
    fn delivered_order_completes_without_update() {
        let order = order_due_in(25).with_status(OrderStatus::Delivered);
        let mut progression = StatusProgression::new(&order, TICK, FALLBACK);

        assert_eq!(progression.start(epoch()), Step::Completed(None));
    }

    #[test]
    fn zero_budget_delivers_immediately() {
        let order = Order::new(OrderId::new("o"), CustomerId::new("c"), Vec::new(), epoch());
        let mut progression = StatusProgression::new(&order, TICK, Duration::ZERO);

        assert!((progression.progress() - 1.0).abs() < f64::EPSILON);
        assert_eq!(
            progression.start(epoch()),
            Step::Completed(Some(StatusUpdate {
                status: OrderStatus::Delivered,
                estimated_delivery: epoch(),
            }))
        );
    }

    #[test]
    fn budget_shorter_than_tick_delivers_on_first_tick() {
        let order = Order::new(OrderId::new("o"), CustomerId::new("c"), Vec::new(), epoch())
            .with_estimated_delivery(epoch() + chrono::Duration::seconds(3));
        let mut progression = StatusProgression::new(&order, TICK, FALLBACK);

        assert_eq!(progression.start(epoch()), Step::Unchanged);
        assert!(matches!(progression.advance(epoch()), Step::Completed(Some(_))));
    }

    #[test]
    fn override_only_moves_forward() {
        let order = order_due_in(25).with_status(OrderStatus::Picked);
        let mut progression = StatusProgression::new(&order, TICK, FALLBACK);

        assert!(!progression.override_status(OrderStatus::Confirmed));
        assert!(!progression.override_status(OrderStatus::Picked));
        assert!(progression.override_status(OrderStatus::Delivering));
        assert_eq!(progression.status(), OrderStatus::Delivering);
    }
}
