//! In-memory collaborators for tests and the demo binary.
//!
//! - [`InMemoryRatingStore`]: `HashMap`-backed [`RatingStore`] with failure
//!   injection and optional latency
//! - [`RecordingTrackingObserver`]: captures engine callbacks in order
//! - [`RecordingRatingNotifier`]: captures saved ratings
//!
//! Clones share their storage, so a test can keep one handle and give the
//! other to the environment.

use crate::error::PersistenceError;
use crate::rating::{RatingNotifier, RatingStore};
use crate::tracking::TrackingObserver;
use crate::types::{OrderId, OrderStatus, ProductRating, RatingKey, StatusUpdate};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

#[derive(Debug, Clone)]
enum Failure {
    Next(PersistenceError),
    Always(PersistenceError),
}

/// `HashMap`-backed rating store
///
/// ```
/// use fulfillment::mocks::InMemoryRatingStore;
/// use fulfillment::error::PersistenceError;
///
/// let store = InMemoryRatingStore::new();
/// store.fail_next(PersistenceError::Unavailable("maintenance".into()));
/// assert!(store.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryRatingStore {
    ratings: Arc<RwLock<HashMap<RatingKey, ProductRating>>>,
    failure: Arc<Mutex<Option<Failure>>>,
    latency: Option<Duration>,
}

impl InMemoryRatingStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every save by `latency` on the tokio clock
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Fail the next save only
    pub fn fail_next(&self, error: PersistenceError) {
        *self.failure.lock().unwrap_or_else(PoisonError::into_inner) = Some(Failure::Next(error));
    }

    /// Fail every save until cleared with `None`
    pub fn set_failure(&self, error: Option<PersistenceError>) {
        *self.failure.lock().unwrap_or_else(PoisonError::into_inner) = error.map(Failure::Always);
    }

    /// Stored rating for a key
    #[must_use]
    pub fn get(&self, key: &RatingKey) -> Option<ProductRating> {
        self.ratings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Number of stored ratings
    #[must_use]
    pub fn len(&self) -> usize {
        self.ratings.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether nothing was stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn take_failure(&self) -> Option<PersistenceError> {
        let mut failure = self.failure.lock().unwrap_or_else(PoisonError::into_inner);
        match failure.take() {
            Some(Failure::Next(error)) => Some(error),
            Some(Failure::Always(error)) => {
                *failure = Some(Failure::Always(error.clone()));
                Some(error)
            },
            None => None,
        }
    }
}

impl RatingStore for InMemoryRatingStore {
    fn save_rating(
        &self,
        rating: ProductRating,
    ) -> Pin<Box<dyn Future<Output = Result<(), PersistenceError>> + Send + '_>> {
        Box::pin(async move {
            if let Some(latency) = self.latency {
                tokio::time::sleep(latency).await;
            }
            if let Some(error) = self.take_failure() {
                return Err(error);
            }
            self.ratings
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(rating.key(), rating);
            Ok(())
        })
    }
}

/// Callback captured by [`RecordingTrackingObserver`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackingEvent {
    /// `on_update` fired
    Updated {
        /// Tracked order
        order_id: OrderId,
        /// Reported update
        update: StatusUpdate,
    },
    /// `on_complete` fired
    Completed {
        /// Tracked order
        order_id: OrderId,
    },
}

/// Observer that records every callback
#[derive(Debug, Clone, Default)]
pub struct RecordingTrackingObserver {
    events: Arc<Mutex<Vec<TrackingEvent>>>,
}

impl RecordingTrackingObserver {
    /// Create an observer with no recorded events
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All callbacks in the order they fired
    #[must_use]
    pub fn events(&self) -> Vec<TrackingEvent> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Updates reported for one order
    #[must_use]
    pub fn updates(&self, order_id: &OrderId) -> Vec<StatusUpdate> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                TrackingEvent::Updated { order_id: id, update } if &id == order_id => Some(update),
                _ => None,
            })
            .collect()
    }

    /// Statuses reported for one order
    #[must_use]
    pub fn statuses(&self, order_id: &OrderId) -> Vec<OrderStatus> {
        self.updates(order_id)
            .into_iter()
            .map(|update| update.status)
            .collect()
    }

    /// Number of completions for one order
    #[must_use]
    pub fn completions(&self, order_id: &OrderId) -> usize {
        self.events()
            .iter()
            .filter(|event| {
                matches!(event, TrackingEvent::Completed { order_id: id } if id == order_id)
            })
            .count()
    }

    fn record(&self, event: TrackingEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl TrackingObserver for RecordingTrackingObserver {
    fn on_update(&self, order_id: &OrderId, update: &StatusUpdate) {
        self.record(TrackingEvent::Updated {
            order_id: order_id.clone(),
            update: update.clone(),
        });
    }

    fn on_complete(&self, order_id: &OrderId) {
        self.record(TrackingEvent::Completed {
            order_id: order_id.clone(),
        });
    }
}

/// Notifier that records every saved rating
#[derive(Debug, Clone, Default)]
pub struct RecordingRatingNotifier {
    ratings: Arc<Mutex<Vec<ProductRating>>>,
}

impl RecordingRatingNotifier {
    /// Create a notifier with nothing recorded
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ratings in the order they were reported
    #[must_use]
    pub fn ratings(&self) -> Vec<ProductRating> {
        self.ratings.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl RatingNotifier for RecordingRatingNotifier {
    fn on_rating_submitted(&self, rating: &ProductRating) {
        self.ratings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(rating.clone());
    }
}
