//! Rating submission through the composed fulfillment store.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect

use freshcart_testing::{InstantClock, epoch, init_test_tracing};
use fulfillment::mocks::{InMemoryRatingStore, RecordingRatingNotifier, RecordingTrackingObserver};
use fulfillment::rating::{RatingEnvironment, RatingRequest, submit_rating};
use fulfillment::tracking::{TrackingEnvironment, track_order};
use fulfillment::types::RatingKey;
use fulfillment::{
    CustomerId, FulfillmentEnvironment, FulfillmentReducer, FulfillmentState, FulfillmentStore,
    LineItem, Money, Order, OrderId, OrderStatus, PersistenceError, ProductId, RatingError,
    RatingValue,
};
use std::sync::Arc;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(5);

struct Harness {
    store: FulfillmentStore,
    ratings: InMemoryRatingStore,
    notifier: RecordingRatingNotifier,
}

fn harness(orders: Vec<Order>, ratings: InMemoryRatingStore) -> Harness {
    init_test_tracing();
    let clock = Arc::new(InstantClock::new(epoch()));
    let notifier = RecordingRatingNotifier::new();
    let env = FulfillmentEnvironment {
        tracking: TrackingEnvironment::new(
            clock.clone(),
            Arc::new(RecordingTrackingObserver::new()),
        ),
        rating: RatingEnvironment::new(clock, Arc::new(ratings.clone()))
            .with_notifier(Arc::new(notifier.clone())),
    };
    let store = FulfillmentStore::new(
        FulfillmentState::from_snapshot(orders, Vec::new()),
        FulfillmentReducer::new(),
        env,
    );
    Harness {
        store,
        ratings,
        notifier,
    }
}

fn order(id: &str, customer: &str, status: OrderStatus) -> Order {
    Order::new(
        OrderId::new(id),
        CustomerId::new(customer),
        vec![
            LineItem::new(ProductId::new("apples"), "Apples", 6, Money::from_cents(60)),
            LineItem::new(ProductId::new("bread"), "Bread", 1, Money::from_cents(320)),
        ],
        epoch(),
    )
    .with_status(status)
}

fn request(customer: &str, stars: u8, order_id: &str) -> RatingRequest {
    RatingRequest::new(
        ProductId::new("apples"),
        CustomerId::new(customer),
        RatingValue::new(stars).unwrap(),
    )
    .for_order(OrderId::new(order_id))
}

#[tokio::test]
async fn delivered_order_can_be_rated() {
    let h = harness(
        vec![order("order-1", "alice", OrderStatus::Delivered)],
        InMemoryRatingStore::new(),
    );

    let rating = submit_rating(&h.store, request("alice", 4, "order-1"), TIMEOUT)
        .await
        .unwrap();

    assert_eq!(rating.rating.get(), 4);
    assert_eq!(rating.order_id, OrderId::new("order-1"));
    assert_eq!(h.ratings.len(), 1);
    assert_eq!(h.notifier.ratings(), vec![rating.clone()]);

    let (average, rated) = h
        .store
        .state(|s| {
            (
                s.ratings.average_rating(&ProductId::new("apples")),
                s.ratings.has_rated(&ProductId::new("apples"), &CustomerId::new("alice")),
            )
        })
        .await;
    assert!((average - 4.0).abs() < f64::EPSILON);
    assert!(rated);
}

#[tokio::test]
async fn averages_across_customers() {
    let h = harness(
        vec![
            order("order-1", "alice", OrderStatus::Delivered),
            order("order-2", "bob", OrderStatus::Delivered),
        ],
        InMemoryRatingStore::new(),
    );

    submit_rating(&h.store, request("alice", 4, "order-1"), TIMEOUT).await.unwrap();
    submit_rating(&h.store, request("bob", 5, "order-2"), TIMEOUT).await.unwrap();

    let average = h
        .store
        .state(|s| s.ratings.average_rating(&ProductId::new("apples")))
        .await;
    assert!((average - 4.5).abs() < f64::EPSILON);
    assert!(
        h.store
            .state(|s| s.ratings.average_rating(&ProductId::new("bread")))
            .await
            .abs()
            < f64::EPSILON
    );
}

#[tokio::test]
async fn resubmission_replaces_previous_rating() {
    let h = harness(
        vec![order("order-1", "alice", OrderStatus::Delivered)],
        InMemoryRatingStore::new(),
    );

    submit_rating(&h.store, request("alice", 2, "order-1"), TIMEOUT).await.unwrap();
    submit_rating(&h.store, request("alice", 5, "order-1"), TIMEOUT).await.unwrap();

    let key = RatingKey::new(ProductId::new("apples"), CustomerId::new("alice"));
    assert_eq!(h.ratings.len(), 1);
    assert_eq!(h.ratings.get(&key).unwrap().rating.get(), 5);
    let count = h
        .store
        .state(|s| s.ratings.book().rating_count(&ProductId::new("apples")))
        .await;
    assert_eq!(count, 1);
}

#[tokio::test]
async fn missing_order_reference_is_a_validation_error() {
    let h = harness(
        vec![order("order-1", "alice", OrderStatus::Delivered)],
        InMemoryRatingStore::new(),
    );
    let request = RatingRequest::new(
        ProductId::new("apples"),
        CustomerId::new("alice"),
        RatingValue::new(3).unwrap(),
    );

    let error = submit_rating(&h.store, request, TIMEOUT).await.unwrap_err();

    assert!(matches!(error, RatingError::Validation(_)));
    assert!(h.ratings.is_empty());
    assert!(h.notifier.ratings().is_empty());
}

#[tokio::test]
async fn undelivered_order_is_ineligible() {
    let h = harness(
        vec![order("order-1", "alice", OrderStatus::Delivering)],
        InMemoryRatingStore::new(),
    );

    let error = submit_rating(&h.store, request("alice", 5, "order-1"), TIMEOUT)
        .await
        .unwrap_err();

    assert_eq!(
        error,
        RatingError::Ineligible {
            product_id: ProductId::new("apples"),
            customer_id: CustomerId::new("alice"),
        }
    );
    let key = RatingKey::new(ProductId::new("apples"), CustomerId::new("alice"));
    assert_eq!(h.store.state(move |s| s.ratings.selection(&key)).await, None);
}

#[tokio::test]
async fn other_customers_delivery_does_not_count() {
    let h = harness(
        vec![order("order-1", "alice", OrderStatus::Delivered)],
        InMemoryRatingStore::new(),
    );

    let error = submit_rating(&h.store, request("bob", 5, "order-1"), TIMEOUT)
        .await
        .unwrap_err();

    assert!(matches!(error, RatingError::Validation(_)));
    assert!(h.ratings.is_empty());
}

#[tokio::test]
async fn rating_must_reference_own_order() {
    let h = harness(
        vec![
            order("alice-1", "alice", OrderStatus::Delivered),
            order("bob-1", "bob", OrderStatus::Pending),
        ],
        InMemoryRatingStore::new(),
    );

    let error = submit_rating(&h.store, request("alice", 5, "bob-1"), TIMEOUT)
        .await
        .unwrap_err();

    assert_eq!(
        error,
        RatingError::Validation("order bob-1 was placed by another customer".to_string())
    );
    assert!(h.ratings.is_empty());
    assert!(h.notifier.ratings().is_empty());

    let rating = submit_rating(&h.store, request("alice", 5, "alice-1"), TIMEOUT)
        .await
        .unwrap();
    assert_eq!(rating.order_id, OrderId::new("alice-1"));
}

#[tokio::test]
async fn unknown_order_reference_is_rejected() {
    let h = harness(
        vec![order("order-1", "alice", OrderStatus::Delivered)],
        InMemoryRatingStore::new(),
    );

    let error = submit_rating(&h.store, request("alice", 4, "order-404"), TIMEOUT)
        .await
        .unwrap_err();

    assert_eq!(error, RatingError::Validation("unknown order order-404".to_string()));
    assert!(h.ratings.is_empty());
}

#[tokio::test]
async fn persistence_failure_rolls_back_selection() {
    let ratings = InMemoryRatingStore::new();
    let h = harness(
        vec![order("order-1", "alice", OrderStatus::Delivered)],
        ratings.clone(),
    );
    let key = RatingKey::new(ProductId::new("apples"), CustomerId::new("alice"));

    submit_rating(&h.store, request("alice", 3, "order-1"), TIMEOUT).await.unwrap();
    ratings.fail_next(PersistenceError::Unavailable("connection reset".to_string()));

    let error = submit_rating(&h.store, request("alice", 5, "order-1"), TIMEOUT)
        .await
        .unwrap_err();
    assert_eq!(
        error,
        RatingError::Persistence(PersistenceError::Unavailable("connection reset".to_string()))
    );

    let lookup = key.clone();
    let (selection, pending, last_error) = h
        .store
        .state(move |s| {
            (
                s.ratings.selection(&lookup),
                s.ratings.is_pending(&lookup),
                s.ratings.last_error().cloned(),
            )
        })
        .await;
    assert_eq!(selection.map(RatingValue::get), Some(3));
    assert!(!pending);
    assert!(matches!(last_error, Some(RatingError::Persistence(_))));
    assert_eq!(h.ratings.get(&key).unwrap().rating.get(), 3);
    assert_eq!(h.notifier.ratings().len(), 1);

    // one-shot failure
    submit_rating(&h.store, request("alice", 5, "order-1"), TIMEOUT).await.unwrap();
    assert_eq!(h.ratings.get(&key).unwrap().rating.get(), 5);
}

#[tokio::test(start_paused = true)]
async fn slow_store_times_out() {
    let h = harness(
        vec![order("order-1", "alice", OrderStatus::Delivered)],
        InMemoryRatingStore::new().with_latency(Duration::from_secs(30)),
    );

    let error = submit_rating(&h.store, request("alice", 4, "order-1"), Duration::from_secs(1))
        .await
        .unwrap_err();

    assert_eq!(error, RatingError::Timeout);
}

#[tokio::test(start_paused = true)]
async fn tracked_order_becomes_rateable_on_delivery() {
    let order = order("order-1", "alice", OrderStatus::Pending)
        .with_estimated_delivery(epoch() + chrono::Duration::minutes(25));
    let h = harness(Vec::new(), InMemoryRatingStore::new());

    let _handle = track_order(&h.store, order).await.unwrap();

    tokio::time::sleep(Duration::from_secs(10 * 60)).await;
    let error = submit_rating(&h.store, request("alice", 5, "order-1"), TIMEOUT)
        .await
        .unwrap_err();
    assert!(matches!(error, RatingError::Ineligible { .. }));

    tokio::time::sleep(Duration::from_secs(20 * 60)).await;
    let rating = submit_rating(&h.store, request("alice", 5, "order-1"), TIMEOUT)
        .await
        .unwrap();
    assert_eq!(rating.rating.get(), 5);
}

#[tokio::test]
async fn submit_after_shutdown_fails() {
    let h = harness(
        vec![order("order-1", "alice", OrderStatus::Delivered)],
        InMemoryRatingStore::new(),
    );
    h.store.shutdown().await.unwrap();

    let error = submit_rating(&h.store, request("alice", 4, "order-1"), TIMEOUT)
        .await
        .unwrap_err();

    assert!(matches!(error, RatingError::Store(_)));
}
