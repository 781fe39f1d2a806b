//! Fulfillment demo binary
//!
//! Prices a delivery, tracks the order until it is delivered and submits a
//! rating for one of its products.
//!
//! ```bash
//! FRESHCART_TICK_MS=10 FRESHCART_INITIAL_DELAY_MS=10 \
//!   RUST_LOG=fulfillment=debug cargo run --bin fulfillment-demo
//! ```
//!
//! Without the overrides the engine runs on its production timing (a tick
//! every 5 seconds) and delivery takes the full 25 minutes.

use anyhow::Context;
use freshcart_core::environment::{Clock, SystemClock};
use fulfillment::mocks::InMemoryRatingStore;
use fulfillment::rating::{RatingEnvironment, RatingRequest, submit_rating};
use fulfillment::tracking::{
    LoggingObserver, TrackingConfig, TrackingEnvironment, TrackingObserver, track_order,
};
use fulfillment::{
    Coordinates, CustomerId, FulfillmentEnvironment, FulfillmentReducer, FulfillmentState,
    FulfillmentStore, LineItem, Money, Order, OrderId, ProductId, RatingValue, StatusUpdate,
    estimate_delivery,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Logs every callback and wakes `main` on delivery
struct DemoObserver {
    delivered: Arc<Notify>,
}

impl TrackingObserver for DemoObserver {
    fn on_update(&self, order_id: &OrderId, update: &StatusUpdate) {
        LoggingObserver.on_update(order_id, update);
        println!(
            "  {order_id}: {} (ETA {})",
            update.status,
            update.estimated_delivery.format("%H:%M:%S")
        );
    }

    fn on_complete(&self, order_id: &OrderId) {
        LoggingObserver.on_complete(order_id);
        self.delivered.notify_one();
    }
}

fn env_millis(name: &str) -> anyhow::Result<Option<Duration>> {
    std::env::var(name)
        .ok()
        .map(|raw| {
            raw.parse::<u64>()
                .map(Duration::from_millis)
                .with_context(|| {
                    format!("{name} must be a whole number of milliseconds, got {raw:?}")
                })
        })
        .transpose()
}

fn tracking_config() -> anyhow::Result<TrackingConfig> {
    let mut config = TrackingConfig::default();
    if let Some(tick) = env_millis("FRESHCART_TICK_MS")? {
        config = config.with_tick(tick);
    }
    if let Some(initial_delay) = env_millis("FRESHCART_INITIAL_DELAY_MS")? {
        config = config.with_initial_delay(initial_delay);
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fulfillment=info,freshcart_runtime=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== FreshCart Fulfillment Demo ===\n");

    let vendor = Coordinates::new(52.5200, 13.4050);
    let customer = Coordinates::new(52.5300, 13.4200);
    let estimate = estimate_delivery(vendor, customer);
    println!(
        "Delivery: {:.1} km, fee {:.2}, about {} minutes",
        estimate.distance_km, estimate.cost, estimate.estimated_time
    );

    let config = tracking_config()?;
    info!(?config, "Tracking configuration");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let delivered = Arc::new(Notify::new());
    let ratings = InMemoryRatingStore::new();
    let env = FulfillmentEnvironment {
        tracking: TrackingEnvironment::new(
            Arc::clone(&clock),
            Arc::new(DemoObserver {
                delivered: Arc::clone(&delivered),
            }),
        )
        .with_config(config),
        rating: RatingEnvironment::new(Arc::clone(&clock), Arc::new(ratings.clone())),
    };
    let store = FulfillmentStore::new(FulfillmentState::default(), FulfillmentReducer::new(), env);

    let created_at = clock.now();
    let order = Order::new(
        OrderId::new("order-1001"),
        CustomerId::new("cust-42"),
        vec![
            LineItem::new(ProductId::new("sourdough"), "Sourdough loaf", 1, Money::from_cents(450)),
            LineItem::new(ProductId::new("oat-milk"), "Oat milk 1L", 2, Money::from_cents(229)),
        ],
        created_at,
    )
    .with_estimated_delivery(
        created_at + chrono::Duration::minutes(i64::from(estimate.estimated_time)),
    );
    println!("\nOrder {} placed, total {}", order.id, order.total());

    let tracked = track_order(&store, order).await?;
    println!("Tracking {} ...", tracked.order_id());
    delivered.notified().await;

    let request = RatingRequest::new(
        ProductId::new("sourdough"),
        CustomerId::new("cust-42"),
        RatingValue::new(5)?,
    )
    .for_order(OrderId::new("order-1001"));
    let rating = submit_rating(&store, request, Duration::from_secs(5)).await?;
    println!("\nRated {} {}", rating.product_id, rating.rating);

    let average = store
        .state(|s| s.ratings.average_rating(&ProductId::new("sourdough")))
        .await;
    println!("Average for sourdough: {average:.1} ({} stored)", ratings.len());

    // No-op after delivery
    tracked.cancel().await?;
    store.shutdown().await?;

    println!("\n=== Demo Complete ===");
    Ok(())
}
