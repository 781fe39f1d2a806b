//! Core domain types for order fulfillment.
//!
//! Orders progress through the canonical status sequence
//! `pending → confirmed → preparing → ready → picked → delivering → delivered`.
//! Ratings reference a delivered order and are keyed by (product, customer).

use crate::error::RatingError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Creates a new `", stringify!($name), "`")]
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the inner string value
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }
    };
}

string_id!(
    /// Unique identifier for an order
    OrderId
);
string_id!(
    /// Unique identifier for a customer
    CustomerId
);
string_id!(
    /// Unique identifier for a catalog product
    ProductId
);

/// Money amount in cents (to avoid floating point issues)
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a new money amount from cents
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the value in cents
    #[must_use]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the value in currency units (as floating point)
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // i64 to f64 precision loss is acceptable for display
    pub fn amount(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.amount())
    }
}

/// A single line item in an order
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product identifier
    pub product_id: ProductId,
    /// Product name for display
    pub name: String,
    /// Quantity ordered
    pub quantity: u32,
    /// Price per unit
    pub unit_price: Money,
}

impl LineItem {
    /// Creates a new line item
    #[must_use]
    pub fn new(
        product_id: ProductId,
        name: impl Into<String>,
        quantity: u32,
        unit_price: Money,
    ) -> Self {
        Self {
            product_id,
            name: name.into(),
            quantity,
            unit_price,
        }
    }

    /// Total price for this line item
    #[must_use]
    pub const fn total(&self) -> Money {
        Money(self.unit_price.0 * self.quantity as i64)
    }
}

/// Delivery status of an order
///
/// Declaration order is the canonical progression order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order received, awaiting store confirmation
    Pending,
    /// Store accepted the order
    Confirmed,
    /// Items are being picked and packed
    Preparing,
    /// Bagged and waiting for a courier
    Ready,
    /// Courier collected the order
    Picked,
    /// Courier is on the way
    Delivering,
    /// Handed to the customer (terminal)
    Delivered,
}

impl OrderStatus {
    /// Canonical status sequence
    pub const ALL: [Self; 7] = [
        Self::Pending,
        Self::Confirmed,
        Self::Preparing,
        Self::Ready,
        Self::Picked,
        Self::Delivering,
        Self::Delivered,
    ];

    /// Number of statuses in the canonical sequence
    pub const COUNT: usize = Self::ALL.len();

    /// Position in the canonical sequence
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Status at `index`, clamped into the sequence
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        if index >= Self::COUNT {
            Self::Delivered
        } else {
            Self::ALL[index]
        }
    }

    /// Whether no further transitions can occur
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered)
    }

    /// Lowercase wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::Picked => "picked",
            Self::Delivering => "delivering",
            Self::Delivered => "delivered",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A customer order as seen by the fulfillment core
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Order identifier
    pub id: OrderId,
    /// Customer who placed the order
    pub customer_id: CustomerId,
    /// Items in the order
    pub items: Vec<LineItem>,
    /// Current delivery status
    pub status: OrderStatus,
    /// When checkout created the order
    pub created_at: DateTime<Utc>,
    /// Current projected delivery time, if one was estimated
    pub estimated_delivery: Option<DateTime<Utc>>,
}

impl Order {
    /// Creates a pending order with no delivery estimate
    #[must_use]
    pub const fn new(
        id: OrderId,
        customer_id: CustomerId,
        items: Vec<LineItem>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            customer_id,
            items,
            status: OrderStatus::Pending,
            created_at,
            estimated_delivery: None,
        }
    }

    /// Sets the projected delivery time
    #[must_use]
    pub const fn with_estimated_delivery(mut self, at: DateTime<Utc>) -> Self {
        self.estimated_delivery = Some(at);
        self
    }

    /// Sets the current status
    #[must_use]
    pub const fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }

    /// Whether any line item is for `product_id`
    #[must_use]
    pub fn contains_product(&self, product_id: &ProductId) -> bool {
        self.items.iter().any(|item| &item.product_id == product_id)
    }

    /// Whether the order reached the terminal status
    #[must_use]
    pub const fn is_delivered(&self) -> bool {
        self.status.is_terminal()
    }

    /// Sum of all line items
    #[must_use]
    pub fn total(&self) -> Money {
        Money(self.items.iter().map(|item| item.total().cents()).sum())
    }
}

/// Partial order update emitted while an order is tracked
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    /// Newly reached status
    pub status: OrderStatus,
    /// Re-projected delivery time
    pub estimated_delivery: DateTime<Utc>,
}

/// A point on the globe in decimal degrees
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
}

impl Coordinates {
    /// Creates a coordinate pair
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Star rating between 1 and 5 inclusive
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct RatingValue(u8);

impl RatingValue {
    /// Lowest accepted rating
    pub const MIN: u8 = 1;
    /// Highest accepted rating
    pub const MAX: u8 = 5;

    /// Validates and wraps a rating
    ///
    /// # Errors
    ///
    /// Returns [`RatingError::InvalidRating`] outside `1..=5`.
    pub const fn new(value: u8) -> Result<Self, RatingError> {
        if value >= Self::MIN && value <= Self::MAX {
            Ok(Self(value))
        } else {
            Err(RatingError::InvalidRating(value))
        }
    }

    /// The numeric rating
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for RatingValue {
    type Error = RatingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RatingValue> for u8 {
    fn from(value: RatingValue) -> Self {
        value.0
    }
}

impl fmt::Display for RatingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/5", self.0)
    }
}

/// Key under which at most one rating is active
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RatingKey {
    /// Rated product
    pub product_id: ProductId,
    /// Rating customer
    pub customer_id: CustomerId,
}

impl RatingKey {
    /// Creates a key
    #[must_use]
    pub const fn new(product_id: ProductId, customer_id: CustomerId) -> Self {
        Self {
            product_id,
            customer_id,
        }
    }
}

/// A customer's rating of a product from a delivered order
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRating {
    /// Rated product
    pub product_id: ProductId,
    /// Customer who rated
    pub customer_id: CustomerId,
    /// Order proving the purchase
    pub order_id: OrderId,
    /// Star value
    pub rating: RatingValue,
    /// When the rating was submitted
    pub created_at: DateTime<Utc>,
}

impl ProductRating {
    /// The (product, customer) key this rating occupies
    #[must_use]
    pub fn key(&self) -> RatingKey {
        RatingKey::new(self.product_id.clone(), self.customer_id.clone())
    }
}
