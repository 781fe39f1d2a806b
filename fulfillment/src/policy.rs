//! Rating eligibility rules.
//!
//! A customer may rate a product once an order of theirs containing it has
//! been delivered. Each (product, customer) pair holds at most one rating.

use crate::types::{CustomerId, Order, ProductId, ProductRating, RatingKey};
use std::collections::HashMap;

/// Whether `customer_id` has a delivered order containing `product_id`
#[must_use]
pub fn can_rate(product_id: &ProductId, customer_id: &CustomerId, orders: &[Order]) -> bool {
    orders.iter().any(|order| {
        &order.customer_id == customer_id
            && order.is_delivered()
            && order.contains_product(product_id)
    })
}

/// Whether `customer_id` already rated `product_id`
#[must_use]
pub fn has_rated(
    product_id: &ProductId,
    customer_id: &CustomerId,
    ratings: &[ProductRating],
) -> bool {
    ratings
        .iter()
        .any(|rating| &rating.product_id == product_id && &rating.customer_id == customer_id)
}

/// Mean rating of a product, `0.0` when it has none
///
/// ```
/// use fulfillment::policy::average_rating;
/// use fulfillment::types::ProductId;
///
/// assert!(average_rating(&ProductId::new("milk"), &[]).abs() < f64::EPSILON);
/// ```
#[must_use]
pub fn average_rating(product_id: &ProductId, ratings: &[ProductRating]) -> f64 {
    mean(ratings.iter().filter(|rating| &rating.product_id == product_id))
}

/// Number of ratings for a product
#[must_use]
pub fn rating_count(product_id: &ProductId, ratings: &[ProductRating]) -> usize {
    ratings
        .iter()
        .filter(|rating| &rating.product_id == product_id)
        .count()
}

#[allow(clippy::cast_precision_loss)] // rating counts stay far below 2^52
fn mean<'a>(ratings: impl Iterator<Item = &'a ProductRating>) -> f64 {
    let (sum, count) = ratings.fold((0_u64, 0_u64), |(sum, count), rating| {
        (sum + u64::from(rating.rating.get()), count + 1)
    });

    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}

/// In-memory ratings keyed by (product, customer)
///
/// Inserting for an existing key replaces the previous rating.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RatingBook {
    ratings: HashMap<RatingKey, ProductRating>,
}

impl RatingBook {
    /// Creates an empty book
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace, returning the rating it replaced
    pub fn upsert(&mut self, rating: ProductRating) -> Option<ProductRating> {
        self.ratings.insert(rating.key(), rating)
    }

    /// Rating stored for a key
    #[must_use]
    pub fn get(&self, key: &RatingKey) -> Option<&ProductRating> {
        self.ratings.get(key)
    }

    /// Whether `customer_id` rated `product_id`
    #[must_use]
    pub fn has_rated(&self, product_id: &ProductId, customer_id: &CustomerId) -> bool {
        self.ratings
            .contains_key(&RatingKey::new(product_id.clone(), customer_id.clone()))
    }

    /// Mean rating of a product, `0.0` when it has none
    #[must_use]
    pub fn average_rating(&self, product_id: &ProductId) -> f64 {
        mean(self.for_product(product_id))
    }

    /// Number of ratings for a product
    #[must_use]
    pub fn rating_count(&self, product_id: &ProductId) -> usize {
        self.for_product(product_id).count()
    }

    /// Total number of ratings
    #[must_use]
    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    /// Whether the book is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    /// All ratings, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &ProductRating> {
        self.ratings.values()
    }

    fn for_product<'a>(
        &'a self,
        product_id: &'a ProductId,
    ) -> impl Iterator<Item = &'a ProductRating> {
        self.ratings
            .values()
            .filter(move |rating| &rating.product_id == product_id)
    }
}

impl FromIterator<ProductRating> for RatingBook {
    fn from_iter<I: IntoIterator<Item = ProductRating>>(iter: I) -> Self {
        let mut book = Self::new();
        for rating in iter {
            book.upsert(rating);
        }
        book
    }
}
