//! Delivery pricing and ETA from two coordinates.
//!
//! Distances are great-circle distances on a spherical Earth. Cost and ETA are
//! computed from the unrounded distance; only the reported values are rounded.

use crate::types::Coordinates;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Mean Earth radius used for great-circle distances
pub const EARTH_RADIUS_KM: f64 = 6371.0;

const COURIER_MIN_RADIUS_KM: f64 = 1.0;
const COURIER_MAX_RADIUS_KM: f64 = 3.0;
/// Fraction of the angular step a courier may drift either way
const COURIER_ANGLE_JITTER: f64 = 0.25;

/// Great-circle distance between two points in kilometers
#[must_use]
pub fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Priced delivery leg
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeliveryCostEstimate {
    /// Delivery fee, two decimals
    pub cost: f64,
    /// Minutes until delivery
    pub estimated_time: u32,
    /// Distance in kilometers, one decimal
    pub distance_km: f64,
}

/// Pricing constants for a delivery leg
///
/// ```
/// use fulfillment::geo::DeliveryPricing;
///
/// let pricing = DeliveryPricing::default().with_per_km_rate(6.5);
/// assert!((pricing.per_km_rate - 6.5).abs() < f64::EPSILON);
/// assert!((pricing.base_fee - 10.0).abs() < f64::EPSILON);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeliveryPricing {
    /// Flat fee charged on every delivery
    pub base_fee: f64,
    /// Fee per kilometer
    pub per_km_rate: f64,
    /// Minutes of handling regardless of distance
    pub base_minutes: f64,
    /// Travel minutes per kilometer
    pub minutes_per_km: f64,
}

impl Default for DeliveryPricing {
    fn default() -> Self {
        Self {
            base_fee: 10.0,
            per_km_rate: 8.0,
            base_minutes: 5.0,
            minutes_per_km: 2.0,
        }
    }
}

impl DeliveryPricing {
    /// Set the flat fee
    #[must_use]
    pub const fn with_base_fee(mut self, base_fee: f64) -> Self {
        self.base_fee = base_fee;
        self
    }

    /// Set the per-kilometer fee
    #[must_use]
    pub const fn with_per_km_rate(mut self, per_km_rate: f64) -> Self {
        self.per_km_rate = per_km_rate;
        self
    }

    /// Set the handling minutes
    #[must_use]
    pub const fn with_base_minutes(mut self, base_minutes: f64) -> Self {
        self.base_minutes = base_minutes;
        self
    }

    /// Set the travel minutes per kilometer
    #[must_use]
    pub const fn with_minutes_per_km(mut self, minutes_per_km: f64) -> Self {
        self.minutes_per_km = minutes_per_km;
        self
    }

    /// Price the leg from `vendor` to `customer`
    #[must_use]
    pub fn estimate(&self, vendor: Coordinates, customer: Coordinates) -> DeliveryCostEstimate {
        let distance = haversine_km(vendor, customer);
        let minutes = (self.base_minutes + distance * self.minutes_per_km)
            .round()
            .max(self.base_minutes.round())
            .max(0.0);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // rounded, non-negative
        let estimated_time = minutes as u32;

        DeliveryCostEstimate {
            cost: round_to(self.base_fee + distance * self.per_km_rate, 2),
            estimated_time,
            distance_km: round_to(distance, 1),
        }
    }
}

/// Price a delivery leg with the default rates
///
/// ```
/// use fulfillment::geo::estimate_delivery;
/// use fulfillment::types::Coordinates;
///
/// let estimate = estimate_delivery(Coordinates::new(0.0, 0.0), Coordinates::new(0.0, 0.01));
/// assert!((estimate.distance_km - 1.1).abs() < 1e-9);
/// assert!((estimate.cost - 18.90).abs() < 1e-9);
/// assert_eq!(estimate.estimated_time, 7);
/// ```
#[must_use]
pub fn estimate_delivery(vendor: Coordinates, customer: Coordinates) -> DeliveryCostEstimate {
    DeliveryPricing::default().estimate(vendor, customer)
}

/// Scatter `count` placeholder courier positions around `center`
///
/// Positions are evenly spaced in bearing with jitter of up to a quarter step
/// and sit 1 to 3 km from the center along the great circle, so they stay
/// valid near the poles and across the antimeridian. Map decoration only.
#[must_use]
#[allow(clippy::cast_precision_loss)] // count is a handful of markers
pub fn courier_positions<R>(center: Coordinates, count: usize, rng: &mut R) -> Vec<Coordinates>
where
    R: Rng + ?Sized,
{
    if count == 0 {
        return Vec::new();
    }

    let step = TAU / count as f64;
    (0..count)
        .map(|i| {
            let jitter = rng.gen_range(-COURIER_ANGLE_JITTER..=COURIER_ANGLE_JITTER) * step;
            let bearing = (i as f64).mul_add(step, jitter);
            let radius_km = rng.gen_range(COURIER_MIN_RADIUS_KM..=COURIER_MAX_RADIUS_KM);

            destination(center, bearing, radius_km)
        })
        .collect()
}

/// Point `distance_km` from `origin` along the initial `bearing` (radians from north)
fn destination(origin: Coordinates, bearing: f64, distance_km: f64) -> Coordinates {
    let angular = distance_km / EARTH_RADIUS_KM;
    let lat1 = origin.latitude.to_radians();
    let lon1 = origin.longitude.to_radians();

    let sin_lat2 = lat1
        .sin()
        .mul_add(angular.cos(), lat1.cos() * angular.sin() * bearing.cos());
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();
    let lon2 = lon1
        + (bearing.sin() * angular.sin() * lat1.cos())
            .atan2(lat1.sin().mul_add(-sin_lat2, angular.cos()));

    Coordinates::new(lat2.to_degrees(), normalize_longitude(lon2.to_degrees()))
}

/// Wrap a longitude into `[-180, 180)`
fn normalize_longitude(longitude: f64) -> f64 {
    (longitude + 180.0).rem_euclid(360.0) - 180.0
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}
