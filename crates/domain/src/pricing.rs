//! Order pricing.

use serde::{Deserialize, Serialize};

/// Tariff inputs joined from the service's mode and the chosen cargo type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingFactors {
    pub base_price: f64,
    pub price_per_km: f64,
    pub price_multiplier: f64,
}

impl PricingFactors {
    /// `(base_price + price_per_km * distance_km) * price_multiplier`
    pub fn total_for(&self, distance_km: f64) -> f64 {
        (self.base_price + self.price_per_km * distance_km) * self.price_multiplier
    }
}
