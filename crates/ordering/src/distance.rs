//! Distance estimation between pickup and delivery addresses.

use async_trait::async_trait;

use crate::error::Result;

/// Estimates the travelled distance of a delivery, in kilometres.
#[async_trait]
pub trait DistanceEstimator: Send + Sync {
    async fn estimate_km(&self, pickup_address: &str, delivery_address: &str) -> Result<f64>;
}

/// Returns the same distance for every pair of addresses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedDistanceEstimator {
    km: f64,
}

impl FixedDistanceEstimator {
    pub const DEFAULT_KM: f64 = 10.0;

    pub fn new(km: f64) -> Self {
        Self { km }
    }
}

impl Default for FixedDistanceEstimator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_KM)
    }
}

#[async_trait]
impl DistanceEstimator for FixedDistanceEstimator {
    async fn estimate_km(&self, _pickup_address: &str, _delivery_address: &str) -> Result<f64> {
        Ok(self.km)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn default_is_ten_km() {
        let km = FixedDistanceEstimator::default()
            .estimate_km("Jl. Sudirman", "Jl. Thamrin")
            .await
            .unwrap();
        assert_eq!(km, 10.0);
    }
}
