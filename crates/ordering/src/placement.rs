//! The order placement transaction.

use std::sync::Arc;

use common::{CustomerId, OrderId};
use domain::{OrderReceipt, OrderStatus, PlaceOrder, PricingFactors, validate};
use store::{Database, params};

use crate::distance::DistanceEstimator;
use crate::error::{OrderingError, Result};

const PRICING_SQL: &str = r#"
    SELECT tm.base_price, tm.price_per_km, ct.price_multiplier
    FROM service_instances si
    JOIN service_templates st ON si.template_id = st.id
    JOIN transportation_modes tm ON st.mode_id = tm.mode_id
    JOIN cargo_types ct ON ct.type_name = $cargo_type
    WHERE si.id = $service_id
"#;

/// Places customer orders.
#[derive(Clone)]
pub struct OrderPlacement {
    db: Database,
    distance: Arc<dyn DistanceEstimator>,
}

impl OrderPlacement {
    pub fn new(db: Database, distance: Arc<dyn DistanceEstimator>) -> Self {
        Self { db, distance }
    }

    /// Prices and records a new pending order for `customer`.
    ///
    /// Either both the order and its initial history row are written, or
    /// nothing is. The distance is estimated before the transaction opens so
    /// a slow estimator never holds the store connection.
    #[tracing::instrument(skip(self, order), fields(service_id = %order.service_id))]
    pub async fn place(&self, customer: &CustomerId, order: &PlaceOrder) -> Result<OrderReceipt> {
        validate(order)?;

        let distance = self
            .distance
            .estimate_km(order.pickup_address.trim(), order.delivery_address.trim())
            .await?;

        let mut tx = self.db.begin().await?;

        let factors: PricingFactors = tx
            .fetch_optional(
                PRICING_SQL,
                &params! {
                    "cargo_type" => order.cargo_type.trim(),
                    "service_id" => order.service_id,
                },
            )
            .await?
            .ok_or_else(|| OrderingError::Validation("Invalid service or cargo type".to_string()))?
            .decode()?;

        let total_price = factors.total_for(distance);
        let status = OrderStatus::Pending;

        let (_, order_id) = tx
            .execute(
                r#"
                INSERT INTO orders (
                    service_instance_id, customer_id, status, pickup_address,
                    delivery_address, cargo_type, cargo_weight, total_price, notes
                )
                VALUES (
                    $service_id, $customer_id, $status, $pickup, $delivery,
                    $cargo_type, $weight, $total_price, $notes
                )
                "#,
                &params! {
                    "service_id" => order.service_id,
                    "customer_id" => customer.as_str(),
                    "status" => status.as_str(),
                    "pickup" => order.pickup_address.trim(),
                    "delivery" => order.delivery_address.trim(),
                    "cargo_type" => order.cargo_type.trim(),
                    "weight" => order.cargo_weight,
                    "total_price" => total_price,
                    "notes" => order.notes.clone(),
                },
            )
            .await?;

        tx.execute(
            r#"
            INSERT INTO order_status_history (order_id, status, notes)
            VALUES ($order_id, $status, 'Order placed')
            "#,
            &params! { "order_id" => order_id, "status" => status.as_str() },
        )
        .await?;

        tx.commit().await?;

        metrics::counter!("orders_placed_total").increment(1);
        tracing::info!(order_id, total_price, distance_km = distance, "Order placed");

        Ok(OrderReceipt {
            order_id: OrderId::new(order_id),
            status,
            total_price,
        })
    }
}
