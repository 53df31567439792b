//! Orders as seen by mitras (fulfilment) and customers (tracking).
//!
//! Placement lives in the `ordering` crate; this repository only reads
//! orders and moves them through their status lifecycle.

use common::{CustomerId, MitraId, OrderId, ServiceInstanceId};
use domain::{
    MitraOrderSummary, Order, OrderDetails, OrderParties, StatusHistoryEntry, StatusUpdate,
    validate,
};
use store::{Database, params};

use crate::error::{RepositoryError, Result};
use crate::rows::decode_rows;

const ENTITY: &str = "Order";

#[derive(Clone)]
pub struct OrderRepository {
    db: Database,
}

impl OrderRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Orders placed against the mitra's service instances, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn list_for_mitra(
        &self,
        mitra_id: MitraId,
        service_instance_id: Option<ServiceInstanceId>,
    ) -> Result<Vec<MitraOrderSummary>> {
        let mut sql = String::from(
            r#"
            SELECT o.id, o.status, o.pickup_address, o.delivery_address,
                   o.cargo_type, o.cargo_weight, o.total_price, o.driver_id,
                   o.created_at,
                   si.id AS service_instance_id,
                   si.config AS service_config,
                   d.name AS driver_name
            FROM orders o
            JOIN service_instances si ON o.service_instance_id = si.id
            LEFT JOIN drivers d ON o.driver_id = d.id
            WHERE si.mitra_id = $mitra_id
            "#,
        );
        let mut params = params! { "mitra_id" => mitra_id };
        if let Some(instance_id) = service_instance_id {
            sql.push_str(" AND si.id = $instance_id");
            params.set("instance_id", instance_id);
        }
        sql.push_str(" ORDER BY o.created_at DESC, o.id DESC");

        let rows = self.db.fetch_all(&sql, &params).await?;
        decode_rows(rows)
    }

    /// Orders of one customer, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn list_for_customer(&self, customer_id: &CustomerId) -> Result<Vec<Order>> {
        let rows = self
            .db
            .fetch_all(
                r#"
                SELECT * FROM orders
                WHERE customer_id = $customer_id
                ORDER BY created_at DESC, id DESC
                "#,
                &params! { "customer_id" => customer_id.as_str() },
            )
            .await?;
        decode_rows(rows)
    }

    /// One order with its parties and full status history.
    ///
    /// Orders of other customers are reported as missing.
    #[tracing::instrument(skip(self))]
    pub async fn get_for_customer(
        &self,
        customer_id: &CustomerId,
        id: OrderId,
    ) -> Result<OrderDetails> {
        let row = self
            .db
            .fetch_optional(
                r#"
                SELECT o.*,
                       mp.name AS mitra_name,
                       tm.mode_name,
                       d.name AS driver_name
                FROM orders o
                JOIN service_instances si ON o.service_instance_id = si.id
                JOIN mitra_profiles mp ON si.mitra_id = mp.id
                JOIN service_templates st ON si.template_id = st.id
                JOIN transportation_modes tm ON st.mode_id = tm.mode_id
                LEFT JOIN drivers d ON o.driver_id = d.id
                WHERE o.id = $id AND o.customer_id = $customer_id
                "#,
                &params! { "id" => id, "customer_id" => customer_id.as_str() },
            )
            .await?
            .ok_or_else(|| RepositoryError::not_found(ENTITY, id))?;

        let order: Order = row.decode()?;
        let parties: OrderParties = row.decode()?;
        let status_history = self.history(id).await?;

        Ok(OrderDetails {
            order,
            parties,
            status_history,
        })
    }

    async fn history(&self, id: OrderId) -> Result<Vec<StatusHistoryEntry>> {
        let rows = self
            .db
            .fetch_all(
                r#"
                SELECT status, notes, created_at FROM order_status_history
                WHERE order_id = $id
                ORDER BY created_at DESC, id DESC
                "#,
                &params! { "id" => id },
            )
            .await?;
        decode_rows(rows)
    }

    /// Moves an order owned by the mitra to a new status.
    ///
    /// The transition, the optional driver assignment and the history row are
    /// applied in one transaction. A driver must belong to the order's
    /// service instance.
    #[tracing::instrument(skip(self, update), fields(status = %update.status))]
    pub async fn update_status(
        &self,
        mitra_id: MitraId,
        id: OrderId,
        update: &StatusUpdate,
    ) -> Result<Order> {
        validate(update)?;
        let mut tx = self.db.begin().await?;

        let current: Order = tx
            .fetch_optional(
                r#"
                SELECT o.* FROM orders o
                JOIN service_instances si ON o.service_instance_id = si.id
                WHERE o.id = $id AND si.mitra_id = $mitra_id
                "#,
                &params! { "id" => id, "mitra_id" => mitra_id },
            )
            .await?
            .ok_or_else(|| RepositoryError::not_found(ENTITY, id))?
            .decode()?;

        let next = current.status.transition(update.status)?;

        if let Some(driver_id) = update.driver_id {
            tx.fetch_optional(
                "SELECT id FROM drivers WHERE id = $id AND service_instance_id = $instance_id",
                &params! {
                    "id" => driver_id,
                    "instance_id" => current.service_instance_id,
                },
            )
            .await?
            .ok_or_else(|| RepositoryError::not_found("Driver", driver_id))?;
        }

        tx.execute(
            r#"
            UPDATE orders
            SET status = $status,
                driver_id = COALESCE($driver_id, driver_id),
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $id
            "#,
            &params! {
                "status" => next.as_str(),
                "driver_id" => update.driver_id,
                "id" => id,
            },
        )
        .await?;

        let notes = update
            .notes
            .clone()
            .filter(|note| !note.trim().is_empty())
            .unwrap_or_else(|| format!("Status changed to {next}"));
        tx.execute(
            r#"
            INSERT INTO order_status_history (order_id, status, notes)
            VALUES ($id, $status, $notes)
            "#,
            &params! { "id" => id, "status" => next.as_str(), "notes" => notes },
        )
        .await?;

        let updated: Order = tx
            .fetch_optional("SELECT * FROM orders WHERE id = $id", &params! { "id" => id })
            .await?
            .ok_or_else(|| RepositoryError::not_found(ENTITY, id))?
            .decode()?;
        tx.commit().await?;

        tracing::info!(order_id = %id, from = %current.status, to = %next, "Order status changed");
        Ok(updated)
    }
}
