use common::{DriverId, MitraId, ServiceInstanceId};
use domain::{Deleted, Driver, DriverPayload, validate};
use store::{Database, Params, Returning, StoreError, params};

use crate::error::{RepositoryError, Result};
use crate::rows::decode_rows;

const ENTITY: &str = "Driver";

/// Drivers of a mitra's service instances.
///
/// A driver is visible only through an instance owned by the calling mitra.
#[derive(Clone)]
pub struct DriverRepository {
    db: Database,
}

impl DriverRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn bind(payload: &DriverPayload) -> Result<Params> {
        Ok(params! {
            "name" => payload.name.trim(),
            "phone" => payload.phone.trim(),
            "vehicle_info" => serde_json::to_string(&payload.vehicle_info)?,
        })
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_for_instance(
        &self,
        mitra_id: MitraId,
        instance_id: ServiceInstanceId,
    ) -> Result<Vec<Driver>> {
        self.ensure_instance(mitra_id, instance_id).await?;
        let rows = self
            .db
            .fetch_all(
                "SELECT * FROM drivers WHERE service_instance_id = $instance_id ORDER BY id",
                &params! { "instance_id" => instance_id },
            )
            .await?;
        decode_rows(rows)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get(&self, mitra_id: MitraId, id: DriverId) -> Result<Driver> {
        let row = self
            .db
            .fetch_optional(
                r#"
                SELECT d.* FROM drivers d
                JOIN service_instances si ON d.service_instance_id = si.id
                WHERE d.id = $id AND si.mitra_id = $mitra_id
                "#,
                &params! { "id" => id, "mitra_id" => mitra_id },
            )
            .await?
            .ok_or_else(|| RepositoryError::not_found(ENTITY, id))?;
        Ok(row.decode()?)
    }

    #[tracing::instrument(skip(self, payload))]
    pub async fn create(
        &self,
        mitra_id: MitraId,
        instance_id: ServiceInstanceId,
        payload: &DriverPayload,
    ) -> Result<Driver> {
        validate(payload)?;
        self.ensure_instance(mitra_id, instance_id).await?;

        let row = self
            .db
            .query_returning::<Self>(
                r#"
                INSERT INTO drivers (service_instance_id, name, phone, vehicle_info)
                VALUES ($instance_id, $name, $phone, $vehicle_info)
                "#,
                &Self::bind(payload)?.with("instance_id", instance_id),
            )
            .await?
            .ok_or(StoreError::UnexpectedOutcome("inserted row"))?;
        Ok(row.decode()?)
    }

    #[tracing::instrument(skip(self, payload))]
    pub async fn update(
        &self,
        mitra_id: MitraId,
        id: DriverId,
        payload: &DriverPayload,
    ) -> Result<Driver> {
        validate(payload)?;
        let row = self
            .db
            .query_returning::<Self>(
                r#"
                UPDATE drivers
                SET name = $name,
                    phone = $phone,
                    vehicle_info = $vehicle_info,
                    updated_at = CURRENT_TIMESTAMP
                WHERE id = $id
                  AND EXISTS (
                      SELECT 1 FROM service_instances si
                      WHERE si.id = drivers.service_instance_id AND si.mitra_id = $mitra_id
                  )
                "#,
                &Self::bind(payload)?
                    .with("id", id)
                    .with("mitra_id", mitra_id),
            )
            .await?
            .ok_or_else(|| RepositoryError::not_found(ENTITY, id))?;
        Ok(row.decode()?)
    }

    /// Removes a driver. Orders assigned to it keep their history with no driver.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, mitra_id: MitraId, id: DriverId) -> Result<Deleted> {
        let removed = self
            .db
            .execute(
                r#"
                DELETE FROM drivers
                WHERE id = $id
                  AND EXISTS (
                      SELECT 1 FROM service_instances si
                      WHERE si.id = drivers.service_instance_id AND si.mitra_id = $mitra_id
                  )
                "#,
                &params! { "id" => id, "mitra_id" => mitra_id },
            )
            .await?;
        if removed == 0 {
            return Err(RepositoryError::not_found(ENTITY, id));
        }
        Ok(Deleted::from(true))
    }

    async fn ensure_instance(&self, mitra_id: MitraId, instance_id: ServiceInstanceId) -> Result<()> {
        self.db
            .fetch_optional(
                "SELECT id FROM service_instances WHERE id = $id AND mitra_id = $mitra_id",
                &params! { "id" => instance_id, "mitra_id" => mitra_id },
            )
            .await?
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found("Service instance", instance_id))
    }
}

impl Returning for DriverRepository {
    const TABLE: &'static str = "drivers";
    const PRIMARY_KEY: &'static str = "id";
}
