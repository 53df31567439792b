use async_trait::async_trait;
use common::ModeId;
use domain::{Deleted, TransportationMode, TransportationModePayload, validate};
use store::{Database, Params, Returning, StoreError, params};

use super::ReferenceRepository;
use crate::error::{RepositoryError, Result, delete_error, write_error};
use crate::rows::decode_rows;

#[derive(Clone)]
pub struct TransportationModeRepository {
    db: Database,
}

impl TransportationModeRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn bind(payload: &TransportationModePayload) -> Params {
        params! {
            "name" => payload.mode_name.trim(),
            "description" => payload.description.clone(),
            "capacity" => payload.capacity_kg,
            "base_price" => payload.base_price,
            "price_per_km" => payload.price_per_km,
        }
    }
}

impl Returning for TransportationModeRepository {
    const TABLE: &'static str = "transportation_modes";
    const PRIMARY_KEY: &'static str = "mode_id";
}

#[async_trait]
impl ReferenceRepository for TransportationModeRepository {
    type Record = TransportationMode;
    type Payload = TransportationModePayload;
    type Id = ModeId;

    const ENTITY: &'static str = "Transportation mode";

    #[tracing::instrument(skip(self))]
    async fn get_all(&self) -> Result<Vec<TransportationMode>> {
        let rows = self
            .db
            .fetch_all(
                "SELECT * FROM transportation_modes ORDER BY mode_id",
                &Params::new(),
            )
            .await?;
        decode_rows(rows)
    }

    #[tracing::instrument(skip(self))]
    async fn get_by_id(&self, id: ModeId) -> Result<TransportationMode> {
        let row = self
            .db
            .fetch_optional(
                "SELECT * FROM transportation_modes WHERE mode_id = $id",
                &params! { "id" => id },
            )
            .await?
            .ok_or_else(|| RepositoryError::not_found(Self::ENTITY, id))?;
        Ok(row.decode()?)
    }

    #[tracing::instrument(skip(self, payload))]
    async fn create(&self, payload: &TransportationModePayload) -> Result<TransportationMode> {
        validate(payload)?;
        let row = self
            .db
            .query_returning::<Self>(
                r#"
                INSERT INTO transportation_modes (mode_name, description, capacity_kg, base_price, price_per_km)
                VALUES ($name, $description, $capacity, $base_price, $price_per_km)
                RETURNING *
                "#,
                &Self::bind(payload),
            )
            .await
            .map_err(|e| write_error(e, Self::ENTITY, Self::ENTITY))?
            .ok_or(StoreError::UnexpectedOutcome("inserted row"))?;
        Ok(row.decode()?)
    }

    #[tracing::instrument(skip(self, payload))]
    async fn update(
        &self,
        id: ModeId,
        payload: &TransportationModePayload,
    ) -> Result<TransportationMode> {
        validate(payload)?;
        let row = self
            .db
            .query_returning::<Self>(
                r#"
                UPDATE transportation_modes
                SET mode_name = $name,
                    description = $description,
                    capacity_kg = $capacity,
                    base_price = $base_price,
                    price_per_km = $price_per_km
                WHERE mode_id = $id
                RETURNING *
                "#,
                &Self::bind(payload).with("id", id),
            )
            .await
            .map_err(|e| write_error(e, Self::ENTITY, Self::ENTITY))?
            .ok_or_else(|| RepositoryError::not_found(Self::ENTITY, id))?;
        Ok(row.decode()?)
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: ModeId) -> Result<Deleted> {
        let removed = self
            .db
            .execute(
                "DELETE FROM transportation_modes WHERE mode_id = $id",
                &params! { "id" => id },
            )
            .await
            .map_err(|e| delete_error(e, Self::ENTITY))?;
        if removed == 0 {
            return Err(RepositoryError::not_found(Self::ENTITY, id));
        }
        Ok(Deleted::from(true))
    }
}
