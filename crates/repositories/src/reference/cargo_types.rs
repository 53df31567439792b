use async_trait::async_trait;
use common::CargoTypeId;
use domain::{CargoType, CargoTypePayload, Deleted, validate};
use store::{Database, Params, Returning, StoreError, params};

use super::ReferenceRepository;
use crate::error::{RepositoryError, Result, delete_error, write_error};
use crate::rows::decode_rows;

#[derive(Clone)]
pub struct CargoTypeRepository {
    db: Database,
}

impl CargoTypeRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn bind(payload: &CargoTypePayload) -> Params {
        params! {
            "name" => payload.type_name.trim(),
            "description" => payload.description.clone(),
            "instructions" => payload.handling_instructions.clone(),
            "multiplier" => payload.price_multiplier,
        }
    }
}

impl Returning for CargoTypeRepository {
    const TABLE: &'static str = "cargo_types";
    const PRIMARY_KEY: &'static str = "cargo_type_id";
}

#[async_trait]
impl ReferenceRepository for CargoTypeRepository {
    type Record = CargoType;
    type Payload = CargoTypePayload;
    type Id = CargoTypeId;

    const ENTITY: &'static str = "Cargo type";

    #[tracing::instrument(skip(self))]
    async fn get_all(&self) -> Result<Vec<CargoType>> {
        let rows = self
            .db
            .fetch_all("SELECT * FROM cargo_types ORDER BY cargo_type_id", &Params::new())
            .await?;
        decode_rows(rows)
    }

    #[tracing::instrument(skip(self))]
    async fn get_by_id(&self, id: CargoTypeId) -> Result<CargoType> {
        let row = self
            .db
            .fetch_optional(
                "SELECT * FROM cargo_types WHERE cargo_type_id = $id",
                &params! { "id" => id },
            )
            .await?
            .ok_or_else(|| RepositoryError::not_found(Self::ENTITY, id))?;
        Ok(row.decode()?)
    }

    #[tracing::instrument(skip(self, payload))]
    async fn create(&self, payload: &CargoTypePayload) -> Result<CargoType> {
        validate(payload)?;
        let row = self
            .db
            .query_returning::<Self>(
                r#"
                INSERT INTO cargo_types (type_name, description, handling_instructions, price_multiplier)
                VALUES ($name, $description, $instructions, $multiplier)
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
    async fn update(&self, id: CargoTypeId, payload: &CargoTypePayload) -> Result<CargoType> {
        validate(payload)?;
        let row = self
            .db
            .query_returning::<Self>(
                r#"
                UPDATE cargo_types
                SET type_name = $name,
                    description = $description,
                    handling_instructions = $instructions,
                    price_multiplier = $multiplier
                WHERE cargo_type_id = $id
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
    async fn delete(&self, id: CargoTypeId) -> Result<Deleted> {
        let removed = self
            .db
            .execute(
                "DELETE FROM cargo_types WHERE cargo_type_id = $id",
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
