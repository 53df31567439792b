use async_trait::async_trait;
use common::{FacilityId, ModeId};
use domain::{Deleted, Facility, FacilityPayload, Outcome, validate};
use store::{Database, Params, Returning, StoreError, params};

use super::ReferenceRepository;
use crate::error::{RepositoryError, Result, delete_error, write_error};
use crate::rows::decode_rows;

#[derive(Clone)]
pub struct FacilityRepository {
    db: Database,
}

impl FacilityRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn bind(payload: &FacilityPayload) -> Params {
        params! {
            "name" => payload.name.trim(),
            "description" => payload.description.clone(),
        }
    }

    /// Facilities attached to a transportation mode.
    #[tracing::instrument(skip(self))]
    pub async fn get_by_mode_id(&self, mode_id: ModeId) -> Result<Vec<Facility>> {
        let rows = self
            .db
            .fetch_all(
                r#"
                SELECT f.* FROM facilities f
                JOIN mode_facilities mf ON f.facility_id = mf.facility_id
                WHERE mf.mode_id = $mode_id
                ORDER BY f.facility_id
                "#,
                &params! { "mode_id" => mode_id },
            )
            .await?;
        decode_rows(rows)
    }

    /// Attaches a facility to a mode. `success` is false if it was already attached.
    #[tracing::instrument(skip(self))]
    pub async fn add_to_mode(&self, mode_id: ModeId, facility_id: FacilityId) -> Result<Outcome> {
        let added = self
            .db
            .execute(
                r#"
                INSERT OR IGNORE INTO mode_facilities (mode_id, facility_id)
                VALUES ($mode_id, $facility_id)
                "#,
                &params! { "mode_id" => mode_id, "facility_id" => facility_id },
            )
            .await
            .map_err(|err| {
                if err.is_foreign_key_violation() {
                    RepositoryError::not_found(
                        "Transportation mode or facility",
                        format!("{mode_id}/{facility_id}"),
                    )
                } else {
                    RepositoryError::Store(err)
                }
            })?;
        Ok(Outcome::from(added > 0))
    }

    /// Detaches a facility from a mode. `success` reports whether a row was removed.
    #[tracing::instrument(skip(self))]
    pub async fn remove_from_mode(
        &self,
        mode_id: ModeId,
        facility_id: FacilityId,
    ) -> Result<Outcome> {
        let removed = self
            .db
            .execute(
                "DELETE FROM mode_facilities WHERE mode_id = $mode_id AND facility_id = $facility_id",
                &params! { "mode_id" => mode_id, "facility_id" => facility_id },
            )
            .await?;
        Ok(Outcome::from(removed > 0))
    }
}

impl Returning for FacilityRepository {
    const TABLE: &'static str = "facilities";
    const PRIMARY_KEY: &'static str = "facility_id";
}

#[async_trait]
impl ReferenceRepository for FacilityRepository {
    type Record = Facility;
    type Payload = FacilityPayload;
    type Id = FacilityId;

    const ENTITY: &'static str = "Facility";

    #[tracing::instrument(skip(self))]
    async fn get_all(&self) -> Result<Vec<Facility>> {
        let rows = self
            .db
            .fetch_all("SELECT * FROM facilities ORDER BY facility_id", &Params::new())
            .await?;
        decode_rows(rows)
    }

    #[tracing::instrument(skip(self))]
    async fn get_by_id(&self, id: FacilityId) -> Result<Facility> {
        let row = self
            .db
            .fetch_optional(
                "SELECT * FROM facilities WHERE facility_id = $id",
                &params! { "id" => id },
            )
            .await?
            .ok_or_else(|| RepositoryError::not_found(Self::ENTITY, id))?;
        Ok(row.decode()?)
    }

    #[tracing::instrument(skip(self, payload))]
    async fn create(&self, payload: &FacilityPayload) -> Result<Facility> {
        validate(payload)?;
        let row = self
            .db
            .query_returning::<Self>(
                r#"
                INSERT INTO facilities (name, description)
                VALUES ($name, $description)
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
    async fn update(&self, id: FacilityId, payload: &FacilityPayload) -> Result<Facility> {
        validate(payload)?;
        let row = self
            .db
            .query_returning::<Self>(
                r#"
                UPDATE facilities
                SET name = $name,
                    description = $description
                WHERE facility_id = $id
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
    async fn delete(&self, id: FacilityId) -> Result<Deleted> {
        let removed = self
            .db
            .execute(
                "DELETE FROM facilities WHERE facility_id = $id",
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
