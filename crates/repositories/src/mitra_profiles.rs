use common::MitraId;
use domain::{MitraProfile, MitraProfilePayload, validate};
use store::{Database, Returning, params};

use crate::error::{RepositoryError, Result};

const ENTITY: &str = "Mitra profile";

#[derive(Clone)]
pub struct MitraProfileRepository {
    db: Database,
}

impl MitraProfileRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    #[tracing::instrument(skip(self))]
    pub async fn get(&self, mitra_id: MitraId) -> Result<MitraProfile> {
        let row = self
            .db
            .fetch_optional(
                "SELECT * FROM mitra_profiles WHERE id = $id",
                &params! { "id" => mitra_id },
            )
            .await?
            .ok_or_else(|| RepositoryError::not_found(ENTITY, mitra_id))?;
        Ok(row.decode()?)
    }

    /// Replaces the profile's editable fields.
    #[tracing::instrument(skip(self, payload))]
    pub async fn update(
        &self,
        mitra_id: MitraId,
        payload: &MitraProfilePayload,
    ) -> Result<MitraProfile> {
        validate(payload)?;
        let row = self
            .db
            .query_returning::<Self>(
                r#"
                UPDATE mitra_profiles
                SET name = $name,
                    address = $address,
                    contact_info = $contact_info,
                    updated_at = CURRENT_TIMESTAMP
                WHERE id = $id
                "#,
                &params! {
                    "name" => payload.name.trim(),
                    "address" => payload.address.clone(),
                    "contact_info" => &payload.contact_info,
                    "id" => mitra_id,
                },
            )
            .await?
            .ok_or_else(|| RepositoryError::not_found(ENTITY, mitra_id))?;
        Ok(row.decode()?)
    }
}

impl Returning for MitraProfileRepository {
    const TABLE: &'static str = "mitra_profiles";
    const PRIMARY_KEY: &'static str = "id";
}
