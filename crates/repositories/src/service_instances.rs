use common::{MitraId, ServiceInstanceId, TemplateId};
use domain::{Deleted, ServiceInstance, ServiceInstancePayload, ServiceTemplate, validate};
use store::{Database, Params, Returning, StoreError, params};

use crate::error::{RepositoryError, Result, delete_error, write_error};
use crate::rows::decode_rows;

const ENTITY: &str = "Service instance";

const SELECT_INSTANCE: &str = r#"
    SELECT si.*, st.name AS template_name
    FROM service_instances si
    JOIN service_templates st ON si.template_id = st.id
"#;

/// Service instances, always scoped to the owning mitra.
#[derive(Clone)]
pub struct ServiceInstanceRepository {
    db: Database,
}

impl ServiceInstanceRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Templates a mitra can instantiate.
    #[tracing::instrument(skip(self))]
    pub async fn templates(&self) -> Result<Vec<ServiceTemplate>> {
        let rows = self
            .db
            .fetch_all(
                r#"
                SELECT st.id, st.name, st.description, st.mode_id, tm.mode_name
                FROM service_templates st
                JOIN transportation_modes tm ON st.mode_id = tm.mode_id
                ORDER BY st.id
                "#,
                &Params::new(),
            )
            .await?;
        decode_rows(rows)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_for_mitra(&self, mitra_id: MitraId) -> Result<Vec<ServiceInstance>> {
        let sql = format!("{SELECT_INSTANCE} WHERE si.mitra_id = $mitra_id ORDER BY si.id");
        let rows = self
            .db
            .fetch_all(&sql, &params! { "mitra_id" => mitra_id })
            .await?;
        decode_rows(rows)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get(&self, mitra_id: MitraId, id: ServiceInstanceId) -> Result<ServiceInstance> {
        let sql = format!("{SELECT_INSTANCE} WHERE si.id = $id AND si.mitra_id = $mitra_id");
        let row = self
            .db
            .fetch_optional(&sql, &params! { "id" => id, "mitra_id" => mitra_id })
            .await?
            .ok_or_else(|| RepositoryError::not_found(ENTITY, id))?;
        Ok(row.decode()?)
    }

    #[tracing::instrument(skip(self, payload))]
    pub async fn create(
        &self,
        mitra_id: MitraId,
        payload: &ServiceInstancePayload,
    ) -> Result<ServiceInstance> {
        validate(payload)?;
        self.ensure_template(payload.template_id).await?;

        let row = self
            .db
            .query_returning::<Self>(
                r#"
                INSERT INTO service_instances (mitra_id, template_id, config)
                VALUES ($mitra_id, $template_id, $config)
                "#,
                &params! {
                    "mitra_id" => mitra_id,
                    "template_id" => payload.template_id,
                    "config" => serde_json::to_string(&payload.config)?,
                },
            )
            .await
            .map_err(|e| write_error(e, ENTITY, "Mitra profile"))?
            .ok_or(StoreError::UnexpectedOutcome("inserted row"))?;

        let id = row
            .get_i64("id")
            .map(ServiceInstanceId::new)
            .ok_or(StoreError::UnexpectedOutcome("service instance id"))?;
        self.get(mitra_id, id).await
    }

    /// Replaces template and configuration of an owned instance.
    #[tracing::instrument(skip(self, payload))]
    pub async fn update(
        &self,
        mitra_id: MitraId,
        id: ServiceInstanceId,
        payload: &ServiceInstancePayload,
    ) -> Result<ServiceInstance> {
        validate(payload)?;
        self.ensure_template(payload.template_id).await?;

        self.db
            .query_returning::<Self>(
                r#"
                UPDATE service_instances
                SET template_id = $template_id,
                    config = $config,
                    updated_at = CURRENT_TIMESTAMP
                WHERE id = $id AND mitra_id = $mitra_id
                "#,
                &params! {
                    "template_id" => payload.template_id,
                    "config" => serde_json::to_string(&payload.config)?,
                    "id" => id,
                    "mitra_id" => mitra_id,
                },
            )
            .await
            .map_err(|e| write_error(e, ENTITY, "Service template"))?
            .ok_or_else(|| RepositoryError::not_found(ENTITY, id))?;

        self.get(mitra_id, id).await
    }

    /// Deletes an owned instance and its drivers. Instances with orders are kept.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, mitra_id: MitraId, id: ServiceInstanceId) -> Result<Deleted> {
        let removed = self
            .db
            .execute(
                "DELETE FROM service_instances WHERE id = $id AND mitra_id = $mitra_id",
                &params! { "id" => id, "mitra_id" => mitra_id },
            )
            .await
            .map_err(|e| delete_error(e, ENTITY))?;
        if removed == 0 {
            return Err(RepositoryError::not_found(ENTITY, id));
        }
        Ok(Deleted::from(true))
    }

    async fn ensure_template(&self, template_id: TemplateId) -> Result<()> {
        self.db
            .fetch_optional(
                "SELECT id FROM service_templates WHERE id = $id",
                &params! { "id" => template_id },
            )
            .await?
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found("Service template", template_id))
    }
}

impl Returning for ServiceInstanceRepository {
    const TABLE: &'static str = "service_instances";
    const PRIMARY_KEY: &'static str = "id";
}
