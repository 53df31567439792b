//! Read-only service catalog for customers.

use common::ServiceInstanceId;
use domain::{CargoType, ServiceFilter, ServiceListing};
use store::{Database, Params, params};

use crate::error::{RepositoryError, Result};
use crate::rows::decode_rows;

const SELECT_LISTING: &str = r#"
    SELECT si.id AS service_id,
           si.config AS service_config,
           mp.name AS mitra_name,
           mp.contact_info AS mitra_contact,
           tm.mode_id,
           tm.mode_name,
           tm.description,
           tm.capacity_kg,
           tm.base_price,
           tm.price_per_km,
           GROUP_CONCAT(f.name) AS facilities
    FROM service_instances si
    JOIN mitra_profiles mp ON si.mitra_id = mp.id
    JOIN service_templates st ON si.template_id = st.id
    JOIN transportation_modes tm ON st.mode_id = tm.mode_id
    LEFT JOIN mode_facilities mf ON tm.mode_id = mf.mode_id
    LEFT JOIN facilities f ON mf.facility_id = f.facility_id
"#;

#[derive(Clone)]
pub struct CatalogRepository {
    db: Database,
}

impl CatalogRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Lists every service instance matching the filter.
    ///
    /// `search` matches mitra name, mode name or mode description. A
    /// `cargo_type_id` filter only requires that the cargo type exists, since
    /// every service accepts every cargo type.
    #[tracing::instrument(skip(self))]
    pub async fn services(&self, filter: &ServiceFilter) -> Result<Vec<ServiceListing>> {
        let mut conditions = Vec::new();
        let mut params = Params::new();

        if let Some(search) = &filter.search {
            conditions.push(
                "(mp.name LIKE $search OR tm.mode_name LIKE $search OR tm.description LIKE $search)",
            );
            params.set("search", format!("%{search}%"));
        }
        if let Some(mode_id) = filter.mode_id {
            conditions.push("tm.mode_id = $mode_id");
            params.set("mode_id", mode_id);
        }
        if let Some(cargo_type_id) = filter.cargo_type_id {
            conditions.push(
                "EXISTS (SELECT 1 FROM cargo_types ct WHERE ct.cargo_type_id = $cargo_type_id)",
            );
            params.set("cargo_type_id", cargo_type_id);
        }

        let mut sql = String::from(SELECT_LISTING);
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" GROUP BY si.id ORDER BY si.id");

        let rows = self.db.fetch_all(&sql, &params).await?;
        decode_rows(rows)
    }

    #[tracing::instrument(skip(self))]
    pub async fn service(&self, id: ServiceInstanceId) -> Result<ServiceListing> {
        let sql = format!("{SELECT_LISTING} WHERE si.id = $id GROUP BY si.id");
        let row = self
            .db
            .fetch_optional(&sql, &params! { "id" => id })
            .await?
            .ok_or_else(|| RepositoryError::not_found("Service", id))?;
        Ok(row.decode()?)
    }

    /// Cargo types offered on the customer order form.
    #[tracing::instrument(skip(self))]
    pub async fn cargo_types(&self) -> Result<Vec<CargoType>> {
        let rows = self
            .db
            .fetch_all(
                "SELECT * FROM cargo_types ORDER BY type_name",
                &Params::new(),
            )
            .await?;
        decode_rows(rows)
    }
}
