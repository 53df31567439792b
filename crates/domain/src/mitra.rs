//! Logistics partners: profiles, service offerings and drivers.
//!
//! Structured columns (`contact_info`, `config`, `vehicle_info`) are stored as
//! JSON text and returned to clients as that text.

use common::{DriverId, MitraId, ModeId, ServiceInstanceId, TemplateId, Timestamp};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::DomainError;
use crate::validation::{json_object_text, non_blank};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MitraProfile {
    pub id: MitraId,
    pub name: String,
    pub address: Option<String>,
    /// JSON-encoded contact details.
    pub contact_info: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

fn empty_object() -> String {
    "{}".to_string()
}

/// Body of `PUT /mitra/profile`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct MitraProfilePayload {
    #[validate(custom(function = "non_blank", message = "Name is required"))]
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default = "empty_object")]
    #[validate(custom(function = "json_object_text"))]
    pub contact_info: String,
}

/// A reusable offering definition tied to one transportation mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceTemplate {
    pub id: TemplateId,
    pub name: String,
    pub description: Option<String>,
    pub mode_id: ModeId,
    pub mode_name: String,
}

/// A mitra's configured offering of a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInstance {
    pub id: ServiceInstanceId,
    pub mitra_id: MitraId,
    pub template_id: TemplateId,
    pub template_name: String,
    /// JSON-encoded [`ServiceConfig`].
    pub config: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ServiceInstance {
    /// Parses the stored configuration.
    pub fn parsed_config(&self) -> Result<ServiceConfig, DomainError> {
        Ok(serde_json::from_str(&self.config)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ServiceConfig {
    #[validate(length(min = 1, message = "Service area is required"))]
    pub service_area: Vec<String>,
    #[validate(custom(function = "non_blank", message = "Operating hours are required"))]
    pub operating_hours: String,
    #[serde(default)]
    pub vehicle_types: Vec<String>,
}

/// Body of `POST`/`PUT /mitra/service-instances`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ServiceInstancePayload {
    pub template_id: TemplateId,
    #[validate(nested)]
    pub config: ServiceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: DriverId,
    pub service_instance_id: ServiceInstanceId,
    pub name: String,
    pub phone: String,
    /// JSON-encoded [`VehicleInfo`].
    pub vehicle_info: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct VehicleInfo {
    #[serde(rename = "type")]
    #[validate(custom(function = "non_blank", message = "Vehicle type is required"))]
    pub vehicle_type: String,
    #[serde(default)]
    pub model: String,
    #[validate(custom(function = "non_blank", message = "Plate is required"))]
    pub plate: String,
}

/// Body of `POST /mitra/service-instances/{id}/drivers` and `PUT /mitra/drivers/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct DriverPayload {
    #[validate(custom(function = "non_blank", message = "Driver name is required"))]
    pub name: String,
    #[validate(custom(function = "non_blank", message = "Phone is required"))]
    pub phone: String,
    #[validate(nested)]
    pub vehicle_info: VehicleInfo,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate;

    #[test]
    fn profile_contact_info_must_be_json_object() {
        let payload = MitraProfilePayload {
            name: "PT Logistik Nusantara".into(),
            address: None,
            contact_info: "call me".into(),
        };
        assert_eq!(
            validate(&payload).unwrap_err().to_string(),
            "Contact info must be a JSON object"
        );
    }

    #[test]
    fn profile_contact_info_defaults_to_empty_object() {
        let payload: MitraProfilePayload = serde_json::from_str(r#"{"name":"PT"}"#).unwrap();
        assert_eq!(payload.contact_info, "{}");
        assert!(validate(&payload).is_ok());
    }

    #[test]
    fn nested_config_is_validated() {
        let payload = ServiceInstancePayload {
            template_id: TemplateId::new(1),
            config: ServiceConfig {
                service_area: vec![],
                operating_hours: "08:00-17:00".into(),
                vehicle_types: vec![],
            },
        };
        assert_eq!(
            validate(&payload).unwrap_err().to_string(),
            "Service area is required"
        );
    }

    #[test]
    fn vehicle_info_uses_type_key() {
        let info: VehicleInfo =
            serde_json::from_str(r#"{"type":"Pickup","model":"L300","plate":"B 1234 XY"}"#)
                .unwrap();
        assert_eq!(info.vehicle_type, "Pickup");
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["type"], "Pickup");
    }

    #[test]
    fn instance_parses_stored_config() {
        let instance = ServiceInstance {
            id: ServiceInstanceId::new(1),
            mitra_id: MitraId::new(1),
            template_id: TemplateId::new(1),
            template_name: "Antar Kota".into(),
            config: r#"{"service_area":["Jakarta"],"operating_hours":"24h","vehicle_types":["Pickup"]}"#.into(),
            created_at: Timestamp::now(),
            updated_at: Timestamp::now(),
        };
        assert_eq!(instance.parsed_config().unwrap().service_area, vec!["Jakarta"]);
    }
}
