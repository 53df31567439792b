//! Customer-facing service listings.

use common::{CargoTypeId, ModeId, ServiceInstanceId};
use serde::{Deserialize, Deserializer, Serialize};

/// A service instance with its mitra, mode and the mode's facilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceListing {
    pub service_id: ServiceInstanceId,
    /// JSON-encoded service configuration.
    pub service_config: String,
    pub mitra_name: String,
    pub mitra_contact: Option<String>,
    pub mode_id: ModeId,
    pub mode_name: String,
    pub description: Option<String>,
    pub capacity_kg: f64,
    pub base_price: f64,
    pub price_per_km: f64,
    /// Facility names, from a comma-separated aggregate column.
    #[serde(deserialize_with = "comma_separated")]
    pub facilities: Vec<String>,
}

fn comma_separated<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .map(|joined| {
            joined
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default())
}

/// Query string of `GET /api/customer/services`. Blank values are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceFilter {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none_id")]
    pub mode_id: Option<ModeId>,
    #[serde(default, deserialize_with = "blank_as_none_id")]
    pub cargo_type_id: Option<CargoTypeId>,
}

fn blank_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty()))
}

fn blank_as_none_id<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<i64>,
{
    match blank_as_none(deserializer)? {
        None => Ok(None),
        Some(value) => value
            .parse::<i64>()
            .map(|id| Some(T::from(id)))
            .map_err(|_| serde::de::Error::custom(format!("invalid id: {value}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn facilities_split_from_aggregate() {
        let listing: ServiceListing = serde_json::from_value(json!({
            "service_id": 1,
            "service_config": "{}",
            "mitra_name": "PT Logistik Nusantara",
            "mitra_contact": null,
            "mode_id": 2,
            "mode_name": "Pickup",
            "description": null,
            "capacity_kg": 1000.0,
            "base_price": 50000.0,
            "price_per_km": 5000.0,
            "facilities": "AC,Tracking"
        }))
        .unwrap();
        assert_eq!(listing.facilities, vec!["AC", "Tracking"]);
    }

    #[test]
    fn missing_facilities_become_empty() {
        let listing: ServiceListing = serde_json::from_value(json!({
            "service_id": 1,
            "service_config": "{}",
            "mitra_name": "PT",
            "mitra_contact": null,
            "mode_id": 1,
            "mode_name": "Truk Box",
            "description": null,
            "capacity_kg": 4000.0,
            "base_price": 200000.0,
            "price_per_km": 10000.0,
            "facilities": null
        }))
        .unwrap();
        assert!(listing.facilities.is_empty());
    }

    #[test]
    fn filter_ignores_blank_values() {
        let filter: ServiceFilter = serde_json::from_value(json!({
            "search": "  ",
            "mode_id": "",
            "cargo_type_id": "3"
        }))
        .unwrap();
        assert_eq!(
            filter,
            ServiceFilter {
                search: None,
                mode_id: None,
                cargo_type_id: Some(CargoTypeId::new(3)),
            }
        );
    }

    #[test]
    fn filter_rejects_malformed_id() {
        let result = serde_json::from_value::<ServiceFilter>(json!({ "mode_id": "abc" }));
        assert!(result.is_err());
    }
}
