use serde::{Deserialize, Serialize};

macro_rules! integer_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw store key.
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the raw store key.
            pub const fn get(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

integer_id!(
    /// Primary key of a transportation mode (`transportation_modes.mode_id`).
    ModeId
);
integer_id!(
    /// Primary key of a cargo type (`cargo_types.cargo_type_id`).
    CargoTypeId
);
integer_id!(
    /// Primary key of a facility (`facilities.facility_id`).
    FacilityId
);
integer_id!(
    /// Primary key of a mitra (logistics partner) profile.
    MitraId
);
integer_id!(
    /// Primary key of a service template.
    TemplateId
);
integer_id!(
    /// Primary key of a mitra's service instance.
    ServiceInstanceId
);
integer_id!(
    /// Primary key of a driver.
    DriverId
);
integer_id!(
    /// Primary key of a customer order.
    OrderId
);

/// Identity of a customer as carried by the `x-customer-id` request header.
///
/// Customers have no table of their own yet, so the identifier is opaque text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(String);

impl CustomerId {
    /// Creates a customer id, rejecting blank values.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
