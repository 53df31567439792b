//! Named statement parameters.

use common::{
    CargoTypeId, DriverId, FacilityId, MitraId, ModeId, OrderId, ServiceInstanceId, TemplateId,
    Timestamp,
};
use sqlx::Sqlite;
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;

/// A single value bound to a `$name` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Null,
    Int(i64),
    Real(f64),
    Text(String),
    Bool(bool),
}

impl Param {
    pub(crate) fn bind_to<'q>(
        &self,
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> Query<'q, Sqlite, SqliteArguments<'q>> {
        match self {
            Param::Null => query.bind(None::<String>),
            Param::Int(value) => query.bind(*value),
            Param::Real(value) => query.bind(*value),
            Param::Text(value) => query.bind(value.clone()),
            Param::Bool(value) => query.bind(*value),
        }
    }
}

impl From<i64> for Param {
    fn from(value: i64) -> Self {
        Param::Int(value)
    }
}

impl From<i32> for Param {
    fn from(value: i32) -> Self {
        Param::Int(value.into())
    }
}

impl From<f64> for Param {
    fn from(value: f64) -> Self {
        Param::Real(value)
    }
}

impl From<bool> for Param {
    fn from(value: bool) -> Self {
        Param::Bool(value)
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Param::Text(value)
    }
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Param::Text(value.to_string())
    }
}

impl From<&String> for Param {
    fn from(value: &String) -> Self {
        Param::Text(value.clone())
    }
}

impl From<Timestamp> for Param {
    fn from(value: Timestamp) -> Self {
        Param::Text(value.to_store_string())
    }
}

impl<T: Into<Param>> From<Option<T>> for Param {
    fn from(value: Option<T>) -> Self {
        value.map_or(Param::Null, Into::into)
    }
}

macro_rules! id_param {
    ($($id:ty),+) => {
        $(
            impl From<$id> for Param {
                fn from(id: $id) -> Self {
                    Param::Int(id.get())
                }
            }
        )+
    };
}

id_param!(
    ModeId,
    CargoTypeId,
    FacilityId,
    MitraId,
    TemplateId,
    ServiceInstanceId,
    DriverId,
    OrderId
);

/// An ordered set of named parameters.
///
/// Names are given without the leading `$`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(Vec<(String, Param)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a parameter.
    pub fn with(mut self, name: &str, value: impl Into<Param>) -> Self {
        self.set(name, value);
        self
    }

    /// Adds or replaces a parameter in place.
    pub fn set(&mut self, name: &str, value: impl Into<Param>) {
        let value = value.into();
        match self.0.iter_mut().find(|(existing, _)| existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Param> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Builds [`Params`] from `"name" => value` pairs.
///
/// ```
/// let params = store::params! { "id" => 7_i64, "name" => "Pickup" };
/// assert_eq!(params.get("id"), Some(&store::Param::Int(7)));
/// ```
#[macro_export]
macro_rules! params {
    () => {
        $crate::Params::new()
    };
    ($($name:literal => $value:expr),+ $(,)?) => {
        $crate::Params::new()$(.with($name, $value))+
    };
}
