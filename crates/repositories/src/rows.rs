use serde::de::DeserializeOwned;
use store::Row;

use crate::Result;

/// Decodes every row into `T`.
pub(crate) fn decode_rows<T: DeserializeOwned>(rows: Vec<Row>) -> Result<Vec<T>> {
    rows.iter()
        .map(|row| row.decode().map_err(Into::into))
        .collect()
}
