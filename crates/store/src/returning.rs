/// Declares which table a repository mutates and how its rows are keyed.
///
/// [`Database::query_returning`](crate::Database::query_returning) uses this
/// to re-read the affected row after an `INSERT` or `UPDATE`, and refuses
/// statements that target any other table.
pub trait Returning {
    /// Table the mutations of this type target.
    const TABLE: &'static str;
    /// Integer primary-key column of [`Self::TABLE`].
    const PRIMARY_KEY: &'static str;
}
