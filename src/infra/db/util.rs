use crate::application::repos::RepoError;

/// Translate a driver error, naming `slug` when a unique constraint trips.
pub fn map_sqlx_error(err: sqlx::Error, slug: &str) -> RepoError {
    match err {
        sqlx::Error::RowNotFound => RepoError::NotFound,
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepoError::Duplicate {
                key: slug.to_string(),
            }
        }
        other => RepoError::from_persistence(other),
    }
}
