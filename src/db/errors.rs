use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Duplicate record: {0}")]
    UniqueViolation(String),

    #[error("Database error: {0}")]
    Other(String),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::UniqueViolation(db.message().to_string())
            }
            _ => Self::Other(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DatabaseError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::Other(err.to_string())
    }
}
