use thiserror::Error;

/// Database layer errors
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] diesel::result::Error),

    #[error("Pool error: {0}")]
    PoolError(#[from] diesel_async::pooled_connection::bb8::RunError),

    #[error("Pool setup error: {0}")]
    PoolSetupError(#[from] diesel_async::pooled_connection::PoolError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Malformed row in {table}: {reason}")]
    MalformedRow { table: &'static str, reason: String },

    #[error(transparent)]
    CoreError(#[from] cadence_core::error::CoreError),
}

pub type DbResult<T> = std::result::Result<T, DbError>;
