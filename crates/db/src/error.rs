/// Errors raised by the job store.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// An update targeted a job id that does not exist.
    #[error("Job not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// A stored row could not be mapped back to a domain value.
    #[error("Corrupt row: {0}")]
    Decode(String),
}
