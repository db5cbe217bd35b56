use herald_core::error::CoreError;
use herald_db::DbError;

/// Errors raised by the lifecycle engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A domain rule was violated (validation, illegal transition).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The job store failed.
    #[error(transparent)]
    Store(#[from] DbError),
}
