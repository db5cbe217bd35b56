/// Job identifiers are random UUIDs generated by the lifecycle engine.
pub type JobId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
