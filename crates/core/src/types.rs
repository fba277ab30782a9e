/// Job identifiers are opaque strings (UUID v4 for simulated jobs, whatever
/// the provider assigns for proxied ones).
pub type JobId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
