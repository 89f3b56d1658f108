/// All timestamps are UTC. Conversion to local time happens only when
/// rendering human-readable text.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
