mod observation;
mod sqlite;

pub use observation::{from_unix_millis, to_unix_millis, DailySummary, ObservationRecord, StoreStats};
pub use sqlite::{Database, Error};
