use crate::InstanceState;
use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Partition key grouping the history of the managed instance
pub const STATE_KEY: &str = "RDSControl";

/// Sortable UTC format used for the `Timestamp` sort key
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// A single entry in the append-only state history.
///
/// Field names match the attribute names of the DynamoDB table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRecord {
    #[serde(rename = "StateKey")]
    pub state_key: String,
    #[serde(rename = "Timestamp", with = "timestamp")]
    pub timestamp: NaiveDateTime,
    #[serde(rename = "State")]
    pub state: InstanceState,
}

impl StateRecord {
    pub fn new(state_key: &str, timestamp: NaiveDateTime, state: InstanceState) -> Self {
        StateRecord {
            state_key: state_key.to_string(),
            // Only seconds survive the round trip through storage
            timestamp: truncate_to_seconds(timestamp),
            state,
        }
    }

    pub fn sort_key(&self) -> String {
        format_timestamp(&self.timestamp)
    }
}

pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
}

pub fn truncate_to_seconds(timestamp: NaiveDateTime) -> NaiveDateTime {
    timestamp.with_nanosecond(0).unwrap_or(timestamp)
}

mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &NaiveDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let value: String = String::deserialize(deserializer)?;

        super::parse_timestamp(&value).map_err(serde::de::Error::custom)
    }
}
