use std::fmt;

use chrono::{serde::ts_milliseconds, DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ContentId;

/// Opaque identifier of the placement a delivery request came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestSource(String);

impl RequestSource {
    pub fn new<S: Into<String>>(source: S) -> Self {
        Self(source.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RequestSource {
    fn from(source: &str) -> Self {
        Self(source.to_string())
    }
}

/// Append-only record of a single successful delivery.
///
/// Produced exactly once per delivery; downstream billing consumes these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestLogEntry {
    pub content: ContentId,
    pub source: RequestSource,
    #[serde(with = "ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl RequestLogEntry {
    /// Stamps the entry with the current time.
    pub fn new(content: ContentId, source: RequestSource) -> Self {
        Self {
            content,
            source,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn entry_round_trips_with_millisecond_timestamp() {
        let entry = RequestLogEntry::new(ContentId::new(), "publisher-42".into());

        let value = serde_json::to_value(&entry).expect("Should serialize");
        assert_eq!(
            value["timestamp"],
            serde_json::json!(entry.timestamp.timestamp_millis())
        );

        let back: RequestLogEntry = serde_json::from_value(value).expect("Should deserialize");
        assert_eq!(entry.content, back.content);
        assert_eq!(entry.source, back.source);
    }
}
