use chrono::{serde::ts_milliseconds, DateTime, Utc};
use parse_display::{Display, FromStr};
use serde::{Deserialize, Serialize};

pub use campaign_id::CampaignId;

mod campaign_id {
    use std::{fmt, str::FromStr};

    use hex::{FromHex, FromHexError};
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
    use thiserror::Error;
    use uuid::Uuid;

    /// An id of 16 bytes, (de)serialized as a `0x` prefixed hex.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct CampaignId([u8; 16]);

    impl CampaignId {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn as_bytes(&self) -> &[u8; 16] {
            &self.0
        }
    }

    impl Default for CampaignId {
        fn default() -> Self {
            Self(*Uuid::new_v4().as_bytes())
        }
    }

    #[derive(Debug, Error)]
    pub enum ParseError {
        /// the `0x` prefix is missing
        #[error("Expected a `0x` prefix")]
        ExpectedPrefix,
        #[error(transparent)]
        InvalidHex(#[from] FromHexError),
    }

    impl FromStr for CampaignId {
        type Err = ParseError;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s.strip_prefix("0x") {
                Some(hex) => Ok(Self(<[u8; 16]>::from_hex(hex)?)),
                None => Err(ParseError::ExpectedPrefix),
            }
        }
    }

    impl fmt::Display for CampaignId {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "0x{}", hex::encode(self.0))
        }
    }

    impl Serialize for CampaignId {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.serialize_str(&self.to_string())
        }
    }

    impl<'de> Deserialize<'de> for CampaignId {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            let hex_string = String::deserialize(deserializer)?;

            hex_string.parse().map_err(de::Error::custom)
        }
    }
}

/// Lifecycle state of a [`Campaign`].
///
/// `Running` is the only state whose content takes part in selection.
/// `Ended` is entered automatically, exactly once, when all of the campaign's
/// content is exhausted. `Cancelled` is an externally triggered terminal
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, FromStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[display(style = "SNAKE_CASE")]
pub enum CampaignState {
    Running,
    Cancelled,
    Ended,
}

impl CampaignState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, CampaignState::Cancelled | CampaignState::Ended)
    }
}

/// The owning aggregate of one or more [`Content`](crate::Content) items.
///
/// The content collection itself lives behind the gateway; a campaign only
/// carries identity and lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: CampaignId,
    pub state: CampaignState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(with = "ts_milliseconds")]
    pub created: DateTime<Utc>,
}

impl Campaign {
    /// Creates a `Running` campaign with a freshly generated [`CampaignId`].
    pub fn new(title: Option<String>) -> Self {
        Self {
            id: CampaignId::new(),
            state: CampaignState::Running,
            title,
            created: Utc::now(),
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn campaign_state_de_serialization() {
        assert_eq!(
            json!("RUNNING"),
            serde_json::to_value(CampaignState::Running).expect("Should serialize")
        );
        assert_eq!(
            CampaignState::Ended,
            serde_json::from_value(json!("ENDED")).expect("Should deserialize")
        );
        assert_eq!("CANCELLED", CampaignState::Cancelled.to_string());

        assert!(!CampaignState::Running.is_terminal());
        assert!(CampaignState::Cancelled.is_terminal());
        assert!(CampaignState::Ended.is_terminal());
    }

    #[test]
    fn new_campaign_is_running() {
        let campaign = Campaign::new(Some("Winter hats".to_string()));

        assert_eq!(CampaignState::Running, campaign.state);
        assert_ne!(Campaign::new(None).id, campaign.id);
    }
}
