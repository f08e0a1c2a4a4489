use chrono::{serde::ts_milliseconds, DateTime, Utc};
use parse_display::{Display, FromStr};
use serde::{Deserialize, Serialize};

use crate::{CampaignId, DomainError, Money, TargetContext};

pub use content_id::ContentId;

mod content_id {
    use std::{fmt, str::FromStr};

    use hex::{FromHex, FromHexError};
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
    use thiserror::Error;
    use uuid::Uuid;

    /// An id of 16 bytes, (de)serialized as a `0x` prefixed hex.
    ///
    /// Generated from a random `Uuid` at creation time, so it is stable
    /// before any persistence round-trip.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct ContentId([u8; 16]);

    impl ContentId {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn as_bytes(&self) -> &[u8; 16] {
            &self.0
        }

        pub fn from_bytes(bytes: [u8; 16]) -> Self {
            Self(bytes)
        }
    }

    impl Default for ContentId {
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

    impl FromStr for ContentId {
        type Err = ParseError;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s.strip_prefix("0x") {
                Some(hex) => Ok(Self(<[u8; 16]>::from_hex(hex)?)),
                None => Err(ParseError::ExpectedPrefix),
            }
        }
    }

    impl fmt::Display for ContentId {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "0x{}", hex::encode(self.0))
        }
    }

    impl Serialize for ContentId {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.serialize_str(&self.to_string())
        }
    }

    impl<'de> Deserialize<'de> for ContentId {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            let hex_string = String::deserialize(deserializer)?;

            hex_string.parse().map_err(de::Error::custom)
        }
    }

}

/// The physical shape of an ad placement.
///
/// A request and a content must match exactly on format; format never takes
/// part in the auction weighting.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, FromStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[display(style = "SNAKE_CASE")]
pub enum ContentFormat {
    Leaderboard,
    Skyscraper,
    MediumRectangle,
    MobileBanner,
}

impl ContentFormat {
    /// Pixel dimensions (`width x height`) of the format.
    pub fn size(&self) -> (u64, u64) {
        match self {
            ContentFormat::Leaderboard => (728, 90),
            ContentFormat::Skyscraper => (160, 600),
            ContentFormat::MediumRectangle => (300, 250),
            ContentFormat::MobileBanner => (320, 50),
        }
    }
}

/// The creative material a delivery hands to the placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ContentPayload {
    #[serde(rename_all = "camelCase")]
    Image { media_url: String },
    Text { body: String },
}

/// A single piece of creative material tied to one campaign, with its own
/// targeting, price and delivery quota.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    pub id: ContentId,
    /// The owning [`Campaign`](crate::Campaign).
    pub campaign: CampaignId,
    pub format: ContentFormat,
    /// Always fully specified - at least one flag per category.
    pub target_context: TargetContext,
    /// Price paid by the advertiser for a single delivery, in minor units.
    pub price_per_request: Money,
    /// How many more times this content may be delivered. Once it reaches 0
    /// the content is no longer eligible for selection.
    pub remaining_requests: u64,
    pub payload: ContentPayload,
    #[serde(with = "ts_milliseconds")]
    pub created: DateTime<Utc>,
}

impl Content {
    /// Creates a content with a freshly generated [`ContentId`].
    ///
    /// Fails with [`DomainError::InvalidArgument`] when the target context
    /// leaves a category unrestricted - stored contexts must carry at least
    /// one flag per category.
    pub fn new(
        campaign: CampaignId,
        format: ContentFormat,
        target_context: TargetContext,
        price_per_request: Money,
        remaining_requests: u64,
        payload: ContentPayload,
    ) -> Result<Self, DomainError> {
        if !target_context.is_fully_specified() {
            return Err(DomainError::InvalidArgument(
                "content target context must have at least one flag per category".to_string(),
            ));
        }

        Ok(Self {
            id: ContentId::new(),
            campaign,
            format,
            target_context,
            price_per_request,
            remaining_requests,
            payload,
            created: Utc::now(),
        })
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining_requests == 0
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::target_context::{AgeGroup, Gender, MaritalStatus, PurposeOfUse};

    use super::*;

    fn broad_context() -> TargetContext {
        TargetContext {
            age: AgeGroup::ALL.into_iter().collect(),
            gender: Gender::ALL.into_iter().collect(),
            marital_status: MaritalStatus::ALL.into_iter().collect(),
            purpose_of_use: PurposeOfUse::ALL.into_iter().collect(),
        }
    }

    #[test]
    fn format_display_and_serde_agree() {
        assert_eq!("LEADERBOARD", ContentFormat::Leaderboard.to_string());
        assert_eq!(
            ContentFormat::MediumRectangle,
            "MEDIUM_RECTANGLE".parse().expect("Should parse")
        );
        assert_eq!(
            json!("SKYSCRAPER"),
            serde_json::to_value(ContentFormat::Skyscraper).expect("Should serialize")
        );
        assert_eq!((728, 90), ContentFormat::Leaderboard.size());
    }

    #[test]
    fn rejects_partially_specified_target_context() {
        let mut context = broad_context();
        context.purpose_of_use.clear();

        let content = Content::new(
            CampaignId::new(),
            ContentFormat::Leaderboard,
            context,
            Money::from_minor(4),
            10,
            ContentPayload::Text {
                body: "Buy more hats".to_string(),
            },
        );

        assert!(matches!(content, Err(DomainError::InvalidArgument(_))));
    }

    #[test]
    fn creates_content_with_stable_id() {
        let content = Content::new(
            CampaignId::new(),
            ContentFormat::Skyscraper,
            broad_context(),
            Money::from_minor(40),
            100,
            ContentPayload::Image {
                media_url: "https://cdn.adcore.network/creatives/hats.png".to_string(),
            },
        )
        .expect("Should create");

        let reserialized: Content = serde_json::from_value(
            serde_json::to_value(&content).expect("Should serialize"),
        )
        .expect("Should deserialize");

        // `created` is (de)serialized with millisecond precision, so compare
        // the identity-bearing fields
        assert_eq!(content.id, reserialized.id);
        assert_eq!(content.campaign, reserialized.campaign);
        assert_eq!(content.payload, reserialized.payload);
        assert_eq!(content.remaining_requests, reserialized.remaining_requests);
    }
}
