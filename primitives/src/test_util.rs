use once_cell::sync::Lazy;

use crate::{
    target_context::{AgeGroup, Gender, MaritalStatus, PurposeOfUse},
    Campaign, CampaignId, Content, ContentFormat, ContentPayload, Money, RequestSource,
    TargetContext,
};

pub static DUMMY_CAMPAIGN: Lazy<Campaign> =
    Lazy::new(|| Campaign::new(Some("Dummy campaign".to_string())));

pub static DUMMY_SOURCE: Lazy<RequestSource> = Lazy::new(|| "dummy-placement".into());

/// A fully specified context carrying every flag of every category - the
/// broadest targeting a stored content can declare.
pub fn broad_context() -> TargetContext {
    TargetContext {
        age: AgeGroup::ALL.into_iter().collect(),
        gender: Gender::ALL.into_iter().collect(),
        marital_status: MaritalStatus::ALL.into_iter().collect(),
        purpose_of_use: PurposeOfUse::ALL.into_iter().collect(),
    }
}

/// An image content with the broadest possible targeting.
pub fn image_content(
    campaign: CampaignId,
    format: ContentFormat,
    price_minor: u64,
    remaining_requests: u64,
) -> Content {
    targeted_content(
        campaign,
        format,
        broad_context(),
        price_minor,
        remaining_requests,
    )
}

/// A content with the given target context.
pub fn targeted_content(
    campaign: CampaignId,
    format: ContentFormat,
    target_context: TargetContext,
    price_minor: u64,
    remaining_requests: u64,
) -> Content {
    Content::new(
        campaign,
        format,
        target_context,
        Money::from_minor(price_minor),
        remaining_requests,
        ContentPayload::Image {
            media_url: "https://cdn.adcore.network/creatives/dummy.png".to_string(),
        },
    )
    .expect("Should create the dummy content")
}
