//! The persistence seam of the engine.
//!
//! Everything the engine knows about stored campaigns and content goes
//! through [`ContentGateway`]; the engine itself keeps no cache, so a stale
//! read can only lose an accounting race, never mask data loss.

use async_trait::async_trait;
use thiserror::Error;

use adserver_primitives::{CampaignId, Content, ContentFormat, ContentId, RequestLogEntry};

/// Outcome of an atomic quota decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaState {
    /// The decrement went through; `remaining` is the post-decrement value,
    /// so a `remaining` of 0 is the boundary transition that triggers the
    /// campaign lifecycle check.
    Decremented { remaining: u64 },
    /// The quota was already 0 - a concurrent delivery consumed the last
    /// unit. The caller lost the race and retries fallback selection.
    Exhausted,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("content {0} does not exist")]
    ContentNotFound(ContentId),
    #[error("campaign {0} does not exist")]
    CampaignNotFound(CampaignId),
    #[error("backing store unavailable: {0}")]
    Unavailable(String),
}

/// Storage collaborator contract of the delivery engine.
///
/// `find_active_content` must reflect quota and campaign state at call time;
/// staleness is acceptable because the accountant re-validates before the
/// decrement and the decrement itself is linearizable.
#[async_trait]
pub trait ContentGateway: Send + Sync {
    /// All content with quota > 0 whose campaign is `RUNNING`, for a format.
    async fn find_active_content(
        &self,
        format: ContentFormat,
    ) -> Result<Vec<Content>, GatewayError>;

    /// Fetches a single content for re-validation during accounting.
    async fn load_content(&self, id: ContentId) -> Result<Option<Content>, GatewayError>;

    /// Atomically decrements the content's remaining quota by exactly 1.
    ///
    /// Two concurrent calls never observe the same pre-decrement value and
    /// the quota never drops below 0.
    async fn decrement_remaining(&self, id: ContentId) -> Result<QuotaState, GatewayError>;

    /// Durable append of a delivery record. Fire-and-forget from the
    /// engine's perspective: a failure is reported but does not roll back
    /// the delivery.
    async fn append_request_log(&self, entry: RequestLogEntry) -> Result<(), GatewayError>;

    /// The content collection of a campaign, for the lifecycle scan.
    async fn campaign_content(&self, campaign: CampaignId) -> Result<Vec<Content>, GatewayError>;

    /// Idempotent `RUNNING` -> `ENDED` transition. Returns whether this call
    /// performed the transition, so any "campaign ended" side effect fires
    /// at most once.
    async fn end_campaign(&self, campaign: CampaignId) -> Result<bool, GatewayError>;
}

#[async_trait]
impl<G: ContentGateway + ?Sized> ContentGateway for std::sync::Arc<G> {
    async fn find_active_content(
        &self,
        format: ContentFormat,
    ) -> Result<Vec<Content>, GatewayError> {
        (**self).find_active_content(format).await
    }

    async fn load_content(&self, id: ContentId) -> Result<Option<Content>, GatewayError> {
        (**self).load_content(id).await
    }

    async fn decrement_remaining(&self, id: ContentId) -> Result<QuotaState, GatewayError> {
        (**self).decrement_remaining(id).await
    }

    async fn append_request_log(&self, entry: RequestLogEntry) -> Result<(), GatewayError> {
        (**self).append_request_log(entry).await
    }

    async fn campaign_content(&self, campaign: CampaignId) -> Result<Vec<Content>, GatewayError> {
        (**self).campaign_content(campaign).await
    }

    async fn end_campaign(&self, campaign: CampaignId) -> Result<bool, GatewayError> {
        (**self).end_campaign(campaign).await
    }
}
