//! In-memory [`ContentGateway`] used by the tests and the demo server.

use std::sync::{
    atomic::{AtomicU64, AtomicUsize, Ordering},
    Mutex,
};

use async_trait::async_trait;
use dashmap::DashMap;

use adserver_primitives::{
    Campaign, CampaignId, CampaignState, Content, ContentFormat, ContentId, RequestLogEntry,
};

use crate::gateway::{ContentGateway, GatewayError, QuotaState};

struct StoredContent {
    content: Content,
    remaining: AtomicU64,
}

impl StoredContent {
    /// The stored content with the quota as of now.
    fn snapshot(&self) -> Content {
        let mut content = self.content.clone();
        content.remaining_requests = self.remaining.load(Ordering::Acquire);

        content
    }
}

/// Keeps campaigns, content and the request log in process memory.
///
/// The quota decrement is a compare-exchange loop on the content's
/// [`AtomicU64`], the campaign state transition happens under the campaign
/// map's entry lock - the same linearizability a serializing transaction
/// gives a persistence-backed gateway.
#[derive(Default)]
pub struct MemoryGateway {
    contents: DashMap<ContentId, StoredContent>,
    campaigns: DashMap<CampaignId, Campaign>,
    request_log: Mutex<Vec<RequestLogEntry>>,
    ended_transitions: AtomicUsize,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_campaign(&self, campaign: Campaign) {
        self.campaigns.insert(campaign.id, campaign);
    }

    pub fn insert_content(&self, content: Content) {
        self.contents.insert(
            content.id,
            StoredContent {
                remaining: AtomicU64::new(content.remaining_requests),
                content,
            },
        );
    }

    /// Externally triggered terminal state; excludes the campaign's content
    /// from selection.
    pub fn cancel_campaign(&self, campaign: CampaignId) {
        if let Some(mut stored) = self.campaigns.get_mut(&campaign) {
            if stored.state == CampaignState::Running {
                stored.state = CampaignState::Cancelled;
            }
        }
    }

    pub fn campaign_state(&self, campaign: CampaignId) -> Option<CampaignState> {
        self.campaigns.get(&campaign).map(|stored| stored.state)
    }

    pub fn remaining_requests(&self, content: ContentId) -> Option<u64> {
        self.contents
            .get(&content)
            .map(|stored| stored.remaining.load(Ordering::Acquire))
    }

    pub fn request_log(&self) -> Vec<RequestLogEntry> {
        self.request_log
            .lock()
            .expect("Request log lock should never be poisoned")
            .clone()
    }

    /// How many `RUNNING` -> `ENDED` transitions actually fired.
    pub fn ended_transitions(&self) -> usize {
        self.ended_transitions.load(Ordering::Acquire)
    }

    fn campaign_is_running(&self, campaign: CampaignId) -> bool {
        self.campaigns
            .get(&campaign)
            .map(|stored| stored.state == CampaignState::Running)
            .unwrap_or(false)
    }
}

#[async_trait]
impl ContentGateway for MemoryGateway {
    async fn find_active_content(
        &self,
        format: ContentFormat,
    ) -> Result<Vec<Content>, GatewayError> {
        let active = self
            .contents
            .iter()
            .filter(|stored| {
                stored.content.format == format
                    && stored.remaining.load(Ordering::Acquire) > 0
                    && self.campaign_is_running(stored.content.campaign)
            })
            .map(|stored| stored.snapshot())
            .collect();

        Ok(active)
    }

    async fn load_content(&self, id: ContentId) -> Result<Option<Content>, GatewayError> {
        Ok(self.contents.get(&id).map(|stored| stored.snapshot()))
    }

    async fn decrement_remaining(&self, id: ContentId) -> Result<QuotaState, GatewayError> {
        let stored = self
            .contents
            .get(&id)
            .ok_or(GatewayError::ContentNotFound(id))?;

        let mut current = stored.remaining.load(Ordering::Acquire);
        loop {
            if current == 0 {
                return Ok(QuotaState::Exhausted);
            }

            match stored.remaining.compare_exchange_weak(
                current,
                current - 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    return Ok(QuotaState::Decremented {
                        remaining: current - 1,
                    })
                }
                Err(actual) => current = actual,
            }
        }
    }

    async fn append_request_log(&self, entry: RequestLogEntry) -> Result<(), GatewayError> {
        self.request_log
            .lock()
            .expect("Request log lock should never be poisoned")
            .push(entry);

        Ok(())
    }

    async fn campaign_content(&self, campaign: CampaignId) -> Result<Vec<Content>, GatewayError> {
        if !self.campaigns.contains_key(&campaign) {
            return Err(GatewayError::CampaignNotFound(campaign));
        }

        let contents = self
            .contents
            .iter()
            .filter(|stored| stored.content.campaign == campaign)
            .map(|stored| stored.snapshot())
            .collect();

        Ok(contents)
    }

    async fn end_campaign(&self, campaign: CampaignId) -> Result<bool, GatewayError> {
        let mut stored = self
            .campaigns
            .get_mut(&campaign)
            .ok_or(GatewayError::CampaignNotFound(campaign))?;

        if stored.state == CampaignState::Running {
            stored.state = CampaignState::Ended;
            self.ended_transitions.fetch_add(1, Ordering::AcqRel);

            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[cfg(test)]
mod test {
    use adserver_primitives::test_util::{image_content, DUMMY_CAMPAIGN, DUMMY_SOURCE};
    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test]
    async fn decrements_to_exhaustion_but_never_below_zero() {
        let gateway = MemoryGateway::new();
        gateway.insert_campaign(DUMMY_CAMPAIGN.clone());

        let content = image_content(DUMMY_CAMPAIGN.id, ContentFormat::Leaderboard, 4, 2);
        gateway.insert_content(content.clone());

        assert_eq!(
            QuotaState::Decremented { remaining: 1 },
            gateway
                .decrement_remaining(content.id)
                .await
                .expect("Should decrement")
        );
        assert_eq!(
            QuotaState::Decremented { remaining: 0 },
            gateway
                .decrement_remaining(content.id)
                .await
                .expect("Should decrement")
        );
        assert_eq!(
            QuotaState::Exhausted,
            gateway
                .decrement_remaining(content.id)
                .await
                .expect("Should report the lost race")
        );
        assert_eq!(Some(0), gateway.remaining_requests(content.id));
    }

    #[tokio::test]
    async fn active_content_excludes_exhausted_and_non_running() {
        let gateway = MemoryGateway::new();
        gateway.insert_campaign(DUMMY_CAMPAIGN.clone());

        let cancelled = Campaign::new(Some("Cancelled campaign".to_string()));
        gateway.insert_campaign(cancelled.clone());
        gateway.cancel_campaign(cancelled.id);

        let active = image_content(DUMMY_CAMPAIGN.id, ContentFormat::Leaderboard, 4, 5);
        let exhausted = image_content(DUMMY_CAMPAIGN.id, ContentFormat::Leaderboard, 4, 0);
        let of_cancelled = image_content(cancelled.id, ContentFormat::Leaderboard, 4, 5);
        let other_format = image_content(DUMMY_CAMPAIGN.id, ContentFormat::Skyscraper, 4, 5);
        for content in [&active, &exhausted, &of_cancelled, &other_format] {
            gateway.insert_content(content.clone());
        }

        let found = gateway
            .find_active_content(ContentFormat::Leaderboard)
            .await
            .expect("Should query");

        assert_eq!(1, found.len());
        assert_eq!(active.id, found[0].id);
    }

    #[tokio::test]
    async fn campaign_transition_fires_once() {
        let gateway = MemoryGateway::new();
        let campaign = Campaign::new(None);
        gateway.insert_campaign(campaign.clone());

        assert!(gateway
            .end_campaign(campaign.id)
            .await
            .expect("Should transition"));
        assert!(!gateway
            .end_campaign(campaign.id)
            .await
            .expect("Should be a no-op"));

        assert_eq!(Some(CampaignState::Ended), gateway.campaign_state(campaign.id));
        assert_eq!(1, gateway.ended_transitions());

        let missing = gateway.end_campaign(CampaignId::new()).await;
        assert!(matches!(missing, Err(GatewayError::CampaignNotFound(_))));
    }

    #[tokio::test]
    async fn request_log_appends() {
        let gateway = MemoryGateway::new();

        let entry = RequestLogEntry::new(ContentId::new(), DUMMY_SOURCE.clone());
        gateway
            .append_request_log(entry.clone())
            .await
            .expect("Should append");

        assert_eq!(vec![entry], gateway.request_log());
    }
}
