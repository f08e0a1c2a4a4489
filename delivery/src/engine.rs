//! The delivery [`Engine`]: selection entry points and accounting.

use serde::{Deserialize, Serialize};
use slog::{debug, error, info, Logger};
use thiserror::Error;

use adserver_primitives::{
    CampaignId, Config, Content, ContentFormat, RequestLogEntry, RequestSource, TargetContext,
};

use crate::{
    auction,
    gateway::{ContentGateway, GatewayError, QuotaState},
    matcher,
};

#[derive(Debug, Error)]
pub enum Error {
    /// No eligible content exists at all for the requested format.
    #[error("no active content for format {0}")]
    NoActiveContent(ContentFormat),
    /// The bounded accounting retry was exhausted; the caller may retry the
    /// whole request.
    #[error("delivery abandoned after losing {attempts} accounting races")]
    Contended { attempts: usize },
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    /// A programming defect - fatal to the single request, not the process.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

impl Error {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Contended { .. } | Error::Gateway(_))
    }
}

/// Which selection path picked the delivered content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionKind {
    /// Winner of the weighted-random auction among targeted candidates.
    Auction,
    /// Uniform draw among all active content of the format.
    Fallback,
}

/// A resolved and fully accounted delivery.
#[derive(Debug, Clone)]
pub struct Delivery {
    /// Snapshot of the delivered content as of selection time.
    pub content: Content,
    pub kind: SelectionKind,
}

enum Accounted {
    Delivered,
    /// A concurrent delivery consumed the last quota unit between selection
    /// and accounting. Internal - the engine retries fallback selection and
    /// never surfaces this to the caller.
    RaceLost,
}

/// The content delivery engine.
///
/// Stateless per call: every operation takes the requesting source
/// explicitly and reads the world through the [`ContentGateway`]. Selection
/// is read-only and runs unsynchronized; the accounting step is the only
/// write and relies on the gateway's linearizable quota decrement.
#[derive(Clone)]
pub struct Engine<G> {
    gateway: G,
    logger: Logger,
    max_accounting_attempts: usize,
}

impl<G: ContentGateway> Engine<G> {
    pub fn new(gateway: G, config: &Config, logger: Logger) -> Self {
        Self {
            gateway,
            logger,
            max_accounting_attempts: config.max_accounting_attempts.get() as usize,
        }
    }

    /// Delivers the best matching content of the format for the given target
    /// context.
    ///
    /// The first attempt auctions the targeted candidates; when no candidate
    /// matches, and on every accounting-race retry, the selection is a
    /// uniform draw among the format's active content. A request with no (or
    /// an entirely unrestricted) context behaves exactly like
    /// [`request_untargeted_content`](Engine::request_untargeted_content).
    pub async fn request_content(
        &self,
        source: &RequestSource,
        format: ContentFormat,
        context: Option<&TargetContext>,
    ) -> Result<Delivery, Error> {
        let restricting = context.filter(|context| !context.is_unrestricted());

        for attempt in 1..=self.max_accounting_attempts {
            let active = self.gateway.find_active_content(format).await?;
            if active.is_empty() {
                return Err(Error::NoActiveContent(format));
            }

            let (content, kind) = match restricting {
                Some(context) if attempt == 1 => {
                    let candidates: Vec<_> = active
                        .iter()
                        .filter_map(|content| matcher::match_content(context, content))
                        .collect();

                    match auction::select_winner(&candidates) {
                        Some(winner) => (winner.content.clone(), SelectionKind::Auction),
                        // zero candidates - fall back to a uniform draw over
                        // the same active set
                        None => match auction::select_uniform(&active) {
                            Some(content) => (content.clone(), SelectionKind::Fallback),
                            None => return Err(Error::NoActiveContent(format)),
                        },
                    }
                }
                _ => match auction::select_uniform(&active) {
                    Some(content) => (content.clone(), SelectionKind::Fallback),
                    None => return Err(Error::NoActiveContent(format)),
                },
            };

            match self.record_delivery(&content, source).await? {
                Accounted::Delivered => {
                    info!(self.logger, "content delivered";
                        "content" => %content.id,
                        "campaign" => %content.campaign,
                        "format" => %format,
                        "source" => %source,
                        "selection" => ?kind);

                    return Ok(Delivery { content, kind });
                }
                Accounted::RaceLost => {
                    debug!(self.logger, "accounting race lost, retrying fallback";
                        "content" => %content.id,
                        "attempt" => attempt);
                }
            }
        }

        Err(Error::Contended {
            attempts: self.max_accounting_attempts,
        })
    }

    /// Delivers any active content of the format, picked uniformly.
    pub async fn request_untargeted_content(
        &self,
        source: &RequestSource,
        format: ContentFormat,
    ) -> Result<Delivery, Error> {
        self.request_content(source, format, None).await
    }

    /// The campaign lifecycle monitor.
    ///
    /// Scans the campaign's content collection and transitions the campaign
    /// `RUNNING` -> `ENDED` once every content is exhausted. Idempotent: the
    /// gateway transition is a no-op for campaigns already `ENDED` or
    /// `CANCELLED`. Only called on the boundary transition of a quota
    /// hitting exactly 0, never on every delivery.
    pub async fn on_content_exhausted(&self, campaign: CampaignId) -> Result<(), Error> {
        let contents = self.gateway.campaign_content(campaign).await?;
        if contents.iter().all(Content::is_exhausted) && self.gateway.end_campaign(campaign).await?
        {
            info!(self.logger, "campaign ended - all content exhausted";
                "campaign" => %campaign,
                "content_count" => contents.len());
        }

        Ok(())
    }

    /// The delivery accountant: quota decrement, request log append and the
    /// lifecycle check - in that order, exactly once per resolved request.
    async fn record_delivery(
        &self,
        content: &Content,
        source: &RequestSource,
    ) -> Result<Accounted, Error> {
        if content.is_exhausted() {
            // active content is filtered to quota > 0 upstream; an exhausted
            // snapshot reaching accounting is a defect, not a race
            error!(self.logger, "exhausted content reached accounting";
                "content" => %content.id);
            return Err(Error::InvariantViolation(format!(
                "content {} selected with zero remaining quota",
                content.id
            )));
        }

        // re-validate against the store before paying the decrement
        let current = self
            .gateway
            .load_content(content.id)
            .await?
            .ok_or(GatewayError::ContentNotFound(content.id))?;
        if current.is_exhausted() {
            return Ok(Accounted::RaceLost);
        }

        let remaining = match self.gateway.decrement_remaining(content.id).await? {
            QuotaState::Decremented { remaining } => remaining,
            QuotaState::Exhausted => return Ok(Accounted::RaceLost),
        };

        let entry = RequestLogEntry::new(content.id, source.clone());
        if let Err(append_error) = self.gateway.append_request_log(entry).await {
            // reported, not rolled back - the delivery stands
            error!(self.logger, "request log append failed";
                "content" => %content.id,
                "error" => %append_error);
        }

        if remaining == 0 {
            if let Err(monitor_error) = self.on_content_exhausted(content.campaign).await {
                error!(self.logger, "campaign end check failed";
                    "campaign" => %content.campaign,
                    "error" => %monitor_error);
            }
        }

        Ok(Accounted::Delivered)
    }
}
