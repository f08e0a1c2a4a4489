#![deny(rust_2018_idioms)]
#![deny(clippy::all)]

use thiserror::Error;

pub mod campaign;
pub mod config;
pub mod content;
pub mod money;
pub mod request_log;
pub mod target_context;
pub mod util {
    pub mod logging;
}

#[cfg(feature = "test-util")]
pub mod test_util;

pub use self::campaign::{Campaign, CampaignId, CampaignState};
pub use self::config::Config;
pub use self::content::{Content, ContentFormat, ContentId, ContentPayload};
pub use self::money::Money;
pub use self::request_log::{RequestLogEntry, RequestSource};
pub use self::target_context::TargetContext;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("rule violation: {0}")]
    RuleViolation(String),
}
