//! The content delivery engine.
//!
//! Selection is a read-only pipeline: the [`gateway`] supplies the active
//! content of a format, the [`matcher`] scores each candidate against the
//! request's target context, and the [`auction`] draws a winner by weight -
//! falling back to a uniform pick when nothing matches. The [`Engine`]
//! accounts every resolved delivery: quota decrement, request log append and
//! the campaign lifecycle check when a content runs dry.
#![deny(rust_2018_idioms)]
#![deny(clippy::all)]

pub mod auction;
pub mod engine;
pub mod gateway;
pub mod matcher;
pub mod memory;

pub use engine::{Delivery, Engine, Error, SelectionKind};
pub use gateway::{ContentGateway, GatewayError, QuotaState};
pub use matcher::{MatchResult, MatchScore};
pub use memory::MemoryGateway;
