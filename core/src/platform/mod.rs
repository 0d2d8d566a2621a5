//! The chat platform seen from the ledger: badges and message delivery.
//!
//! RULE: Every call into the platform goes through `bounded()`, and no call
//! is ever made while the ledger lock is held. Failures here are logged and
//! reported as warnings; they never undo a committed ledger write.

use crate::types::{ChannelId, MemberId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{future::Future, time::Duration};
use thiserror::Error;

mod memory;

pub use memory::{Delivery, DeliveryTarget, MemoryPlatform};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    #[error("Platform call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Unknown member {0}")]
    UnknownMember(MemberId),

    #[error("Unknown channel {0}")]
    UnknownChannel(ChannelId),

    #[error("Platform rejected the request: {0}")]
    Rejected(String),

    #[error("Platform unavailable: {0}")]
    Unavailable(String),
}

/// A presentation-neutral message. Rendering is the platform's business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub title:  String,
    pub body:   String,
    pub color:  u32,
    pub fields: Vec<(String, String)>,
}

impl Notice {
    pub fn new(title: impl Into<String>, body: impl Into<String>, color: u32) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            color,
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }
}

#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Names of the badges (roles) the member currently holds.
    async fn member_badges(&self, member: MemberId) -> Result<Vec<String>, PlatformError>;

    /// Whether a badge with this name exists on the platform at all.
    async fn badge_exists(&self, name: &str) -> Result<bool, PlatformError>;

    async fn add_badge(&self, member: MemberId, name: &str) -> Result<(), PlatformError>;

    async fn remove_badge(&self, member: MemberId, name: &str) -> Result<(), PlatformError>;

    async fn post_to_channel(&self, channel: ChannelId, notice: &Notice) -> Result<(), PlatformError>;

    async fn notify_member(&self, member: MemberId, notice: &Notice) -> Result<(), PlatformError>;
}

/// Run a platform call with a deadline.
pub async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, PlatformError>
where
    F: Future<Output = Result<T, PlatformError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(PlatformError::Timeout(limit)),
    }
}
