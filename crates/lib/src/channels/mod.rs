//! Outbound chat channels.
//!
//! The relay talks to a channel through [`Notifier`] so the HTTP layer never
//! depends on a concrete provider; DingTalk is the only implementation.

mod dingtalk;

pub use dingtalk::{forward, DingTalkAt, DingTalkChannel, DingTalkMessage, DingTalkText};

use async_trait::async_trait;
use reqwest::StatusCode;

/// Why a send did not reach the destination.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("failed to marshal message: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected status code: {0}")]
    Status(StatusCode),
}

/// Sends a text notification to the destination identified by `access_token`.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_text(&self, access_token: &str, text: &str) -> Result<(), ChannelError>;
}
