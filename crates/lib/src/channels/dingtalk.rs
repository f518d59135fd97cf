//! DingTalk channel: posts text messages to a custom robot via `/robot/send`.

use crate::channels::{ChannelError, Notifier};
use crate::config::{self, Config};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::Serialize;

const SEND_PATH: &str = "/robot/send";
const ACCESS_TOKEN_PARAM: &str = "access_token";

/// Robot message envelope. Only the `text` message type is produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DingTalkMessage {
    pub msgtype: String,
    pub text: DingTalkText,
    pub at: DingTalkAt,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DingTalkText {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DingTalkAt {
    #[serde(rename = "isAtAll")]
    pub is_at_all: bool,
}

impl DingTalkMessage {
    /// Text message that mentions everyone in the group.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            msgtype: "text".to_string(),
            text: DingTalkText {
                content: content.into(),
            },
            at: DingTalkAt { is_at_all: true },
        }
    }
}

/// Client for the DingTalk robot API.
#[derive(Clone)]
pub struct DingTalkChannel {
    base_url: String,
    client: reqwest::Client,
}

impl DingTalkChannel {
    /// Build a channel against `base_url` (trailing `/` trimmed). `timeout` bounds each send.
    pub fn new(
        base_url: impl Into<String>,
        timeout: Option<std::time::Duration>,
    ) -> Result<Self, ChannelError> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: builder.build()?,
        })
    }

    /// Channel configured from `dingtalk.*` (base URL after env override, timeout).
    pub fn from_config(config: &Config) -> Result<Self, ChannelError> {
        Self::new(
            config::resolve_dingtalk_base_url(config),
            config.dingtalk.timeout(),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Robot send URL. The token is appended as-is, without percent-encoding.
    pub fn send_url(&self, access_token: &str) -> String {
        format!(
            "{}{}?{}={}",
            self.base_url, SEND_PATH, ACCESS_TOKEN_PARAM, access_token
        )
    }

    /// POST /robot/send — anything other than 200 is an error.
    pub async fn send_message(
        &self,
        access_token: &str,
        message: &DingTalkMessage,
    ) -> Result<(), ChannelError> {
        let payload = serde_json::to_vec(message)?;
        let res = self
            .client
            .post(self.send_url(access_token))
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await?;
        // Only the status is read; dropping `res` releases the body on every path.
        let status = res.status();
        if status != StatusCode::OK {
            return Err(ChannelError::Status(status));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for DingTalkChannel {
    async fn send_text(&self, access_token: &str, text: &str) -> Result<(), ChannelError> {
        self.send_message(access_token, &DingTalkMessage::text(text))
            .await
    }
}

/// Relay `text` to the robot behind `access_token`. Failures are logged and swallowed.
pub async fn forward(notifier: &dyn Notifier, text: &str, access_token: &str) {
    match notifier.send_text(access_token, text).await {
        Ok(()) => log::info!("dingtalk alert sent successfully"),
        Err(e) => log::warn!("dingtalk alert failed: {}", e),
    }
}
