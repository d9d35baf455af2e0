use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::channel::NotificationChannel;
use crate::errors::NotifyError;

pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Telegram Bot API client bound to one bot and one target chat.
#[derive(Clone)]
pub struct TelegramChannel {
    http: Client,
    api_url: String,
    bot_token: String,
    chat_id: String,
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

#[derive(Serialize)]
struct GetUpdatesRequest {
    offset: i64,
    timeout: u64,
    allowed_updates: [&'static str; 1],
}

#[derive(Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    result: Option<T>,
}

/// Incoming update from `getUpdates`; only text messages are modelled.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

impl TelegramChannel {
    pub fn new(
        api_url: impl Into<String>,
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> Result<Self, NotifyError> {
        // long polling holds the connection open, so the timeout is generous
        let http = Client::builder()
            .timeout(Duration::from_secs(60))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
        })
    }

    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    /// Send `text` to an arbitrary chat (used for command replies).
    #[instrument(skip(self, text), fields(chars = text.chars().count()), level = "debug")]
    pub async fn send_to(&self, chat_id: &str, text: &str) -> Result<(), NotifyError> {
        let request = SendMessageRequest {
            chat_id,
            text,
            parse_mode: "HTML",
        };

        let _: serde_json::Value = self.call("sendMessage", &request).await?;
        debug!("telegram message delivered");
        Ok(())
    }

    /// Long-poll for updates after `offset`.
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout: Duration,
    ) -> Result<Vec<Update>, NotifyError> {
        let request = GetUpdatesRequest {
            offset,
            timeout: timeout.as_secs(),
            allowed_updates: ["message"],
        };
        self.call("getUpdates", &request).await
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T, NotifyError>
    where
        B: Serialize + ?Sized,
        T: for<'de> Deserialize<'de>,
    {
        let url = format!("{}/bot{}/{}", self.api_url, self.bot_token, method);

        let resp = self.http.post(&url).json(body).send().await?;
        let status = resp.status();
        let parsed: ApiResponse<T> = resp.json().await?;

        match parsed {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } if status.is_success() => Ok(result),
            ApiResponse { description, .. } => Err(NotifyError::Rejected {
                status,
                description: description.unwrap_or_else(|| "no description".to_string()),
            }),
        }
    }
}

#[async_trait]
impl NotificationChannel for TelegramChannel {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        self.send_to(&self.chat_id, text).await
    }
}
