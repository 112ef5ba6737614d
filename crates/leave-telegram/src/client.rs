//! Outbound Bot API client.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tracing::{debug, error};

use crate::error::{Result, TelegramError};

/// Delivers reply texts to a chat.
///
/// Delivery is fire-and-forget: implementations log failures and never
/// report them back to the pipeline.
#[async_trait]
pub trait ReplySender: Send + Sync {
    async fn send_reply(&self, chat_id: i64, text: &str);
}

/// Sends replies through a teloxide [`Bot`].
#[derive(Clone)]
pub struct TelegramClient {
    bot: Bot,
}

impl TelegramClient {
    /// Creates a client for `token`, talking to the Bot API at `api_url`.
    pub fn new(token: impl Into<String>, api_url: &str) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(TelegramError::NoToken);
        }
        let url = reqwest::Url::parse(api_url)
            .map_err(|e| TelegramError::InvalidApiUrl(format!("{}: {}", api_url, e)))?;
        Ok(Self {
            bot: Bot::new(token).set_api_url(url),
        })
    }

    /// Sends one Markdown message, single attempt.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        self.bot
            .send_message(ChatId(chat_id), text)
            .parse_mode(ParseMode::Markdown)
            .await?;
        debug!(chat_id = chat_id, "Reply delivered");
        Ok(())
    }
}

#[async_trait]
impl ReplySender for TelegramClient {
    async fn send_reply(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.send_message(chat_id, text).await {
            error!(chat_id = chat_id, error = %e, "Failed to send Telegram reply");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SEND_MESSAGE: &str = r"^/botTOKEN/(?i)sendmessage$";

    #[test]
    fn test_empty_token_rejected() {
        assert!(matches!(
            TelegramClient::new(" ", "http://localhost"),
            Err(TelegramError::NoToken)
        ));
    }

    #[test]
    fn test_bad_api_url_rejected() {
        assert!(matches!(
            TelegramClient::new("TOKEN", "not a url"),
            Err(TelegramError::InvalidApiUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_send_message_contract() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(SEND_MESSAGE))
            .and(body_partial_json(json!({
                "chat_id": 111,
                "text": "hello",
                "parse_mode": "Markdown"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": {
                    "message_id": 1,
                    "date": 1_700_000_000,
                    "chat": {"id": 111, "type": "private", "first_name": "Jane"},
                    "text": "hello"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = TelegramClient::new("TOKEN", &server.uri()).unwrap();
        client.send_reply(111, "hello").await;
    }

    #[tokio::test]
    async fn test_refused_message_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(SEND_MESSAGE))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "ok": false,
                "error_code": 400,
                "description": "Bad Request: chat not found"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = TelegramClient::new("TOKEN", &server.uri()).unwrap();
        let direct = client.send_message(1, "x").await;
        assert!(matches!(direct, Err(TelegramError::HttpError(_))));
    }

    #[tokio::test]
    async fn test_reply_sender_does_not_retry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let client = TelegramClient::new("TOKEN", &server.uri()).unwrap();
        client.send_reply(1, "x").await;
    }
}
