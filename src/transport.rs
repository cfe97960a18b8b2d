//! Messaging transport: the two primitives the delivery pipeline needs.
//!
//! [`MessagingTransport`] is the seam between the pipeline and the outside
//! world. [`TelegramTransport`] implements it on top of the Telegram Bot API;
//! tests substitute a recording fake.

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::error::TransportError;
use crate::utils::truncate_for_log;

/// Sends photos and text messages to a chat.
pub trait MessagingTransport {
    /// Post the image at `photo_url` with `caption`.
    async fn send_photo(&self, chat_id: &str, photo_url: &str, caption: &str)
    -> Result<(), TransportError>;

    /// Post a plain text message.
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), TransportError>;
}

/// Body of every Bot API reply.
#[derive(Debug, Deserialize)]
struct ApiReply {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Telegram Bot API client.
pub struct TelegramTransport {
    client: Client,
    api_base: String,
    token: String,
}

impl std::fmt::Debug for TelegramTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramTransport")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl TelegramTransport {
    pub fn new(client: Client, api_base: &str, token: &str) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    /// POST a form to `method` and map the reply onto [`TransportError`].
    ///
    /// A 2xx reply is accepted unless its body says `"ok": false`. An
    /// unparsable 2xx body still counts as sent.
    async fn call(&self, method: &'static str, form: &[(&str, &str)]) -> Result<(), TransportError> {
        let response = self
            .client
            .post(self.method_url(method))
            .form(form)
            .send()
            .await
            .map_err(|source| network_error(method, source))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| network_error(method, source))?;
        let reply = serde_json::from_str::<ApiReply>(&body).ok();

        let accepted = status.is_success() && reply.as_ref().is_none_or(|r| r.ok);
        if accepted {
            debug!(method, status = status.as_u16(), "Telegram accepted request");
            return Ok(());
        }

        let description = reply
            .and_then(|r| r.description)
            .unwrap_or_else(|| truncate_for_log(&body, 300));
        warn!(method, status = status.as_u16(), %description, "Telegram rejected request");
        Err(TransportError::Rejected {
            method,
            status: status.as_u16(),
            description,
        })
    }
}

/// The request URL carries the bot token, so it is dropped from the error.
fn network_error(method: &'static str, source: reqwest::Error) -> TransportError {
    TransportError::Network {
        method,
        source: source.without_url(),
    }
}

impl MessagingTransport for TelegramTransport {
    #[instrument(level = "info", skip(self, caption), fields(caption_chars = caption.chars().count()))]
    async fn send_photo(
        &self,
        chat_id: &str,
        photo_url: &str,
        caption: &str,
    ) -> Result<(), TransportError> {
        self.call(
            "sendPhoto",
            &[("chat_id", chat_id), ("photo", photo_url), ("caption", caption)],
        )
        .await
    }

    #[instrument(level = "info", skip(self, text), fields(text_chars = text.chars().count()))]
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), TransportError> {
        self.call("sendMessage", &[("chat_id", chat_id), ("text", text)])
            .await
    }
}
