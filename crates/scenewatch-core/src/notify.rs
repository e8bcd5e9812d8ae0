//! Outbound notification transports.
//!
//! [`TelegramNotifier`] posts to the Bot API over blocking HTTP. The bot
//! token is part of every request URL, so transport errors are stripped of
//! their URL before they surface.

use std::time::Duration;

use reqwest::blocking::{multipart, Client};
use serde::{Deserialize, Serialize};

use crate::config::NotifyConfig;
use crate::error::{Result, WatchError};

pub trait Notifier {
    fn send_message(&self, text: &str) -> Result<()>;

    fn send_photo(&self, png: &[u8], caption: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// TelegramNotifier
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct ApiReply {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(config: &NotifyConfig, token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(WatchError::Config(format!(
                "bot token is empty (set {})",
                config.token_env
            )));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token,
            chat_id: config.chat_id.clone(),
        })
    }

    /// Reads the token from the environment variable named in `config`.
    pub fn from_env(config: &NotifyConfig) -> Result<Self> {
        let token = std::env::var(&config.token_env).map_err(|_| {
            WatchError::Config(format!("{} is not set", config.token_env))
        })?;
        Self::new(config, token)
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.api_base, self.token)
    }

    fn check(method: &str, response: reqwest::blocking::Response) -> Result<()> {
        let status = response.status();
        let reply: ApiReply = response.json().unwrap_or_default();
        if status.is_success() && reply.ok {
            tracing::debug!(method, status = status.as_u16(), "notification delivered");
            return Ok(());
        }
        let reason = reply
            .description
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("").to_string());
        tracing::warn!(method, status = status.as_u16(), %reason, "notification rejected");
        Err(WatchError::Dispatch(format!(
            "{method}: HTTP {}: {reason}",
            status.as_u16()
        )))
    }
}

fn transport_error(method: &str, e: reqwest::Error) -> WatchError {
    WatchError::Dispatch(format!("{method}: {}", e.without_url()))
}

impl Notifier for TelegramNotifier {
    fn send_message(&self, text: &str) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint("sendMessage"))
            .json(&SendMessage {
                chat_id: &self.chat_id,
                text,
            })
            .send()
            .map_err(|e| transport_error("sendMessage", e))?;
        Self::check("sendMessage", response)
    }

    fn send_photo(&self, png: &[u8], caption: &str) -> Result<()> {
        let photo = multipart::Part::bytes(png.to_vec())
            .file_name("alert.png")
            .mime_str("image/png")
            .map_err(|e| transport_error("sendPhoto", e))?;
        let form = multipart::Form::new()
            .text("chat_id", self.chat_id.clone())
            .text("caption", caption.to_string())
            .part("photo", photo);
        let response = self
            .client
            .post(self.endpoint("sendPhoto"))
            .multipart(form)
            .send()
            .map_err(|e| transport_error("sendPhoto", e))?;
        Self::check("sendPhoto", response)
    }
}

// ---------------------------------------------------------------------------
// LogNotifier
// ---------------------------------------------------------------------------

/// Writes notifications to the log. Used when no transport is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send_message(&self, text: &str) -> Result<()> {
        tracing::info!(target: "scenewatch::alert", "{text}");
        Ok(())
    }

    fn send_photo(&self, png: &[u8], caption: &str) -> Result<()> {
        tracing::info!(target: "scenewatch::alert", bytes = png.len(), "{caption}");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
