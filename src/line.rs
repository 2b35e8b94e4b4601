//! LINE Messaging API adapter: webhook verification, payload types, and
//! the reply call.

use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

const REPLY_API_URL: &str = "https://api.line.me/v2/bot/message/reply";

/// Verifies a LINE webhook signature using constant-time comparison.
///
/// LINE sends `X-Line-Signature: <base64>`. This function validates the
/// base64-encoded HMAC-SHA256 of the raw request body against that header
/// value, keyed by the channel secret.
pub fn verify_signature(channel_secret: &str, body: &[u8], signature_header: &str) -> bool {
    let Ok(expected) = base64::engine::general_purpose::STANDARD.decode(signature_header) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(channel_secret.as_bytes()) else {
        return false;
    };

    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

// --- Webhook payload types ---

#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(rename = "replyToken")]
    pub reply_token: Option<String>,
    pub source: Option<EventSource>,
    pub message: Option<EventMessage>,
}

#[derive(Debug, Deserialize)]
pub struct EventSource {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EventMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub text: Option<String>,
}

// --- Outbound reply messages ---

/// One message in the LINE reply API's wire format.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReplyMessage {
    Text {
        text: String,
    },
    Sticker {
        #[serde(rename = "packageId")]
        package_id: String,
        #[serde(rename = "stickerId")]
        sticker_id: String,
    },
    Image {
        #[serde(rename = "originalContentUrl")]
        original_content_url: String,
        #[serde(rename = "previewImageUrl")]
        preview_image_url: String,
    },
    Video {
        #[serde(rename = "originalContentUrl")]
        original_content_url: String,
        #[serde(rename = "previewImageUrl")]
        preview_image_url: String,
    },
    Location {
        title: String,
        address: String,
        latitude: f64,
        longitude: f64,
    },
}

#[derive(Serialize)]
struct ReplyRequest<'a> {
    #[serde(rename = "replyToken")]
    reply_token: &'a str,
    messages: Vec<ReplyMessage>,
}

/// LINE reply API client.
pub struct LineClient {
    access_token: String,
    client: reqwest::Client,
}

impl LineClient {
    pub fn new(access_token: String) -> Self {
        Self {
            access_token,
            client: reqwest::Client::new(),
        }
    }

    /// Send one message in answer to the event that issued `reply_token`.
    /// The token is single-use; there is no retry.
    pub async fn reply(&self, reply_token: &str, message: ReplyMessage) -> Result<(), String> {
        let request = ReplyRequest {
            reply_token,
            messages: vec![message],
        };

        let response = self
            .client
            .post(REPLY_API_URL)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Failed to send reply: {e}");
                warn!("{}", msg);
                msg
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let msg = format!("LINE API error {status}: {body}");
            warn!("{}", msg);
            return Err(msg);
        }

        Ok(())
    }
}
