//! HTTP surface: the LINE webhook callback and the history admin endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::classify::{self, Reply};
use crate::gemini::GeminiClient;
use crate::history::HistoryStore;
use crate::line::{self, LineClient, ReplyMessage, WebhookEvent, WebhookPayload};

/// Shared state for all handlers.
pub struct AppState {
    pub channel_secret: String,
    pub history: HistoryStore,
    pub gemini: GeminiClient,
    pub line: LineClient,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/callback", post(callback))
        .route("/history/:user", get(get_history).delete(delete_history))
        .with_state(state)
}

async fn index() -> &'static str {
    "LINE Gemini Bot is running."
}

// --- Webhook callback (POST /callback) ---

async fn callback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let signature = headers
        .get("x-line-signature")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if !line::verify_signature(&state.channel_secret, body.as_bytes(), signature) {
        warn!("Rejected webhook call with bad signature ({} bytes)", body.len());
        return (StatusCode::BAD_REQUEST, "Invalid signature").into_response();
    }

    // Once the signature checks out the platform always gets a 200; event
    // failures are logged, not surfaced.
    let payload: WebhookPayload = match serde_json::from_str(&body) {
        Ok(p) => p,
        Err(e) => {
            warn!("Undecodable webhook body: {e}");
            return (StatusCode::OK, "OK").into_response();
        }
    };

    for event in payload.events {
        handle_event(&state, event).await;
    }

    (StatusCode::OK, "OK").into_response()
}

/// Run one event through classify → reply → log. Non-text events are
/// skipped silently.
async fn handle_event(state: &AppState, event: WebhookEvent) {
    if event.event_type != "message" {
        return;
    }
    let Some(reply_token) = event.reply_token else {
        return;
    };
    let Some(user_id) = event.source.and_then(|s| s.user_id) else {
        return;
    };
    let Some(message) = event.message else {
        return;
    };
    if message.msg_type != "text" {
        return;
    }
    let Some(text) = message.text else {
        return;
    };

    let preview: String = text.chars().take(100).collect();
    info!("Message from {user_id}: \"{preview}\"");

    let (outbound, record) = match classify::classify(&text, &user_id) {
        // Echo skips the history log entirely.
        Reply::Echo(sender_id) => (ReplyMessage::Text { text: sender_id }, false),
        Reply::Chat(prompt) => {
            let completion = state.gemini.complete(&prompt).await;
            let text = classify::truncate(&completion, classify::MAX_REPLY_CHARS);
            (ReplyMessage::Text { text }, true)
        }
        Reply::Sticker {
            package_id,
            sticker_id,
        } => (
            ReplyMessage::Sticker {
                package_id: package_id.to_string(),
                sticker_id: sticker_id.to_string(),
            },
            true,
        ),
        Reply::Image {
            original_url,
            preview_url,
        } => (
            ReplyMessage::Image {
                original_content_url: original_url.to_string(),
                preview_image_url: preview_url.to_string(),
            },
            true,
        ),
        Reply::Video {
            original_url,
            preview_url,
        } => (
            ReplyMessage::Video {
                original_content_url: original_url.to_string(),
                preview_image_url: preview_url.to_string(),
            },
            true,
        ),
        Reply::Location {
            title,
            address,
            latitude,
            longitude,
        } => (
            ReplyMessage::Location {
                title: title.to_string(),
                address: address.to_string(),
                latitude,
                longitude,
            },
            true,
        ),
    };

    // No history entry when the reply never went out.
    if state.line.reply(&reply_token, outbound).await.is_err() {
        return;
    }

    if record {
        if let Err(e) = state.history.append(&user_id, &text) {
            warn!("Failed to record history for {user_id}: {e}");
        }
    }
}

// --- History admin endpoints ---

#[derive(Serialize)]
struct HistoryEntry {
    id: i64,
    msg: String,
}

async fn get_history(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
) -> Response {
    match state.history.list(&user) {
        Ok(records) => {
            let entries: Vec<HistoryEntry> = records
                .into_iter()
                .map(|r| HistoryEntry { id: r.id, msg: r.msg })
                .collect();
            Json(entries).into_response()
        }
        Err(e) => {
            error!("Failed to list history for {user}: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn delete_history(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
) -> Response {
    match state.history.delete_all(&user) {
        Ok(count) => {
            info!("Deleted {count} history rows for {user}");
            Json(serde_json::json!({"status": "deleted", "user": user})).into_response()
        }
        Err(e) => {
            error!("Failed to delete history for {user}: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
