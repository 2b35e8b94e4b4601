//! Gemini API client for text completion.

use serde::{Deserialize, Serialize};
use tracing::debug;

const GEMINI_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";

pub struct GeminiClient {
    api_key: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Why a completion attempt produced no text.
#[derive(Debug)]
enum CompletionError {
    /// Network failure or non-2xx status.
    Transport(String),
    /// 2xx response whose body lacks the expected reply text.
    Shape(String),
}

impl CompletionError {
    /// The diagnostic sent to the user in place of a completion.
    fn chat_text(&self) -> String {
        match self {
            Self::Transport(detail) => format!("Gemini request failed: {detail}"),
            Self::Shape(detail) => format!("Gemini response missing field: {detail}"),
        }
    }
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .expect("Failed to build HTTP client");

        Self { api_key, client }
    }

    /// Ask Gemini for a completion of `prompt`.
    ///
    /// Always returns displayable text: on any failure the result is a
    /// diagnostic string rather than an error, and it is sent to the user
    /// like a normal reply.
    pub async fn complete(&self, prompt: &str) -> String {
        match self.request(prompt).await {
            Ok(text) => text,
            Err(e) => e.chat_text(),
        }
    }

    async fn request(&self, prompt: &str) -> Result<String, CompletionError> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let url = format!("{}?key={}", GEMINI_API_URL, self.api_key);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        debug!("Gemini response status: {status}");

        if !status.is_success() {
            return Err(CompletionError::Transport(format!("{status}: {body}")));
        }

        extract_reply_text(&body)
    }
}

/// Pull the reply text out of a generateContent response body.
fn extract_reply_text(body: &str) -> Result<String, CompletionError> {
    let parsed: GenerateResponse =
        serde_json::from_str(body).map_err(|e| CompletionError::Shape(e.to_string()))?;

    parsed
        .candidates
        .and_then(|c| c.into_iter().next())
        .ok_or_else(|| CompletionError::Shape("candidates".to_string()))?
        .content
        .ok_or_else(|| CompletionError::Shape("content".to_string()))?
        .parts
        .and_then(|p| p.into_iter().next())
        .ok_or_else(|| CompletionError::Shape("parts".to_string()))?
        .text
        .ok_or_else(|| CompletionError::Shape("text".to_string()))
}
