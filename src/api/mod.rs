use serde::{Deserialize, Serialize};

pub mod client;

/// Role attached to a history entry on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiRole {
    User,
    Assistant,
}

impl ApiRole {
    pub fn as_str(self) -> &'static str {
        match self {
            ApiRole::User => "user",
            ApiRole::Assistant => "assistant",
        }
    }
}

/// One prior conversation turn, as sent alongside a chat request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: ApiRole,
    pub content: String,
}

/// Request body for `POST /api/chat`.
///
/// `history` is part of the wire contract and is accepted by the relay, but
/// the provider call itself is stateless; only `message` is forwarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

/// Response body for `POST /api/chat`.
///
/// Error responses carry the same shape with a human-readable notice in
/// `reply`, so a client that renders `reply` unconditionally still shows
/// something sensible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub reply: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}
