//! HTTP client for the relay service.

use crate::api::{ChatReply, ChatRequest, HistoryEntry};
use crate::utils::url::construct_api_url;

/// Thin wrapper around [`reqwest::Client`] that knows where the relay lives.
///
/// The relay reports its own failures inside a normally-shaped [`ChatReply`]
/// body, so the response body is decoded regardless of HTTP status; only
/// transport-level failures (connection refused, unparseable body) surface as
/// errors here.
#[derive(Clone)]
pub struct RelayClient {
    http: reqwest::Client,
    base_url: String,
}

impl RelayClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub async fn send(
        &self,
        message: String,
        history: Vec<HistoryEntry>,
    ) -> Result<ChatReply, reqwest::Error> {
        let url = construct_api_url(&self.base_url, "api/chat");
        let response = self
            .http
            .post(url)
            .json(&ChatRequest { message, history })
            .send()
            .await?;
        response.json::<ChatReply>().await
    }
}
