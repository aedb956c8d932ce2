use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::RecommenderConfig;

pub const UNAVAILABLE_MESSAGE: &str = "Sorry, I couldn't fetch recommendations right now.";
pub const EMPTY_MESSAGE: &str = "No recommendations found.";

const SYSTEM_PROMPT: &str =
    "You are an event concierge. Keep answers short and use markdown lists.";
const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 800;

#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("invalid recommender endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("recommender http error: {0}")]
    Http(String),
    #[error("recommender returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("recommender decode error: {0}")]
    Decode(String),
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatReply>,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Asks a chat-completions endpoint for event ideas matching a free-text query.
pub struct Recommender {
    model: String,
    completions_url: Url,
    api_key: Option<String>,
    client: Client,
}

impl Recommender {
    pub fn from_config(config: &RecommenderConfig) -> Result<Self, RecommendError> {
        let endpoint = format!("{}/chat/completions", config.endpoint.trim().trim_end_matches('/'));
        let completions_url = Url::parse(&endpoint)
            .map_err(|err| RecommendError::InvalidEndpoint(format!("{endpoint}: {err}")))?;
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| RecommendError::Http(err.to_string()))?;
        Ok(Self {
            model: config.model.clone(),
            completions_url,
            api_key: config.api_key.clone(),
            client,
        })
    }

    /// Never fails: transport, timeout or decode problems degrade to a fixed
    /// apology.
    pub async fn recommend(&self, query: &str) -> String {
        match self.ask(query).await {
            Ok(Some(text)) => text,
            Ok(None) => EMPTY_MESSAGE.to_string(),
            Err(err) => {
                warn!(%err, "recommendation request failed");
                UNAVAILABLE_MESSAGE.to_string()
            }
        }
    }

    async fn ask(&self, query: &str) -> Result<Option<String>, RecommendError> {
        let prompt = build_prompt(query);
        let body = ChatRequest {
            model: &self.model,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
        };

        let mut request = self.client.post(self.completions_url.clone()).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|err| RecommendError::Http(err.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| RecommendError::Http(err.to_string()))?;
        debug!(%status, "recommender response");

        if !status.is_success() {
            return Err(RecommendError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: ChatResponse =
            serde_json::from_str(&text).map_err(|err| RecommendError::Decode(err.to_string()))?;
        Ok(first_answer(parsed))
    }
}

fn first_answer(response: ChatResponse) -> Option<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|reply| reply.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
}

fn build_prompt(query: &str) -> String {
    format!(
        "The user asks: \"{query}\".\nRecommend 3 fictional but realistic upcoming events based on this query.\nReturn them as a concise markdown list with Title, Date, and Location.",
        query = query.trim()
    )
}
