use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::models::{AuthResponse, CreateLeadRequest, EventLead, VerifyResponse, WireEvent};
use crate::session::SessionStore;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unauthorized, please log in again")]
    Unauthorized,
    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("http error: {0}")]
    Http(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Client for the event backend. Admin routes carry the bearer token of the
/// session passed in; a 401 on those routes clears that session.
#[derive(Clone)]
pub struct ApiClient {
    base: Url,
    client: Client,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let base = Url::parse(config.base_url.trim())
            .map_err(|err| ApiError::InvalidUrl(format!("{}: {err}", config.base_url)))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(config.base_url.clone()));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("event-scale/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| ApiError::Http(err.to_string()))?;
        Ok(Self { base, client })
    }

    pub async fn authenticate_with_google(&self, credential: &str) -> Result<AuthResponse, ApiError> {
        let url = self.endpoint(&["auth", "google"])?;
        let request = self.client.post(url).json(&json!({ "credential": credential }));
        self.send(request, None).await
    }

    pub async fn verify_auth(&self, session: &SessionStore) -> Result<VerifyResponse, ApiError> {
        let url = self.endpoint(&["auth", "verify"])?;
        self.send(self.authorized(self.client.get(url), session), Some(session))
            .await
    }

    /// Pending (not yet approved) listings for the curation queue.
    pub async fn fetch_admin_events(&self, session: &SessionStore) -> Result<Vec<WireEvent>, ApiError> {
        let url = self.endpoint(&["admin", "events"])?;
        let records = self
            .send(self.authorized(self.client.get(url), session), Some(session))
            .await?;
        Ok(decode_feed(records))
    }

    pub async fn fetch_imported_events(
        &self,
        session: &SessionStore,
    ) -> Result<Vec<WireEvent>, ApiError> {
        let url = self.endpoint(&["admin", "imported", "events"])?;
        let records = self
            .send(self.authorized(self.client.get(url), session), Some(session))
            .await?;
        Ok(decode_feed(records))
    }

    /// Public marketplace feed. Anything not flagged approved is dropped even
    /// if the backend returns it.
    pub async fn fetch_approved_events(&self) -> Result<Vec<WireEvent>, ApiError> {
        let url = self.endpoint(&["events"])?;
        let events = decode_feed(self.send(self.client.get(url), None).await?);
        let total = events.len();
        let approved: Vec<WireEvent> = events.into_iter().filter(|e| e.is_approved).collect();
        if approved.len() != total {
            warn!(
                dropped = total - approved.len(),
                "public feed returned unapproved events"
            );
        }
        Ok(approved)
    }

    pub async fn approve_event(
        &self,
        session: &SessionStore,
        event_id: &str,
    ) -> Result<WireEvent, ApiError> {
        let url = self.endpoint(&["admin", "event", event_id])?;
        self.send(self.authorized(self.client.post(url), session), Some(session))
            .await
    }

    pub async fn create_event_lead(
        &self,
        event_id: &str,
        lead: &CreateLeadRequest,
    ) -> Result<EventLead, ApiError> {
        let url = self.endpoint(&["events", event_id, "lead"])?;
        self.send(self.client.post(url).json(lead), None).await
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder, session: &SessionStore) -> RequestBuilder {
        match session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        session: Option<&SessionStore>,
    ) -> Result<T, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|err| ApiError::Http(err.to_string()))?;
        let status = response.status();
        let url = response.url().clone();
        let body = response
            .text()
            .await
            .map_err(|err| ApiError::Http(err.to_string()))?;
        debug!(%url, %status, "backend response");

        if status == StatusCode::UNAUTHORIZED {
            if let Some(session) = session {
                if let Err(err) = session.logout() {
                    warn!(%err, "failed to clear rejected session");
                }
            }
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|parsed| parsed.error)
                .filter(|msg| !msg.trim().is_empty())
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|err| ApiError::Decode(err.to_string()))
    }
}

/// Decodes a feed one record at a time so a malformed record is skipped
/// instead of failing the whole list.
fn decode_feed(records: Vec<Value>) -> Vec<WireEvent> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value(record) {
            Ok(event) => Some(event),
            Err(err) => {
                warn!(index, %err, "skipping undecodable event record");
                None
            }
        })
        .collect()
}
