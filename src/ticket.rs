use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use thiserror::Error;
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::models::{CreateLeadRequest, DisplayEvent, EventLead};

pub const FALLBACK_REDIRECT: &str = "https://example.com";

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

#[derive(Debug, Error, PartialEq)]
pub enum TicketError {
    #[error("a valid email address is required")]
    InvalidEmail,
    #[error("ticket request already submitted")]
    AlreadySubmitted,
}

/// "Get tickets" dialog: collect an email, record the lead, hand back where
/// to send the visitor.
#[derive(Debug, Clone)]
pub enum TicketFlow {
    Collecting {
        event_id: String,
        title: String,
        source_url: Option<String>,
        email: String,
        consent: bool,
    },
    Done {
        lead: Option<EventLead>,
        redirect_url: Option<String>,
    },
}

impl TicketFlow {
    pub fn start(event: &DisplayEvent) -> Self {
        TicketFlow::Collecting {
            event_id: event.id.clone(),
            title: event.title.clone(),
            source_url: event.source_url.clone(),
            email: String::new(),
            consent: false,
        }
    }

    pub fn set_email(&mut self, value: impl Into<String>) {
        if let TicketFlow::Collecting { email, .. } = self {
            *email = value.into();
        }
    }

    pub fn set_consent(&mut self, value: bool) {
        if let TicketFlow::Collecting { consent, .. } = self {
            *consent = value;
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, TicketFlow::Done { .. })
    }

    /// Records the lead and finishes the flow. A backend failure still
    /// completes, redirecting only when the listing has its own source URL.
    pub async fn submit(&mut self, client: &ApiClient) -> Result<(), TicketError> {
        let TicketFlow::Collecting {
            event_id,
            title,
            source_url,
            email,
            consent,
        } = self
        else {
            return Err(TicketError::AlreadySubmitted);
        };

        let email = email.trim().to_string();
        if !is_valid_email(&email) {
            return Err(TicketError::InvalidEmail);
        }

        let request = CreateLeadRequest {
            email,
            consent: *consent,
            original_event_url: source_url.clone(),
        };

        let next = match client.create_event_lead(event_id, &request).await {
            Ok(lead) => {
                info!(event_id = %event_id, title = %title, "lead captured, redirecting");
                TicketFlow::Done {
                    lead: Some(lead),
                    redirect_url: Some(
                        source_url
                            .clone()
                            .unwrap_or_else(|| FALLBACK_REDIRECT.to_string()),
                    ),
                }
            }
            Err(err) => {
                warn!(event_id = %event_id, %err, "failed to save lead");
                TicketFlow::Done {
                    lead: None,
                    redirect_url: source_url.clone(),
                }
            }
        };
        *self = next;
        Ok(())
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

/// Host shown on the listing's "Source:" line.
pub fn source_host(event: &DisplayEvent) -> String {
    event
        .source_url
        .as_deref()
        .and_then(|url| Url::parse(url).ok())
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_else(|| "example.com".to_string())
}
