use serde::{Deserialize, Deserializer, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    New,
    Updated,
    Inactive,
    Imported,
    #[serde(other)]
    Unknown,
}

impl EventStatus {
    /// Badge label shown next to a listing on the admin dashboard.
    pub fn label(self) -> &'static str {
        match self {
            EventStatus::New => "New",
            EventStatus::Updated => "Updated",
            EventStatus::Inactive => "Inactive",
            EventStatus::Imported => "Imported",
            EventStatus::Unknown => "Unknown",
        }
    }
}

/// Event record as the backend serves it. Every field defaults, whether it is
/// missing or `null`, so sparse payloads still decode.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct WireEvent {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub venue_name: Option<String>,
    pub venue_address: Option<String>,
    pub city: Option<String>,
    pub category: Option<String>,
    pub date_time_start: Option<String>,
    pub date_time_end: Option<String>,
    pub date_time_timezone: Option<String>,
    pub image_url: Option<String>,
    pub poster_url: Option<String>,
    pub source_website: Option<String>,
    pub source_event_id: Option<String>,
    pub original_url: Option<String>,
    pub last_scraped_at: Option<String>,
    pub status: Option<EventStatus>,
    pub hash: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub is_approved: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DisplayEvent {
    pub id: String,
    pub title: String,
    pub date: String,
    pub location: String,
    pub category: String,
    pub image: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EventStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imported_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imported_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AdminProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct AuthResponse {
    pub admin: AdminProfile,
    pub token: String,
}

#[derive(Deserialize, Debug)]
pub struct VerifyResponse {
    pub admin: AdminProfile,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadRequest {
    pub email: String,
    pub consent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_event_url: Option<String>,
}

/// Visitor email captured before the redirect to a ticket provider.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EventLead {
    pub id: String,
    pub email: String,
    pub event_id: String,
    pub consent: bool,
    #[serde(default)]
    pub redirected_at: Option<String>,
    #[serde(default)]
    pub original_event_url: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}
