//! In-process stand-in for the event backend used by client tests.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use crate::api::ApiClient;
use crate::config::ApiConfig;

pub const VALID_TOKEN: &str = "valid-token";

#[derive(Clone, Default)]
struct BackendState {
    events: Arc<Mutex<Vec<Value>>>,
    leads: Arc<Mutex<Vec<Value>>>,
}

pub struct FakeBackend {
    base_url: String,
    state: BackendState,
}

impl FakeBackend {
    pub fn client(&self) -> ApiClient {
        ApiClient::new(&ApiConfig::default().with_base_url(self.base_url.clone()))
            .expect("fake backend client")
    }

    pub fn lead_count(&self) -> usize {
        self.state.leads.lock().expect("leads lock").len()
    }
}

pub async fn spawn() -> FakeBackend {
    let state = BackendState {
        events: Arc::new(Mutex::new(seed_events())),
        leads: Arc::new(Mutex::new(Vec::new())),
    };
    let app = Router::new()
        .route("/auth/google", post(google_login))
        .route("/auth/verify", get(verify))
        .route("/events", get(public_events))
        .route("/events/:id/lead", post(create_lead))
        .route("/admin/events", get(pending_events))
        .route("/admin/imported/events", get(imported_events))
        .route("/admin/event/:id", post(approve))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake backend");
    let addr = listener.local_addr().expect("fake backend addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake backend serve");
    });

    FakeBackend {
        base_url: format!("http://{addr}"),
        state,
    }
}

fn seed_events() -> Vec<Value> {
    vec![
        json!({
            "id": "pending-1",
            "title": "Jazz on the Roof",
            "venueName": "Skyline Bar",
            "city": "London",
            "category": "Music",
            "dateTimeStart": "2024-01-20T19:00:00Z",
            "dateTimeTimezone": "Europe/London",
            "status": "new",
            "isApproved": false,
            "updatedAt": "2024-01-02T10:00:00Z"
        }),
        json!({
            "id": "pending-2",
            "title": "Pottery Workshop",
            "venueName": "TBA",
            "city": "Paris",
            "category": "Workshops",
            "dateTimeStart": "garbage",
            "status": "updated",
            "isApproved": false
        }),
        json!({
            "id": "approved-1",
            "title": "Symphony Gala",
            "venueName": "Royal Hall",
            "venueAddress": "1 Kensington Gore",
            "city": "London",
            "category": "Classical",
            "dateTimeStart": "2024-02-14T20:00:00Z",
            "dateTimeTimezone": "Europe/London",
            "originalUrl": "https://tickets.example.com/gala",
            "status": "imported",
            "isApproved": true,
            "updatedAt": "2024-01-05T08:00:00Z"
        }),
    ]
}

fn authorized(headers: &HeaderMap) -> Result<(), StatusCode> {
    let expected = format!("Bearer {VALID_TOKEN}");
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

fn admin_json() -> Value {
    json!({ "id": "a1", "name": "Ada", "email": "ada@example.com" })
}

async fn google_login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let credential = body.get("credential").and_then(Value::as_str).unwrap_or_default();
    if credential.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Missing credential" })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({ "admin": admin_json(), "token": VALID_TOKEN })),
    )
}

async fn verify(headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    authorized(&headers)?;
    Ok(Json(json!({ "admin": admin_json() })))
}

fn events_where(state: &BackendState, approved: bool) -> Vec<Value> {
    state
        .events
        .lock()
        .expect("events lock")
        .iter()
        .filter(|event| event["isApproved"].as_bool() == Some(approved))
        .cloned()
        .collect()
}

async fn public_events(State(state): State<BackendState>) -> Json<Value> {
    // Leaks one unapproved record and a couple of sloppy ones so the client-side
    // re-check and per-record decoding are exercised.
    let mut events = events_where(&state, true);
    events.extend(events_where(&state, false).into_iter().take(1));
    events.push(json!({ "id": null, "isApproved": null }));
    events.push(json!({
        "id": "approved-sparse",
        "title": null,
        "venueName": null,
        "imageUrl": null,
        "isApproved": true
    }));
    events.push(json!({ "id": "approved-broken", "isApproved": true, "title": 42 }));
    Json(Value::Array(events))
}

async fn pending_events(
    State(state): State<BackendState>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    authorized(&headers)?;
    Ok(Json(Value::Array(events_where(&state, false))))
}

async fn imported_events(
    State(state): State<BackendState>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    authorized(&headers)?;
    Ok(Json(Value::Array(events_where(&state, true))))
}

async fn approve(
    State(state): State<BackendState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    authorized(&headers).map_err(|status| (status, Json(json!({}))))?;
    let mut events = state.events.lock().expect("events lock");
    let event = events
        .iter_mut()
        .find(|event| event["id"].as_str() == Some(id.as_str()))
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Event not found" })),
            )
        })?;
    event["isApproved"] = json!(true);
    event["status"] = json!("imported");
    event["updatedAt"] = json!("2024-03-01T12:00:00Z");
    Ok(Json(event.clone()))
}

async fn create_lead(
    State(state): State<BackendState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let email = body.get("email").and_then(Value::as_str).unwrap_or_default();
    if email.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Email is required" })),
        );
    }
    let mut leads = state.leads.lock().expect("leads lock");
    let lead = json!({
        "id": format!("lead-{}", leads.len() + 1),
        "email": email,
        "eventId": id,
        "consent": body.get("consent").and_then(Value::as_bool).unwrap_or(false),
        "redirectedAt": null,
        "originalEventUrl": body.get("originalEventUrl").and_then(Value::as_str).unwrap_or_default(),
        "createdAt": "2024-03-01T12:00:00Z",
        "updatedAt": "2024-03-01T12:00:00Z"
    });
    leads.push(lead.clone());
    (StatusCode::CREATED, Json(lead))
}
