use tracing::{info, warn};

use crate::api::{ApiClient, ApiError};
use crate::filter::{self, EventQuery};
use crate::models::DisplayEvent;
use crate::session::SessionStore;
use crate::transform::transform_all;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdminTab {
    /// Scraped listings waiting for approval.
    #[default]
    Pending,
    Imported,
}

/// Back-office curation view: one feed per tab plus the filter bar state.
#[derive(Debug, Default)]
pub struct AdminDashboard {
    pub tab: AdminTab,
    pub query: EventQuery,
    events: Vec<DisplayEvent>,
}

impl AdminDashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[DisplayEvent] {
        &self.events
    }

    /// Listings after the current query is applied.
    pub fn visible(&self) -> Vec<DisplayEvent> {
        filter::filter(&self.events, &self.query)
    }

    pub fn city_options(&self) -> Vec<String> {
        filter::city_options(&self.events)
    }

    pub async fn switch_tab(
        &mut self,
        client: &ApiClient,
        session: &SessionStore,
        tab: AdminTab,
    ) -> Result<usize, ApiError> {
        self.tab = tab;
        self.load(client, session).await
    }

    pub async fn load(&mut self, client: &ApiClient, session: &SessionStore) -> Result<usize, ApiError> {
        let wire = match self.tab {
            AdminTab::Pending => client.fetch_admin_events(session).await,
            AdminTab::Imported => client.fetch_imported_events(session).await,
        }?;
        self.events = transform_all(&wire);
        info!(tab = ?self.tab, count = self.events.len(), "admin feed loaded");
        Ok(self.events.len())
    }

    /// Approves a listing. On the pending tab the feed is reloaded so the
    /// approved record drops out.
    pub async fn import_event(
        &mut self,
        client: &ApiClient,
        session: &SessionStore,
        event_id: &str,
    ) -> Result<DisplayEvent, ApiError> {
        let approved = match client.approve_event(session, event_id).await {
            Ok(approved) => approved,
            Err(err) => {
                warn!(event_id, %err, "import failed");
                return Err(err);
            }
        };
        info!(event_id, "event imported");
        if self.tab == AdminTab::Pending {
            self.load(client, session).await?;
        }
        Ok(crate::transform::transform(&approved))
    }
}

/// Public listing of approved events.
#[derive(Debug, Default)]
pub struct Marketplace {
    pub query: EventQuery,
    events: Vec<DisplayEvent>,
}

impl Marketplace {
    pub async fn load(client: &ApiClient) -> Result<Self, ApiError> {
        let wire = client.fetch_approved_events().await?;
        let events = transform_all(&wire);
        info!(count = events.len(), "marketplace loaded");
        Ok(Self {
            query: EventQuery::default(),
            events,
        })
    }

    pub fn events(&self) -> &[DisplayEvent] {
        &self.events
    }

    pub fn find(&self, event_id: &str) -> Option<&DisplayEvent> {
        self.events.iter().find(|event| event.id == event_id)
    }

    pub fn visible(&self) -> Vec<DisplayEvent> {
        filter::filter(&self.events, &self.query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_backend::{self, VALID_TOKEN};
    use crate::models::{AdminProfile, EventStatus};
    use crate::transform::DATE_TBA;

    fn signed_in(token: &str) -> SessionStore {
        let session = SessionStore::in_memory();
        session
            .login(
                AdminProfile {
                    id: "a1".to_string(),
                    name: "Ada".to_string(),
                    email: "ada@example.com".to_string(),
                    avatar: None,
                },
                token.to_string(),
            )
            .expect("login");
        session
    }

    #[tokio::test]
    async fn loads_and_filters_pending_feed() {
        let backend = fake_backend::spawn().await;
        let client = backend.client();
        let session = signed_in(VALID_TOKEN);

        let mut dashboard = AdminDashboard::new();
        assert_eq!(dashboard.load(&client, &session).await.expect("load"), 2);
        assert_eq!(dashboard.events()[1].date, DATE_TBA);
        assert_eq!(dashboard.events()[1].location, "Paris");
        assert_eq!(dashboard.city_options(), vec!["Skyline Bar", "Paris"]);

        dashboard.query = EventQuery::default().with_keyword("JAZZ");
        let visible = dashboard.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].status, Some(EventStatus::New));
        assert_eq!(visible[0].imported_at, None);
    }

    #[tokio::test]
    async fn import_moves_event_between_tabs() {
        let backend = fake_backend::spawn().await;
        let client = backend.client();
        let session = signed_in(VALID_TOKEN);

        let mut dashboard = AdminDashboard::new();
        dashboard.load(&client, &session).await.expect("load");
        let imported = dashboard
            .import_event(&client, &session, "pending-1")
            .await
            .expect("import");
        assert_eq!(imported.imported_at.as_deref(), Some("2024-03-01T12:00:00Z"));
        assert_eq!(imported.imported_by.as_deref(), Some("Admin"));
        assert_eq!(dashboard.events().len(), 1);

        let count = dashboard
            .switch_tab(&client, &session, AdminTab::Imported)
            .await
            .expect("imported tab");
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn expired_session_is_cleared() {
        let backend = fake_backend::spawn().await;
        let client = backend.client();
        let session = signed_in("stale");

        let mut dashboard = AdminDashboard::new();
        let err = dashboard
            .import_event(&client, &session, "pending-1")
            .await
            .expect_err("stale token");
        assert!(err.is_unauthorized());
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn marketplace_shows_approved_only() {
        let backend = fake_backend::spawn().await;
        let mut market = Marketplace::load(&backend.client()).await.expect("marketplace");
        assert_eq!(market.events().len(), 2);

        let sparse = market.find("approved-sparse").expect("sparse record kept");
        assert_eq!(sparse.title, "Untitled Event");
        assert_eq!(sparse.location, "Location TBA");
        assert_eq!(sparse.date, DATE_TBA);

        let gala = market.find("approved-1").expect("gala listed");
        assert_eq!(gala.location, "Royal Hall, 1 Kensington Gore, London");
        assert_eq!(gala.date, "Feb 14, 2024 • 8:00 PM");

        market.query = EventQuery::default().with_city("paris");
        assert!(market.visible().is_empty());
    }
}
