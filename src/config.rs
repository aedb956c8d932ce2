use std::time::Duration;

const DEFAULT_API_URL: &str = "http://localhost:5000";
const DEFAULT_TIMEOUT_SECS: u64 = 20;
const DEFAULT_RECOMMENDER_ENDPOINT: &str = "http://127.0.0.1:1234/v1";
const DEFAULT_RECOMMENDER_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub recommender: RecommenderConfig,
}

#[derive(Debug, Clone)]
pub struct RecommenderConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            recommender: RecommenderConfig::default(),
        }
    }
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_RECOMMENDER_ENDPOINT.to_string(),
            model: DEFAULT_RECOMMENDER_MODEL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("EVENT_SCALE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self {
            base_url,
            timeout: timeout_from_env("EVENT_SCALE_HTTP_TIMEOUT_SECS"),
            recommender: RecommenderConfig::from_env(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl RecommenderConfig {
    pub fn from_env() -> Self {
        Self {
            endpoint: std::env::var("RECOMMENDER_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_RECOMMENDER_ENDPOINT.to_string()),
            model: std::env::var("RECOMMENDER_MODEL")
                .unwrap_or_else(|_| DEFAULT_RECOMMENDER_MODEL.to_string()),
            api_key: std::env::var("RECOMMENDER_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            timeout: timeout_from_env("RECOMMENDER_TIMEOUT_SECS"),
        }
    }
}

fn timeout_from_env(name: &str) -> Duration {
    let secs = std::env::var(name)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    Duration::from_secs(secs)
}
