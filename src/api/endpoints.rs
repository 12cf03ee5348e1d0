//! Endpoint Table
//!
//! Maps each logical backend operation to its URL.

use crate::config::{ApiConfig, TrackerConfig};

/// URLs for every backend operation, built from one base URL
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: String,
    tracker_test: String,
    tracker_tickets: String,
}

impl Endpoints {
    pub fn new(base_url: &str) -> Self {
        Self::with_tracker(base_url, &TrackerConfig::default())
    }

    pub fn from_config(api: &ApiConfig, tracker: &TrackerConfig) -> Self {
        Self::with_tracker(&api.base_url, tracker)
    }

    fn with_tracker(base_url: &str, tracker: &TrackerConfig) -> Self {
        // Normalize: remove trailing slash
        let base = base_url.trim_end_matches('/').to_string();
        Self {
            tracker_test: join(&base, &tracker.test_path),
            tracker_tickets: join(&base, &tracker.tickets_path),
            base,
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn health(&self) -> String {
        format!("{}/api/health", self.base)
    }

    pub fn generate_mockup(&self) -> String {
        format!("{}/api/generate-mockup", self.base)
    }

    pub fn chat(&self) -> String {
        format!("{}/api/chat", self.base)
    }

    pub fn list_mockups(&self) -> String {
        format!("{}/api/mockups", self.base)
    }

    pub fn mockup(&self, id: &str) -> String {
        format!("{}/api/mockups/{}", self.base, urlencoding::encode(id))
    }

    pub fn update_mockup(&self, id: &str) -> String {
        format!("{}/update", self.mockup(id))
    }

    /// Used for both reading and adding feedback
    pub fn feedback(&self, id: &str) -> String {
        format!("{}/feedback", self.mockup(id))
    }

    pub fn submit_mockup(&self, id: &str) -> String {
        format!("{}/submit", self.mockup(id))
    }

    pub fn edit_html(&self) -> String {
        format!("{}/api/edit-html", self.base)
    }

    pub fn refine_mockup(&self) -> String {
        format!("{}/api/refine-mockup", self.base)
    }

    pub fn simulate_feedback(&self) -> String {
        format!("{}/api/simulate-feedback", self.base)
    }

    pub fn tracker_test(&self) -> &str {
        &self.tracker_test
    }

    pub fn tracker_tickets(&self) -> &str {
        &self.tracker_tickets
    }
}

fn join(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!("{}/{}", base, path.trim_start_matches('/'))
}
