//! Past Projects
//!
//! Stateless reads of previously generated mockups, plus one-shot
//! generation straight from a prompt.

use std::sync::Arc;
use tracing::{info, warn};

use crate::api::dto::GenerateMockupRequest;
use crate::api::MockupBackend;
use crate::conversation::ArtifactHandoff;
use crate::error::{StudioError, StudioResult};
use crate::inflight::{InFlight, Operation};
use crate::model::MockupSummary;

const UNTITLED: &str = "Untitled Project";

/// Loads and opens stored mockups
pub struct ProjectList<B: MockupBackend> {
    backend: Arc<B>,
    inflight: InFlight,
}

impl<B: MockupBackend> ProjectList<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            inflight: InFlight::new(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.inflight.is_busy(Operation::LoadProjects)
    }

    pub fn is_generating(&self) -> bool {
        self.inflight.is_busy(Operation::Generate)
    }

    /// List prior mockups for display
    pub async fn load(&self) -> StudioResult<Vec<MockupSummary>> {
        let _guard = self.inflight.try_begin(Operation::LoadProjects)?;
        match self.backend.list_mockups().await {
            Ok(projects) => {
                info!(count = projects.len(), "Loaded past projects");
                Ok(projects)
            }
            Err(e) => {
                warn!("Error loading past projects: {}", e);
                Err(e.into())
            }
        }
    }

    /// Fetch one stored mockup so it can be opened in the viewer
    pub async fn open(&self, id: &str) -> StudioResult<ArtifactHandoff> {
        let id = id.trim();
        if id.is_empty() {
            return Err(StudioError::Validation("Mockup id is required".to_string()));
        }
        let mockup = self.backend.get_mockup(id).await.map_err(|e| {
            warn!(mockup_id = id, "Error loading project: {}", e);
            e
        })?;
        Ok(ArtifactHandoff::new(mockup, None))
    }

    /// Generate a mockup from a prompt without a conversation
    pub async fn generate(&self, prompt: &str, project_name: &str) -> StudioResult<ArtifactHandoff> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(StudioError::Validation("Prompt is required".to_string()));
        }
        let project_name = match project_name.trim() {
            "" => UNTITLED.to_string(),
            name => name.to_string(),
        };
        let _guard = self.inflight.try_begin(Operation::Generate)?;

        let request = GenerateMockupRequest {
            prompt: prompt.to_string(),
            project_name,
        };
        let response = self.backend.generate_mockup(&request).await?;

        let Some(mut mockup) = response.mockup else {
            return Err(StudioError::Client(crate::api::ClientError::Decode(
                "generate response carried no mockup".to_string(),
            )));
        };
        if let Some(html) = response.html_content {
            mockup.html_content = html;
        }
        info!(mockup_id = %mockup.id, "Generated mockup");
        Ok(ArtifactHandoff::new(mockup, None))
    }
}
