//! Mockup Viewer
//!
//! Owns the artifact once it leaves the conversation. Edits, refinements,
//! and saves each hold their own in-flight flag, so any two of them may be
//! outstanding at once. They share the working HTML buffer: the last write
//! to complete wins.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

use crate::api::dto::{AddFeedbackRequest, EditHtmlRequest, RefineMockupRequest};
use crate::api::{ClientError, MockupBackend};
use crate::conversation::ArtifactHandoff;
use crate::error::{StudioError, StudioResult};
use crate::inflight::{InFlight, Operation};
use crate::model::{default_author, ChatTurn, FeedbackItem, Mockup, SimulatedFeedback};

/// Instruction sent by [`MockupViewer::refine`]
pub const REFINE_INSTRUCTION: &str = "Polish the overall design: improve visual hierarchy, spacing, \
     color consistency, and responsiveness while keeping all existing content and features.";

const EDIT_GREETING: &str =
    "Tell me what to change in this mockup and I'll update it for you.";

/// Which face of the artifact is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Preview,
    Code,
}

/// Result of an instruction-driven edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The HTML was replaced; `saved` tells whether the auto-save succeeded
    Applied { saved: bool },
    /// The backend could not apply the edit; the HTML is unchanged
    Failed { error: String },
}

#[derive(Debug)]
struct ViewerState {
    saved: Mockup,
    html: String,
    mode: ViewMode,
    transcript: Vec<ChatTurn>,
    feedback: Vec<FeedbackItem>,
    simulated: Vec<SimulatedFeedback>,
    error: Option<String>,
}

/// Viewer and editor for one mockup
pub struct MockupViewer<B: MockupBackend> {
    backend: Arc<B>,
    state: Mutex<ViewerState>,
    inflight: InFlight,
}

impl<B: MockupBackend> MockupViewer<B> {
    pub fn new(backend: Arc<B>, handoff: ArtifactHandoff) -> Self {
        let saved = handoff.into_mockup();
        info!(mockup_id = %saved.id, project = %saved.project_name, "Opening mockup");

        Self {
            backend,
            state: Mutex::new(ViewerState {
                html: saved.html_content.clone(),
                feedback: saved.feedback.clone(),
                saved,
                mode: ViewMode::default(),
                transcript: vec![ChatTurn::assistant(EDIT_GREETING)],
                simulated: Vec::new(),
                error: None,
            }),
            inflight: InFlight::new(),
        }
    }

    fn state(&self) -> MutexGuard<'_, ViewerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The artifact as last persisted
    pub fn artifact(&self) -> Mockup {
        self.state().saved.clone()
    }

    /// The working HTML, including unsaved edits
    pub fn html(&self) -> String {
        self.state().html.clone()
    }

    pub fn is_dirty(&self) -> bool {
        let state = self.state();
        state.html != state.saved.html_content
    }

    pub fn view_mode(&self) -> ViewMode {
        self.state().mode
    }

    pub fn set_view(&self, mode: ViewMode) {
        self.state().mode = mode;
    }

    pub fn toggle_view(&self) -> ViewMode {
        let mut state = self.state();
        state.mode = match state.mode {
            ViewMode::Preview => ViewMode::Code,
            ViewMode::Code => ViewMode::Preview,
        };
        state.mode
    }

    /// Edit transcript
    pub fn transcript(&self) -> Vec<ChatTurn> {
        self.state().transcript.clone()
    }

    pub fn feedback(&self) -> Vec<FeedbackItem> {
        self.state().feedback.clone()
    }

    pub fn simulated_feedback(&self) -> Vec<SimulatedFeedback> {
        self.state().simulated.clone()
    }

    /// Standing error from the last failed save, refine, or feedback call
    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    pub fn is_busy(&self, op: Operation) -> bool {
        self.inflight.is_busy(op)
    }

    /// Apply a natural-language edit, then auto-save the result.
    ///
    /// Backend failures are reported in the transcript and as
    /// [`EditOutcome::Failed`]; only validation and busy errors are `Err`.
    pub async fn edit_with_instruction(&self, instruction: &str) -> StudioResult<EditOutcome> {
        let instruction = instruction.trim();
        if instruction.is_empty() {
            return Err(StudioError::Validation("Instruction cannot be empty".to_string()));
        }
        let _guard = self.inflight.try_begin(Operation::Edit)?;

        let html = {
            let mut state = self.state();
            state.transcript.push(ChatTurn::user(instruction));
            state.html.clone()
        };

        let request = EditHtmlRequest {
            html_content: html,
            instruction: instruction.to_string(),
        };

        let edited = match self.backend.edit_html(&request).await {
            Ok(edited) => edited,
            Err(e) => {
                warn!("Edit failed: {}", e);
                let error = e.user_message();
                self.state().transcript.push(ChatTurn::assistant(format!(
                    "Sorry, I couldn't apply that change: {}",
                    error
                )));
                return Ok(EditOutcome::Failed { error });
            }
        };

        let id = {
            let mut state = self.state();
            state.html = edited.clone();
            state.saved.id.clone()
        };

        let saved = match self.backend.update_mockup(&id, &edited).await {
            Ok(()) => {
                let mut state = self.state();
                state.saved.html_content = edited;
                state.transcript.push(ChatTurn::assistant(format!(
                    "Done! I applied \"{}\" and saved the mockup.",
                    instruction
                )));
                true
            }
            Err(e) => {
                warn!(mockup_id = %id, "Auto-save after edit failed: {}", e);
                self.state().transcript.push(ChatTurn::assistant(format!(
                    "I applied \"{}\", but saving failed: {}. Use save to try again.",
                    instruction,
                    e.user_message()
                )));
                false
            }
        };

        Ok(EditOutcome::Applied { saved })
    }

    /// Persist the working HTML; on success the saved artifact follows it
    pub async fn save_changes(&self) -> StudioResult<Mockup> {
        let _guard = self.inflight.try_begin(Operation::Save)?;
        let (id, html) = {
            let state = self.state();
            (state.saved.id.clone(), state.html.clone())
        };

        match self.backend.update_mockup(&id, &html).await {
            Ok(()) => {
                let mut state = self.state();
                state.saved.html_content = html;
                state.error = None;
                info!(mockup_id = %id, "Mockup saved");
                Ok(state.saved.clone())
            }
            Err(e) => Err(self.fail("Save", e)),
        }
    }

    /// Ask the backend for a general polish of the whole document
    pub async fn refine(&self) -> StudioResult<()> {
        self.refine_with(vec![REFINE_INSTRUCTION.to_string()]).await
    }

    /// Refine using the comments left on this mockup
    pub async fn refine_with_feedback(&self) -> StudioResult<()> {
        let texts: Vec<String> = self.state().feedback.iter().map(|f| f.text.clone()).collect();
        if texts.is_empty() {
            return Err(StudioError::Validation(
                "Please add some feedback before refining the mockup.".to_string(),
            ));
        }
        self.refine_with(texts).await
    }

    async fn refine_with(&self, feedback: Vec<String>) -> StudioResult<()> {
        let _guard = self.inflight.try_begin(Operation::Refine)?;
        let request = RefineMockupRequest {
            original_html: self.html(),
            feedback,
        };

        let response = match self.backend.refine_mockup(&request).await {
            Ok(r) => r,
            Err(e) => return Err(self.fail("Refine", e)),
        };

        let Some(html) = response.html_content else {
            return Err(self.fail(
                "Refine",
                ClientError::Decode("refine response carried no html_content".to_string()),
            ));
        };

        if let Some(new_id) = response.mockup_id.as_deref() {
            info!(refined_id = new_id, "Backend stored the refined version separately");
        }
        let mut state = self.state();
        state.html = html;
        state.error = None;
        Ok(())
    }

    /// Reload the comment list for this mockup
    pub async fn load_feedback(&self) -> StudioResult<Vec<FeedbackItem>> {
        let _guard = self.inflight.try_begin(Operation::Feedback)?;
        self.fetch_feedback().await
    }

    /// Leave a comment, then reload the list
    pub async fn add_feedback(&self, text: &str, author: &str) -> StudioResult<Vec<FeedbackItem>> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StudioError::Validation("Feedback text is required".to_string()));
        }
        let author = match author.trim() {
            "" => default_author(),
            a => a.to_string(),
        };
        let _guard = self.inflight.try_begin(Operation::Feedback)?;

        let id = self.state().saved.id.clone();
        let request = AddFeedbackRequest {
            feedback: text.to_string(),
            author,
        };
        if let Err(e) = self.backend.add_feedback(&id, &request).await {
            return Err(self.fail("Feedback", e));
        }
        self.fetch_feedback().await
    }

    async fn fetch_feedback(&self) -> StudioResult<Vec<FeedbackItem>> {
        let id = self.state().saved.id.clone();
        match self.backend.get_feedback(&id).await {
            Ok(items) => {
                self.state().feedback = items.clone();
                Ok(items)
            }
            Err(e) => Err(self.fail("Loading feedback", e)),
        }
    }

    /// Have the backend role-play stakeholders reviewing the current HTML
    pub async fn simulate_feedback(&self) -> StudioResult<Vec<SimulatedFeedback>> {
        let _guard = self.inflight.try_begin(Operation::SimulateFeedback)?;
        let html = self.html();

        match self.backend.simulate_feedback(&html).await {
            Ok(items) => {
                self.state().simulated = items.clone();
                Ok(items)
            }
            Err(e) => Err(self.fail("Feedback simulation", e)),
        }
    }

    /// Write the working HTML into `dir`
    pub async fn download(&self, dir: &Path) -> StudioResult<PathBuf> {
        let (name, html) = {
            let state = self.state();
            (state.saved.download_filename(), state.html.clone())
        };
        let path = dir.join(name);
        tokio::fs::write(&path, html).await?;
        info!("Wrote mockup to {:?}", path);
        Ok(path)
    }

    fn fail(&self, what: &str, e: ClientError) -> StudioError {
        warn!("{} failed: {}", what, e);
        let err = StudioError::from(e);
        self.state().error = Some(format!("{} failed: {}", what, err.user_message()));
        err
    }
}
