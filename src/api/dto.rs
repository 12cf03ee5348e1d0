//! Data Transfer Objects
//!
//! Request and response bodies for the mockup backend. Response types
//! tolerate missing fields so that older backends still decode.

use serde::{Deserialize, Serialize};

use crate::model::{FeedbackItem, Mockup, MockupSummary, SimulatedFeedback, TicketResult, TrackerTicket};

// ============================================
// Requests
// ============================================

#[derive(Debug, Clone, Serialize)]
pub struct GenerateMockupRequest {
    pub prompt: String,
    pub project_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// `null` on the first turn of a conversation
    pub conversation_id: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateMockupRequest {
    pub html_content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddFeedbackRequest {
    pub feedback: String,
    pub author: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EditHtmlRequest {
    pub html_content: String,
    pub instruction: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefineMockupRequest {
    pub original_html: String,
    pub feedback: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulateFeedbackRequest {
    pub html_content: String,
}

// ============================================
// Responses
// ============================================

/// Anything carrying the backend's `success`/`error` pair
pub trait Outcome {
    fn succeeded(&self) -> bool;
    fn error_message(&self) -> Option<&str>;
}

macro_rules! impl_outcome {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Outcome for $ty {
                fn succeeded(&self) -> bool {
                    self.success
                }

                fn error_message(&self) -> Option<&str> {
                    self.error.as_deref()
                }
            }
        )*
    };
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateMockupResponse {
    #[serde(default)]
    pub success: bool,
    pub mockup: Option<Mockup>,
    #[serde(default)]
    pub html_content: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub ready_to_generate: bool,
    #[serde(default)]
    pub mockup: Option<Mockup>,
    #[serde(default)]
    pub html_content: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MockupListResponse {
    #[serde(default)]
    pub mockups: Vec<MockupSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MockupResponse {
    pub mockup: Mockup,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuccessResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackListResponse {
    #[serde(default)]
    pub feedback: Vec<FeedbackItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddFeedbackResponse {
    #[serde(default)]
    pub success: bool,
    pub feedback: Option<FeedbackItem>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EditHtmlResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub html_content: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefineMockupResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub mockup_id: Option<String>,
    #[serde(default)]
    pub html_content: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulateFeedbackResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub feedback: Vec<SimulatedFeedback>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub tickets: Vec<TicketResult>,
    #[serde(default)]
    pub tickets_created: usize,
    #[serde(default)]
    pub tickets_failed: usize,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackerTestResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackerTicketsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub tickets: Vec<TrackerTicket>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of a non-2xx response
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl_outcome!(
    GenerateMockupResponse,
    ChatResponse,
    SuccessResponse,
    AddFeedbackResponse,
    EditHtmlResponse,
    RefineMockupResponse,
    SimulateFeedbackResponse,
    SubmitResponse,
    TrackerTestResponse,
    TrackerTicketsResponse,
);
