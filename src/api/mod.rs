//! Mockup Backend API
//!
//! Typed access to the external mockup service.
//!
//! ## Architecture
//!
//! - **Endpoints**: fixed table of operation URLs
//! - **DTOs**: request/response bodies
//! - **MockupBackend**: the seam controllers are written against
//! - **ApiClient**: the `reqwest` implementation of that seam

mod client;
pub mod dto;
mod endpoints;
mod error;

pub use client::ApiClient;
pub use endpoints::Endpoints;
pub use error::{ClientError, GENERIC_FAILURE};

use async_trait::async_trait;

use crate::model::{FeedbackItem, Mockup, MockupSummary, SimulatedFeedback, TrackerTicket};
use dto::{
    AddFeedbackRequest, ChatRequest, ChatResponse, EditHtmlRequest, GenerateMockupRequest,
    GenerateMockupResponse, RefineMockupRequest, RefineMockupResponse, SubmitResponse,
};

/// Result type for backend calls
pub type ClientResult<T> = Result<T, ClientError>;

/// One method per backend operation.
///
/// Implementations issue exactly one request per call and never retry.
/// Responses with `success: false` are reported as [`ClientError::Rejected`].
#[async_trait]
pub trait MockupBackend: Send + Sync {
    /// Check that the backend is up
    async fn health(&self) -> ClientResult<()>;

    /// Generate a mockup directly from a prompt
    async fn generate_mockup(&self, request: &GenerateMockupRequest) -> ClientResult<GenerateMockupResponse>;

    /// Send one chat turn
    async fn chat(&self, request: &ChatRequest) -> ClientResult<ChatResponse>;

    /// List stored mockups, newest first
    async fn list_mockups(&self) -> ClientResult<Vec<MockupSummary>>;

    /// Fetch one mockup including its HTML
    async fn get_mockup(&self, id: &str) -> ClientResult<Mockup>;

    /// Persist edited HTML
    async fn update_mockup(&self, id: &str, html_content: &str) -> ClientResult<()>;

    async fn get_feedback(&self, id: &str) -> ClientResult<Vec<FeedbackItem>>;

    async fn add_feedback(&self, id: &str, request: &AddFeedbackRequest) -> ClientResult<()>;

    /// Apply a natural-language instruction to HTML, returning the new document
    async fn edit_html(&self, request: &EditHtmlRequest) -> ClientResult<String>;

    async fn refine_mockup(&self, request: &RefineMockupRequest) -> ClientResult<RefineMockupResponse>;

    async fn simulate_feedback(&self, html_content: &str) -> ClientResult<Vec<SimulatedFeedback>>;

    /// Create tracker tickets for a mockup. Partial success is still `Ok`.
    async fn submit_mockup(&self, id: &str) -> ClientResult<SubmitResponse>;

    /// Whether the backend has a working tracker configuration
    async fn tracker_connected(&self) -> ClientResult<bool>;

    async fn tracker_tickets(&self) -> ClientResult<Vec<TrackerTicket>>;
}
