//! # Mockup Studio
//!
//! Chat-driven client for an AI mockup-generation backend: talk through a
//! product idea, receive a generated HTML mockup, edit it by instruction,
//! and turn it into issue-tracker tickets.
//!
//! ## Modules
//!
//! - [`api`]: endpoint table, DTOs, and the `reqwest` backend client
//! - [`conversation`]: chat transcript and the ready-artifact handoff
//! - [`viewer`]: in-place editing, refinement, saving, and feedback
//! - [`tickets`]: ticket submission and the tracker board
//! - [`projects`]: past-project listing and direct generation
//! - [`auth`]: auth gate over an external identity provider
//! - [`store`]: application state with subscribers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mockup_studio::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let backend = Arc::new(ApiClient::from_config(&config)?);
//!
//!     let chat = ConversationController::new(Arc::clone(&backend), &config.chat);
//!     if let SendOutcome::ArtifactReady(handoff) = chat.send_turn("a todo app").await? {
//!         let viewer = MockupViewer::new(Arc::clone(&backend), handoff);
//!         viewer.edit_with_instruction("make the background blue").await?;
//!
//!         let report = TicketSubmission::new(backend).submit(&viewer.artifact().id).await?;
//!         println!("{}", report.summary());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod conversation;
pub mod error;
pub mod inflight;
pub mod logging;
pub mod model;
pub mod projects;
pub mod store;
pub mod tickets;
pub mod viewer;

#[cfg(test)]
pub(crate) mod testing;

// Re-export top-level types for convenience
pub use api::{ApiClient, ClientError, ClientResult, Endpoints, MockupBackend, GENERIC_FAILURE};

pub use auth::{AuthGate, AuthState, ConfiguredIdentity, GateView, IdentityProvider, UserProfile};

pub use config::{Config, ConfigError, LoggingConfig};

pub use conversation::{ArtifactHandoff, ConversationController, PendingSend, SendOutcome};

pub use error::{StudioError, StudioResult};

pub use inflight::{InFlight, Operation};

pub use model::{
    ChatTurn, FeedbackItem, Mockup, MockupSummary, Role, SimulatedFeedback, StatusCategory,
    TicketOutcome, TicketResult, TrackerTicket,
};

pub use projects::ProjectList;

pub use store::{Action, AppState, Phase, Store, View};

pub use tickets::{BoardState, PriorityClass, SubmissionReport, TicketFilter, TicketSubmission, TrackerBoard};

pub use viewer::{EditOutcome, MockupViewer, ViewMode};
