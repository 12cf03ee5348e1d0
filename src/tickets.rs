//! Issue-Tracker Tickets
//!
//! Submitting a mockup turns it into tracker tickets; the board lists what
//! the tracker currently holds.

use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

use crate::api::MockupBackend;
use crate::error::StudioResult;
use crate::inflight::{InFlight, Operation};
use crate::model::{StatusCategory, TicketOutcome, TrackerTicket};

// ============================================
// Submission
// ============================================

/// Every ticket outcome from one submission, in backend order.
///
/// Partial success is a normal result; all outcomes are kept.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReport {
    pub outcomes: Vec<TicketOutcome>,
    /// Count reported by the backend
    pub tickets_created: usize,
    /// Count reported by the backend
    pub tickets_failed: usize,
}

impl SubmissionReport {
    pub fn created(&self) -> Vec<&TicketOutcome> {
        self.outcomes.iter().filter(|o| o.is_created()).collect()
    }

    pub fn failed(&self) -> Vec<&TicketOutcome> {
        self.outcomes.iter().filter(|o| !o.is_created()).collect()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} ticket(s) created, {} failed",
            self.created().len(),
            self.failed().len()
        )
    }
}

/// Sends a mockup to the tracker
pub struct TicketSubmission<B: MockupBackend> {
    backend: Arc<B>,
    inflight: InFlight,
}

impl<B: MockupBackend> TicketSubmission<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            inflight: InFlight::new(),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.inflight.is_busy(Operation::Submit)
    }

    /// Create tickets for `artifact_id`. Call again to retry.
    pub async fn submit(&self, artifact_id: &str) -> StudioResult<SubmissionReport> {
        let _guard = self.inflight.try_begin(Operation::Submit)?;
        info!(mockup_id = artifact_id, "Submitting mockup to tracker");

        let response = self.backend.submit_mockup(artifact_id).await.map_err(|e| {
            warn!(mockup_id = artifact_id, "Ticket submission failed: {}", e);
            e
        })?;

        let report = SubmissionReport {
            outcomes: response.tickets.into_iter().map(TicketOutcome::from).collect(),
            tickets_created: response.tickets_created,
            tickets_failed: response.tickets_failed,
        };
        info!(mockup_id = artifact_id, "{}", report.summary());
        Ok(report)
    }
}

// ============================================
// Board
// ============================================

/// Board filter buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TicketFilter {
    #[default]
    All,
    Todo,
    InProgress,
    Done,
}

impl TicketFilter {
    pub const ALL: [TicketFilter; 4] = [
        TicketFilter::All,
        TicketFilter::Todo,
        TicketFilter::InProgress,
        TicketFilter::Done,
    ];

    pub fn matches(&self, ticket: &TrackerTicket) -> bool {
        match self {
            TicketFilter::All => true,
            TicketFilter::Todo => ticket.status_category == StatusCategory::New,
            TicketFilter::InProgress => ticket.status_category == StatusCategory::Indeterminate,
            TicketFilter::Done => ticket.status_category == StatusCategory::Done,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TicketFilter::All => "All",
            TicketFilter::Todo => "To Do",
            TicketFilter::InProgress => "In Progress",
            TicketFilter::Done => "Done",
        }
    }
}

impl std::str::FromStr for TicketFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(TicketFilter::All),
            "todo" => Ok(TicketFilter::Todo),
            "inprogress" | "in-progress" => Ok(TicketFilter::InProgress),
            "done" => Ok(TicketFilter::Done),
            other => Err(format!("Unknown filter: {}", other)),
        }
    }
}

/// Display bucket for a ticket's priority
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityClass {
    High,
    Medium,
    Low,
}

impl PriorityClass {
    pub fn of(priority: &str) -> Self {
        match priority.to_lowercase().as_str() {
            "highest" | "high" => PriorityClass::High,
            "low" | "lowest" => PriorityClass::Low,
            _ => PriorityClass::Medium,
        }
    }
}

/// What the board shows
#[derive(Debug, Clone, PartialEq)]
pub enum BoardState {
    /// Not loaded yet
    Idle,
    /// The backend has no working tracker setup; this persists until refresh
    NotConnected { reason: String },
    /// Connected, but listing tickets failed
    Error { message: String },
    Loaded { tickets: Vec<TrackerTicket> },
}

const NOT_CONFIGURED: &str =
    "The issue tracker is not configured. Please set up tracker credentials in the backend.";
const UNREACHABLE: &str = "Failed to connect to the issue tracker. Please check your configuration.";

#[derive(Debug)]
struct BoardInner {
    state: BoardState,
    filter: TicketFilter,
}

/// Tracker board with filtering
pub struct TrackerBoard<B: MockupBackend> {
    backend: Arc<B>,
    inflight: InFlight,
    inner: Mutex<BoardInner>,
}

impl<B: MockupBackend> TrackerBoard<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            inflight: InFlight::new(),
            inner: Mutex::new(BoardInner {
                state: BoardState::Idle,
                filter: TicketFilter::default(),
            }),
        }
    }

    fn inner(&self) -> MutexGuard<'_, BoardInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn state(&self) -> BoardState {
        self.inner().state.clone()
    }

    /// True while a refresh is outstanding
    pub fn is_loading(&self) -> bool {
        self.inflight.is_busy(Operation::Tracker)
    }

    pub fn filter(&self) -> TicketFilter {
        self.inner().filter
    }

    pub fn set_filter(&self, filter: TicketFilter) {
        self.inner().filter = filter;
    }

    /// Check connectivity, then load tickets if connected
    pub async fn refresh(&self) -> StudioResult<BoardState> {
        let _guard = self.inflight.try_begin(Operation::Tracker)?;

        let state = match self.backend.tracker_connected().await {
            Ok(true) => match self.backend.tracker_tickets().await {
                Ok(tickets) => {
                    info!(count = tickets.len(), "Loaded tracker tickets");
                    BoardState::Loaded { tickets }
                }
                Err(e) => {
                    warn!("Loading tracker tickets failed: {}", e);
                    BoardState::Error {
                        message: e.user_message(),
                    }
                }
            },
            Ok(false) => BoardState::NotConnected {
                reason: NOT_CONFIGURED.to_string(),
            },
            Err(e) => {
                warn!("Tracker connectivity check failed: {}", e);
                BoardState::NotConnected {
                    reason: UNREACHABLE.to_string(),
                }
            }
        };
        self.inner().state = state.clone();
        Ok(state)
    }

    /// Tickets passing the current filter
    pub fn visible(&self) -> Vec<TrackerTicket> {
        let inner = self.inner();
        match &inner.state {
            BoardState::Loaded { tickets } => tickets
                .iter()
                .filter(|t| inner.filter.matches(t))
                .cloned()
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn count(&self, filter: TicketFilter) -> usize {
        match &self.inner().state {
            BoardState::Loaded { tickets } => tickets.iter().filter(|t| filter.matches(t)).count(),
            _ => 0,
        }
    }
}
