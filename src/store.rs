//! Application Store
//!
//! Unidirectional data flow: the front end dispatches [`Action`]s, the
//! store reduces them into a new [`AppState`], and every subscriber gets a
//! snapshot. Uses a tokio broadcast channel for pub/sub.

use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::auth::AuthState;
use crate::conversation::ArtifactHandoff;
use crate::model::Mockup;

/// Top-level screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dashboard,
    Viewer,
    TrackerBoard,
}

/// Where the user is in the conversation → artifact → tickets flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NoConversation,
    Chatting,
    ArtifactReady,
    Editing,
    /// Tickets were created for the current artifact; edits remain allowed
    Submitted,
}

/// Everything the front end renders from
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub auth: AuthState,
    pub view: View,
    pub phase: Phase,
    pub conversation_id: Option<String>,
    /// Artifact open in the viewer
    pub current: Option<Mockup>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            auth: AuthState::Loading,
            view: View::Dashboard,
            phase: Phase::NoConversation,
            conversation_id: None,
            current: None,
        }
    }
}

/// State transitions the front end can request
#[derive(Debug, Clone)]
pub enum Action {
    AuthChanged(AuthState),
    ConversationStarted(String),
    ConversationReset,
    /// The only way into the viewer
    ArtifactReady(ArtifactHandoff),
    ArtifactEdited,
    ArtifactSaved(Mockup),
    TicketsSubmitted { artifact_id: String },
    ShowTrackerBoard,
    BackToDashboard,
}

/// Holds the state and notifies subscribers
pub struct Store {
    state: AppState,
    tx: broadcast::Sender<AppState>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self {
            state: AppState::default(),
            tx,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Receive a snapshot after every dispatch
    pub fn subscribe(&self) -> broadcast::Receiver<AppState> {
        self.tx.subscribe()
    }

    /// Apply an action and send the resulting snapshot to every subscriber,
    /// even when nothing changed. Returns whether the state changed.
    pub fn dispatch(&mut self, action: Action) -> bool {
        let next = reduce(&self.state, action);
        let changed = next != self.state;
        if next.view != self.state.view {
            info!(from = ?self.state.view, to = ?next.view, "View changed");
        }
        self.state = next;
        // No subscribers is fine
        let _ = self.tx.send(self.state.clone());
        changed
    }
}

fn reduce(state: &AppState, action: Action) -> AppState {
    let mut next = state.clone();

    if let Action::AuthChanged(auth) = action {
        if !matches!(auth, AuthState::Authenticated(_)) {
            next = AppState::default();
        }
        next.auth = auth;
        return next;
    }

    if !matches!(state.auth, AuthState::Authenticated(_)) {
        debug!(?action, "Ignoring action while signed out");
        return next;
    }

    match action {
        Action::AuthChanged(_) => {}
        Action::ConversationStarted(id) => {
            next.conversation_id = Some(id);
            if next.phase == Phase::NoConversation {
                next.phase = Phase::Chatting;
            }
        }
        Action::ConversationReset => {
            next.conversation_id = None;
            if next.view == View::Dashboard {
                next.phase = Phase::NoConversation;
            }
        }
        Action::ArtifactReady(handoff) => {
            if let Some(id) = handoff.conversation_id() {
                next.conversation_id = Some(id.to_string());
            }
            next.current = Some(handoff.into_mockup());
            next.view = View::Viewer;
            next.phase = Phase::ArtifactReady;
        }
        Action::ArtifactEdited => {
            if next.phase == Phase::ArtifactReady {
                next.phase = Phase::Editing;
            }
        }
        Action::ArtifactSaved(mockup) => {
            let same = next.current.as_ref().map(|m| m.id == mockup.id).unwrap_or(false);
            if same {
                next.current = Some(mockup);
                if next.phase == Phase::ArtifactReady {
                    next.phase = Phase::Editing;
                }
            }
        }
        Action::TicketsSubmitted { artifact_id } => {
            let same = next.current.as_ref().map(|m| m.id == artifact_id).unwrap_or(false);
            if same {
                next.phase = Phase::Submitted;
            }
        }
        Action::ShowTrackerBoard => {
            next.view = View::TrackerBoard;
        }
        Action::BackToDashboard => {
            next.view = View::Dashboard;
            next.current = None;
            next.phase = if next.conversation_id.is_some() {
                Phase::Chatting
            } else {
                Phase::NoConversation
            };
        }
    }
    next
}
