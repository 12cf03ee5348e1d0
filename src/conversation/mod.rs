//! Conversation Controller
//!
//! Holds the chat transcript and the server-assigned conversation id, and
//! turns a ready response from the backend into an [`ArtifactHandoff`].
//!
//! ## Send lifecycle
//!
//! A send is a two-phase transition:
//!
//! 1. [`ConversationController::begin_send`] appends the user turn
//!    optimistically and returns a [`PendingSend`]
//! 2. the pending send is either committed with the backend's reply, or
//!    rolled back, which truncates the transcript to its prior length
//!
//! [`ConversationController::send_turn`] drives both phases against the
//! backend; the phases are public so the rollback path can be exercised on
//! its own.

pub mod marker;

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::api::dto::{ChatRequest, ChatResponse};
use crate::api::MockupBackend;
use crate::config::ChatConfig;
use crate::error::{StudioError, StudioResult};
use crate::inflight::{InFlight, InFlightGuard, Operation};
use crate::model::{ChatTurn, Mockup};

const READY_NOTICE: &str = "🎉 Your mockup has been generated! Opening it now...";

/// A finished artifact on its way into the viewer.
///
/// Only the conversation controller and the project loader can create one,
/// so the viewer cannot be opened before the backend has said the artifact
/// is ready.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactHandoff {
    mockup: Mockup,
    conversation_id: Option<String>,
}

impl ArtifactHandoff {
    pub(crate) fn new(mockup: Mockup, conversation_id: Option<String>) -> Self {
        Self {
            mockup,
            conversation_id,
        }
    }

    pub fn mockup(&self) -> &Mockup {
        &self.mockup
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    pub fn into_mockup(self) -> Mockup {
        self.mockup
    }
}

/// An optimistic user turn awaiting the backend's answer
#[must_use = "a pending send must be committed or rolled back"]
#[derive(Debug)]
pub struct PendingSend {
    request: ChatRequest,
    rollback_len: usize,
    _guard: InFlightGuard,
}

impl PendingSend {
    /// The request to send for this turn
    pub fn request(&self) -> &ChatRequest {
        &self.request
    }
}

/// Ready artifact whose notice has not been posted yet
#[derive(Debug)]
pub struct ReadyArtifact {
    mockup: Mockup,
    conversation_id: Option<String>,
}

/// Result of a successful send
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// The assistant replied and the conversation continues
    Replied,
    /// The assistant replied and the mockup is ready for the viewer
    ArtifactReady(ArtifactHandoff),
}

#[derive(Debug)]
struct ConversationState {
    conversation_id: Option<String>,
    transcript: Vec<ChatTurn>,
    error: Option<String>,
}

/// Drives one chat conversation against the backend
pub struct ConversationController<B: MockupBackend> {
    backend: Arc<B>,
    state: Mutex<ConversationState>,
    inflight: InFlight,
    welcome: String,
    ready_delay: Duration,
}

impl<B: MockupBackend> ConversationController<B> {
    pub fn new(backend: Arc<B>, config: &ChatConfig) -> Self {
        Self {
            backend,
            state: Mutex::new(ConversationState {
                conversation_id: None,
                transcript: vec![ChatTurn::assistant(config.welcome_message.clone())],
                error: None,
            }),
            inflight: InFlight::new(),
            welcome: config.welcome_message.clone(),
            ready_delay: Duration::from_millis(config.ready_delay_ms),
        }
    }

    fn state(&self) -> MutexGuard<'_, ConversationState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn transcript(&self) -> Vec<ChatTurn> {
        self.state().transcript.clone()
    }

    pub fn conversation_id(&self) -> Option<String> {
        self.state().conversation_id.clone()
    }

    /// Standing error from the last failed send
    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    pub fn is_sending(&self) -> bool {
        self.inflight.is_busy(Operation::SendMessage)
    }

    /// Send one user turn and apply the reply.
    ///
    /// On failure the user turn is removed again, the error is kept as the
    /// standing error, and the error is returned. Nothing is retried.
    pub async fn send_turn(&self, text: &str) -> StudioResult<SendOutcome> {
        let pending = self.begin_send(text)?;

        match self.backend.chat(pending.request()).await {
            Ok(response) => match self.commit(pending, response) {
                Some(ready) => {
                    if !self.ready_delay.is_zero() {
                        tokio::time::sleep(self.ready_delay).await;
                    }
                    Ok(SendOutcome::ArtifactReady(self.announce(ready)))
                }
                None => Ok(SendOutcome::Replied),
            },
            Err(e) => {
                let err = StudioError::from(e);
                self.rollback(pending, &err);
                Err(err)
            }
        }
    }

    /// Phase one: validate, claim the send flag, and append the user turn
    pub fn begin_send(&self, text: &str) -> StudioResult<PendingSend> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StudioError::Validation("Message cannot be empty".to_string()));
        }

        let guard = self.inflight.try_begin(Operation::SendMessage)?;

        let mut state = self.state();
        state.error = None;
        let rollback_len = state.transcript.len();
        state.transcript.push(ChatTurn::user(text));

        Ok(PendingSend {
            request: ChatRequest {
                conversation_id: state.conversation_id.clone(),
                message: text.to_string(),
            },
            rollback_len,
            _guard: guard,
        })
    }

    /// Phase two (success): record the id and append the assistant reply.
    ///
    /// Returns the artifact when the backend flagged the conversation as
    /// ready and sent a mockup with it.
    pub fn commit(&self, pending: PendingSend, response: ChatResponse) -> Option<ReadyArtifact> {
        let mut state = self.state();

        let held = state.conversation_id.clone();
        match (held.as_deref(), response.conversation_id.as_deref()) {
            (None, Some(id)) => {
                info!(conversation_id = id, "Conversation started");
                state.conversation_id = Some(id.to_string());
            }
            (Some(held), Some(id)) if held != id => {
                warn!(held, received = id, "Backend returned a different conversation id; keeping the original");
            }
            _ => {}
        }

        state.transcript.push(ChatTurn::assistant(response.message));
        drop(pending);

        if !response.ready_to_generate {
            return None;
        }

        let Some(mut mockup) = response.mockup else {
            debug!("Ready flag without a mockup payload; staying in chat");
            return None;
        };
        if let Some(html) = response.html_content {
            mockup.html_content = html;
        }

        info!(mockup_id = %mockup.id, "Mockup ready");
        Some(ReadyArtifact {
            mockup,
            conversation_id: response.conversation_id.or_else(|| state.conversation_id.clone()),
        })
    }

    /// Phase two (failure): drop the optimistic user turn and keep the error
    pub fn rollback(&self, pending: PendingSend, error: &StudioError) {
        let mut state = self.state();
        warn!("Chat turn failed: {}", error);
        state.transcript.truncate(pending.rollback_len);
        state.error = Some(error.user_message());
    }

    /// Post the "mockup ready" notice and release the artifact
    pub fn announce(&self, ready: ReadyArtifact) -> ArtifactHandoff {
        let mut state = self.state();
        state
            .transcript
            .push(ChatTurn::system(READY_NOTICE).with_artifact(ready.conversation_id.clone()));
        ArtifactHandoff::new(ready.mockup, ready.conversation_id)
    }

    /// Start over: forget the id, the error, and the transcript.
    ///
    /// Callers must not reset while a send is outstanding.
    pub fn reset_conversation(&self) {
        let mut state = self.state();
        state.conversation_id = None;
        state.error = None;
        state.transcript = vec![ChatTurn::assistant(self.welcome.clone())];
        info!("Conversation reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ClientError;
    use crate::model::Role;
    use crate::testing::{chat_reply, mockup, Call, ScriptedBackend};

    fn controller(backend: &Arc<ScriptedBackend>) -> ConversationController<ScriptedBackend> {
        let config = ChatConfig {
            ready_delay_ms: 0,
            welcome_message: "Hi...".to_string(),
        };
        ConversationController::new(Arc::clone(backend), &config)
    }

    #[tokio::test]
    async fn test_first_turn_stores_id() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.on_chat(Ok(chat_reply("c1", "What features?")));
        let chat = controller(&backend);

        let outcome = chat.send_turn("a todo app").await.unwrap();

        assert_eq!(outcome, SendOutcome::Replied);
        assert_eq!(chat.conversation_id().as_deref(), Some("c1"));
        assert_eq!(
            chat.transcript(),
            vec![
                ChatTurn::assistant("Hi..."),
                ChatTurn::user("a todo app"),
                ChatTurn::assistant("What features?"),
            ]
        );
        assert_eq!(
            backend.calls(),
            vec![Call::Chat {
                conversation_id: None,
                message: "a todo app".into()
            }]
        );
    }

    #[tokio::test]
    async fn test_id_reused_on_next_send() {
        let backend = Arc::new(ScriptedBackend::new());
        backend
            .on_chat(Ok(chat_reply("c1", "What features?")))
            .on_chat(Ok(chat_reply("c2", "Any colors?")));
        let chat = controller(&backend);

        chat.send_turn("a todo app").await.unwrap();
        chat.send_turn("tags and due dates").await.unwrap();

        let calls = backend.calls();
        assert_eq!(
            calls[1],
            Call::Chat {
                conversation_id: Some("c1".into()),
                message: "tags and due dates".into()
            }
        );
        assert_eq!(chat.conversation_id().as_deref(), Some("c1"));
    }

    #[tokio::test]
    async fn test_failed_send_rolls_back() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.on_chat(Err(ClientError::Api {
            status: 500,
            message: "model overloaded".into(),
        }));
        let chat = controller(&backend);
        let before = chat.transcript().len();

        let err = chat.send_turn("a todo app").await.unwrap_err();

        assert!(matches!(err, StudioError::Client(_)));
        assert_eq!(chat.transcript().len(), before);
        assert_eq!(chat.error().as_deref(), Some("model overloaded"));
        assert!(!chat.is_sending());
        assert_eq!(chat.conversation_id(), None);
    }

    #[tokio::test]
    async fn test_rejected_reply_rolls_back() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.on_chat(Err(ClientError::Rejected("conversation expired".into())));
        let chat = controller(&backend);

        assert!(chat.send_turn("hello").await.is_err());
        assert_eq!(chat.transcript().len(), 1);
        assert_eq!(chat.error().as_deref(), Some("conversation expired"));
    }

    #[test]
    fn test_rollback_without_transport() {
        let backend = Arc::new(ScriptedBackend::new());
        let chat = controller(&backend);

        let pending = chat.begin_send("  a todo app ").unwrap();
        assert_eq!(pending.request().message, "a todo app");
        assert_eq!(chat.transcript().len(), 2);
        assert!(chat.is_sending());

        chat.rollback(pending, &StudioError::Client(ClientError::Unavailable));

        assert_eq!(chat.transcript().len(), 1);
        assert!(!chat.is_sending());
        assert!(chat.error().is_some());
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_empty_message_rejected() {
        let backend = Arc::new(ScriptedBackend::new());
        let chat = controller(&backend);

        assert!(matches!(chat.begin_send("   "), Err(StudioError::Validation(_))));
        assert_eq!(chat.transcript().len(), 1);
    }

    #[test]
    fn test_second_send_while_pending_is_busy() {
        let backend = Arc::new(ScriptedBackend::new());
        let chat = controller(&backend);

        let pending = chat.begin_send("first").unwrap();
        assert!(matches!(
            chat.begin_send("second"),
            Err(StudioError::Busy(Operation::SendMessage))
        ));
        let _ = chat.commit(pending, chat_reply("c1", "ok"));
        assert!(chat.begin_send("third").is_ok());
    }

    #[tokio::test]
    async fn test_ready_reply_hands_off_artifact() {
        let backend = Arc::new(ScriptedBackend::new());
        let mut reply = chat_reply(
            "c1",
            "<READY_TO_GENERATE>A todo app with tags</READY_TO_GENERATE>",
        );
        reply.ready_to_generate = true;
        reply.mockup = Some(mockup("m1", ""));
        reply.html_content = Some("<html>todo</html>".into());
        backend.on_chat(Ok(reply));
        let chat = controller(&backend);

        let outcome = chat.send_turn("that's everything").await.unwrap();

        let SendOutcome::ArtifactReady(handoff) = outcome else {
            panic!("expected a handoff");
        };
        assert_eq!(handoff.mockup().html_content, "<html>todo</html>");
        assert_eq!(handoff.conversation_id(), Some("c1"));

        let transcript = chat.transcript();
        assert_eq!(transcript.len(), 4);
        assert_eq!(transcript[2].display_text(), "A todo app with tags");
        assert_eq!(transcript[3].role, Role::System);
        assert!(transcript[3].artifact_ready);
        assert_eq!(transcript[3].conversation_id.as_deref(), Some("c1"));
    }

    #[tokio::test]
    async fn test_ready_flag_without_mockup_stays_in_chat() {
        let backend = Arc::new(ScriptedBackend::new());
        let mut reply = chat_reply("c1", "Generating soon");
        reply.ready_to_generate = true;
        backend.on_chat(Ok(reply));
        let chat = controller(&backend);

        assert_eq!(chat.send_turn("go").await.unwrap(), SendOutcome::Replied);
        assert_eq!(chat.transcript().len(), 3);
    }

    #[tokio::test]
    async fn test_marker_text_alone_is_not_ready() {
        let backend = Arc::new(ScriptedBackend::new());
        let mut reply = chat_reply("c1", "<READY_TO_GENERATE>done</READY_TO_GENERATE>");
        reply.mockup = Some(mockup("m1", "<html></html>"));
        backend.on_chat(Ok(reply));
        let chat = controller(&backend);

        assert_eq!(chat.send_turn("go").await.unwrap(), SendOutcome::Replied);
    }

    #[tokio::test]
    async fn test_reset_clears_everything() {
        let backend = Arc::new(ScriptedBackend::new());
        backend
            .on_chat(Ok(chat_reply("c1", "What features?")))
            .on_chat(Ok(chat_reply("c9", "Hello again")));
        let chat = controller(&backend);
        chat.send_turn("a todo app").await.unwrap();

        chat.reset_conversation();

        assert_eq!(chat.conversation_id(), None);
        assert_eq!(chat.transcript(), vec![ChatTurn::assistant("Hi...")]);

        chat.send_turn("a weather app").await.unwrap();
        assert_eq!(
            backend.calls()[1],
            Call::Chat {
                conversation_id: None,
                message: "a weather app".into()
            }
        );
        assert_eq!(chat.conversation_id().as_deref(), Some("c9"));
    }
}
