//! Scripted backend for controller tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::api::dto::*;
use crate::api::{ClientError, ClientResult, MockupBackend};
use crate::model::{FeedbackItem, Mockup, MockupSummary, SimulatedFeedback, TrackerTicket};

/// A request the controller issued
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Health,
    Generate { prompt: String, project_name: String },
    Chat { conversation_id: Option<String>, message: String },
    ListMockups,
    GetMockup(String),
    Update { id: String, html: String },
    GetFeedback(String),
    AddFeedback { id: String, feedback: String, author: String },
    EditHtml { html: String, instruction: String },
    Refine { original_html: String, feedback: Vec<String> },
    Simulate(String),
    Submit(String),
    TrackerTest,
    TrackerTickets,
}

/// Answers each call from a per-operation queue; an empty queue means
/// the backend is unreachable.
#[derive(Default)]
pub struct ScriptedBackend {
    calls: Mutex<Vec<Call>>,
    generate: Mutex<VecDeque<ClientResult<GenerateMockupResponse>>>,
    chat: Mutex<VecDeque<ClientResult<ChatResponse>>>,
    list: Mutex<VecDeque<ClientResult<Vec<MockupSummary>>>>,
    mockup: Mutex<VecDeque<ClientResult<Mockup>>>,
    update: Mutex<VecDeque<ClientResult<()>>>,
    feedback: Mutex<VecDeque<ClientResult<Vec<FeedbackItem>>>>,
    add_feedback: Mutex<VecDeque<ClientResult<()>>>,
    edit: Mutex<VecDeque<ClientResult<String>>>,
    refine: Mutex<VecDeque<ClientResult<RefineMockupResponse>>>,
    simulate: Mutex<VecDeque<ClientResult<Vec<SimulatedFeedback>>>>,
    submit: Mutex<VecDeque<ClientResult<SubmitResponse>>>,
    tracker_test: Mutex<VecDeque<ClientResult<bool>>>,
    tracker_tickets: Mutex<VecDeque<ClientResult<Vec<TrackerTicket>>>>,
    edit_gate: Mutex<Option<Arc<Notify>>>,
    tracker_gate: Mutex<Option<Arc<Notify>>>,
}

fn push<T>(queue: &Mutex<VecDeque<T>>, value: T) {
    queue.lock().unwrap().push_back(value);
}

fn gate(slot: &Mutex<Option<Arc<Notify>>>) -> Arc<Notify> {
    let notify = Arc::new(Notify::new());
    *slot.lock().unwrap() = Some(Arc::clone(&notify));
    notify
}

async fn wait(slot: &Mutex<Option<Arc<Notify>>>) {
    let notify = slot.lock().unwrap().clone();
    if let Some(notify) = notify {
        notify.notified().await;
    }
}

fn pop<T>(queue: &Mutex<VecDeque<ClientResult<T>>>) -> ClientResult<T> {
    queue
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or(Err(ClientError::Unavailable))
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    /// Park every `edit_html` call until the returned handle is notified
    pub fn hold_edit(&self) -> Arc<Notify> {
        gate(&self.edit_gate)
    }

    /// Park every `tracker_connected` call until the returned handle is notified
    pub fn hold_tracker_test(&self) -> Arc<Notify> {
        gate(&self.tracker_gate)
    }

    pub fn on_generate(&self, r: ClientResult<GenerateMockupResponse>) -> &Self {
        push(&self.generate, r);
        self
    }

    pub fn on_chat(&self, r: ClientResult<ChatResponse>) -> &Self {
        push(&self.chat, r);
        self
    }

    pub fn on_list(&self, r: ClientResult<Vec<MockupSummary>>) -> &Self {
        push(&self.list, r);
        self
    }

    pub fn on_get_mockup(&self, r: ClientResult<Mockup>) -> &Self {
        push(&self.mockup, r);
        self
    }

    pub fn on_update(&self, r: ClientResult<()>) -> &Self {
        push(&self.update, r);
        self
    }

    pub fn on_feedback(&self, r: ClientResult<Vec<FeedbackItem>>) -> &Self {
        push(&self.feedback, r);
        self
    }

    pub fn on_add_feedback(&self, r: ClientResult<()>) -> &Self {
        push(&self.add_feedback, r);
        self
    }

    pub fn on_edit(&self, r: ClientResult<String>) -> &Self {
        push(&self.edit, r);
        self
    }

    pub fn on_refine(&self, r: ClientResult<RefineMockupResponse>) -> &Self {
        push(&self.refine, r);
        self
    }

    pub fn on_simulate(&self, r: ClientResult<Vec<SimulatedFeedback>>) -> &Self {
        push(&self.simulate, r);
        self
    }

    pub fn on_submit(&self, r: ClientResult<SubmitResponse>) -> &Self {
        push(&self.submit, r);
        self
    }

    pub fn on_tracker_test(&self, r: ClientResult<bool>) -> &Self {
        push(&self.tracker_test, r);
        self
    }

    pub fn on_tracker_tickets(&self, r: ClientResult<Vec<TrackerTicket>>) -> &Self {
        push(&self.tracker_tickets, r);
        self
    }
}

#[async_trait]
impl MockupBackend for ScriptedBackend {
    async fn health(&self) -> ClientResult<()> {
        self.record(Call::Health);
        Ok(())
    }

    async fn generate_mockup(&self, request: &GenerateMockupRequest) -> ClientResult<GenerateMockupResponse> {
        self.record(Call::Generate {
            prompt: request.prompt.clone(),
            project_name: request.project_name.clone(),
        });
        pop(&self.generate)
    }

    async fn chat(&self, request: &ChatRequest) -> ClientResult<ChatResponse> {
        self.record(Call::Chat {
            conversation_id: request.conversation_id.clone(),
            message: request.message.clone(),
        });
        pop(&self.chat)
    }

    async fn list_mockups(&self) -> ClientResult<Vec<MockupSummary>> {
        self.record(Call::ListMockups);
        pop(&self.list)
    }

    async fn get_mockup(&self, id: &str) -> ClientResult<Mockup> {
        self.record(Call::GetMockup(id.to_string()));
        pop(&self.mockup)
    }

    async fn update_mockup(&self, id: &str, html_content: &str) -> ClientResult<()> {
        self.record(Call::Update {
            id: id.to_string(),
            html: html_content.to_string(),
        });
        pop(&self.update)
    }

    async fn get_feedback(&self, id: &str) -> ClientResult<Vec<FeedbackItem>> {
        self.record(Call::GetFeedback(id.to_string()));
        pop(&self.feedback)
    }

    async fn add_feedback(&self, id: &str, request: &AddFeedbackRequest) -> ClientResult<()> {
        self.record(Call::AddFeedback {
            id: id.to_string(),
            feedback: request.feedback.clone(),
            author: request.author.clone(),
        });
        pop(&self.add_feedback)
    }

    async fn edit_html(&self, request: &EditHtmlRequest) -> ClientResult<String> {
        self.record(Call::EditHtml {
            html: request.html_content.clone(),
            instruction: request.instruction.clone(),
        });
        wait(&self.edit_gate).await;
        pop(&self.edit)
    }

    async fn refine_mockup(&self, request: &RefineMockupRequest) -> ClientResult<RefineMockupResponse> {
        self.record(Call::Refine {
            original_html: request.original_html.clone(),
            feedback: request.feedback.clone(),
        });
        pop(&self.refine)
    }

    async fn simulate_feedback(&self, html_content: &str) -> ClientResult<Vec<SimulatedFeedback>> {
        self.record(Call::Simulate(html_content.to_string()));
        pop(&self.simulate)
    }

    async fn submit_mockup(&self, id: &str) -> ClientResult<SubmitResponse> {
        self.record(Call::Submit(id.to_string()));
        pop(&self.submit)
    }

    async fn tracker_connected(&self) -> ClientResult<bool> {
        self.record(Call::TrackerTest);
        wait(&self.tracker_gate).await;
        pop(&self.tracker_test)
    }

    async fn tracker_tickets(&self) -> ClientResult<Vec<TrackerTicket>> {
        self.record(Call::TrackerTickets);
        pop(&self.tracker_tickets)
    }
}

/// A mockup with the given id and HTML
pub fn mockup(id: &str, html: &str) -> Mockup {
    Mockup {
        id: id.to_string(),
        project_name: "Todo App".to_string(),
        prompt: "a todo app".to_string(),
        html_content: html.to_string(),
        created_at: "2025-11-08T10:15:00".to_string(),
        html_filename: None,
        screenshot_filename: None,
        feedback: Vec::new(),
    }
}

pub fn chat_reply(conversation_id: &str, message: &str) -> ChatResponse {
    ChatResponse {
        success: true,
        conversation_id: Some(conversation_id.to_string()),
        message: message.to_string(),
        ready_to_generate: false,
        mockup: None,
        html_content: None,
        error: None,
    }
}
