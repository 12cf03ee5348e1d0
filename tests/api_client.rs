use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use mockup_studio::api::dto::{ChatRequest, GenerateMockupRequest};
use mockup_studio::{
    ApiClient, ClientError, Endpoints, MockupBackend, StatusCategory, TicketSubmission, GENERIC_FAILURE,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

#[derive(Clone, Default)]
struct StubState {
    chat_bodies: Arc<Mutex<Vec<Value>>>,
    updates: Arc<Mutex<Vec<(String, Value)>>>,
    submit_bodies: Arc<Mutex<Vec<String>>>,
}

async fn chat(State(state): State<StubState>, Json(body): Json<Value>) -> Json<Value> {
    let first = body["conversation_id"].is_null();
    state.chat_bodies.lock().expect("chat lock").push(body);
    if first {
        Json(json!({
            "success": true,
            "conversation_id": "c1",
            "message": "What should it do?",
            "ready_to_generate": false,
        }))
    } else {
        Json(json!({
            "success": true,
            "conversation_id": "c1",
            "message": "<READY_TO_GENERATE>Done</READY_TO_GENERATE>",
            "ready_to_generate": true,
            "mockup": {
                "id": "m1",
                "project_name": "Todo App",
                "prompt": "a todo app",
                "html_content": "<h1>Todo</h1>",
                "created_at": "2024-05-01T10:00:00",
            },
        }))
    }
}

async fn generate(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["prompt"].as_str().unwrap_or_default().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "error": "Prompt is required"})),
        );
    }
    (StatusCode::OK, Json(json!({"success": false, "error": "Model overloaded"})))
}

async fn update(
    State(state): State<StubState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.updates.lock().expect("updates lock").push((id, body));
    Json(json!({"success": true}))
}

async fn submit(State(state): State<StubState>, Path(id): Path<String>, body: String) -> Json<Value> {
    state.submit_bodies.lock().expect("submit lock").push(body);
    match id.as_str() {
        "none-created" => {
            return Json(json!({
                "success": false,
                "error": "No tickets could be created",
                "tickets_created": 0,
                "tickets_failed": 2,
                "tickets": [
                    {"title": "Header", "success": false, "error": "project not found"},
                    {"title": "Footer", "success": false, "error": "project not found"},
                ],
            }))
        }
        "no-tickets" => {
            return Json(json!({"success": false, "error": "Mockup has no components"}))
        }
        _ => {}
    }
    Json(json!({
        "success": true,
        "tickets_created": 1,
        "tickets_failed": 1,
        "tickets": [
            {"title": format!("{} header", id), "success": true, "issue_key": "KAN-1"},
            {"title": "Footer", "success": false, "error": "field required"},
        ],
    }))
}

async fn tracker_test() -> Json<Value> {
    Json(json!({"success": true, "connected": true}))
}

async fn tracker_tickets() -> Json<Value> {
    Json(json!({
        "success": true,
        "tickets": [
            {"key": "KAN-1", "summary": "Header", "status": "To Do", "statusCategory": "new"},
            {"key": "KAN-2", "summary": "Footer", "status": "Done", "statusCategory": "done"},
            {"key": "KAN-3", "summary": "Nav", "status": "Blocked", "statusCategory": "blocked"},
        ],
    }))
}

async fn broken_list() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "<html><body>upstream exploded</body></html>")
}

async fn bad_gateway() -> StatusCode {
    StatusCode::BAD_GATEWAY
}

async fn spawn_stub() -> (ApiClient, StubState, oneshot::Sender<()>) {
    let state = StubState::default();
    let app = Router::new()
        .route("/api/chat", post(chat))
        .route("/api/generate-mockup", post(generate))
        .route("/api/health", get(bad_gateway))
        .route("/api/mockups", get(broken_list))
        .route("/api/mockups/:id/update", put(update))
        .route("/api/mockups/:id/submit", post(submit))
        .route("/api/jira/test", get(tracker_test))
        .route("/api/jira/tickets", get(tracker_tickets))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub listener");
    let address: SocketAddr = listener.local_addr().expect("stub local addr");
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .expect("run stub server");
    });

    let client = ApiClient::new(
        Endpoints::new(&format!("http://{address}")),
        Duration::from_secs(5),
    )
    .expect("build client");
    (client, state, shutdown_tx)
}

#[tokio::test]
async fn test_first_chat_sends_null_conversation_id() {
    let (client, state, _shutdown) = spawn_stub().await;

    let first = client
        .chat(&ChatRequest {
            conversation_id: None,
            message: "a todo app".into(),
        })
        .await
        .unwrap();
    assert_eq!(first.conversation_id.as_deref(), Some("c1"));
    assert!(!first.ready_to_generate);

    let second = client
        .chat(&ChatRequest {
            conversation_id: Some("c1".into()),
            message: "just a list".into(),
        })
        .await
        .unwrap();
    assert!(second.ready_to_generate);
    assert_eq!(second.mockup.unwrap().html_content, "<h1>Todo</h1>");

    let bodies = state.chat_bodies.lock().unwrap();
    assert_eq!(bodies[0], json!({"conversation_id": null, "message": "a todo app"}));
    assert_eq!(bodies[1]["conversation_id"], "c1");
}

#[tokio::test]
async fn test_error_body_maps_to_api_error() {
    let (client, _state, _shutdown) = spawn_stub().await;

    let err = client
        .generate_mockup(&GenerateMockupRequest {
            prompt: String::new(),
            project_name: "Todo".into(),
        })
        .await
        .unwrap_err();

    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Prompt is required");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_non_json_error_body_is_not_shown() {
    let (client, _state, _shutdown) = spawn_stub().await;

    let err = client.list_mockups().await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Api { status: 500, ref message } if message == GENERIC_FAILURE
    ));
    assert_eq!(err.user_message(), GENERIC_FAILURE);

    let err = client.health().await.unwrap_err();
    assert!(matches!(err, ClientError::Api { status: 502, .. }));
    assert_eq!(err.user_message(), GENERIC_FAILURE);
}

#[tokio::test]
async fn test_success_false_maps_to_rejected() {
    let (client, _state, _shutdown) = spawn_stub().await;

    let err = client
        .generate_mockup(&GenerateMockupRequest {
            prompt: "a todo app".into(),
            project_name: "Todo".into(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Rejected(ref m) if m == "Model overloaded"));
    assert_eq!(err.user_message(), "Model overloaded");
}

#[tokio::test]
async fn test_update_uses_put_with_html_body() {
    let (client, state, _shutdown) = spawn_stub().await;

    client.update_mockup("m1", "<p>blue</p>").await.unwrap();

    let updates = state.updates.lock().unwrap();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].0, "m1");
    assert_eq!(updates[0].1, json!({"html_content": "<p>blue</p>"}));
}

#[tokio::test]
async fn test_submit_posts_without_body() {
    let (client, state, _shutdown) = spawn_stub().await;

    let response = client.submit_mockup("m1").await.unwrap();
    assert_eq!(response.tickets_created, 1);
    assert_eq!(response.tickets_failed, 1);
    assert_eq!(response.tickets[0].title, "m1 header");
    assert_eq!(response.tickets[1].error.as_deref(), Some("field required"));

    assert_eq!(*state.submit_bodies.lock().unwrap(), vec![String::new()]);
}

#[tokio::test]
async fn test_submit_with_no_ticket_created_keeps_outcomes() {
    let (client, _state, _shutdown) = spawn_stub().await;

    let response = client.submit_mockup("none-created").await.unwrap();
    assert!(!response.success);
    assert_eq!(response.tickets.len(), 2);

    let report = TicketSubmission::new(Arc::new(client))
        .submit("none-created")
        .await
        .unwrap();
    assert_eq!(report.created().len(), 0);
    assert_eq!(report.failed().len(), 2);
    assert_eq!(report.failed()[1].title(), "Footer");
}

#[tokio::test]
async fn test_submit_failure_without_tickets_is_rejected() {
    let (client, _state, _shutdown) = spawn_stub().await;

    let err = client.submit_mockup("no-tickets").await.unwrap_err();
    assert!(matches!(err, ClientError::Rejected(ref m) if m == "Mockup has no components"));
}

#[tokio::test]
async fn test_tracker_connection_and_tickets() {
    let (client, _state, _shutdown) = spawn_stub().await;

    assert!(client.tracker_connected().await.unwrap());

    let tickets = client.tracker_tickets().await.unwrap();
    assert_eq!(tickets.len(), 3);
    assert_eq!(tickets[0].status_category, StatusCategory::New);
    assert_eq!(tickets[1].status_category, StatusCategory::Done);
    // Unknown categories count as new
    assert_eq!(tickets[2].status_category, StatusCategory::New);
}

#[tokio::test]
async fn test_unreachable_backend_is_unavailable() {
    // Bind then drop so nothing listens on the port
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let client = ApiClient::new(
        Endpoints::new(&format!("http://{address}")),
        Duration::from_secs(5),
    )
    .unwrap();

    let err = client.health().await.unwrap_err();
    assert!(matches!(err, ClientError::Unavailable));
}
