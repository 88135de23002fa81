//! Integration tests for the plan-generation pipeline.
//!
//! Each test spins up an Axum server on a random port with stub model and
//! mail collaborators, and exercises the real HTTP contract end to end.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use fitplan::error::{DispatchError, ModelError};
use fitplan::generator::PlanGenerator;
use fitplan::llm::{CompletionRequest, CompletionResponse, PlanModel};
use fitplan::mailer::{EmailMessage, MailTransport, PlanDispatcher};
use fitplan::routes::{AppState, plan_routes};

/// Stub model — counts calls, returns a canned plan or fails.
struct StubModel {
    calls: Arc<AtomicUsize>,
    fail: bool,
}

#[async_trait]
impl PlanModel for StubModel {
    fn model_name(&self) -> &str {
        "stub"
    }

    async fn complete(
        &self,
        _request: CompletionRequest,
    ) -> Result<CompletionResponse, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ModelError::RequestFailed("stub model failure".to_string()));
        }
        Ok(CompletionResponse {
            content: "Day 1: squats, 4x8, 90s rest. Breakfast: 600 kcal.".to_string(),
        })
    }
}

/// Stub mail transport — records sends, optionally fails.
struct StubMailer {
    sends: Arc<AtomicUsize>,
    last: Arc<Mutex<Option<EmailMessage>>>,
    fail: bool,
}

#[async_trait]
impl MailTransport for StubMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), DispatchError> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(DispatchError::Transport("stub SMTP failure".to_string()));
        }
        *self.last.lock().await = Some(message.clone());
        Ok(())
    }
}

struct TestServer {
    base_url: String,
    model_calls: Arc<AtomicUsize>,
    mail_sends: Arc<AtomicUsize>,
    last_email: Arc<Mutex<Option<EmailMessage>>>,
}

/// Start a server on a random port with the given stub behavior.
async fn start_server(model_fails: bool, mail_fails: bool) -> TestServer {
    let model_calls = Arc::new(AtomicUsize::new(0));
    let mail_sends = Arc::new(AtomicUsize::new(0));
    let last_email = Arc::new(Mutex::new(None));

    let model: Arc<dyn PlanModel> = Arc::new(StubModel {
        calls: Arc::clone(&model_calls),
        fail: model_fails,
    });
    let mailer: Arc<dyn MailTransport> = Arc::new(StubMailer {
        sends: Arc::clone(&mail_sends),
        last: Arc::clone(&last_email),
        fail: mail_fails,
    });

    let state = AppState {
        generator: Arc::new(PlanGenerator::new(model)),
        dispatcher: Arc::new(PlanDispatcher::new("coach@fitplan.test".to_string(), mailer)),
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, plan_routes(state)).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestServer {
        base_url: format!("http://127.0.0.1:{port}"),
        model_calls,
        mail_sends,
        last_email,
    }
}

fn valid_payload() -> Value {
    json!({
        "email": "alice@example.com",
        "fitness_goal": "muscle gain",
        "training_location": "gym",
        "weight": 75,
        "fitness_level": "intermediate",
        "diet_level": "balanced",
        "height": 180,
        "age": 29,
        "sleep_hours": 7,
        "training_frequency": 4,
    })
}

async fn post_plan(server: &TestServer, payload: &Value) -> (u16, Value) {
    let response = reqwest::Client::new()
        .post(format!("{}/generate_plan", server.base_url))
        .json(payload)
        .send()
        .await
        .unwrap();
    let status = response.status().as_u16();
    let body: Value = response.json().await.unwrap();
    (status, body)
}

#[tokio::test]
async fn home_route_reports_running() {
    let server = start_server(false, false).await;
    let response = reqwest::get(format!("{}/", server.base_url)).await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "The API is running!");
}

#[tokio::test]
async fn missing_field_yields_400_naming_the_field() {
    let server = start_server(false, false).await;

    for field in [
        "email",
        "fitness_goal",
        "training_location",
        "weight",
        "fitness_level",
        "diet_level",
        "height",
        "age",
        "sleep_hours",
        "training_frequency",
    ] {
        let mut payload = valid_payload();
        payload.as_object_mut().unwrap().remove(field);

        let (status, body) = post_plan(&server, &payload).await;
        assert_eq!(status, 400);
        assert_eq!(body["error"], format!("{field} is required"));
    }

    // No external call happens for rejected payloads.
    assert_eq!(server.model_calls.load(Ordering::SeqCst), 0);
    assert_eq!(server.mail_sends.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn falsy_field_yields_400() {
    let server = start_server(false, false).await;

    let mut payload = valid_payload();
    payload["weight"] = json!(0);
    let (status, body) = post_plan(&server, &payload).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "weight is required");
}

#[tokio::test]
async fn optional_fields_are_not_required() {
    let server = start_server(false, false).await;

    // No equipment / additional_info anywhere in the payload.
    let (status, body) = post_plan(&server, &valid_payload()).await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Plan generated and sent successfully!");
}

#[tokio::test]
async fn generation_failure_yields_500_and_no_email() {
    let server = start_server(true, false).await;

    let (status, body) = post_plan(&server, &valid_payload()).await;
    assert_eq!(status, 500);
    assert_eq!(body, json!({"error": "Failed to generate fitness plan"}));

    assert_eq!(server.model_calls.load(Ordering::SeqCst), 1);
    // The mail collaborator is never invoked on generation failure.
    assert_eq!(server.mail_sends.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn dispatch_failure_yields_500_after_generation() {
    let server = start_server(false, true).await;

    let (status, body) = post_plan(&server, &valid_payload()).await;
    assert_eq!(status, 500);
    assert_eq!(body, json!({"error": "Failed to send email"}));

    assert_eq!(server.model_calls.load(Ordering::SeqCst), 1);
    assert_eq!(server.mail_sends.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn success_sends_exactly_one_email_with_the_plan() {
    let server = start_server(false, false).await;

    let (status, body) = post_plan(&server, &valid_payload()).await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"message": "Plan generated and sent successfully!"}));

    assert_eq!(server.model_calls.load(Ordering::SeqCst), 1);
    assert_eq!(server.mail_sends.load(Ordering::SeqCst), 1);

    let email = server.last_email.lock().await.clone().unwrap();
    assert_eq!(email.from, "coach@fitplan.test");
    assert_eq!(email.to, "alice@example.com");
    assert_eq!(email.subject, "Your Personalized AI Fitness Plan");
    assert!(email.body.contains("Day 1"));
}

#[tokio::test]
async fn repeated_requests_are_not_deduplicated() {
    // Current behavior, asserted on purpose: the same valid request twice
    // causes two independent generations and two sends.
    let server = start_server(false, false).await;

    let (first, _) = post_plan(&server, &valid_payload()).await;
    let (second, _) = post_plan(&server, &valid_payload()).await;
    assert_eq!(first, 200);
    assert_eq!(second, 200);

    assert_eq!(server.model_calls.load(Ordering::SeqCst), 2);
    assert_eq!(server.mail_sends.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn malformed_body_resolves_to_400_not_a_crash() {
    let server = start_server(false, false).await;

    let response = reqwest::Client::new()
        .post(format!("{}/generate_plan", server.base_url))
        .header("content-type", "application/json")
        .body("this is not json {{{")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "email is required");

    // The server is still alive afterwards.
    let (status, _) = post_plan(&server, &valid_payload()).await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn non_object_json_body_resolves_to_400() {
    let server = start_server(false, false).await;
    let (status, body) = post_plan(&server, &json!(["not", "an", "object"])).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "email is required");
}
