//! HTTP surface — welcome route and the plan-generation orchestrator.
//!
//! The orchestrator sequences validate → generate → dispatch, each a hard
//! gate: a failure short-circuits the remaining stages and maps to a fixed
//! response. No compensation, no retry, no shared state across requests.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tracing::{error, info};

use crate::generator::PlanGenerator;
use crate::mailer::PlanDispatcher;
use crate::profile::Profile;

/// Shared state for the plan routes.
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<PlanGenerator>,
    pub dispatcher: Arc<PlanDispatcher>,
}

/// GET /
async fn home() -> impl IntoResponse {
    Json(json!({"message": "The API is running!"}))
}

/// POST /generate_plan
///
/// Underlying generation and dispatch causes are logged, never returned to
/// the caller; the caller sees only the fixed response table.
async fn generate_plan(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    // A malformed or absent body validates like an empty payload and lands
    // on the same deterministic 400 as any other incomplete submission.
    let payload: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    let profile = match Profile::validate(&payload) {
        Ok(profile) => profile,
        Err(e) => {
            info!(field = %e.field, "Rejected plan request");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": e.to_string()})),
            );
        }
    };

    let plan = match state.generator.generate(&profile).await {
        Ok(plan) => plan,
        Err(e) => {
            error!(error = %e, "Plan generation failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to generate fitness plan"})),
            );
        }
    };

    if let Err(e) = state.dispatcher.dispatch(&plan, &profile.email).await {
        error!(error = %e, "Plan email dispatch failed");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Failed to send email"})),
        );
    }

    (
        StatusCode::OK,
        Json(json!({"message": "Plan generated and sent successfully!"})),
    )
}

/// Build the core plan routes.
pub fn plan_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/generate_plan", post(generate_plan))
        .with_state(state)
}
