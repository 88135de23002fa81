//! Stateless passthrough endpoints — one external call each, no business
//! logic. These sit outside the plan pipeline and share none of its state.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::error;

use crate::llm::{ChatMessage, CompletionRequest, PlanModel};

/// Shared state for the passthrough routes.
#[derive(Clone)]
pub struct ProxyState {
    pub model: Arc<dyn PlanModel>,
    pub http: reqwest::Client,
    pub store_api_url: String,
}

#[derive(Debug, Default, Deserialize)]
struct ChatPayload {
    #[serde(default)]
    message: String,
}

/// POST /chat — forward a single user turn to the model.
async fn chat(State(state): State<ProxyState>, body: Bytes) -> impl IntoResponse {
    let payload: ChatPayload = serde_json::from_slice(&body).unwrap_or_default();
    if payload.message.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "message is required"})),
        );
    }

    let request = CompletionRequest::new(vec![ChatMessage::user(payload.message)]);
    match state.model.complete(request).await {
        Ok(response) => (StatusCode::OK, Json(json!({"reply": response.content}))),
        Err(e) => {
            error!(error = %e, "Chat passthrough failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to generate reply"})),
            )
        }
    }
}

/// GET /store_products — relay the catalog listing from the upstream store API.
async fn store_products(State(state): State<ProxyState>) -> impl IntoResponse {
    let result = async {
        let response = state.http.get(&state.store_api_url).send().await?;
        response.error_for_status()?.json::<Value>().await
    }
    .await;

    match result {
        Ok(products) => (StatusCode::OK, Json(products)),
        Err(e) => {
            error!(error = %e, "Store catalog fetch failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({"error": "Failed to fetch store products"})),
            )
        }
    }
}

/// Build the passthrough routes.
pub fn proxy_routes(state: ProxyState) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/store_products", get(store_products))
        .with_state(state)
}
