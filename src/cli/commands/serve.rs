//! HTTP API server for integration with other systems.
//!
//! Exposes the research pipeline as a single form-style endpoint.

use super::prepare_researcher;
use crate::cli::Output;
use crate::config::Settings;
use crate::research::Researcher;
use crate::response::{ParseError, ResearchResponse};
use crate::SleuthError;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

/// Shared application state.
struct AppState {
    researcher: Arc<Researcher>,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let researcher = prepare_researcher(None, settings).await?;
    let app = router(Arc::new(AppState { researcher }));

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Sleuth API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Research", "POST /research");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/research", post(research))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct ResearchRequest {
    query: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<ParseError>,
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn research(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ResearchRequest>, JsonRejection>,
) -> Response {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            return error_response(SleuthError::InvalidInput(rejection.body_text()))
        }
    };

    match state.researcher.research(&req.query).await {
        Ok(response) => Json::<ResearchResponse>(response).into_response(),
        Err(e) => error_response(e),
    }
}

fn error_response(e: SleuthError) -> Response {
    let status = status_for(&e);
    if status.is_server_error() {
        error!("Research request failed: {}", e);
    }

    let body = ErrorResponse {
        error: e.to_string(),
        retryable: e.is_retryable(),
        details: e.parse_error().cloned(),
    };
    (status, Json(body)).into_response()
}

fn status_for(e: &SleuthError) -> StatusCode {
    match e {
        SleuthError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        SleuthError::SchemaValidation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        SleuthError::AgentExecution(_)
        | SleuthError::ToolLoopExceeded(_)
        | SleuthError::OpenAI(_)
        | SleuthError::Http(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::ModelReply;
    use crate::testing::{offline_settings, serve_router, tool_call, ScriptedModel};

    fn state(replies: Vec<crate::Result<ModelReply>>) -> Arc<AppState> {
        let model = Arc::new(ScriptedModel::new(replies));
        let researcher = Researcher::with_model(&offline_settings(), model).unwrap();
        Arc::new(AppState {
            researcher: Arc::new(researcher),
        })
    }

    async fn call(state: Arc<AppState>, query: &str) -> (StatusCode, serde_json::Value) {
        let response = research(
            State(state),
            Ok(Json(ResearchRequest {
                query: query.to_string(),
            })),
        )
        .await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_research_ok() {
        let state = state(vec![
            Ok(tool_call("call_1", "search", r#"{"query": "rust"}"#)),
            Ok(ModelReply::Final(
                r#"{"topic":"Rust","summary":"A language.","sources":["https://www.rust-lang.org"],"tools_used":["search"]}"#
                    .to_string(),
            )),
        ]);

        let (status, body) = call(state, "What is Rust?").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["topic"], "Rust");
        assert_eq!(body["tools_used"][0], "search");
    }

    #[tokio::test]
    async fn test_research_blank_query() {
        let (status, body) = call(state(Vec::new()), "  ").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["retryable"], false);
    }

    #[tokio::test]
    async fn test_research_malformed_body_is_bad_request() {
        let state = state(Vec::new());
        let base = serve_router(router(state)).await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{}/research", base))
            .json(&serde_json::json!({ "question": "x" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains("query"));
        assert_eq!(body["retryable"], false);
        assert!(body.get("details").is_none());

        let response = client
            .post(format!("{}/research", base))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body("{not json")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_research_schema_failure_returns_raw_output() {
        let state = state(vec![Ok(ModelReply::Final(
            "I could not find anything useful.".to_string(),
        ))]);

        let (status, body) = call(state, "obscure topic").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["retryable"], true);
        assert_eq!(
            body["details"]["raw_output"]["output"],
            "I could not find anything useful."
        );
    }

    #[tokio::test]
    async fn test_research_agent_failure() {
        let state = state(vec![Err(SleuthError::OpenAI("rate limited".to_string()))]);
        let (status, body) = call(state, "anything").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body.get("details").is_none());
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&SleuthError::ToolLoopExceeded(15)),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&SleuthError::Config("missing key".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
