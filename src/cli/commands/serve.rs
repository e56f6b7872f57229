//! HTTP API server exposing the question-answering service.
//!
//! The index is initialized before the listener starts accepting traffic,
//! so no request observes the uninitialized state in normal operation.

use crate::cli::Output;
use crate::config::Settings;
use crate::rag::ChatService;
use axum::{
    extract::State,
    http::HeaderValue,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Shared application state.
struct AppState {
    service: ChatService,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let allowed_origin = settings.server.allowed_origin.clone();
    let service = ChatService::from_settings(settings)?;

    let spinner = Output::spinner("Preparing the index...");
    let report = service.initialize().await?;
    spinner.finish_and_clear();

    if report.skipped {
        Output::info("Index already populated; ingestion skipped.");
    } else {
        Output::success(&format!(
            "Indexed {} fragments from {} sources",
            report.fragments_written, report.sources_fetched
        ));
        if report.sources_failed > 0 {
            Output::warning(&format!(
                "{} source(s) could not be fetched and were skipped",
                report.sources_failed
            ));
        }
    }

    let origin = allowed_origin
        .parse::<HeaderValue>()
        .map_err(|e| anyhow::anyhow!("Invalid allowed origin '{}': {}", allowed_origin, e))?;

    // One fixed origin; methods and headers are unrestricted.
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any);

    let state = Arc::new(AppState { service });

    let app = Router::new()
        .route("/chat", post(chat))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Cronista API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    Output::kv("Allowed origin", &allowed_origin);
    println!();
    println!("Endpoints:");
    Output::kv("Chat", "POST /chat");
    Output::kv("Health", "GET  /health");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct ChatRequest {
    pregunta: String,
}

#[derive(Serialize)]
struct ChatResponse {
    respuesta: String,
}

// === Handlers ===

/// Answer a question. Always replies with HTTP 200; failures travel as
/// Spanish-language warning strings in the response body.
async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> impl IntoResponse {
    let respuesta = match state.service.answer(&req.pregunta).await {
        Ok(answer) => answer,
        Err(e) => e.user_message(),
    };

    Json(ChatResponse { respuesta })
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let fragments = state.service.vector_store().count().await.unwrap_or(0);

    Json(serde_json::json!({
        "status": "ok",
        "initialized": state.service.is_initialized(),
        "fragments": fragments,
    }))
}
