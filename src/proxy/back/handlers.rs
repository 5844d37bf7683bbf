use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderValue, Method, header},
    response::IntoResponse,
    routing::{MethodRouter, get, post},
};
use serde_json::json;
use tower_http::cors::CorsLayer;

use super::AppState;
use crate::{
    Provider,
    proxy::dto::{ChatRequest, ChatResponse},
    service,
};

pub fn build_router(state: Arc<AppState>) -> Router {
    // Configure CORS. Preflight requests are answered here and never reach a
    // handler.
    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_static("*"))
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    // Build router
    Router::new()
        .route("/health", get(health_check))
        .route("/groq-proxy", proxy_route(groq_handler))
        .route("/huggingface-proxy", proxy_route(huggingface_handler))
        .route(
            "/huggingface-inference-proxy",
            proxy_route(huggingface_inference_handler),
        )
        .layer(cors)
        .with_state(state)
}

fn proxy_route<H, T>(handler: H) -> MethodRouter<Arc<AppState>>
where
    H: axum::handler::Handler<T, Arc<AppState>>,
    T: 'static,
{
    post(handler).fallback(method_not_allowed)
}

pub async fn health_check() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

async fn method_not_allowed() -> service::Error {
    service::Error::MethodNotAllowed
}

pub async fn groq_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> service::Result<Json<ChatResponse>> {
    proxy(&state, Provider::Groq, &body).await
}

pub async fn huggingface_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> service::Result<Json<ChatResponse>> {
    proxy(&state, Provider::HuggingFace, &body).await
}

pub async fn huggingface_inference_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> service::Result<Json<ChatResponse>> {
    proxy(&state, Provider::HuggingFaceInference, &body).await
}

async fn proxy(
    state: &AppState,
    provider: Provider,
    body: &[u8],
) -> service::Result<Json<ChatResponse>> {
    let request = ChatRequest::from_slice(body)?;
    tracing::info!(
        %provider,
        messages = request.messages.len(),
        custom_system_prompt = request.system_prompt.is_some(),
        "Proxying chat request"
    );

    let content = state.client.complete(provider, &request).await?;
    Ok(Json(ChatResponse { content }))
}
