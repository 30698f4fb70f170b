use crate::models::chat::{ ProxyRequest, ProxyResponse };
use crate::proxy::{ ConversationProxy, ProxyError };
use std::any::Any;
use std::sync::Arc;
use axum::{
    body::{ Body, Bytes },
    routing::{ get, post },
    Router,
    Json,
    extract::State,
    response::{ IntoResponse, Response },
    http::{ header, StatusCode },
};
use serde_json::json;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{ Any as AnyOrigin, CorsLayer };
use log::{ info, error };
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub proxy: Arc<ConversationProxy>,
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        ).into_response()
    }
}

pub fn router(proxy: Arc<ConversationProxy>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods(AnyOrigin)
        .allow_headers(AnyOrigin);

    Router::new()
        .route("/api/ai-client", post(ai_client_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(AppState { proxy })
}

async fn ai_client_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let request_id = Uuid::new_v4().to_string();

    // checked before the body is read
    if !state.proxy.has_credential() {
        error!("[{}] Rejected: OPENAI_API_KEY is not configured", request_id);
        return ProxyError::MissingCredential.into_response();
    }

    let request: ProxyRequest = if body.iter().all(u8::is_ascii_whitespace) {
        ProxyRequest::default()
    } else {
        match serde_json::from_slice(&body) {
            Ok(request) => request,
            Err(e) => {
                error!("[{}] Unreadable request body: {}", request_id, e);
                return ProxyError::Unhandled(e.to_string()).into_response();
            }
        }
    };

    match state.proxy.respond(&request.messages, &request_id).await {
        Ok(reply) => {
            info!("[{}] Reply sent ({} chars)", request_id, reply.chars().count());
            Json(ProxyResponse { reply }).into_response()
        }
        Err(e) => e.into_response(),
    }
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    error!("Handler panicked: {}", message);
    ProxyError::Unhandled(message).into_response()
}
