use std::any::Any;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use metrics::counter;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use crate::metrics::Metrics;
use crate::search::{anon_id, Assistant, ChatQuery, APOLOGY_RESPONSE, INVALID_REQUEST_ERROR};

pub const CHAT_ROUTE: &str = "/api/roku-ai";

#[derive(Clone)]
pub struct AppState {
    pub assistant: Assistant,
}

/// Prior turns sent by the chat widget. Accepted, not used for ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn router(state: AppState) -> Router {
    create_router(state, None)
}

pub fn create_router(state: AppState, metrics: Option<&Metrics>) -> Router {
    let mut app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route(CHAT_ROUTE, post(chat));

    if let Some(m) = metrics {
        app = app.merge(m.router());
    }

    app.layer(CatchPanicLayer::custom(apology_on_panic))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

fn bad_request() -> Response {
    counter!("assistant_invalid_requests_total").increment(1);
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: INVALID_REQUEST_ERROR.to_string(),
        }),
    )
        .into_response()
}

/// Pull `(message, searchWeb, history length)` out of a request body.
/// `None` when `message` is missing or not a string.
pub fn parse_chat_body(body: &Value) -> Option<(ChatQuery, usize)> {
    let message = body.get("message")?.as_str()?;
    let search_web = body
        .get("searchWeb")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let history_len = body
        .get("history")
        .and_then(|h| serde_json::from_value::<Vec<ChatTurn>>(h.clone()).ok())
        .map_or(0, |h| h.len());
    Some((
        ChatQuery {
            message: message.to_string(),
            search_web,
        },
        history_len,
    ))
}

async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let body = match payload {
        Ok(Json(v)) => v,
        Err(rej) => {
            tracing::info!(target: "assistant", reason = %rej.body_text(), "rejected chat body");
            return bad_request();
        }
    };
    let Some((query, history_len)) = parse_chat_body(&body) else {
        return bad_request();
    };

    tracing::debug!(
        target: "assistant",
        id = %anon_id(&query.message),
        history_len,
        search_web = query.search_web,
        "chat request"
    );

    let response = state.assistant.reply(&query).await;
    Json(ChatResponse { response }).into_response()
}

fn apology_on_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(target: "assistant", detail, "chat handler panicked");
    (
        StatusCode::OK,
        Json(ChatResponse {
            response: APOLOGY_RESPONSE.to_string(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_accepts_minimal_body() {
        let (q, n) = parse_chat_body(&json!({"message": "best forex broker"})).unwrap();
        assert_eq!(q.message, "best forex broker");
        assert!(!q.search_web);
        assert_eq!(n, 0);
    }

    #[test]
    fn parse_reads_flags_and_history() {
        let body = json!({
            "message": "etoro fees",
            "searchWeb": true,
            "history": [{"role": "user", "content": "hi"}, {"role": "assistant", "content": "hello"}]
        });
        let (q, n) = parse_chat_body(&body).unwrap();
        assert!(q.search_web);
        assert_eq!(n, 2);
    }

    #[test]
    fn parse_rejects_missing_or_non_string_message() {
        assert!(parse_chat_body(&json!({})).is_none());
        assert!(parse_chat_body(&json!({"message": 42})).is_none());
        assert!(parse_chat_body(&json!({"message": null})).is_none());
        assert!(parse_chat_body(&json!(["message"])).is_none());
    }

    #[test]
    fn empty_string_message_is_not_malformed() {
        let (q, _) = parse_chat_body(&json!({"message": ""})).unwrap();
        assert_eq!(q.message, "");
    }
}
