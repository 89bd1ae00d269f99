//! HTTP surface for the todos and search handlers.
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `GET`, `POST` | `/todos` | list, create |
//! | `GET`, `PUT`, `DELETE` | `/todos/{id}` | get, update, delete |
//! | `POST` | `/search` | semantic search |
//!
//! Every route accepts any method so unsupported ones get the JSON 405
//! body instead of an empty one.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{App, ServiceError, ServiceResponse};

impl IntoResponse for ServiceResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.body)).into_response()
    }
}

/// Build the router over shared handler state.
pub fn router(app: App) -> Router {
    Router::new()
        .route("/todos", any(todos_collection))
        .route("/todos/{id}", any(todos_item))
        .route("/search", any(search))
        .layer(TraceLayer::new_for_http())
        .with_state(app)
}

/// Bind and serve until the process is stopped.
pub async fn serve(app: App, bind: &str) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, router(app)).await
}

fn body_text(body: &Bytes) -> Result<Option<&str>, ServiceError> {
    if body.is_empty() {
        return Ok(None);
    }
    std::str::from_utf8(body)
        .map(Some)
        .map_err(|e| ServiceError::Internal(format!("request body is not UTF-8: {}", e)))
}

async fn todos_collection(State(app): State<App>, method: Method, body: Bytes) -> ServiceResponse {
    match body_text(&body) {
        Ok(body) => app.todos(method.as_str(), None, body).await,
        Err(e) => e.into_response(),
    }
}

async fn todos_item(
    State(app): State<App>,
    method: Method,
    Path(id): Path<String>,
    body: Bytes,
) -> ServiceResponse {
    match body_text(&body) {
        Ok(body) => app.todos(method.as_str(), Some(&id), body).await,
        Err(e) => e.into_response(),
    }
}

async fn search(State(app): State<App>, method: Method, body: Bytes) -> ServiceResponse {
    if method != Method::POST {
        return ServiceError::MethodNotAllowed.into_response();
    }
    match body_text(&body) {
        Ok(body) => app.search(body).await,
        Err(e) => e.into_response(),
    }
}
