//! Request handlers: pass-through to the core plus HTTP status mapping.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use crate::commit::draft_commit_message;
use crate::git::{RepositoryStatus, resolve_repo_path};
use crate::server::AppState;

pub const STATUS_FAILED: &str = "Failed to get git status. Make sure you are in a git repository.";
pub const NO_STAGED_CHANGES: &str = "No staged changes found. Please stage your changes first.";
pub const DRAFT_FAILED: &str = "Failed to generate commit message";
pub const MESSAGE_REQUIRED: &str = "Commit message is required";
pub const COMMIT_FAILED: &str = "Failed to commit changes. Make sure you have staged changes.";
pub const DRAFT_UNREACHABLE: &str =
    "Failed to generate commit message. Make sure you are in a git repository.";
pub const COMMIT_UNREACHABLE: &str =
    "Failed to commit changes. Make sure you are in a git repository.";

const INDEX_HTML: &str = include_str!("index.html");

/// Error body returned to the browser as `{"error": ...}`.
#[derive(Debug)]
pub enum ApiError {
    /// Client input was rejected before any external call.
    BadRequest(String),
    /// A git or provider operation failed; the text is user-safe.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// `Json` extractor whose rejections use the `{"error": ...}` body.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        Ok(Self(value))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoRequest {
    #[serde(default)]
    pub repo_path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRequest {
    #[serde(default)]
    pub repo_path: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DraftResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommitResponse {
    pub success: bool,
    pub output: String,
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn status(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<RepoRequest>,
) -> Result<Json<RepositoryStatus>, ApiError> {
    let repo = resolve_repo_path(request.repo_path.as_deref());

    match state.git.status(&repo).await {
        Ok(status) => Ok(Json(status)),
        Err(e) => {
            error!("Git status failed for {}: {e}", repo.display());
            Err(ApiError::Internal(STATUS_FAILED.to_string()))
        }
    }
}

pub async fn generate_commit(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<RepoRequest>,
) -> Result<Json<DraftResponse>, ApiError> {
    let repo = resolve_repo_path(request.repo_path.as_deref());

    let payload = state.git.diff_and_files(&repo).await.map_err(|e| {
        error!("Reading diff failed for {}: {e}", repo.display());
        let message = if e.is_connection_failure() {
            DRAFT_UNREACHABLE
        } else {
            DRAFT_FAILED
        };
        ApiError::Internal(message.to_string())
    })?;

    if payload.is_empty() {
        return Err(ApiError::BadRequest(NO_STAGED_CHANGES.to_string()));
    }

    let message = draft_commit_message(&state.drafter, &payload.diff, &payload.files)
        .await
        .map_err(|e| {
            error!("{}", e.detailed());
            ApiError::Internal(e.summary())
        })?;

    Ok(Json(DraftResponse { message }))
}

pub async fn commit(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<CommitRequest>,
) -> Result<Json<CommitResponse>, ApiError> {
    let message = request.message.unwrap_or_default();
    if message.trim().is_empty() {
        return Err(ApiError::BadRequest(MESSAGE_REQUIRED.to_string()));
    }

    let repo = resolve_repo_path(request.repo_path.as_deref());

    match state.git.commit(&repo, &message).await {
        Ok(output) => Ok(Json(CommitResponse {
            success: true,
            output,
        })),
        Err(e) if e.is_validation_failure() => {
            Err(ApiError::BadRequest(MESSAGE_REQUIRED.to_string()))
        }
        Err(e) => {
            error!("Commit failed for {}: {e}", repo.display());
            let message = if e.is_connection_failure() {
                COMMIT_UNREACHABLE
            } else {
                COMMIT_FAILED
            };
            Err(ApiError::Internal(message.to_string()))
        }
    }
}
