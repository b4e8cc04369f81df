use crate::models::question::Question;
use crate::services::relevance_validator::Problem;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

pub const CREDENTIAL_MISSING_MESSAGE: &str = "OpenAI key not configured on server";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    /// Transport failure talking to the completion service.
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// No completion-service credential is configured. Never retried.
    #[error("{}", CREDENTIAL_MISSING_MESSAGE)]
    CredentialMissing,

    #[error("Completion service returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Corrective retry produced no parseable JSON")]
    UnparseableAfterRetry { assistant: Option<String> },

    #[error("{} question(s) still off-topic after corrective retry", problems.len())]
    RelevanceValidationFailed {
        assistant: Option<String>,
        problems: Vec<Problem>,
        questions: Vec<Question>,
    },

    #[error("question is required")]
    MissingQuestion,

    #[error("Question must include a referenceSolution to allow AI grading")]
    MissingReferenceSolution,

    #[error("Generation timed out after {0} seconds")]
    Timeout(u64),
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            Error::CredentialMissing => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "ok": false, "error": CREDENTIAL_MISSING_MESSAGE }),
            ),
            Error::Upstream { status, body } => (
                StatusCode::BAD_GATEWAY,
                json!({ "ok": false, "error": "OpenAI error", "status": status, "detail": body }),
            ),
            Error::Reqwest(err) => (
                StatusCode::BAD_GATEWAY,
                json!({ "ok": false, "error": "OpenAI error", "detail": err.to_string() }),
            ),
            Error::UnparseableAfterRetry { assistant } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({
                    "ok": false,
                    "error": "ai_response_not_parseable_after_retry",
                    "assistant": assistant,
                }),
            ),
            Error::RelevanceValidationFailed {
                assistant,
                problems,
                questions,
            } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({
                    "ok": false,
                    "error": "ai_response_not_in_language",
                    "reason": { "ok": false, "problems": problems },
                    "assistant": assistant,
                    "data": { "questions": questions },
                }),
            ),
            Error::MissingQuestion => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "ok": false, "error": "missing_question", "detail": "question is required" }),
            ),
            Error::MissingReferenceSolution => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "ok": false,
                    "error": "missing_reference_solution",
                    "detail": "Question must include a referenceSolution to allow AI grading.",
                }),
            ),
            Error::Timeout(secs) => (
                StatusCode::GATEWAY_TIMEOUT,
                json!({ "ok": false, "error": "generation_timeout", "detail": format!("No result within {}s", secs) }),
            ),
            Error::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "ok": false, "error": "bad_request", "detail": msg }),
            ),
            Error::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                json!({ "ok": false, "error": "not_found", "detail": msg }),
            ),
            Error::Validation(err) => (
                StatusCode::BAD_REQUEST,
                json!({ "ok": false, "error": "invalid_request", "detail": err.to_string() }),
            ),
            Error::Config(msg) => {
                tracing::error!("Configuration failure: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "ok": false, "error": "internal_error", "detail": msg }),
                )
            }
            Error::Anyhow(err) => {
                tracing::error!(error = ?err, "Unhandled error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "ok": false, "error": "internal_error", "detail": "An unexpected error occurred" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
