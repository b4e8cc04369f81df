use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Json},
};
use std::time::Duration;
use validator::Validate;

use crate::{
    dto::interview_dto::{
        GenerateQuestionsPayload, GenerateQuestionsResponse, GradeCodePayload, GradeCodeResponse,
    },
    error::{Error, Result},
    models::generation::GenerationRequest,
    services::normalizer::{NormalizeMode, Normalizer},
    AppState,
};

fn ensure_credential(state: &AppState) -> Result<()> {
    if state.config.use_mock || state.config.has_credential() {
        Ok(())
    } else {
        Err(Error::CredentialMissing)
    }
}

#[axum::debug_handler]
pub async fn generate_questions(
    State(state): State<AppState>,
    payload: std::result::Result<Json<GenerateQuestionsPayload>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload.map_err(|e| Error::BadRequest(e.body_text()))?;
    payload.validate()?;
    ensure_credential(&state)?;

    let request = GenerationRequest::from(payload);
    let limit = state.config.generation_timeout_secs;
    let output = tokio::time::timeout(
        Duration::from_secs(limit),
        state.generation_service.generate(&request),
    )
    .await
    .map_err(|_| {
        tracing::error!(language = %request.language, "Question generation timed out");
        Error::Timeout(limit)
    })??;

    Ok(Json(GenerateQuestionsResponse::from(output)))
}

#[axum::debug_handler]
pub async fn grade_code(
    State(state): State<AppState>,
    payload: std::result::Result<Json<GradeCodePayload>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload.map_err(|e| Error::BadRequest(e.body_text()))?;
    ensure_credential(&state)?;

    let raw = payload
        .question
        .filter(|q| !q.is_null())
        .ok_or(Error::MissingQuestion)?;
    let language = raw
        .get("language")
        .and_then(|l| l.as_str())
        .unwrap_or_default()
        .to_string();
    let question = Normalizer::new(NormalizeMode::Lenient)
        .normalize(&raw, &language)
        .ok_or(Error::MissingReferenceSolution)?;

    let grade = state
        .grading_service
        .grade(&question, &payload.user_code)
        .await?;
    Ok(Json(GradeCodeResponse::from(grade)))
}
