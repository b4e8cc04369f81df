use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use validator::Validate;

use crate::models::generation::{GenerationOutput, GenerationRequest};
use crate::models::grade::GradeResult;
use crate::models::question::Question;

fn default_language() -> String {
    "javascript".to_string()
}

fn default_topic() -> String {
    "algorithms".to_string()
}

fn default_count() -> usize {
    10
}

fn default_difficulty() -> String {
    "medium".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GenerateQuestionsPayload {
    #[serde(default = "default_language")]
    #[validate(length(min = 1))]
    pub language: String,
    #[serde(default = "default_topic")]
    pub topic: String,
    #[serde(default = "default_count")]
    #[validate(range(min = 1))]
    pub count: usize,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
    pub role: Option<String>,
    pub framework: Option<String>,
}

impl From<GenerateQuestionsPayload> for GenerationRequest {
    fn from(p: GenerateQuestionsPayload) -> Self {
        let non_blank = |s: Option<String>| s.filter(|v| !v.trim().is_empty());
        GenerationRequest {
            language: p.language.trim().to_string(),
            topic: p.topic,
            count: p.count,
            difficulty: p.difficulty,
            role: non_blank(p.role),
            framework: non_blank(p.framework),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionsData {
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateQuestionsResponse {
    pub ok: bool,
    pub data: QuestionsData,
    pub assistant: Option<String>,
}

impl From<GenerationOutput> for GenerateQuestionsResponse {
    fn from(out: GenerationOutput) -> Self {
        Self {
            ok: true,
            data: QuestionsData {
                questions: out.questions,
            },
            assistant: out.assistant,
        }
    }
}

/// The question arrives as loose JSON in whatever shape the client kept it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeCodePayload {
    pub question: Option<JsonValue>,
    #[serde(rename = "userCode", alias = "user_code", default)]
    pub user_code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GradeCodeResponse {
    pub ok: bool,
    pub data: GradeResult,
}

impl From<GradeResult> for GradeCodeResponse {
    fn from(data: GradeResult) -> Self {
        Self { ok: true, data }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub message: &'static str,
}
