use crate::models::question::Question;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub language: String,
    pub topic: String,
    pub count: usize,
    pub difficulty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
}

impl GenerationRequest {
    pub fn new(language: impl Into<String>, count: usize) -> Self {
        Self {
            language: language.into(),
            topic: "algorithms".to_string(),
            count,
            difficulty: "medium".to_string(),
            role: None,
            framework: None,
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_framework(mut self, framework: impl Into<String>) -> Self {
        self.framework = Some(framework.into());
        self
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationOutput {
    pub questions: Vec<Question>,
    /// Raw text of the last successful completion call, kept for diagnostics.
    pub assistant: Option<String>,
}
