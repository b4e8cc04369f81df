use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Partial,
    Fail,
}

/// Outcome of grading one coding submission.
///
/// When the grader's reply could not be read as a verdict, only `raw` is set. An unset
/// `verdict` means "ungraded", never "fail".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GradeResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verdict: Option<Verdict>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl GradeResult {
    pub fn graded(score: u8, verdict: Verdict, feedback: impl Into<String>) -> Self {
        Self {
            score: Some(score),
            verdict: Some(verdict),
            feedback: Some(feedback.into()),
            raw: None,
        }
    }

    pub fn ungraded(raw: Option<String>) -> Self {
        Self {
            raw,
            ..Self::default()
        }
    }

    pub fn is_graded(&self) -> bool {
        self.verdict.is_some()
    }
}
