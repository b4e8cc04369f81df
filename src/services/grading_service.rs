use crate::error::{Error, Result};
use crate::models::grade::{GradeResult, Verdict};
use crate::models::question::{Question, QuestionKind, QuestionType};
use crate::models::session::{Answer, SessionAnswer};
use crate::services::completion_client::{CompletionClient, SamplingConfig};
use crate::services::mock_service;
use crate::services::prompt_builder;
use crate::services::response_parser::parse;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone)]
pub struct GradingService {
    client: Arc<dyn CompletionClient>,
    mock: bool,
}

/// Per-question outcome in a scored session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerOutcome {
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub answer: Option<Answer>,
    /// `None` when the answer could not be judged (ungraded code, MCQ without a key).
    pub correct: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<GradeResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreSummary {
    pub total: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub results: Vec<AnswerOutcome>,
}

impl GradingService {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self {
            client,
            mock: false,
        }
    }

    pub fn with_mock(mut self, mock: bool) -> Self {
        self.mock = mock;
        self
    }

    /// Grades a coding submission against the question's reference solution.
    ///
    /// A reply that is not a complete `{score, verdict, feedback}` object still succeeds, with
    /// only the raw text kept.
    pub async fn grade(&self, question: &Question, submission: &str) -> Result<GradeResult> {
        let reference = question
            .reference_solution()
            .ok_or(Error::MissingReferenceSolution)?;

        if self.mock {
            return Ok(mock_service::grade_mock_submission(submission));
        }

        let prompts = prompt_builder::grading(question.prompt(), reference, submission);
        let content = self
            .client
            .complete(&prompts.system, &prompts.user, SamplingConfig::grading())
            .await?;

        let grade = content
            .as_deref()
            .and_then(parse)
            .and_then(|v| read_grade(&v));
        match grade {
            Some(grade) => {
                tracing::info!(question_id = %question.id, score = ?grade.score, "Submission graded");
                Ok(grade)
            }
            None => {
                tracing::warn!(question_id = %question.id, "Grader reply was not a verdict");
                Ok(GradeResult::ungraded(content))
            }
        }
    }

    /// Tallies a session's answers. Multiple choice is checked by index; code counts only once graded.
    pub fn score_answers(
        questions: &[Question],
        answers: &HashMap<String, SessionAnswer>,
    ) -> ScoreSummary {
        let mut correct = 0;
        let mut incorrect = 0;
        let mut results = Vec::with_capacity(questions.len());

        for q in questions {
            let given = answers.get(&q.id);
            let outcome = match (&q.kind, given) {
                (QuestionKind::MultipleChoice(mc), given) => match mc.correct_index {
                    Some(key) => Some(matches!(
                        given.map(|a| &a.answer),
                        Some(Answer::Choice(idx)) if *idx == key
                    )),
                    None => None,
                },
                (QuestionKind::Coding(_), Some(a)) => a
                    .grade
                    .as_ref()
                    .and_then(|g| g.verdict)
                    .map(|v| v == Verdict::Pass),
                (QuestionKind::Coding(_), None) => Some(false),
            };

            match outcome {
                Some(true) => correct += 1,
                Some(false) => incorrect += 1,
                None => {}
            }
            results.push(AnswerOutcome {
                id: q.id.clone(),
                question_type: q.question_type(),
                answer: given.map(|a| a.answer.clone()),
                correct: outcome,
                grade: given.and_then(|a| a.grade.clone()),
            });
        }

        ScoreSummary {
            total: questions.len(),
            correct,
            incorrect,
            results,
        }
    }
}

fn read_grade(value: &JsonValue) -> Option<GradeResult> {
    let score = value
        .get("score")
        .and_then(|s| s.as_u64())
        .filter(|s| *s <= 100)?;
    let verdict = match value.get("verdict").and_then(|v| v.as_str())?.trim() {
        v if v.eq_ignore_ascii_case("pass") => Verdict::Pass,
        v if v.eq_ignore_ascii_case("partial") => Verdict::Partial,
        v if v.eq_ignore_ascii_case("fail") => Verdict::Fail,
        _ => return None,
    };
    let feedback = value.get("feedback").and_then(|f| f.as_str())?;
    Some(GradeResult::graded(score as u8, verdict, feedback))
}
