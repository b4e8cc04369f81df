use crate::error::{Error, Result};
use crate::models::generation::GenerationRequest;
use crate::models::grade::GradeResult;
use crate::models::question::{Question, QuestionKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Choice(usize),
    Code(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionAnswer {
    pub answer: Answer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<GradeResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmittedAnswer {
    pub id: String,
    pub answer: Option<Answer>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub session_id: Uuid,
    pub answers: Vec<SubmittedAnswer>,
    pub submitted_at: DateTime<Utc>,
}

/// One interview run: the request, the questions it produced and the answers given so far.
#[derive(Debug)]
pub struct Session {
    pub id: Uuid,
    pub request: GenerationRequest,
    pub questions: Vec<Question>,
    pub answers: HashMap<String, SessionAnswer>,
    pub started_at: DateTime<Utc>,
    submitted: bool,
}

pub type SharedSession = Arc<tokio::sync::Mutex<Session>>;

impl Session {
    pub fn new(request: GenerationRequest, questions: Vec<Question>) -> Self {
        Self {
            id: Uuid::new_v4(),
            request,
            questions,
            answers: HashMap::new(),
            started_at: Utc::now(),
            submitted: false,
        }
    }

    pub fn shared(self) -> SharedSession {
        Arc::new(tokio::sync::Mutex::new(self))
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    pub fn record_answer(&mut self, question_id: &str, answer: Answer) -> Result<()> {
        if self.submitted {
            return Err(Error::BadRequest("Session already submitted".to_string()));
        }
        let question = self
            .question(question_id)
            .ok_or_else(|| Error::NotFound(format!("Question {} not in session", question_id)))?;

        match (&question.kind, &answer) {
            (QuestionKind::MultipleChoice(mc), Answer::Choice(idx)) => {
                if *idx >= mc.options.len() {
                    return Err(Error::BadRequest(format!(
                        "Choice {} out of range for question {}",
                        idx, question_id
                    )));
                }
            }
            (QuestionKind::Coding(_), Answer::Code(_)) => {}
            _ => {
                return Err(Error::BadRequest(format!(
                    "Answer kind does not match question {}",
                    question_id
                )))
            }
        }

        self.answers.insert(
            question_id.to_string(),
            SessionAnswer {
                answer,
                grade: None,
            },
        );
        Ok(())
    }

    pub fn attach_grade(&mut self, question_id: &str, grade: GradeResult) -> Result<()> {
        let entry = self
            .answers
            .get_mut(question_id)
            .ok_or_else(|| Error::NotFound(format!("No answer recorded for {}", question_id)))?;
        entry.grade = Some(grade);
        Ok(())
    }

    /// Finalizes the session. Returns the submission the first time only.
    pub fn submit(&mut self) -> Option<Submission> {
        if self.submitted {
            return None;
        }
        self.submitted = true;
        let answers = self
            .questions
            .iter()
            .map(|q| SubmittedAnswer {
                id: q.id.clone(),
                answer: self.answers.get(&q.id).map(|a| a.answer.clone()),
            })
            .collect();
        Some(Submission {
            session_id: self.id,
            answers,
            submitted_at: Utc::now(),
        })
    }
}
