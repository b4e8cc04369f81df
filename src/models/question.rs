use serde::{Deserialize, Serialize};

/// Stand-in solution used by lenient normalization when the model omitted one.
pub const PLACEHOLDER_SOLUTION: &str = "No reference solution provided.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    Coding,
}

impl QuestionType {
    pub fn id_prefix(self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "mc",
            QuestionType::Coding => "coding",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice(MultipleChoiceDetails),
    Coding(CodingDetails),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultipleChoiceDetails {
    pub prompt: String,
    pub options: Vec<String>,
    /// Always present for strictly normalized questions.
    pub correct_index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodingDetails {
    pub prompt: String,
    pub reference_solution: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl Question {
    pub fn question_type(&self) -> QuestionType {
        match self.kind {
            QuestionKind::MultipleChoice(_) => QuestionType::MultipleChoice,
            QuestionKind::Coding(_) => QuestionType::Coding,
        }
    }

    pub fn prompt(&self) -> &str {
        match &self.kind {
            QuestionKind::MultipleChoice(mc) => &mc.prompt,
            QuestionKind::Coding(code) => &code.prompt,
        }
    }

    /// The reference solution usable for grading. Lenient placeholders do not count.
    pub fn reference_solution(&self) -> Option<&str> {
        match &self.kind {
            QuestionKind::Coding(code) => {
                let solution = code.reference_solution.trim();
                if solution.is_empty() || solution == PLACEHOLDER_SOLUTION {
                    None
                } else {
                    Some(code.reference_solution.as_str())
                }
            }
            QuestionKind::MultipleChoice(_) => None,
        }
    }

    /// Text compared by the deduplicator: the prompt, or the solution when the prompt is blank.
    pub fn dedup_text(&self) -> &str {
        let prompt = self.prompt();
        if !prompt.trim().is_empty() {
            return prompt;
        }
        match &self.kind {
            QuestionKind::Coding(code) => &code.reference_solution,
            QuestionKind::MultipleChoice(_) => prompt,
        }
    }

    /// Everything a reader of the question sees, joined for token scanning.
    pub fn combined_text(&self) -> String {
        match &self.kind {
            QuestionKind::MultipleChoice(mc) => {
                let mut text = mc.prompt.clone();
                for option in &mc.options {
                    text.push('\n');
                    text.push_str(option);
                }
                text
            }
            QuestionKind::Coding(code) => format!("{}\n{}", code.prompt, code.reference_solution),
        }
    }
}
