use crate::models::question::{
    CodingDetails, MultipleChoiceDetails, Question, QuestionKind, QuestionType,
    PLACEHOLDER_SOLUTION,
};
use crate::utils::ids::{IdGenerator, RandomIds};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;

/// How incomplete items are treated.
///
/// `Strict` drops anything missing a required field. `Lenient` keeps recognisable items and
/// fills gaps with display defaults (no choices, no correct index, placeholder solution).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizeMode {
    #[default]
    Strict,
    Lenient,
}

impl FromStr for NormalizeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(NormalizeMode::Strict),
            "lenient" => Ok(NormalizeMode::Lenient),
            other => Err(format!("unknown normalize mode '{}'", other)),
        }
    }
}

impl fmt::Display for NormalizeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizeMode::Strict => write!(f, "strict"),
            NormalizeMode::Lenient => write!(f, "lenient"),
        }
    }
}

// Field names in priority order; the first present one wins.
const TYPE_FIELDS: &[&str] = &["type", "questionType", "qtype", "kind"];
const MCQ_PROMPT_FIELDS: &[&str] = &["question", "prompt", "text"];
const CODING_PROMPT_FIELDS: &[&str] = &["prompt", "question", "text"];
const OPTION_FIELDS: &[&str] = &["options", "choices"];
const INDEX_FIELDS: &[&str] = &["correctIndex", "correct_index", "correctAnswer", "correct_answer"];
const SOLUTION_FIELDS: &[&str] = &[
    "referenceSolution",
    "reference_solution",
    "sampleAnswer",
    "answer",
    "solution",
];

const UNTITLED_PROMPT: &str = "Untitled question";

pub struct Normalizer<I = RandomIds> {
    mode: NormalizeMode,
    ids: I,
}

impl Normalizer<RandomIds> {
    pub fn new(mode: NormalizeMode) -> Self {
        Self {
            mode,
            ids: RandomIds,
        }
    }
}

impl<I: IdGenerator> Normalizer<I> {
    pub fn with_ids(mode: NormalizeMode, ids: I) -> Self {
        Self { mode, ids }
    }

    pub fn mode(&self) -> NormalizeMode {
        self.mode
    }

    pub fn fresh_id(&mut self, question_type: QuestionType) -> String {
        self.ids.next_id(question_type.id_prefix())
    }

    /// Maps one raw model item to a canonical question, or `None` when it cannot be used.
    pub fn normalize(&mut self, raw: &JsonValue, language_fallback: &str) -> Option<Question> {
        if !raw.is_object() {
            return None;
        }

        let declared = first_str(raw, TYPE_FIELDS)
            .map(|t| t.to_ascii_lowercase())
            .unwrap_or_default();
        let is_mcq = declared.contains("multiple")
            || declared.contains("mcq")
            || first_field(raw, OPTION_FIELDS).is_some();

        let kind = if is_mcq {
            self.multiple_choice(raw)?
        } else {
            let is_coding = declared == "code"
                || declared == "coding"
                || first_str(raw, CODING_PROMPT_FIELDS).is_some();
            if !is_coding {
                return None;
            }
            self.coding(raw, language_fallback)?
        };

        let id = match raw.get("id") {
            Some(JsonValue::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            Some(JsonValue::Number(n)) => n.to_string(),
            _ => {
                let prefix = match kind {
                    QuestionKind::MultipleChoice(_) => QuestionType::MultipleChoice,
                    QuestionKind::Coding(_) => QuestionType::Coding,
                };
                self.fresh_id(prefix)
            }
        };

        Some(Question {
            id,
            kind,
            topic: first_str(raw, &["topic"]).map(str::to_string),
        })
    }

    fn multiple_choice(&self, raw: &JsonValue) -> Option<QuestionKind> {
        let strict = self.mode == NormalizeMode::Strict;

        let prompt = match first_str(raw, MCQ_PROMPT_FIELDS) {
            Some(p) => p.to_string(),
            None if strict => return None,
            None => UNTITLED_PROMPT.to_string(),
        };

        let options: Vec<String> = match first_field(raw, OPTION_FIELDS).and_then(|o| o.as_array()) {
            Some(entries) => {
                let texts: Vec<Option<String>> = entries.iter().map(option_text).collect();
                if strict && texts.iter().any(Option::is_none) {
                    return None;
                }
                texts.into_iter().flatten().collect()
            }
            None if strict => return None,
            None => Vec::new(),
        };
        if strict && options.len() < 2 {
            return None;
        }

        let correct_index = first_field(raw, INDEX_FIELDS)
            .and_then(as_index)
            .filter(|idx| *idx < options.len());
        if strict && correct_index.is_none() {
            return None;
        }

        Some(QuestionKind::MultipleChoice(MultipleChoiceDetails {
            prompt,
            options,
            correct_index,
        }))
    }

    fn coding(&self, raw: &JsonValue, language_fallback: &str) -> Option<QuestionKind> {
        let strict = self.mode == NormalizeMode::Strict;

        let prompt = match first_str(raw, CODING_PROMPT_FIELDS) {
            Some(p) => p.to_string(),
            None if strict => return None,
            None => UNTITLED_PROMPT.to_string(),
        };
        let reference_solution = match first_str(raw, SOLUTION_FIELDS) {
            Some(s) => s.to_string(),
            None if strict => return None,
            None => PLACEHOLDER_SOLUTION.to_string(),
        };

        let language = first_str(raw, &["language"])
            .map(str::to_string)
            .or_else(|| {
                let fallback = language_fallback.trim();
                (!fallback.is_empty()).then(|| fallback.to_string())
            });

        Some(QuestionKind::Coding(CodingDetails {
            prompt,
            reference_solution,
            language,
        }))
    }
}

fn first_field<'a>(raw: &'a JsonValue, fields: &[&str]) -> Option<&'a JsonValue> {
    fields
        .iter()
        .filter_map(|f| raw.get(*f))
        .find(|v| !v.is_null())
}

fn first_str<'a>(raw: &'a JsonValue, fields: &[&str]) -> Option<&'a str> {
    fields
        .iter()
        .filter_map(|f| raw.get(*f).and_then(|v| v.as_str()))
        .map(str::trim)
        .find(|s| !s.is_empty())
}

fn option_text(v: &JsonValue) -> Option<String> {
    match v {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn as_index(v: &JsonValue) -> Option<usize> {
    if let Some(i) = v.as_u64() {
        return usize::try_from(i).ok();
    }
    // 1.0 is still a whole index; 1.5 is not.
    v.as_f64()
        .filter(|f| *f >= 0.0 && f.fract() == 0.0)
        .map(|f| f as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ids::SequentialIds;
    use serde_json::json;

    fn strict() -> Normalizer<SequentialIds> {
        Normalizer::with_ids(NormalizeMode::Strict, SequentialIds::new())
    }

    fn lenient() -> Normalizer<SequentialIds> {
        Normalizer::with_ids(NormalizeMode::Lenient, SequentialIds::new())
    }

    #[test]
    fn accepts_complete_multiple_choice() {
        let q = strict()
            .normalize(
                &json!({
                    "id": "q1",
                    "type": "multiple_choice",
                    "question": "Which SQL clause filters rows?",
                    "options": ["WHERE", "GROUP BY", "ORDER BY", "HAVING"],
                    "correctIndex": 0,
                    "topic": "filtering"
                }),
                "sql",
            )
            .unwrap();
        assert_eq!(q.id, "q1");
        assert_eq!(q.topic.as_deref(), Some("filtering"));
        match q.kind {
            QuestionKind::MultipleChoice(mc) => {
                assert_eq!(mc.options.len(), 4);
                assert_eq!(mc.correct_index, Some(0));
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn strict_rejects_mcq_without_correct_index() {
        let raw = json!({
            "type": "multiple_choice",
            "question": "Which index suits range queries?",
            "options": ["B-tree", "Hash"]
        });
        assert!(strict().normalize(&raw, "sql").is_none());
    }

    #[test]
    fn strict_rejects_out_of_range_and_short_options() {
        let out_of_range = json!({"question": "Q?", "options": ["a", "b"], "correctIndex": 2});
        let one_option = json!({"question": "Q?", "choices": ["a"], "correctIndex": 0});
        let negative = json!({"question": "Q?", "options": ["a", "b"], "correctIndex": -1});
        let mut n = strict();
        assert!(n.normalize(&out_of_range, "").is_none());
        assert!(n.normalize(&one_option, "").is_none());
        assert!(n.normalize(&negative, "").is_none());
    }

    #[test]
    fn lenient_keeps_incomplete_mcq_for_display() {
        let raw = json!({"type": "mcq", "prompt": "Pick one"});
        let q = lenient().normalize(&raw, "").unwrap();
        match q.kind {
            QuestionKind::MultipleChoice(mc) => {
                assert_eq!(mc.prompt, "Pick one");
                assert!(mc.options.is_empty());
                assert_eq!(mc.correct_index, None);
            }
            other => panic!("unexpected kind {:?}", other),
        }
        assert_eq!(q.id, "mc_1");
    }

    #[test]
    fn choices_alias_and_alternate_index_field() {
        let raw = json!({"prompt": "2 + 2?", "choices": [3, 4], "correct_answer": 1});
        let q = strict().normalize(&raw, "").unwrap();
        match q.kind {
            QuestionKind::MultipleChoice(mc) => {
                assert_eq!(mc.options, vec!["3".to_string(), "4".to_string()]);
                assert_eq!(mc.correct_index, Some(1));
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn coding_requires_solution_in_strict_mode() {
        let raw = json!({"type": "coding", "prompt": "Write a query selecting active users"});
        assert!(strict().normalize(&raw, "sql").is_none());

        let q = lenient().normalize(&raw, "sql").unwrap();
        assert_eq!(q.reference_solution(), None);
        match q.kind {
            QuestionKind::Coding(code) => {
                assert_eq!(code.reference_solution, PLACEHOLDER_SOLUTION);
                assert_eq!(code.language.as_deref(), Some("sql"));
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn coding_accepts_sample_answer_alias() {
        let raw = json!({
            "type": "code",
            "prompt": "Sum an array",
            "sampleAnswer": "def s(a): return sum(a)",
            "language": "python"
        });
        let q = strict().normalize(&raw, "javascript").unwrap();
        assert_eq!(q.reference_solution(), Some("def s(a): return sum(a)"));
        assert_eq!(q.id, "coding_1");
    }

    #[test]
    fn unrecognised_shapes_are_dropped() {
        let mut n = lenient();
        assert!(n.normalize(&json!({"foo": "bar"}), "").is_none());
        assert!(n.normalize(&json!("just text"), "").is_none());
        assert!(n.normalize(&json!(null), "").is_none());
    }
}
