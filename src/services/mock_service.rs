use crate::models::generation::GenerationRequest;
use crate::models::grade::{GradeResult, Verdict};
use crate::models::question::{
    CodingDetails, MultipleChoiceDetails, Question, QuestionKind, QuestionType,
};

/// Canned batches never exceed this many questions.
pub const MAX_MOCK_QUESTIONS: usize = 8;

const OPTION_LABELS: [&str; 4] = ["Option A", "Option B", "Option C", "Option D"];

/// Deterministic questions for offline runs. Every fourth one is a coding task.
pub fn generate_mock_questions(req: &GenerationRequest) -> Vec<Question> {
    let n = req.count.min(MAX_MOCK_QUESTIONS);
    (0..n)
        .map(|i| {
            let number = i + 1;
            if number % 4 == 0 {
                Question {
                    id: format!("{}_{}", QuestionType::Coding.id_prefix(), number),
                    kind: QuestionKind::Coding(CodingDetails {
                        prompt: format!(
                            "Write a short {} solution for a {} {} task (#{}).",
                            req.language, req.difficulty, req.topic, number
                        ),
                        reference_solution: format!("// reference solution for task {}", number),
                        language: Some(req.language.clone()),
                    }),
                    topic: Some(req.topic.clone()),
                }
            } else {
                Question {
                    id: format!("{}_{}", QuestionType::MultipleChoice.id_prefix(), number),
                    kind: QuestionKind::MultipleChoice(MultipleChoiceDetails {
                        prompt: format!(
                            "[{}] Sample {} question #{} about {}",
                            req.language, req.difficulty, number, req.topic
                        ),
                        options: OPTION_LABELS.iter().map(|s| s.to_string()).collect(),
                        correct_index: Some(i % OPTION_LABELS.len()),
                    }),
                    topic: Some(req.topic.clone()),
                }
            }
        })
        .collect()
}

/// Length heuristic standing in for the grader.
pub fn grade_mock_submission(submission: &str) -> GradeResult {
    if submission.trim().chars().count() > 20 {
        GradeResult::graded(90, Verdict::Pass, "Mock grader: submission looks complete.")
    } else {
        GradeResult::graded(30, Verdict::Fail, "Mock grader: submission is too short.")
    }
}
