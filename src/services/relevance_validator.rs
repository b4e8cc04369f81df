use crate::models::question::Question;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

pub const FOREIGN_TOKENS_REASON: &str = "contains foreign-language tokens";
pub const NO_SQL_REASON: &str = "no SQL keywords found";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    pub id: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub ok: bool,
    pub problems: Vec<Problem>,
    /// Informational findings that never fail validation.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub advisories: Vec<Problem>,
}

/// Tokens that strongly indicate a language other than the target one.
fn denylist(language: &str) -> &'static [&'static str] {
    match canonical_language(language).as_str() {
        "javascript" => &[
            "def ",
            "import numpy",
            "print(",
            "printf(",
            "public static",
            "system.out",
            "std::",
            "#include",
            "cout<<",
        ],
        "python" => &[
            "console.log",
            "console.error",
            "var ",
            "let ",
            "const ",
            "=>",
            "function ",
        ],
        "java" => &["console.log", "var ", "let ", "const ", "console.error", "=>", "def "],
        "html" => &["def ", "print(", "public static", "system.out", "std::", "#include"],
        "sql" => &[
            "def ",
            "console.log",
            "public static",
            "function ",
            "var ",
            "let ",
            "const ",
        ],
        "csharp" => &["def ", "console.log", "print(", "std::", "cout<<"],
        _ => &[],
    }
}

pub fn canonical_language(language: &str) -> String {
    let lang = language.trim().to_lowercase();
    match lang.as_str() {
        "js" | "node" | "nodejs" | "node.js" => "javascript".to_string(),
        "py" | "python3" => "python".to_string(),
        "c#" | "cs" | "dotnet" => "csharp".to_string(),
        "postgres" | "postgresql" | "mysql" | "sqlite" | "tsql" | "t-sql" => "sql".to_string(),
        "html5" => "html".to_string(),
        _ => lang,
    }
}

fn sql_keywords() -> &'static Regex {
    static SQL: OnceLock<Regex> = OnceLock::new();
    SQL.get_or_init(|| {
        Regex::new(r"select\b|insert\b|update\b|delete\b|join\b|primary key|foreign key")
            .expect("valid sql keyword pattern")
    })
}

pub fn contains_foreign_tokens(text: &str, language: &str) -> bool {
    let lowered = text.to_lowercase();
    denylist(language).iter().any(|tok| lowered.contains(tok))
}

/// Flags questions whose text carries syntax from a language other than `language`.
pub fn validate(questions: &[Question], language: &str, role: Option<&str>) -> ValidationReport {
    let database_role = role
        .map(|r| r.trim().eq_ignore_ascii_case("database"))
        .unwrap_or(false);

    let mut report = ValidationReport::default();
    for q in questions {
        let combined = q.combined_text();
        if contains_foreign_tokens(&combined, language) {
            report.problems.push(Problem {
                id: Some(q.id.clone()),
                reason: FOREIGN_TOKENS_REASON.to_string(),
            });
        }
        // Conceptual database questions are fine without SQL, so this is only advisory.
        if database_role && !sql_keywords().is_match(&combined.to_lowercase()) {
            report.advisories.push(Problem {
                id: Some(q.id.clone()),
                reason: NO_SQL_REASON.to_string(),
            });
        }
    }
    report.ok = report.problems.is_empty();

    for advisory in &report.advisories {
        tracing::info!(
            id = ?advisory.id,
            reason = %advisory.reason,
            "Relevance advisory"
        );
    }
    if !report.ok {
        tracing::warn!(
            language = %language,
            flagged = report.problems.len(),
            "Relevance validation flagged questions"
        );
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::{CodingDetails, MultipleChoiceDetails, QuestionKind};

    fn coding(id: &str, prompt: &str, solution: &str) -> Question {
        Question {
            id: id.into(),
            kind: QuestionKind::Coding(CodingDetails {
                prompt: prompt.into(),
                reference_solution: solution.into(),
                language: None,
            }),
            topic: None,
        }
    }

    #[test]
    fn flags_javascript_leaking_into_sql() {
        let questions = vec![
            coding("ok", "Select active users", "SELECT * FROM users WHERE active = 1;"),
            coding("bad", "Log every row", "rows.forEach(r => console.log(r))"),
        ];
        let report = validate(&questions, "sql", None);
        assert!(!report.ok);
        assert_eq!(report.problems.len(), 1);
        assert_eq!(report.problems[0].id.as_deref(), Some("bad"));
        assert_eq!(report.problems[0].reason, FOREIGN_TOKENS_REASON);
    }

    #[test]
    fn scans_options_too() {
        let q = Question {
            id: "m1".into(),
            kind: QuestionKind::MultipleChoice(MultipleChoiceDetails {
                prompt: "How do you print in Python?".into(),
                options: vec!["console.log(x)".into(), "print(x)".into()],
                correct_index: Some(1),
            }),
            topic: None,
        };
        assert!(!validate(&[q], "python", None).ok);
    }

    #[test]
    fn database_role_is_advisory_only() {
        let questions = vec![coding(
            "c1",
            "Explain what normalization means",
            "Organising tables to reduce redundancy.",
        )];
        let report = validate(&questions, "sql", Some("database"));
        assert!(report.ok);
        assert_eq!(report.advisories.len(), 1);
    }

    #[test]
    fn unknown_language_has_no_denylist_and_aliases_resolve() {
        let questions = vec![coding("c1", "Anything", "def foo(): pass")];
        assert!(validate(&questions, "haskell", None).ok);
        assert!(!validate(&questions, "JS", None).ok);
    }

    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn database_advisories_are_logged() {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(captured.clone())
            .with_ansi(false)
            .finish();
        let questions = vec![coding("c7", "Explain normalization", "Reduce redundancy.")];

        let report = tracing::subscriber::with_default(subscriber, || {
            validate(&questions, "sql", Some("database"))
        });

        assert!(report.ok);
        let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("Relevance advisory"));
        assert!(logs.contains(NO_SQL_REASON));
        assert!(logs.contains("c7"));
    }
}
