use crate::models::generation::GenerationRequest;
use crate::services::relevance_validator::Problem;

/// Upper bound on items requested in one batch.
pub const MAX_GENERATION_COUNT: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct Prompts {
    pub system: String,
    pub user: String,
}

const GENERATION_SYSTEM: &str = "You are an assistant that generates programming interview questions and coding tasks tailored to a requested language, role, and framework. ALWAYS respond with valid JSON only (no commentary, no explanation). The top-level JSON must be: { \"questions\": [ ... ] }.";

const CORRECTIVE_SYSTEM: &str =
    "You are an assistant that must strictly follow user instructions and output valid JSON only.";

const GRADING_SYSTEM: &str = "You are a helpful, concise code reviewer and grader.";

const FEW_SHOT_EXAMPLES: &str = r#"EXAMPLES (JSON only):
1) Database (SQL):
{"questions":[{"id":"q1","type":"multiple_choice","question":"Which SQL clause is used to filter rows based on a condition?","options":["WHERE","GROUP BY","ORDER BY","HAVING"],"correctIndex":0,"topic":"filtering"},{"id":"q2","type":"coding","prompt":"Write an SQL query that selects the name and email from users where active=1","referenceSolution":"SELECT name, email FROM users WHERE active = 1;","topic":"queries"}]}

2) HTML/Frontend:
{"questions":[{"id":"q1","type":"multiple_choice","question":"What does the HTML <main> element represent?","options":["The main content of a document","A navigation region","A footer","A sidebar"],"correctIndex":0,"topic":"semantics"},{"id":"q2","type":"coding","prompt":"Create an accessible HTML form with a labeled input for email","referenceSolution":"<form><label for=\"email\">Email</label><input id=\"email\" type=\"email\" /></form>","topic":"forms"}]}

3) DevOps:
{"questions":[{"id":"q1","type":"multiple_choice","question":"Which file is commonly used to define a Docker image build process?","options":["Dockerfile","docker-compose.yml","Jenkinsfile",".env"],"correctIndex":0,"topic":"containers"},{"id":"q2","type":"coding","prompt":"Write a minimal Dockerfile for a Node.js app using 'node:18' base image","referenceSolution":"FROM node:18\nWORKDIR /app\nCOPY package*.json ./\nRUN npm install\nCOPY . .\nCMD [\"node\", \"index.js\"]","topic":"containers"}]}
"#;

const DIVERSITY_INSTRUCTION: &str = "DIVERSITY_INSTRUCTION: Produce a varied set of questions; avoid repeating the same template more than twice. Vary the cognitive level (knowledge, application, analysis). Include a small \"topic\" field for each question (e.g. \"arrays\", \"strings\", \"closures\"). Do not sacrifice the JSON-only requirement.";

/// Items to request for a final batch of `count`: twice as many, capped.
pub fn generation_count(count: usize) -> usize {
    count.saturating_mul(2).max(count).min(MAX_GENERATION_COUNT)
}

fn target_description(req: &GenerationRequest) -> String {
    let mut out = format!("the language '{}'", req.language);
    if let Some(role) = req.role.as_deref().filter(|r| !r.trim().is_empty()) {
        out.push_str(&format!(", role: '{}'", role));
    }
    if let Some(framework) = req.framework.as_deref().filter(|f| !f.trim().is_empty()) {
        out.push_str(&format!(", framework: '{}'", framework));
    }
    if !req.topic.trim().is_empty() {
        out.push_str(&format!(", topic: '{}'", req.topic));
    }
    out
}

/// Generation prompts asking for `item_count` questions; everything else follows `req`.
pub fn generation(req: &GenerationRequest, item_count: usize) -> Prompts {
    let user = format!(
        "Generate exactly {count} interview questions focused on {target}. Difficulty: {difficulty}.\n\n\
STRONG REQUIREMENTS:\n\
- Produce JSON only, with top-level {{ \"questions\": [...] }} and nothing else. Do NOT include any explanation or extra text.\n\
- Questions MUST be relevant to the requested language and role. If language is 'html' or role is 'database', DO NOT include code snippets or questions about unrelated languages (for example: JavaScript, Python, Java); use SQL for database tasks.\n\
- Mix multiple-choice (type: \"multiple_choice\") and coding/markup/SQL tasks (type: \"coding\").\n\
- For multiple-choice, include: {{ \"type\": \"multiple_choice\", \"question\": string, \"options\": [strings], \"correctIndex\": number }}\n\
- For coding tasks, include: {{ \"type\": \"coding\", \"prompt\": string, \"referenceSolution\": string }}\n\n\
EXAMPLES FOLLOW (use these as templates):\n\n{examples}\n\
Now produce the JSON with {count} questions and nothing else.\n\n{diversity}",
        count = item_count,
        target = target_description(req),
        difficulty = req.difficulty,
        examples = FEW_SHOT_EXAMPLES,
        diversity = DIVERSITY_INSTRUCTION,
    );

    Prompts {
        system: GENERATION_SYSTEM.to_string(),
        user,
    }
}

/// One-shot repair prompt naming the violations found in the previous batch.
pub fn corrective(req: &GenerationRequest, problems: &[Problem]) -> Prompts {
    let role = req.role.as_deref().unwrap_or("unspecified");
    let violations = problems
        .iter()
        .map(|p| format!("- {}: {}", p.id.as_deref().unwrap_or("(no id)"), p.reason))
        .collect::<Vec<_>>()
        .join("\n");
    let example = serde_json::json!({
        "questions": [{
            "id": "q1",
            "type": "multiple_choice",
            "question": "Example",
            "options": ["a", "b"],
            "correctIndex": 0
        }]
    });

    let user = format!(
        "The previous response included questions that are not specific to the requested language ({language}) or role ({role}).\n\
Flagged questions:\n{violations}\n\n\
Please produce JSON only with the same schema: exactly {count} questions, and make sure ALL questions are strictly about the requested language and role. \
Do not use syntax from any other language. Example for {language}: {example}",
        language = req.language,
        role = role,
        violations = violations,
        count = req.count,
        example = example,
    );

    Prompts {
        system: CORRECTIVE_SYSTEM.to_string(),
        user,
    }
}

pub fn grading(prompt: &str, reference_solution: &str, submission: &str) -> Prompts {
    let user = format!(
        "You are an expert programming interviewer. Grade the student's submission.\n---\nQuestion prompt:\n{}\n---\nReference solution:\n{}\n---\nStudent submission:\n{}\n---\nProvide a JSON response only with shape: {{\n  \"score\": number (0-100),\n  \"verdict\": \"pass\"|\"partial\"|\"fail\",\n  \"feedback\": string\n}}",
        prompt, reference_solution, submission
    );
    Prompts {
        system: GRADING_SYSTEM.to_string(),
        user,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn over_generation_doubles_and_caps() {
        assert_eq!(generation_count(1), 2);
        assert_eq!(generation_count(3), 6);
        assert_eq!(generation_count(25), 50);
        assert_eq!(generation_count(40), 50);
    }

    #[test]
    fn generation_prompt_embeds_request() {
        let req = GenerationRequest::new("sql", 3)
            .with_role("database")
            .with_framework("postgres")
            .with_topic("joins");
        let prompts = generation(&req, generation_count(req.count));
        assert!(prompts.system.contains("{ \"questions\": [ ... ] }"));
        assert!(prompts.user.starts_with("Generate exactly 6 interview questions"));
        assert!(prompts.user.contains("the language 'sql', role: 'database', framework: 'postgres', topic: 'joins'"));
        assert!(prompts.user.contains("Database (SQL)"));
        assert!(prompts.user.contains("HTML/Frontend"));
        assert!(prompts.user.contains("DIVERSITY_INSTRUCTION"));
    }

    #[test]
    fn only_the_count_changes_with_over_generation() {
        let req = GenerationRequest::new("python", 4);
        let a = generation(&req, 4);
        let b = generation(&req, 8);
        assert_eq!(a.system, b.system);
        assert_eq!(a.user.replace("4 questions", "8 questions").replace("exactly 4", "exactly 8"), b.user);
    }

    #[test]
    fn corrective_prompt_names_violations() {
        let req = GenerationRequest::new("sql", 3).with_role("database");
        let problems = vec![Problem {
            id: Some("q4".into()),
            reason: "contains foreign-language tokens".into(),
        }];
        let prompts = corrective(&req, &problems);
        assert!(prompts.user.contains("(sql) or role (database)"));
        assert!(prompts.user.contains("- q4: contains foreign-language tokens"));
        assert!(prompts.user.contains("exactly 3 questions"));
    }

    #[test]
    fn grading_prompt_embeds_all_parts() {
        let prompts = grading("Reverse a list", "xs[::-1]", "list(reversed(xs))");
        assert!(prompts.user.contains("Question prompt:\nReverse a list"));
        assert!(prompts.user.contains("Reference solution:\nxs[::-1]"));
        assert!(prompts.user.contains("Student submission:\nlist(reversed(xs))"));
    }
}
