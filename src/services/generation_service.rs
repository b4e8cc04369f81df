use crate::error::{Error, Result};
use crate::models::generation::{GenerationOutput, GenerationRequest};
use crate::models::question::Question;
use crate::services::completion_client::{CompletionClient, SamplingConfig};
use crate::services::dedup_service::dedupe;
use crate::services::mock_service;
use crate::services::normalizer::{NormalizeMode, Normalizer};
use crate::services::prompt_builder::{self, generation_count};
use crate::services::relevance_validator::{validate, Problem};
use crate::services::response_parser::{parse, question_items};
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use std::sync::Arc;

/// Retry budgets and normalization behaviour for one generation run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationPolicy {
    /// Completion calls allowed while filling the pool.
    pub batch_attempts: u32,
    /// Repair calls allowed after relevance validation fails.
    pub corrective_retries: u32,
    pub normalize_mode: NormalizeMode,
}

impl Default for GenerationPolicy {
    fn default() -> Self {
        Self {
            batch_attempts: 2,
            corrective_retries: 1,
            normalize_mode: NormalizeMode::Strict,
        }
    }
}

#[derive(Clone)]
pub struct GenerationService {
    client: Arc<dyn CompletionClient>,
    policy: GenerationPolicy,
    mock: bool,
}

enum Phase {
    Batch { attempt: u32 },
    Review,
    Correct { problems: Vec<Problem> },
}

/// Per-request accumulation state. Nothing here outlives a single `generate` call.
struct Run {
    normalizer: Normalizer,
    pool: Vec<Question>,
    seen_ids: HashSet<String>,
    assistant: Option<String>,
    successful_calls: u32,
    last_error: Option<Error>,
    corrections_sent: u32,
}

impl Run {
    fn new(mode: NormalizeMode) -> Self {
        Self {
            normalizer: Normalizer::new(mode),
            pool: Vec::new(),
            seen_ids: HashSet::new(),
            assistant: None,
            successful_calls: 0,
            last_error: None,
            corrections_sent: 0,
        }
    }

    /// Normalizes raw items, renaming ids that collide with ones already seen in this run.
    fn normalize_items(&mut self, items: &[JsonValue], language: &str) -> Vec<Question> {
        let mut out = Vec::with_capacity(items.len());
        for raw in items {
            let Some(mut q) = self.normalizer.normalize(raw, language) else {
                continue;
            };
            if self.seen_ids.contains(&q.id) {
                q.id = self.normalizer.fresh_id(q.question_type());
            }
            self.seen_ids.insert(q.id.clone());
            out.push(q);
        }
        out
    }
}

impl GenerationService {
    pub fn new(client: Arc<dyn CompletionClient>, policy: GenerationPolicy) -> Self {
        Self {
            client,
            policy,
            mock: false,
        }
    }

    /// Serves canned questions instead of calling the completion service.
    pub fn with_mock(mut self, mock: bool) -> Self {
        self.mock = mock;
        self
    }

    pub fn policy(&self) -> GenerationPolicy {
        self.policy
    }

    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationOutput> {
        if request.count == 0 {
            return Err(Error::BadRequest("count must be at least 1".to_string()));
        }
        if self.mock {
            tracing::info!(language = %request.language, count = request.count, "Serving mock questions");
            return Ok(GenerationOutput {
                questions: mock_service::generate_mock_questions(request),
                assistant: None,
            });
        }

        let needed = request.count;
        let requested = generation_count(needed);
        let batch_prompts = prompt_builder::generation(request, requested);
        tracing::info!(
            language = %request.language,
            role = ?request.role,
            count = needed,
            requested,
            "Starting question generation"
        );

        let mut run = Run::new(self.policy.normalize_mode);
        let mut phase = Phase::Batch { attempt: 1 };

        loop {
            phase = match phase {
                Phase::Batch { attempt } => {
                    match self
                        .client
                        .complete(&batch_prompts.system, &batch_prompts.user, SamplingConfig::generation())
                        .await
                    {
                        Ok(content) => {
                            run.successful_calls += 1;
                            let parsed = content.as_deref().and_then(parse);
                            match parsed.as_ref().and_then(question_items) {
                                Some(items) => {
                                    let batch = run.normalize_items(items, &request.language);
                                    tracing::info!(
                                        attempt,
                                        raw = items.len(),
                                        accepted = batch.len(),
                                        "Batch received"
                                    );
                                    run.pool.extend(batch);
                                }
                                None => {
                                    tracing::warn!(attempt, "Batch had no parseable questions");
                                }
                            }
                            if content.is_some() {
                                run.assistant = content;
                            }
                        }
                        Err(err @ Error::CredentialMissing) => return Err(err),
                        Err(err) => {
                            tracing::warn!(attempt, error = %err, "Batch request failed");
                            run.last_error = Some(err);
                        }
                    }

                    let unique = dedupe(run.pool.clone(), needed).len();
                    if attempt < self.policy.batch_attempts && unique < needed {
                        Phase::Batch {
                            attempt: attempt + 1,
                        }
                    } else {
                        Phase::Review
                    }
                }

                Phase::Review => {
                    let mut unique = dedupe(std::mem::take(&mut run.pool), needed);
                    if unique.is_empty() {
                        if run.successful_calls == 0 {
                            if let Some(err) = run.last_error.take() {
                                tracing::error!(error = %err, "Every batch failed");
                                return Err(err);
                            }
                        }
                        tracing::warn!("No valid questions generated after all attempts");
                        return Ok(GenerationOutput {
                            questions: Vec::new(),
                            assistant: run.assistant,
                        });
                    }

                    let report = validate(&unique, &request.language, request.role.as_deref());
                    if report.ok {
                        unique.truncate(needed);
                        tracing::info!(returned = unique.len(), "Generation succeeded");
                        return Ok(GenerationOutput {
                            questions: unique,
                            assistant: run.assistant,
                        });
                    }
                    if run.corrections_sent >= self.policy.corrective_retries {
                        return Err(Error::RelevanceValidationFailed {
                            assistant: run.assistant,
                            problems: report.problems,
                            questions: unique,
                        });
                    }
                    Phase::Correct {
                        problems: report.problems,
                    }
                }

                Phase::Correct { problems } => {
                    run.corrections_sent += 1;
                    tracing::warn!(
                        flagged = problems.len(),
                        retry = run.corrections_sent,
                        "Issuing corrective retry"
                    );
                    let prompts = prompt_builder::corrective(request, &problems);
                    let content = self
                        .client
                        .complete(&prompts.system, &prompts.user, SamplingConfig::corrective())
                        .await?;

                    let parsed = content.as_deref().and_then(parse);
                    let Some(items) = parsed.as_ref().and_then(question_items) else {
                        tracing::error!("Corrective retry was not parseable");
                        return Err(Error::UnparseableAfterRetry { assistant: content });
                    };

                    // Ids from the rejected batch no longer matter.
                    run.seen_ids.clear();
                    let mut unique = dedupe(run.normalize_items(items, &request.language), needed);
                    let report = validate(&unique, &request.language, request.role.as_deref());
                    if report.ok {
                        unique.truncate(needed);
                        tracing::info!(returned = unique.len(), "Corrective retry succeeded");
                        return Ok(GenerationOutput {
                            questions: unique,
                            assistant: content,
                        });
                    }
                    if run.corrections_sent >= self.policy.corrective_retries {
                        tracing::error!(flagged = report.problems.len(), "Corrective retry still off-topic");
                        return Err(Error::RelevanceValidationFailed {
                            assistant: content,
                            problems: report.problems,
                            questions: unique,
                        });
                    }
                    Phase::Correct {
                        problems: report.problems,
                    }
                }
            };
        }
    }
}
