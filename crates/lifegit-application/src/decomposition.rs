//! AI-assisted task decomposition pipeline.
//!
//! Turns a free-text goal into a structured, time-scoped task plan by
//! prompting the completion service for a JSON task breakdown. The
//! pipeline owns the retry/backoff policy and the manual fallback: a
//! transient service outage must never block goal creation, so
//! [`TaskDecompositionPipeline::generate`] always returns a plan.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use lifegit_core::completion::{CompletionError, CompletionService};
use lifegit_core::plan::{TaskItem, TaskPlan, TimeScope};
use serde::Deserialize;

/// Sanity bound on the number of tasks accepted from the service.
///
/// The prompt deliberately does not cap the task count; oversized plans
/// are rejected post-hoc and classified as an invalid response.
const MAX_TASKS: usize = 50;

/// Retry behavior for completion requests.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts per generation request, including the first.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles for each further attempt.
    pub base_delay: Duration,
    /// Deadline for a single completion call.
    pub request_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// The decomposition pipeline.
///
/// One instance per service graph; the attempt counter is state of the
/// instance (not ambient), stored for observation and reset to zero after
/// any success.
pub struct TaskDecompositionPipeline {
    completion: Arc<dyn CompletionService>,
    policy: RetryPolicy,
    attempts: AtomicU32,
}

impl TaskDecompositionPipeline {
    /// Creates a pipeline with the default retry policy.
    pub fn new(completion: Arc<dyn CompletionService>) -> Self {
        Self::with_policy(completion, RetryPolicy::default())
    }

    /// Creates a pipeline with a custom retry policy.
    pub fn with_policy(completion: Arc<dyn CompletionService>, policy: RetryPolicy) -> Self {
        Self {
            completion,
            policy,
            attempts: AtomicU32::new(0),
        }
    }

    /// The attempt count of the generation request currently or most
    /// recently in flight. Zero after a success.
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Generates a task plan for a goal. Never fails.
    ///
    /// Retryable service failures are retried with the same prompt and an
    /// increasing delay, up to the policy's attempt bound; permanent
    /// failures and exhausted retries yield the deterministic manual
    /// fallback plan (`is_ai_generated = false`). The caller only observes
    /// latency and the `is_ai_generated` flag.
    pub async fn generate(
        &self,
        branch_id: &str,
        title: &str,
        description: &str,
        timeframe: Option<&str>,
    ) -> TaskPlan {
        let prompt = build_prompt(title, description, timeframe);

        for attempt in 1..=self.policy.max_attempts {
            self.attempts.store(attempt, Ordering::SeqCst);
            match self.attempt(&prompt).await {
                Ok(response) => {
                    self.attempts.store(0, Ordering::SeqCst);
                    return self.ai_plan(branch_id, response);
                }
                Err(err) if !err.is_retryable() => {
                    tracing::warn!("task decomposition failed permanently: {err}");
                    break;
                }
                Err(err) => {
                    tracing::warn!(
                        "task decomposition attempt {attempt}/{} failed: {err}",
                        self.policy.max_attempts
                    );
                    if attempt < self.policy.max_attempts {
                        tokio::time::sleep(self.backoff_delay(attempt)).await;
                    }
                }
            }
        }

        tracing::info!("falling back to a manual task plan for '{title}'");
        self.fallback_plan(branch_id, title, timeframe)
    }

    async fn attempt(&self, prompt: &str) -> Result<PlanResponse, CompletionError> {
        let response = match tokio::time::timeout(
            self.policy.request_timeout,
            self.completion.complete(prompt),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => return Err(CompletionError::Timeout(self.policy.request_timeout)),
        };
        parse_plan(&response)
    }

    fn backoff_delay(&self, attempt: u32) -> Duration {
        self.policy.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }

    fn ai_plan(&self, branch_id: &str, mut response: PlanResponse) -> TaskPlan {
        // Honor the service's ordering where it supplied one; entries
        // without an index keep their document position.
        for (position, entry) in response.tasks.iter_mut().enumerate() {
            entry.order_index.get_or_insert(position);
        }
        response.tasks.sort_by_key(|entry| entry.order_index);

        let tasks = response
            .tasks
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                TaskItem::new(
                    entry.title,
                    entry.description,
                    entry.estimated_minutes,
                    TimeScope::parse_lenient(&entry.time_scope),
                    index,
                    true,
                )
            })
            .collect();

        TaskPlan::new(branch_id, response.total_duration, true, tasks)
    }

    fn fallback_plan(&self, branch_id: &str, title: &str, timeframe: Option<&str>) -> TaskPlan {
        let task = TaskItem::new(
            "Outline your plan",
            format!(
                "A plan for '{title}' could not be generated automatically. \
                 Break the goal into concrete tasks and add them here."
            ),
            30,
            TimeScope::Daily,
            0,
            false,
        );
        TaskPlan::new(branch_id, timeframe.unwrap_or("to be planned"), false, vec![task])
    }
}

fn build_prompt(title: &str, description: &str, timeframe: Option<&str>) -> String {
    let timeframe_line = match timeframe {
        Some(t) => format!("Target timeframe: {t}\n"),
        None => String::new(),
    };
    format!(
        "You are a goal-planning assistant. Break the following personal goal \
         into an ordered list of concrete tasks.\n\
         \n\
         Goal: {title}\n\
         Details: {description}\n\
         {timeframe_line}\
         \n\
         Respond with JSON only, no prose, matching exactly:\n\
         {{\n\
         \x20 \"totalDuration\": \"<overall duration estimate>\",\n\
         \x20 \"tasks\": [\n\
         \x20   {{\n\
         \x20     \"title\": \"<short task title>\",\n\
         \x20     \"description\": \"<what to do>\",\n\
         \x20     \"estimatedMinutes\": <positive integer>,\n\
         \x20     \"timeScope\": \"daily\" | \"weekly\" | \"monthly\",\n\
         \x20     \"orderIndex\": <integer, 0-based>\n\
         \x20   }}\n\
         \x20 ]\n\
         }}"
    )
}

/// Parses and validates a completion response into a plan document.
///
/// Any structural problem classifies as `InvalidResponse` so the retry
/// loop treats it like a transient service condition.
fn parse_plan(text: &str) -> Result<PlanResponse, CompletionError> {
    let body = strip_code_fences(text);
    let response: PlanResponse = serde_json::from_str(body)
        .map_err(|err| CompletionError::InvalidResponse(err.to_string()))?;

    if response.tasks.is_empty() {
        return Err(CompletionError::InvalidResponse(
            "plan contains no tasks".to_string(),
        ));
    }
    if response.tasks.len() > MAX_TASKS {
        return Err(CompletionError::InvalidResponse(format!(
            "plan contains {} tasks (limit {MAX_TASKS})",
            response.tasks.len()
        )));
    }
    for entry in &response.tasks {
        if entry.title.trim().is_empty() {
            return Err(CompletionError::InvalidResponse(
                "task with empty title".to_string(),
            ));
        }
        if entry.estimated_minutes == 0 {
            return Err(CompletionError::InvalidResponse(format!(
                "task '{}' has no duration estimate",
                entry.title
            )));
        }
    }
    Ok(response)
}

/// Completion services often wrap JSON in a markdown code fence.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    inner.trim()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlanResponse {
    #[serde(default)]
    total_duration: String,
    tasks: Vec<TaskEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskEntry {
    title: String,
    #[serde(default)]
    description: String,
    estimated_minutes: u32,
    #[serde(default)]
    time_scope: String,
    #[serde(default)]
    order_index: Option<usize>,
}
