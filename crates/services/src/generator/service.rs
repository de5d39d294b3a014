use std::sync::Arc;
use std::time::Duration;

use exam_core::model::{QUESTIONS_PER_TOPIC, QuestionSet, Topic};
use rand::Rng;

use super::model_client::{ModelError, QuestionModel};
use super::parser::parse_reply;
use crate::error::GeneratorError;

const SYSTEM_PROMPT: &str = "You are an aptitude test question generator.";

/// Bounded backoff for rate-limited model calls.
///
/// The first wait matches the collaborator's advertised 60-second window and
/// doubles per attempt, with uniform jitter so parallel workers do not retry
/// in lockstep. Once `max_attempts` calls have been rate limited the
/// generator gives up with a definitive error instead of looping forever.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(60),
            max_jitter: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Wait before retry number `attempt` (zero-based).
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        let backoff = self.base_delay.saturating_mul(factor);
        let jitter_ms = self.max_jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return backoff;
        }
        let jitter = rand::rng().random_range(0..=jitter_ms);
        backoff + Duration::from_millis(jitter)
    }
}

/// Generates a topic's questions and answer key via the model collaborator.
pub struct QuestionService {
    model: Arc<dyn QuestionModel>,
    retry: RetryPolicy,
}

impl QuestionService {
    #[must_use]
    pub fn new(model: Arc<dyn QuestionModel>) -> Self {
        Self {
            model,
            retry: RetryPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Generate `QUESTIONS_PER_TOPIC` question/answer pairs for a topic.
    ///
    /// The returned set always has matching question and answer counts;
    /// callers can index the key positionally without re-validating.
    ///
    /// # Errors
    ///
    /// Returns `GeneratorError::RateLimitExhausted` when every attempt was
    /// rate limited, `GeneratorError::Malformed` when the reply does not
    /// parse into the requested pairs, and `GeneratorError::Model` for other
    /// transport failures.
    pub async fn generate(&self, topic: Topic) -> Result<QuestionSet, GeneratorError> {
        let user_prompt = format!(
            "Generate {QUESTIONS_PER_TOPIC} aptitude questions for {topic} and provide \
             correct answers. Structure the response as 'Question <number>: <question>' \
             and 'Answer: <answer>' for each question."
        );

        let mut attempt = 0;
        let reply = loop {
            match self.model.complete(SYSTEM_PROMPT, &user_prompt).await {
                Ok(reply) => break reply,
                Err(ModelError::RateLimited) => {
                    attempt += 1;
                    if attempt >= self.retry.max_attempts {
                        return Err(GeneratorError::RateLimitExhausted { attempts: attempt });
                    }
                    tokio::time::sleep(self.retry.delay_for(attempt - 1)).await;
                }
                Err(other) => return Err(other.into()),
            }
        };

        Ok(parse_reply(topic, &reply, QUESTIONS_PER_TOPIC)?)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Scripted model that pops one outcome per call.
    struct ScriptedModel {
        outcomes: Mutex<Vec<Result<String, ModelError>>>,
        calls: Mutex<u32>,
    }

    impl ScriptedModel {
        fn new(mut outcomes: Vec<Result<String, ModelError>>) -> Self {
            outcomes.reverse();
            Self {
                outcomes: Mutex::new(outcomes),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl QuestionModel for ScriptedModel {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, ModelError> {
            *self.calls.lock().unwrap() += 1;
            self.outcomes
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(ModelError::EmptyReply))
        }
    }

    fn well_formed_reply() -> String {
        (1..=5)
            .map(|i| format!("Question {i}: What is {i}+{i}?\nAnswer: {}\n", i + i))
            .collect()
    }

    fn fast_retry(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
            max_jitter: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn generates_matching_questions_and_answers() {
        let model = Arc::new(ScriptedModel::new(vec![Ok(well_formed_reply())]));
        let service = QuestionService::new(model.clone());

        let set = service.generate(Topic::Arithmetic).await.unwrap();
        assert_eq!(set.questions().len(), 5);
        assert_eq!(set.answers().len(), 5);
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_after_rate_limit_then_succeeds() {
        let model = Arc::new(ScriptedModel::new(vec![
            Err(ModelError::RateLimited),
            Err(ModelError::RateLimited),
            Ok(well_formed_reply()),
        ]));
        let service = QuestionService::new(model.clone()).with_retry(fast_retry(5));

        let set = service.generate(Topic::Algebra).await.unwrap();
        assert_eq!(set.len(), 5);
        assert_eq!(model.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_bounded_attempts() {
        let model = Arc::new(ScriptedModel::new(vec![
            Err(ModelError::RateLimited),
            Err(ModelError::RateLimited),
            Err(ModelError::RateLimited),
        ]));
        let service = QuestionService::new(model.clone()).with_retry(fast_retry(3));

        let err = service.generate(Topic::Geometry).await.unwrap_err();
        assert!(matches!(
            err,
            GeneratorError::RateLimitExhausted { attempts: 3 }
        ));
        assert_eq!(model.calls(), 3);
    }

    #[tokio::test]
    async fn non_rate_limit_failures_propagate_immediately() {
        let model = Arc::new(ScriptedModel::new(vec![Err(ModelError::HttpStatus(
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        ))]));
        let service = QuestionService::new(model.clone()).with_retry(fast_retry(5));

        let err = service.generate(Topic::Arithmetic).await.unwrap_err();
        assert!(matches!(err, GeneratorError::Model(_)));
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn malformed_reply_is_rejected() {
        let model = Arc::new(ScriptedModel::new(vec![Ok(
            "Question 1: only one?\nAnswer: yes\n".to_string(),
        )]));
        let service = QuestionService::new(model);

        let err = service.generate(Topic::Arithmetic).await.unwrap_err();
        assert!(matches!(err, GeneratorError::Malformed(_)));
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_secs(60),
            max_jitter: Duration::ZERO,
        };
        assert_eq!(policy.delay_for(0), Duration::from_secs(60));
        assert_eq!(policy.delay_for(1), Duration::from_secs(120));
        assert_eq!(policy.delay_for(2), Duration::from_secs(240));
    }
}
