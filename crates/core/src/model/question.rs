use thiserror::Error;

use crate::model::Topic;

/// Number of question/answer pairs requested per topic.
pub const QUESTIONS_PER_TOPIC: usize = 5;

//
// ─── QUESTION SET ──────────────────────────────────────────────────────────────
//

/// One topic's generated material: questions and their answer key, in order.
///
/// Invariant: `questions` and `answers` are the same nonzero length, so the
/// answer at position `i` always belongs to the question at position `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSet {
    topic: Topic,
    questions: Vec<String>,
    answers: Vec<String>,
}

impl QuestionSet {
    /// Build a question set, enforcing the paired-length invariant.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSetError::CountMismatch` if the two sequences differ
    /// in length, or `QuestionSetError::Empty` if there are no pairs at all.
    pub fn new(
        topic: Topic,
        questions: Vec<String>,
        answers: Vec<String>,
    ) -> Result<Self, QuestionSetError> {
        if questions.len() != answers.len() {
            return Err(QuestionSetError::CountMismatch {
                questions: questions.len(),
                answers: answers.len(),
            });
        }
        if questions.is_empty() {
            return Err(QuestionSetError::Empty);
        }
        Ok(Self {
            topic,
            questions,
            answers,
        })
    }

    #[must_use]
    pub fn topic(&self) -> Topic {
        self.topic
    }

    #[must_use]
    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    #[must_use]
    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    /// Number of question/answer pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Split into the question texts and the answer key.
    #[must_use]
    pub fn into_parts(self) -> (Vec<String>, Vec<String>) {
        (self.questions, self.answers)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuestionSetError {
    #[error("question/answer counts differ: {questions} questions, {answers} answers")]
    CountMismatch { questions: usize, answers: usize },

    #[error("question set has no pairs")]
    Empty,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
