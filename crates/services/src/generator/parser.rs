//! Parsing of free-text model replies into question/answer pairs.

use exam_core::model::{QuestionSet, QuestionSetError, Topic};
use thiserror::Error;

/// Marker opening a question line: `Question 1: ...`.
const QUESTION_MARKER: &str = "Question";
/// Marker opening an answer line: `Answer: ...`.
const ANSWER_MARKER: &str = "Answer:";

/// Ways a reply can fail to parse into the requested pairs.
///
/// The parser rejects malformed replies outright rather than silently
/// dropping lines and handing downstream scoring a mismatched key.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseReplyError {
    #[error("question {ordinal} was followed by another question before its answer")]
    DanglingQuestion { ordinal: usize },
    #[error("reply ended while awaiting the answer to question {ordinal}")]
    TrailingQuestion { ordinal: usize },
    #[error("expected {expected} question/answer pairs, found {found}")]
    WrongCount { expected: usize, found: usize },
    #[error(transparent)]
    Invalid(#[from] QuestionSetError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    AwaitingQuestion,
    AwaitingAnswer,
}

/// Parse a model reply into a question set with exactly `expected` pairs.
///
/// Each line is classified by its leading marker; unmarked lines are
/// discarded. The two-state machine alternates question → answer: an answer
/// line with no open question is ignored, while a second question line
/// before an answer — or a trailing unanswered question, or the wrong pair
/// count — rejects the reply.
///
/// A marked question line with no colon carries no extractable text and is
/// treated as unmarked.
///
/// # Errors
///
/// Returns `ParseReplyError` describing the first structural defect found.
pub fn parse_reply(
    topic: Topic,
    reply: &str,
    expected: usize,
) -> Result<QuestionSet, ParseReplyError> {
    let mut questions: Vec<String> = Vec::new();
    let mut answers: Vec<String> = Vec::new();
    let mut state = ParseState::AwaitingQuestion;

    for line in reply.lines() {
        let line = line.trim();
        if let Some(question) = question_text(line) {
            match state {
                ParseState::AwaitingQuestion => {
                    questions.push(question);
                    state = ParseState::AwaitingAnswer;
                }
                ParseState::AwaitingAnswer => {
                    return Err(ParseReplyError::DanglingQuestion {
                        ordinal: questions.len(),
                    });
                }
            }
        } else if let Some(answer) = answer_text(line) {
            match state {
                ParseState::AwaitingAnswer => {
                    answers.push(answer);
                    state = ParseState::AwaitingQuestion;
                }
                // Stray answer with no open question.
                ParseState::AwaitingQuestion => {}
            }
        }
    }

    if state == ParseState::AwaitingAnswer {
        return Err(ParseReplyError::TrailingQuestion {
            ordinal: questions.len(),
        });
    }
    if questions.len() != expected {
        return Err(ParseReplyError::WrongCount {
            expected,
            found: questions.len(),
        });
    }

    Ok(QuestionSet::new(topic, questions, answers)?)
}

/// Text after the first colon of a `Question ...:` line, if any.
fn question_text(line: &str) -> Option<String> {
    if !line.starts_with(QUESTION_MARKER) {
        return None;
    }
    let (_, rest) = line.split_once(':')?;
    Some(rest.trim().to_string())
}

/// Text after the marker colon of an `Answer:` line.
fn answer_text(line: &str) -> Option<String> {
    line.strip_prefix(ANSWER_MARKER)
        .map(|rest| rest.trim().to_string())
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
