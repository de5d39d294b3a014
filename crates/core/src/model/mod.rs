mod question;
mod result;
mod session;
mod topic;

pub use question::{QUESTIONS_PER_TOPIC, QuestionSet, QuestionSetError};
pub use result::{ResultRow, SubjectMarks, SubjectMarksParseError, TestResult, TestResultError};
pub use session::{ExamSession, SessionId, SessionIdParseError, SessionStateError};
pub use topic::{Topic, TopicParseError};
