//! Question generation against the external language-model collaborator.

mod model_client;
mod parser;
mod service;

pub use model_client::{ChatCompletionsModel, ChatModelConfig, ModelError, QuestionModel};
pub use parser::{ParseReplyError, parse_reply};
pub use service::{QuestionService, RetryPolicy};
