#![forbid(unsafe_code)]

pub mod analysis;
pub mod app_services;
pub mod error;
pub mod generator;
pub mod results_service;
pub mod sessions;

pub use exam_core::Clock;

pub use analysis::{AnalysisService, SentimentModel, SentimentTally, SubjectReport};
pub use app_services::{AppServices, AppServicesError};
pub use error::{AnalysisError, GeneratorError, ResultsError, SessionError};
pub use generator::{ChatCompletionsModel, ChatModelConfig, QuestionModel, QuestionService, RetryPolicy};
pub use results_service::ResultsService;
pub use sessions::{ExamService, SessionRegistry};
