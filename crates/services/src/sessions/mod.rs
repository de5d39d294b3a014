//! Live exam sessions: registry, scoring, and the finalize flow.

mod registry;
mod service;

pub use registry::{DEFAULT_SESSION_TTL_MINUTES, SessionRegistry};
pub use service::ExamService;
