use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use exam_core::Clock;
use storage::repository::{Storage, StorageError};

use crate::analysis::AnalysisService;
use crate::generator::{ChatCompletionsModel, QuestionModel, QuestionService};
use crate::results_service::ResultsService;
use crate::sessions::{ExamService, SessionRegistry};

/// Assembles the platform services over a storage backend and a model.
#[derive(Clone)]
pub struct AppServices {
    registry: Arc<SessionRegistry>,
    questions: Arc<QuestionService>,
    results: Arc<ResultsService>,
    exam: Arc<ExamService>,
    analysis: Arc<AnalysisService>,
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error("EXAM_AI_API_KEY is not set; the question model is unavailable")]
    ModelNotConfigured,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AppServices {
    #[must_use]
    pub fn new(
        model: Arc<dyn QuestionModel>,
        storage: Storage,
        clock: Clock,
        chart_dir: impl Into<PathBuf>,
    ) -> Self {
        let registry = Arc::new(SessionRegistry::new(clock));
        let questions = Arc::new(QuestionService::new(model));
        let results = Arc::new(ResultsService::new(Arc::clone(&storage.results)));
        let exam = Arc::new(ExamService::new(
            Arc::clone(&questions),
            Arc::clone(&registry),
            Arc::clone(&results),
        ));
        let analysis = Arc::new(AnalysisService::with_vader(chart_dir));

        Self {
            registry,
            questions,
            results,
            exam,
            analysis,
        }
    }

    /// Build services from the environment: model config from `EXAM_AI_*`
    /// variables, storage backend picked from the store path's extension.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::ModelNotConfigured` when no API key is
    /// set, and storage errors for an unusable store path.
    pub fn from_env(
        store_path: &Path,
        chart_dir: impl Into<PathBuf>,
    ) -> Result<Self, AppServicesError> {
        let model =
            ChatCompletionsModel::from_env().ok_or(AppServicesError::ModelNotConfigured)?;
        let storage = Storage::open(store_path)?;
        Ok(Self::new(
            Arc::new(model),
            storage,
            Clock::default_clock(),
            chart_dir,
        ))
    }

    #[must_use]
    pub fn registry(&self) -> Arc<SessionRegistry> {
        Arc::clone(&self.registry)
    }

    #[must_use]
    pub fn questions(&self) -> Arc<QuestionService> {
        Arc::clone(&self.questions)
    }

    #[must_use]
    pub fn results(&self) -> Arc<ResultsService> {
        Arc::clone(&self.results)
    }

    #[must_use]
    pub fn exam(&self) -> Arc<ExamService> {
        Arc::clone(&self.exam)
    }

    #[must_use]
    pub fn analysis(&self) -> Arc<AnalysisService> {
        Arc::clone(&self.analysis)
    }
}
