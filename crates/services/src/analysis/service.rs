use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use exam_core::model::{ResultRow, SubjectMarks, Topic};
use storage::tabular;

use super::chart::RadarChartRenderer;
use super::sentiment::{SentimentModel, SentimentTally, VaderModel};
use crate::error::AnalysisError;

/// One ranked entry in a subject report.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentStanding {
    pub name: String,
    pub percentage: f64,
    pub marks: SubjectMarks,
    pub chart: PathBuf,
}

/// Everything a per-subject score page needs: standings ordered best-first,
/// the sentiment tally over the whole dataset, and one chart per student.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectReport {
    pub subject: Topic,
    pub standings: Vec<StudentStanding>,
    pub sentiment: SentimentTally,
}

/// Order records by descending percentage for a subject.
///
/// Records whose subject was not attempted or has a zero total carry no
/// percentage and are excluded before any division happens. The sort is
/// stable, so ties keep their dataset order.
#[must_use]
pub fn rank(rows: &[ResultRow], subject: Topic) -> Vec<ResultRow> {
    let mut ranked: Vec<ResultRow> = rows
        .iter()
        .filter(|row| row.percentage(subject).is_some())
        .cloned()
        .collect();
    ranked.sort_by(|a, b| {
        let pa = a.percentage(subject);
        let pb = b.percentage(subject);
        pb.partial_cmp(&pa).unwrap_or(Ordering::Equal)
    });
    ranked
}

/// Consumer-stage engine: loads a dataset, ranks students per subject,
/// classifies feedback, and renders per-student chart artifacts.
pub struct AnalysisService {
    sentiment: Arc<dyn SentimentModel>,
    charts: RadarChartRenderer,
}

impl AnalysisService {
    #[must_use]
    pub fn new(sentiment: Arc<dyn SentimentModel>, chart_dir: impl Into<PathBuf>) -> Self {
        Self {
            sentiment,
            charts: RadarChartRenderer::new(chart_dir),
        }
    }

    /// Engine with the default VADER-backed sentiment collaborator.
    #[must_use]
    pub fn with_vader(chart_dir: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(VaderModel::new()), chart_dir)
    }

    /// Read a store file or uploaded dataset into rows.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::Dataset` for unsupported extensions and
    /// undecodable files.
    pub fn load_dataset(&self, path: &Path) -> Result<Vec<ResultRow>, AnalysisError> {
        Ok(tabular::read_dataset(path)?)
    }

    /// Tally feedback polarity over a corpus.
    pub fn classify_feedback<'a>(
        &self,
        feedbacks: impl IntoIterator<Item = &'a str>,
    ) -> SentimentTally {
        let mut tally = SentimentTally::default();
        for text in feedbacks {
            tally.observe(self.sentiment.compound(text));
        }
        tally
    }

    /// Assemble the report behind a per-subject score page.
    ///
    /// Sentiment is tallied over every row's feedback, while standings and
    /// charts cover only the rows rankable for `subject`. Chart radii are
    /// the raw scores (not percentages); a subject the student never took
    /// draws at zero.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::Chart` if an artifact cannot be rendered.
    pub fn subject_report(
        &self,
        rows: &[ResultRow],
        subject: Topic,
    ) -> Result<SubjectReport, AnalysisError> {
        let sentiment = self.classify_feedback(rows.iter().map(|row| row.feedback.as_str()));

        let mut standings = Vec::new();
        for row in rank(rows, subject) {
            let Some(percentage) = row.percentage(subject) else {
                continue;
            };
            let axes: Vec<(&str, f64)> = Topic::ALL
                .iter()
                .map(|topic| {
                    (
                        topic.label(),
                        f64::from(row.raw_score(*topic).unwrap_or(0)),
                    )
                })
                .collect();
            let chart = self.charts.render(&row.name, &axes)?;
            standings.push(StudentStanding {
                name: row.name.clone(),
                percentage,
                marks: row.marks(subject),
                chart,
            });
        }

        Ok(SubjectReport {
            subject,
            standings,
            sentiment,
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
