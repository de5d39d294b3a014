//! Batch analysis over a results dataset: ranking, feedback sentiment, and
//! per-student chart artifacts.

mod chart;
mod sentiment;
mod service;

pub use chart::{ChartError, RadarChartRenderer};
pub use sentiment::{
    NEGATIVE_THRESHOLD, POSITIVE_THRESHOLD, SentimentModel, SentimentTally, VaderModel,
};
pub use service::{AnalysisService, StudentStanding, SubjectReport, rank};
