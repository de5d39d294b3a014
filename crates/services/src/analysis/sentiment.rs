use vader_sentiment::SentimentIntensityAnalyzer;

/// Compound scores at or above this classify as positive.
pub const POSITIVE_THRESHOLD: f64 = 0.05;
/// Compound scores at or below this classify as negative.
pub const NEGATIVE_THRESHOLD: f64 = -0.05;

/// The surface the analysis needs from the sentiment collaborator: one
/// compound polarity score in `[-1, 1]` per feedback string.
pub trait SentimentModel: Send + Sync {
    fn compound(&self, text: &str) -> f64;
}

/// Lexicon-based analyzer backed by the VADER lexicon.
///
/// The analyzer borrows its lexicon from process-wide statics, so building
/// one per scoring call is cheap.
#[derive(Debug, Clone, Copy, Default)]
pub struct VaderModel;

impl VaderModel {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl SentimentModel for VaderModel {
    fn compound(&self, text: &str) -> f64 {
        SentimentIntensityAnalyzer::new()
            .polarity_scores(text)
            .get("compound")
            .copied()
            .unwrap_or(0.0)
    }
}

/// Positive/negative counts over a feedback corpus.
///
/// Scores strictly between the two thresholds count toward neither side;
/// the tallies deliberately need not sum to the corpus size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SentimentTally {
    pub positive: usize,
    pub negative: usize,
}

impl SentimentTally {
    /// Fold one compound score into the tally.
    pub fn observe(&mut self, compound: f64) {
        if compound >= POSITIVE_THRESHOLD {
            self.positive += 1;
        } else if compound <= NEGATIVE_THRESHOLD {
            self.negative += 1;
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_scores_classify_inclusively() {
        let mut tally = SentimentTally::default();
        tally.observe(0.05);
        tally.observe(-0.05);
        assert_eq!(tally, SentimentTally { positive: 1, negative: 1 });
    }

    #[test]
    fn neutral_scores_count_toward_neither_side() {
        let mut tally = SentimentTally::default();
        tally.observe(0.0);
        tally.observe(0.049);
        tally.observe(-0.049);
        assert_eq!(tally, SentimentTally::default());
    }

    #[test]
    fn vader_separates_praise_from_complaints() {
        let model = VaderModel::new();
        assert!(model.compound("great job, I loved it") >= POSITIVE_THRESHOLD);
        assert!(model.compound("terrible experience, awful questions") <= NEGATIVE_THRESHOLD);
    }
}
