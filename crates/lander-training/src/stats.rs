use lander_evaluator::fitness::Score;

/// Descriptive statistics of one generation's scores.
///
/// # Examples
///
/// ```
/// # use lander_training::stats::ScoreStats;
/// let stats = ScoreStats::new([50, 20, 40, 10, 30]).unwrap();
/// assert_eq!(stats.min, 10);
/// assert_eq!(stats.max, 50);
/// assert_eq!(stats.mean, 30.0);
/// assert_eq!(stats.median, 30);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreStats {
    /// The best (lowest) score.
    pub min: Score,
    /// The worst (highest) score.
    pub max: Score,
    pub mean: f64,
    /// The upper median of the scores.
    pub median: Score,
    /// The population standard deviation.
    pub std_dev: f64,
}

impl ScoreStats {
    /// Computes statistics from unsorted scores.
    ///
    /// Returns `None` if `scores` is empty.
    #[must_use]
    pub fn new<I>(scores: I) -> Option<Self>
    where
        I: IntoIterator<Item = Score>,
    {
        let mut scores = scores.into_iter().collect::<Vec<_>>();
        scores.sort_unstable();
        Self::from_sorted(&scores)
    }

    /// Computes statistics from scores already sorted in ascending order.
    ///
    /// Returns `None` if `sorted_scores` is empty.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_scores` is not sorted in ascending order.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_sorted(sorted_scores: &[Score]) -> Option<Self> {
        assert!(
            sorted_scores.is_sorted(),
            "scores must be sorted in ascending order"
        );

        let min = *sorted_scores.first()?;
        let max = *sorted_scores.last()?;
        let n = sorted_scores.len() as f64;
        let mean = sorted_scores.iter().map(|&s| s as f64).sum::<f64>() / n;
        let median = sorted_scores[sorted_scores.len() / 2];
        let variance = sorted_scores
            .iter()
            .map(|&s| (s as f64 - mean).powi(2))
            .sum::<f64>()
            / n;

        Some(Self {
            min,
            max,
            mean,
            median,
            std_dev: variance.sqrt(),
        })
    }
}
