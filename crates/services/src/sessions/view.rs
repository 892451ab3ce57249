use chrono::{DateTime, Utc};
use serde::Serialize;

use quiz_core::model::{CategoryBreakdown, SessionSummary};

/// One row of the per-category table on the summary screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryReportItem {
    pub name: String,
    pub correct: usize,
    pub incorrect: usize,
    pub skipped: usize,
    pub total: usize,
    /// Stacked bar widths in percent, absent when nothing was attempted.
    pub bar: Option<[f64; 3]>,
}

impl CategoryReportItem {
    #[must_use]
    pub fn from_breakdown(breakdown: &CategoryBreakdown) -> Self {
        Self {
            name: breakdown.name.clone(),
            correct: breakdown.correct,
            incorrect: breakdown.incorrect,
            skipped: breakdown.skipped,
            total: breakdown.total,
            bar: breakdown
                .bar()
                .map(|bar| [bar.correct, bar.incorrect, bar.skipped]),
        }
    }
}

/// Presentation-agnostic end-of-session report.
///
/// Carries the feedback copy but no layout; the caller decides how to
/// render percentages and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub title: String,
    pub message: String,
    pub total: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub skipped: usize,
    pub overall_percentage: f64,
    pub categories: Vec<CategoryReportItem>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl SessionReport {
    #[must_use]
    pub fn from_summary(
        summary: &SessionSummary,
        started_at: DateTime<Utc>,
        completed_at: Option<DateTime<Utc>>,
    ) -> Self {
        let feedback = summary.feedback();
        Self {
            title: feedback.title().to_string(),
            message: feedback.message(summary.skipped()),
            total: summary.total(),
            correct: summary.correct(),
            incorrect: summary.incorrect(),
            skipped: summary.skipped(),
            overall_percentage: summary.overall_percentage(),
            categories: summary
                .categories()
                .iter()
                .map(CategoryReportItem::from_breakdown)
                .collect(),
            started_at,
            completed_at,
        }
    }

    /// Overall score rounded to whole percent, as shown in the headline.
    #[must_use]
    pub fn rounded_percentage(&self) -> u32 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let rounded = self.overall_percentage.round().clamp(0.0, 100.0) as u32;
        rounded
    }
}
