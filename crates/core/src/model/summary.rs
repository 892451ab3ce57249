use crate::model::positions::PositionSet;
use crate::model::question::Question;

/// Performance band shown at the end of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedbackTier {
    /// Every question was skipped (or the session was empty).
    NoneAttempted,
    /// 100%.
    Perfect,
    /// [80, 100).
    Excellent,
    /// [70, 80).
    Good,
    /// [60, 70).
    KeepGoing,
    /// Below 60.
    NeedsWork,
}

impl FeedbackTier {
    /// Pick the tier for an overall percentage.
    ///
    /// `skipped == total` wins regardless of the percentage.
    #[must_use]
    pub fn select(overall_percentage: f64, skipped: usize, total: usize) -> Self {
        if skipped == total {
            return FeedbackTier::NoneAttempted;
        }
        match overall_percentage {
            p if p >= 100.0 => FeedbackTier::Perfect,
            p if p >= 80.0 => FeedbackTier::Excellent,
            p if p >= 70.0 => FeedbackTier::Good,
            p if p >= 60.0 => FeedbackTier::KeepGoing,
            _ => FeedbackTier::NeedsWork,
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            FeedbackTier::NoneAttempted => "No Questions Attempted",
            FeedbackTier::Perfect => "Perfect Score!",
            FeedbackTier::Excellent => "Excellent Performance!",
            FeedbackTier::Good => "Good Progress!",
            FeedbackTier::KeepGoing => "Keep Going!",
            FeedbackTier::NeedsWork => "Room for Improvement",
        }
    }

    /// Encouragement text; mentions the skipped count when there is one.
    #[must_use]
    pub fn message(self, skipped: usize) -> String {
        let skipped_phrase = match skipped {
            0 => None,
            1 => Some("the 1 skipped question".to_string()),
            n => Some(format!("the {n} skipped questions")),
        };

        match (self, skipped_phrase) {
            (FeedbackTier::NoneAttempted, _) => {
                "Try answering some questions! Mistakes are how the material sticks.".to_string()
            }
            (FeedbackTier::Perfect, None) => {
                "Outstanding work! You have these concepts down completely.".to_string()
            }
            (FeedbackTier::Perfect, Some(s)) => {
                format!("Outstanding work on everything you attempted! Try {s} when you feel ready.")
            }
            (FeedbackTier::Excellent, None) => {
                "Great job! Focus on the few questions you missed to reach a perfect score."
                    .to_string()
            }
            (FeedbackTier::Excellent, Some(s)) => format!(
                "Great job on the questions you attempted! Review the misses and try {s} when ready."
            ),
            (FeedbackTier::Good, None) => {
                "You're on the right track! Review the questions you missed to shore up those areas."
                    .to_string()
            }
            (FeedbackTier::Good, Some(s)) => format!(
                "You're on the right track! Review the misses and tackle {s} after some study."
            ),
            (FeedbackTier::KeepGoing, None) => {
                "You're making progress! Work through the explanations for the questions you missed."
                    .to_string()
            }
            (FeedbackTier::KeepGoing, Some(s)) => format!(
                "You're making progress! Review the material, then retry the misses and {s}."
            ),
            (FeedbackTier::NeedsWork, None) => {
                "Don't get discouraged! Use the explanations to study, then try again.".to_string()
            }
            (FeedbackTier::NeedsWork, Some(s)) => format!(
                "Don't get discouraged! Review the material thoroughly before attempting {s}."
            ),
        }
    }
}

/// Correct/incorrect/skipped counts for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryBreakdown {
    pub name: String,
    pub correct: usize,
    pub incorrect: usize,
    pub skipped: usize,
    pub total: usize,
}

/// Percent widths for a stacked correct/incorrect/skipped bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryBar {
    pub correct: f64,
    pub incorrect: f64,
    pub skipped: f64,
}

impl CategoryBreakdown {
    /// Bar widths relative to the attempted questions in this category.
    ///
    /// Returns `None` when nothing in the category was attempted.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn bar(&self) -> Option<CategoryBar> {
        let attempted = self.correct + self.incorrect + self.skipped;
        if attempted == 0 {
            return None;
        }
        let pct = |n: usize| n as f64 / attempted as f64 * 100.0;
        Some(CategoryBar {
            correct: pct(self.correct),
            incorrect: pct(self.incorrect),
            skipped: pct(self.skipped),
        })
    }
}

/// End-of-session statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    total: usize,
    correct: usize,
    incorrect: usize,
    skipped: usize,
    overall_percentage: f64,
    categories: Vec<CategoryBreakdown>,
    feedback: FeedbackTier,
}

impl SessionSummary {
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    #[must_use]
    pub fn correct(&self) -> usize {
        self.correct
    }

    #[must_use]
    pub fn incorrect(&self) -> usize {
        self.incorrect
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Questions not skipped; the denominator of the overall percentage.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.total - self.skipped
    }

    /// `correct / (total - skipped) * 100`, or 0 when nothing was attempted.
    #[must_use]
    pub fn overall_percentage(&self) -> f64 {
        self.overall_percentage
    }

    /// Per-category counts, largest category first.
    #[must_use]
    pub fn categories(&self) -> &[CategoryBreakdown] {
        &self.categories
    }

    #[must_use]
    pub fn feedback(&self) -> FeedbackTier {
        self.feedback
    }
}

/// Aggregate overall and per-category correctness for a session.
///
/// A position counts as incorrect when it is answered but not correct.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn summarize(
    questions: &[Question],
    answered: &PositionSet,
    correct: &PositionSet,
    skipped: &PositionSet,
) -> SessionSummary {
    let total = questions.len();
    let mut categories: Vec<CategoryBreakdown> = Vec::new();
    let mut correct_count = 0;
    let mut incorrect_count = 0;
    let mut skipped_count = 0;

    for (position, question) in questions.iter().enumerate() {
        let name = question.category().name();
        let idx = match categories.iter().position(|c| c.name == name) {
            Some(idx) => idx,
            None => {
                categories.push(CategoryBreakdown {
                    name: name.to_string(),
                    correct: 0,
                    incorrect: 0,
                    skipped: 0,
                    total: 0,
                });
                categories.len() - 1
            }
        };
        let entry = &mut categories[idx];
        entry.total += 1;

        if skipped.contains(position) {
            entry.skipped += 1;
            skipped_count += 1;
        } else if correct.contains(position) {
            entry.correct += 1;
            correct_count += 1;
        } else if answered.contains(position) {
            entry.incorrect += 1;
            incorrect_count += 1;
        }
    }

    // Stable: equal totals keep encounter order.
    categories.sort_by(|a, b| b.total.cmp(&a.total));

    let denominator = total - skipped_count;
    let overall_percentage = if denominator == 0 {
        0.0
    } else {
        correct_count as f64 / denominator as f64 * 100.0
    };

    SessionSummary {
        total,
        correct: correct_count,
        incorrect: incorrect_count,
        skipped: skipped_count,
        overall_percentage,
        categories,
        feedback: FeedbackTier::select(overall_percentage, skipped_count, total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::test_support::question_in;

    fn sets(len: usize, answered: &[usize], correct: &[usize], skipped: &[usize]) -> [PositionSet; 3] {
        let build = |members: &[usize]| {
            let mut set = PositionSet::with_len(len);
            for &m in members {
                set.insert(m);
            }
            set
        };
        [build(answered), build(correct), build(skipped)]
    }

    #[test]
    fn mixed_session_percentage_excludes_skipped() {
        let questions = vec![
            question_in("1", "Cardiology"),
            question_in("2", "Cardiology"),
            question_in("3", "Neurology"),
            question_in("4", "Neurology"),
        ];
        let [answered, correct, skipped] = sets(4, &[0, 1, 2], &[0, 2], &[3]);

        let summary = summarize(&questions, &answered, &correct, &skipped);

        assert_eq!(summary.correct(), 2);
        assert_eq!(summary.incorrect(), 1);
        assert_eq!(summary.skipped(), 1);
        assert_eq!(summary.attempted(), 3);
        assert!((summary.overall_percentage() - 200.0 / 3.0).abs() < 1e-9);
        assert_ne!(summary.feedback(), FeedbackTier::NoneAttempted);
        assert_eq!(summary.feedback(), FeedbackTier::KeepGoing);
    }

    #[test]
    fn all_skipped_selects_none_attempted() {
        let questions = vec![question_in("1", "Cardiology"), question_in("2", "Dermatology")];
        let [answered, correct, skipped] = sets(2, &[], &[], &[0, 1]);

        let summary = summarize(&questions, &answered, &correct, &skipped);

        assert_eq!(summary.overall_percentage(), 0.0);
        assert_eq!(summary.feedback(), FeedbackTier::NoneAttempted);
    }

    #[test]
    fn empty_session_has_zero_percentage() {
        let summary = summarize(
            &[],
            &PositionSet::default(),
            &PositionSet::default(),
            &PositionSet::default(),
        );
        assert_eq!(summary.total(), 0);
        assert_eq!(summary.overall_percentage(), 0.0);
        assert_eq!(summary.feedback(), FeedbackTier::NoneAttempted);
        assert!(summary.categories().is_empty());
    }

    #[test]
    fn categories_sorted_by_total_with_stable_ties() {
        let questions = vec![
            question_in("1", "Pulmonology"),
            question_in("2", "Neurology"),
            question_in("3", "Cardiology"),
            question_in("4", "Cardiology"),
            question_in("5", "Neurology"),
            question_in("6", "Dermatology"),
        ];
        let [answered, correct, skipped] = sets(6, &[2, 3], &[2], &[4]);

        let summary = summarize(&questions, &answered, &correct, &skipped);
        let names: Vec<_> = summary.categories().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Neurology", "Cardiology", "Pulmonology", "Dermatology"]);

        let cardiology = &summary.categories()[1];
        assert_eq!(
            (cardiology.correct, cardiology.incorrect, cardiology.skipped, cardiology.total),
            (1, 1, 0, 2)
        );
        let neurology = &summary.categories()[0];
        assert_eq!((neurology.skipped, neurology.total), (1, 2));
    }

    #[test]
    fn tier_thresholds_use_half_open_intervals() {
        assert_eq!(FeedbackTier::select(100.0, 0, 5), FeedbackTier::Perfect);
        assert_eq!(FeedbackTier::select(80.0, 1, 5), FeedbackTier::Excellent);
        assert_eq!(FeedbackTier::select(79.99, 0, 5), FeedbackTier::Good);
        assert_eq!(FeedbackTier::select(70.0, 0, 5), FeedbackTier::Good);
        assert_eq!(FeedbackTier::select(60.0, 0, 5), FeedbackTier::KeepGoing);
        assert_eq!(FeedbackTier::select(59.9, 0, 5), FeedbackTier::NeedsWork);
        assert_eq!(FeedbackTier::select(0.0, 5, 5), FeedbackTier::NoneAttempted);
    }

    #[test]
    fn messages_pluralize_skipped_count() {
        assert!(FeedbackTier::Perfect.message(1).contains("the 1 skipped question "));
        assert!(FeedbackTier::Perfect.message(3).contains("the 3 skipped questions"));
        assert!(!FeedbackTier::Good.message(0).contains("skipped"));
    }

    #[test]
    fn bar_is_relative_to_attempted_in_category() {
        let breakdown = CategoryBreakdown {
            name: "Cardiology".into(),
            correct: 1,
            incorrect: 1,
            skipped: 2,
            total: 5,
        };
        let bar = breakdown.bar().unwrap();
        assert!((bar.correct - 25.0).abs() < 1e-9);
        assert!((bar.skipped - 50.0).abs() < 1e-9);

        let untouched = CategoryBreakdown {
            correct: 0,
            incorrect: 0,
            skipped: 0,
            ..breakdown
        };
        assert!(untouched.bar().is_none());
    }
}
