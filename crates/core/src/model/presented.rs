use rand::Rng;

use crate::model::question::{Question, QuestionError};
use crate::shuffle::shuffle;

/// A question as shown to the user, with its options in a shuffled order.
///
/// `question().correct_answer()` is expressed in the presented ordering;
/// `original_index` maps a presented option back to the canonical one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentedQuestion {
    question: Question,
    original_indices: Vec<usize>,
}

impl PresentedQuestion {
    /// Shuffle the options of `canonical` and remap its correct answer.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the remapped correct answer fails
    /// re-validation against the new ordering.
    pub fn shuffle<R: Rng + ?Sized>(
        canonical: &Question,
        rng: &mut R,
    ) -> Result<Self, QuestionError> {
        let order = shuffle(&(0..canonical.options().len()).collect::<Vec<_>>(), rng).shuffled;
        let question = canonical.with_option_order(&order)?;
        Ok(Self {
            question,
            original_indices: order,
        })
    }

    #[must_use]
    pub fn question(&self) -> &Question {
        &self.question
    }

    /// Canonical option index for a presented option index.
    #[must_use]
    pub fn original_index(&self, presented: usize) -> Option<usize> {
        self.original_indices.get(presented).copied()
    }

    #[must_use]
    pub fn original_indices(&self) -> &[usize] {
        &self.original_indices
    }

    /// Presented index of a canonical option.
    #[must_use]
    pub fn presented_index(&self, original: usize) -> Option<usize> {
        self.original_indices.iter().position(|&i| i == original)
    }
}
