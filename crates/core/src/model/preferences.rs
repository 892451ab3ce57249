use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use thiserror::Error;

use crate::model::ids::CategoryId;
use crate::model::question::{Difficulty, Question};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PreferencesError {
    #[error("at least one category must be selected")]
    NoCategories,

    #[error("at least one difficulty must be selected")]
    NoDifficulties,

    #[error("the last selected difficulty cannot be removed")]
    LastDifficulty,

    #[error("question count {value} is outside {min}..={max}")]
    QuestionCountOutOfRange { value: u32, min: u32, max: u32 },
}

/// A user's practice filters and desired session length.
///
/// Values loaded from storage are kept as-is, even when they would not pass
/// `PreferencesDraft::validate`; the session engine tolerates empty filters
/// and oversized counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPreferences {
    categories: BTreeSet<CategoryId>,
    question_count: u32,
    difficulties: BTreeSet<Difficulty>,
}

/// Preferences as edited during onboarding or in settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferencesDraft {
    pub categories: BTreeSet<CategoryId>,
    pub question_count: u32,
    pub difficulties: BTreeSet<Difficulty>,
}

impl Default for PreferencesDraft {
    /// Onboarding starting point: nothing selected, 10 questions, every difficulty.
    fn default() -> Self {
        Self {
            categories: BTreeSet::new(),
            question_count: UserPreferences::DEFAULT_QUESTION_COUNT,
            difficulties: Difficulty::ALL.into_iter().collect(),
        }
    }
}

impl PreferencesDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the draft into preferences that can start a session.
    ///
    /// # Errors
    ///
    /// Returns `PreferencesError` if no category or difficulty is selected, or
    /// if the question count is outside `UserPreferences::QUESTION_COUNT_RANGE`.
    pub fn validate(self) -> Result<UserPreferences, PreferencesError> {
        let preferences = UserPreferences {
            categories: self.categories,
            question_count: self.question_count,
            difficulties: self.difficulties,
        };
        preferences.check()?;
        check_question_count(preferences.question_count)?;
        Ok(preferences)
    }
}

impl UserPreferences {
    pub const DEFAULT_QUESTION_COUNT: u32 = 10;
    pub const QUESTION_COUNT_RANGE: RangeInclusive<u32> = 3..=15;

    /// Rehydrate preferences from persisted storage without validation.
    #[must_use]
    pub fn from_persisted(
        categories: impl IntoIterator<Item = CategoryId>,
        question_count: u32,
        difficulties: impl IntoIterator<Item = Difficulty>,
    ) -> Self {
        Self {
            categories: categories.into_iter().collect(),
            question_count,
            difficulties: difficulties.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn categories(&self) -> &BTreeSet<CategoryId> {
        &self.categories
    }

    #[must_use]
    pub fn question_count(&self) -> u32 {
        self.question_count
    }

    #[must_use]
    pub fn difficulties(&self) -> &BTreeSet<Difficulty> {
        &self.difficulties
    }

    /// Checks that a session drawn from these preferences can contain questions.
    ///
    /// # Errors
    ///
    /// Returns `PreferencesError::NoCategories` or `PreferencesError::NoDifficulties`.
    pub fn check(&self) -> Result<(), PreferencesError> {
        if self.categories.is_empty() {
            return Err(PreferencesError::NoCategories);
        }
        if self.difficulties.is_empty() {
            return Err(PreferencesError::NoDifficulties);
        }
        Ok(())
    }

    /// True when the question passes both the category and difficulty filters.
    #[must_use]
    pub fn matches(&self, question: &Question) -> bool {
        self.categories.contains(question.category().id())
            && self.difficulties.contains(&question.difficulty())
    }

    /// Select or deselect a category. Returns whether it is now selected.
    pub fn toggle_category(&mut self, id: CategoryId) -> bool {
        if self.categories.remove(&id) {
            false
        } else {
            self.categories.insert(id);
            true
        }
    }

    /// Select or deselect a difficulty. Returns whether it is now selected.
    ///
    /// # Errors
    ///
    /// Returns `PreferencesError::LastDifficulty` when deselecting the only
    /// selected difficulty; the set is left unchanged.
    pub fn toggle_difficulty(&mut self, difficulty: Difficulty) -> Result<bool, PreferencesError> {
        if self.difficulties.contains(&difficulty) {
            if self.difficulties.len() == 1 {
                return Err(PreferencesError::LastDifficulty);
            }
            self.difficulties.remove(&difficulty);
            Ok(false)
        } else {
            self.difficulties.insert(difficulty);
            Ok(true)
        }
    }

    /// # Errors
    ///
    /// Returns `PreferencesError::QuestionCountOutOfRange` if `count` is
    /// outside `QUESTION_COUNT_RANGE`.
    pub fn set_question_count(&mut self, count: u32) -> Result<(), PreferencesError> {
        check_question_count(count)?;
        self.question_count = count;
        Ok(())
    }
}

fn check_question_count(value: u32) -> Result<(), PreferencesError> {
    let range = UserPreferences::QUESTION_COUNT_RANGE;
    if !range.contains(&value) {
        return Err(PreferencesError::QuestionCountOutOfRange {
            value,
            min: *range.start(),
            max: *range.end(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cardiology() -> CategoryId {
        CategoryId::new("cardiology")
    }

    #[test]
    fn draft_defaults_match_onboarding() {
        let draft = PreferencesDraft::new();
        assert!(draft.categories.is_empty());
        assert_eq!(draft.question_count, 10);
        assert_eq!(draft.difficulties.len(), 3);
    }

    #[test]
    fn draft_without_categories_is_rejected() {
        let err = PreferencesDraft::new().validate().unwrap_err();
        assert_eq!(err, PreferencesError::NoCategories);
    }

    #[test]
    fn draft_with_count_out_of_range_is_rejected() {
        let mut draft = PreferencesDraft::new();
        draft.categories.insert(cardiology());
        draft.question_count = 20;
        assert_eq!(
            draft.validate().unwrap_err(),
            PreferencesError::QuestionCountOutOfRange {
                value: 20,
                min: 3,
                max: 15
            }
        );
    }

    #[test]
    fn persisted_preferences_skip_validation() {
        let prefs = UserPreferences::from_persisted(Vec::new(), 50, Vec::new());
        assert_eq!(prefs.question_count(), 50);
        assert_eq!(prefs.check().unwrap_err(), PreferencesError::NoCategories);
    }

    #[test]
    fn toggle_category_adds_and_removes() {
        let mut prefs = UserPreferences::from_persisted(Vec::new(), 10, Difficulty::ALL);
        assert!(prefs.toggle_category(cardiology()));
        assert!(prefs.categories().contains(&cardiology()));
        assert!(!prefs.toggle_category(cardiology()));
        assert!(prefs.categories().is_empty());
    }

    #[test]
    fn last_difficulty_cannot_be_removed() {
        let mut prefs =
            UserPreferences::from_persisted(vec![cardiology()], 10, vec![Difficulty::Easy]);
        assert_eq!(
            prefs.toggle_difficulty(Difficulty::Easy).unwrap_err(),
            PreferencesError::LastDifficulty
        );
        assert_eq!(prefs.difficulties().len(), 1);

        assert!(prefs.toggle_difficulty(Difficulty::Hard).unwrap());
        assert!(!prefs.toggle_difficulty(Difficulty::Easy).unwrap());
        assert_eq!(
            prefs.difficulties().iter().copied().collect::<Vec<_>>(),
            vec![Difficulty::Hard]
        );
    }

    #[test]
    fn set_question_count_enforces_range() {
        let mut prefs = UserPreferences::from_persisted(vec![cardiology()], 10, Difficulty::ALL);
        prefs.set_question_count(3).unwrap();
        assert_eq!(prefs.question_count(), 3);
        assert!(prefs.set_question_count(2).is_err());
        assert_eq!(prefs.question_count(), 3);
    }
}
