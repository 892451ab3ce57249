use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::{CategoryId, QuestionId, TopicId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question id cannot be empty")]
    EmptyId,

    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("question needs at least {min} options, got {len}")]
    TooFewOptions { min: usize, len: usize },

    #[error("option {index} is empty")]
    EmptyOption { index: usize },

    #[error("correct answer index {index} is out of range for {len} options")]
    CorrectAnswerOutOfRange { index: usize, len: usize },

    #[error("option order is not a permutation of {len} options")]
    InvalidOptionOrder { len: usize },

    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

/// Difficulty tier attached to every question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(QuestionError::UnknownDifficulty(s.to_string())),
        }
    }
}

//
// ─── CATEGORY & TOPIC ──────────────────────────────────────────────────────────
//

/// Top-level subject grouping (e.g. Cardiology).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Category {
    id: CategoryId,
    name: String,
    description: String,
}

impl Category {
    /// Builds a category whose id is the slug of its name.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: CategoryId::from_name(&name),
            name,
            description: description.into(),
        }
    }

    /// Rehydrate a category whose id was stored separately.
    #[must_use]
    pub fn from_persisted(
        id: CategoryId,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &CategoryId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Finer-grained subject under a category.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Topic {
    id: TopicId,
    name: String,
    category: Category,
}

impl Topic {
    /// Builds a topic whose id is the slug of its name.
    #[must_use]
    pub fn new(name: impl Into<String>, category: Category) -> Self {
        let name = name.into();
        Self {
            id: TopicId::from_name(&name),
            name,
            category,
        }
    }

    #[must_use]
    pub fn from_persisted(id: TopicId, name: impl Into<String>, category: Category) -> Self {
        Self {
            id,
            name: name.into(),
            category,
        }
    }

    #[must_use]
    pub fn id(&self) -> &TopicId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn category(&self) -> &Category {
        &self.category
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// Unvalidated question input, as authored or loaded from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub id: QuestionId,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    pub explanation: String,
    pub topic: Topic,
    pub difficulty: Difficulty,
    pub tags: BTreeSet<String>,
}

impl QuestionDraft {
    /// Validate the draft into an immutable `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the id or prompt is blank, fewer than two
    /// options are given, an option is blank, or the correct answer does not
    /// index an option.
    pub fn validate(self) -> Result<Question, QuestionError> {
        if self.id.as_str().trim().is_empty() {
            return Err(QuestionError::EmptyId);
        }
        let prompt = self.prompt.trim().to_string();
        if prompt.is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if self.options.len() < Question::MIN_OPTIONS {
            return Err(QuestionError::TooFewOptions {
                min: Question::MIN_OPTIONS,
                len: self.options.len(),
            });
        }
        if let Some(index) = self.options.iter().position(|o| o.trim().is_empty()) {
            return Err(QuestionError::EmptyOption { index });
        }
        check_correct_answer(self.correct_answer, self.options.len())?;

        Ok(Question {
            id: self.id,
            prompt,
            options: self.options,
            correct_answer: self.correct_answer,
            explanation: self.explanation.trim().to_string(),
            topic: self.topic,
            difficulty: self.difficulty,
            tags: self.tags,
        })
    }
}

/// A multiple-choice question. Immutable once validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    options: Vec<String>,
    correct_answer: usize,
    explanation: String,
    topic: Topic,
    difficulty: Difficulty,
    tags: BTreeSet<String>,
}

impl Question {
    pub const MIN_OPTIONS: usize = 2;

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Index into `options()` of the correct option.
    #[must_use]
    pub fn correct_answer(&self) -> usize {
        self.correct_answer
    }

    #[must_use]
    pub fn correct_option(&self) -> &str {
        &self.options[self.correct_answer]
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    #[must_use]
    pub fn category(&self) -> &Category {
        self.topic.category()
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Exact-index grading against this question's option ordering.
    #[must_use]
    pub fn is_correct(&self, selected: usize) -> bool {
        selected == self.correct_answer
    }

    /// Returns a copy whose options follow `order`, where `order[new] == old`.
    ///
    /// The correct answer is remapped to the new position of the originally
    /// correct option and re-checked against the new ordering.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::InvalidOptionOrder` if `order` is not a
    /// permutation of `0..options().len()`.
    pub fn with_option_order(&self, order: &[usize]) -> Result<Question, QuestionError> {
        let len = self.options.len();
        let mut seen = vec![false; len];
        if order.len() != len {
            return Err(QuestionError::InvalidOptionOrder { len });
        }
        for &old in order {
            if old >= len || seen[old] {
                return Err(QuestionError::InvalidOptionOrder { len });
            }
            seen[old] = true;
        }

        let options = order.iter().map(|&old| self.options[old].clone()).collect();
        let correct_answer = order
            .iter()
            .position(|&old| old == self.correct_answer)
            .ok_or(QuestionError::InvalidOptionOrder { len })?;
        check_correct_answer(correct_answer, len)?;

        Ok(Question {
            options,
            correct_answer,
            ..self.clone()
        })
    }
}

fn check_correct_answer(index: usize, len: usize) -> Result<(), QuestionError> {
    if index >= len {
        return Err(QuestionError::CorrectAnswerOutOfRange { index, len });
    }
    Ok(())
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
