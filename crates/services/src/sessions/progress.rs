use serde::Serialize;

/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub correct: usize,
    pub skipped: usize,
    pub attempted: usize,
    pub remaining: usize,
    /// 1-based number of the question on screen, if any.
    pub current: Option<usize>,
    pub is_complete: bool,
}

impl SessionProgress {
    /// "Question k of n", or `None` when nothing is on screen.
    #[must_use]
    pub fn label(&self) -> Option<String> {
        self.current
            .map(|current| format!("Question {current} of {}", self.total))
    }
}
