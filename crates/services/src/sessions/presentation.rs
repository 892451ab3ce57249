use quiz_core::model::{PresentedQuestion, Question, QuestionError, QuestionId};
use rand::Rng;

/// Memoized presentation shuffle for the question on screen.
///
/// The options are reshuffled only when the question identity changes, so
/// re-reading the current question never reorders its options.
#[derive(Debug, Clone, Default)]
pub(crate) struct PresentationCache {
    entry: Option<(QuestionId, PresentedQuestion)>,
}

impl PresentationCache {
    pub(crate) fn get_or_shuffle<R: Rng + ?Sized>(
        &mut self,
        question: &Question,
        rng: &mut R,
    ) -> Result<&PresentedQuestion, QuestionError> {
        let entry = match self.entry.take() {
            Some((id, presented)) if &id == question.id() => (id, presented),
            _ => (
                question.id().clone(),
                PresentedQuestion::shuffle(question, rng)?,
            ),
        };
        let (_, presented) = self.entry.insert(entry);
        Ok(&*presented)
    }

    pub(crate) fn get(&self, question: &Question) -> Option<&PresentedQuestion> {
        self.entry
            .as_ref()
            .filter(|(id, _)| id == question.id())
            .map(|(_, presented)| presented)
    }

    pub(crate) fn clear(&mut self) {
        self.entry = None;
    }
}
