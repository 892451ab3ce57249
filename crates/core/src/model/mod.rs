mod catalogue;
mod ids;
mod positions;
mod preferences;
mod presented;
mod question;
mod summary;

#[cfg(test)]
pub(crate) mod test_support;

pub use catalogue::onboarding_categories;
pub use ids::{CategoryId, ParseIdError, QuestionId, TopicId, UserId};
pub use positions::PositionSet;
pub use preferences::{PreferencesDraft, PreferencesError, UserPreferences};
pub use presented::PresentedQuestion;
pub use question::{Category, Difficulty, Question, QuestionDraft, QuestionError, Topic};
pub use summary::{CategoryBar, CategoryBreakdown, FeedbackTier, SessionSummary, summarize};
