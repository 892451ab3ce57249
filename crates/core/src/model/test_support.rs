use std::collections::BTreeSet;

use crate::model::{Category, Difficulty, Question, QuestionDraft, QuestionId, Topic};

pub(crate) fn question(id: &str, category: &str, difficulty: Difficulty) -> Question {
    QuestionDraft {
        id: QuestionId::new(id),
        prompt: format!("Question {id}?"),
        options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
        correct_answer: 1,
        explanation: format!("Explanation {id}"),
        topic: Topic::new(format!("{category} Basics"), Category::new(category, "")),
        difficulty,
        tags: BTreeSet::new(),
    }
    .validate()
    .unwrap()
}

pub(crate) fn question_in(id: &str, category: &str) -> Question {
    question(id, category, Difficulty::Medium)
}
