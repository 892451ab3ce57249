use std::collections::BTreeSet;

use quiz_core::model::{
    Category, CategoryId, Difficulty, Question, QuestionDraft, QuestionId, Topic, TopicId,
};
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn usize_to_i64(field: &'static str, v: usize) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

fn i64_to_usize(field: &'static str, v: i64) -> Result<usize, StorageError> {
    usize::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn options_to_json(question: &Question) -> Result<String, StorageError> {
    serde_json::to_string(question.options()).map_err(ser)
}

pub(crate) fn tags_to_json(question: &Question) -> Result<String, StorageError> {
    serde_json::to_string(question.tags()).map_err(ser)
}

pub(crate) fn map_question_row(row: &sqlx::sqlite::SqliteRow) -> Result<Question, StorageError> {
    let options_raw: String = row.try_get("options").map_err(ser)?;
    let options: Vec<String> = serde_json::from_str(&options_raw).map_err(ser)?;

    let tags_raw: String = row.try_get("tags").map_err(ser)?;
    let tags: BTreeSet<String> = serde_json::from_str(&tags_raw).map_err(ser)?;

    let difficulty: Difficulty = row
        .try_get::<String, _>("difficulty")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;

    let category = Category::from_persisted(
        CategoryId::new(row.try_get::<String, _>("category_id").map_err(ser)?),
        row.try_get::<String, _>("category_name").map_err(ser)?,
        row.try_get::<String, _>("category_description")
            .map_err(ser)?,
    );
    let topic = Topic::from_persisted(
        TopicId::new(row.try_get::<String, _>("topic_id").map_err(ser)?),
        row.try_get::<String, _>("topic_name").map_err(ser)?,
        category,
    );

    QuestionDraft {
        id: QuestionId::new(row.try_get::<String, _>("id").map_err(ser)?),
        prompt: row.try_get("prompt").map_err(ser)?,
        options,
        correct_answer: i64_to_usize(
            "correct_answer",
            row.try_get::<i64, _>("correct_answer").map_err(ser)?,
        )?,
        explanation: row.try_get("explanation").map_err(ser)?,
        topic,
        difficulty,
        tags,
    }
    .validate()
    .map_err(ser)
}
