use async_trait::async_trait;
use quiz_core::model::Question;

use super::SqliteRepository;
use super::mapping::{conn, map_question_row, options_to_json, tags_to_json, usize_to_i64};
use crate::repository::{QuestionRepository, StorageError};

#[async_trait]
impl QuestionRepository for SqliteRepository {
    async fn all_questions(&self) -> Result<Vec<Question>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT
                id, prompt, options, correct_answer, explanation,
                topic_id, topic_name,
                category_id, category_name, category_description,
                difficulty, tags
            FROM questions
            ORDER BY position ASC, id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_question_row).collect()
    }

    async fn upsert_questions(&self, questions: &[Question]) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        let next: i64 = sqlx::query_scalar("SELECT COALESCE(MAX(position) + 1, 0) FROM questions")
            .fetch_one(&mut *tx)
            .await
            .map_err(conn)?;

        for (offset, question) in questions.iter().enumerate() {
            let position = next + usize_to_i64("position", offset)?;
            // Existing rows keep their position so repository order is stable.
            sqlx::query(
                r"
                INSERT INTO questions (
                    id, position, prompt, options, correct_answer, explanation,
                    topic_id, topic_name,
                    category_id, category_name, category_description,
                    difficulty, tags
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
                ON CONFLICT(id) DO UPDATE SET
                    prompt = excluded.prompt,
                    options = excluded.options,
                    correct_answer = excluded.correct_answer,
                    explanation = excluded.explanation,
                    topic_id = excluded.topic_id,
                    topic_name = excluded.topic_name,
                    category_id = excluded.category_id,
                    category_name = excluded.category_name,
                    category_description = excluded.category_description,
                    difficulty = excluded.difficulty,
                    tags = excluded.tags
                ",
            )
            .bind(question.id().as_str())
            .bind(position)
            .bind(question.prompt())
            .bind(options_to_json(question)?)
            .bind(usize_to_i64("correct_answer", question.correct_answer())?)
            .bind(question.explanation())
            .bind(question.topic().id().as_str())
            .bind(question.topic().name())
            .bind(question.category().id().as_str())
            .bind(question.category().name())
            .bind(question.category().description())
            .bind(question.difficulty().as_str())
            .bind(tags_to_json(question)?)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)?;
        tracing::debug!(count = questions.len(), "upserted questions");
        Ok(())
    }
}
