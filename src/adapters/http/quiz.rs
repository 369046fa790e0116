//! Quiz API port implementation.

use super::BackendClient;
use crate::domain::ids::ContentId;
use crate::domain::quiz::QuizQuestion;
use crate::ports::quiz_api::QuizApi;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::error::Error;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveQuizBody<'a> {
    lesson_id: &'a ContentId,
    questions: &'a [QuizQuestion],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SavedQuiz {
    quiz_id: ContentId,
}

#[derive(Deserialize)]
struct QuizPayload {
    questions: Vec<QuizQuestion>,
}

#[async_trait]
impl QuizApi for BackendClient {
    async fn save_quiz(
        &self,
        lesson_id: &ContentId,
        questions: &[QuizQuestion],
    ) -> Result<ContentId, Box<dyn Error + Send + Sync>> {
        let body = SaveQuizBody {
            lesson_id,
            questions,
        };
        let saved: SavedQuiz = self.post_json("/api/quiz", &body).await?;
        Ok(saved.quiz_id)
    }

    async fn fetch_quiz(
        &self,
        quiz_id: &ContentId,
    ) -> Result<Vec<QuizQuestion>, Box<dyn Error + Send + Sync>> {
        let payload: QuizPayload = self.get_json(&format!("/api/quiz/{quiz_id}")).await?;
        Ok(payload.questions)
    }

    async fn delete_quiz(
        &self,
        quiz_id: &ContentId,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(self.delete(&format!("/api/quiz/{quiz_id}")).await?)
    }
}
