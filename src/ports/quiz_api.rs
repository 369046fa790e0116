use crate::domain::ids::ContentId;
use crate::domain::quiz::QuizQuestion;
use async_trait::async_trait;
use std::error::Error;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizApi: Send + Sync {
    /// Persist a lesson's quiz; returns the backend quiz identity.
    async fn save_quiz(
        &self,
        lesson_id: &ContentId,
        questions: &[QuizQuestion],
    ) -> Result<ContentId, Box<dyn Error + Send + Sync>>;

    /// Load a quiz back, answers and correctness flags included.
    async fn fetch_quiz(
        &self,
        quiz_id: &ContentId,
    ) -> Result<Vec<QuizQuestion>, Box<dyn Error + Send + Sync>>;

    /// Delete a quiz by its backend identity.
    async fn delete_quiz(&self, quiz_id: &ContentId)
        -> Result<(), Box<dyn Error + Send + Sync>>;
}
