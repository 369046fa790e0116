//! Lesson content management: type switches, deletes, quiz and material
//! sync. Remote cleanup of replaced content is best-effort; local state
//! always converges.

use crate::application::cleanup::{CleanupLog, CleanupOp};
use crate::application::store::CourseStore;
use crate::domain::course::ContentType;
use crate::domain::ids::ContentId;
use crate::domain::quiz::{self, QuizQuestion, QuizValidationError};
use crate::ports::material_api::MaterialApi;
use crate::ports::quiz_api::QuizApi;
use crate::ports::video_api::VideoApi;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("unknown lesson {0}")]
    UnknownLesson(ContentId),

    #[error("lesson {0} does not hold {1:?} content")]
    WrongContentType(ContentId, ContentType),

    #[error(transparent)]
    InvalidQuiz(#[from] QuizValidationError),

    #[error("backend call failed: {0}")]
    Backend(String),
}

pub struct ContentService<V, M, Q> {
    video: Arc<V>,
    material: Arc<M>,
    quiz: Arc<Q>,
    store: CourseStore,
    cleanup: CleanupLog,
}

impl<V, M, Q> ContentService<V, M, Q>
where
    V: VideoApi,
    M: MaterialApi,
    Q: QuizApi,
{
    pub fn new(
        video: Arc<V>,
        material: Arc<M>,
        quiz: Arc<Q>,
        store: CourseStore,
        cleanup: CleanupLog,
    ) -> Self {
        Self {
            video,
            material,
            quiz,
            store,
            cleanup,
        }
    }

    /// Change a lesson's declared content type. Persisted content of the
    /// previous type is deleted from its owning backend first; afterwards
    /// every type-specific field is cleared and the new type applied.
    pub async fn switch_content_type(
        &self,
        lesson_id: &ContentId,
        new_type: ContentType,
    ) -> Result<(), ContentError> {
        let Some(lesson) = self.store.lesson_snapshot(lesson_id).await else {
            return Err(ContentError::UnknownLesson(lesson_id.clone()));
        };
        if lesson.content_type == new_type {
            return Ok(());
        }
        if let Some((old_type, content_id)) = lesson.persisted_content_id() {
            self.delete_remote(old_type, &content_id).await;
        }
        self.store.reset_content(lesson_id, new_type).await;
        Ok(())
    }

    /// Delete a lesson, requesting deletion of its linked backend content
    /// first.
    pub async fn delete_lesson(&self, lesson_id: &ContentId) -> Result<(), ContentError> {
        let Some(lesson) = self.store.lesson_snapshot(lesson_id).await else {
            return Err(ContentError::UnknownLesson(lesson_id.clone()));
        };
        if let Some((content_type, content_id)) = lesson.persisted_content_id() {
            self.delete_remote(content_type, &content_id).await;
        }
        self.store.remove_lesson(lesson_id).await;
        Ok(())
    }

    /// Validate and persist a quiz, then mirror it into the aggregate.
    pub async fn save_quiz(
        &self,
        lesson_id: &ContentId,
        questions: Vec<QuizQuestion>,
    ) -> Result<ContentId, ContentError> {
        quiz::validate(&questions)?;
        let Some(lesson) = self.store.lesson_snapshot(lesson_id).await else {
            return Err(ContentError::UnknownLesson(lesson_id.clone()));
        };
        if lesson.content_type != ContentType::Quiz {
            return Err(ContentError::WrongContentType(
                lesson_id.clone(),
                ContentType::Quiz,
            ));
        }
        let quiz_id = self
            .quiz
            .save_quiz(lesson_id, &questions)
            .await
            .map_err(|e| ContentError::Backend(e.to_string()))?;
        self.store
            .set_quiz(lesson_id, quiz_id.clone(), questions)
            .await;
        Ok(quiz_id)
    }

    /// Reload a lesson's quiz from the backend into the aggregate.
    pub async fn reload_quiz(&self, lesson_id: &ContentId) -> Result<Vec<QuizQuestion>, ContentError> {
        let Some(lesson) = self.store.lesson_snapshot(lesson_id).await else {
            return Err(ContentError::UnknownLesson(lesson_id.clone()));
        };
        let Some(quiz_id) = lesson.quiz.quiz_id else {
            return Err(ContentError::WrongContentType(
                lesson_id.clone(),
                ContentType::Quiz,
            ));
        };
        let questions = self
            .quiz
            .fetch_quiz(&quiz_id)
            .await
            .map_err(|e| ContentError::Backend(e.to_string()))?;
        self.store
            .set_quiz(lesson_id, quiz_id, questions.clone())
            .await;
        Ok(questions)
    }

    /// Upload a document and attach it to a material lesson.
    pub async fn attach_material(
        &self,
        lesson_id: &ContentId,
        file: &Path,
    ) -> Result<(), ContentError> {
        let Some(context) = self.store.lesson_context(lesson_id).await else {
            return Err(ContentError::UnknownLesson(lesson_id.clone()));
        };
        if context.content_type != ContentType::Material {
            return Err(ContentError::WrongContentType(
                lesson_id.clone(),
                ContentType::Material,
            ));
        }
        let upload = self
            .material
            .upload_material(file, &context.lesson_title, &context.section_id)
            .await
            .map_err(|e| ContentError::Backend(e.to_string()))?;
        self.store.set_material(lesson_id, &upload).await;
        Ok(())
    }

    async fn delete_remote(&self, content_type: ContentType, content_id: &ContentId) {
        let (op, result) = match content_type {
            ContentType::Video => (
                CleanupOp::DeleteVideo,
                self.video.delete_video(content_id).await,
            ),
            ContentType::Material => (
                CleanupOp::DeleteMaterial,
                self.material.delete_material(content_id).await,
            ),
            ContentType::Quiz => (
                CleanupOp::DeleteQuiz,
                self.quiz.delete_quiz(content_id).await,
            ),
        };
        if let Err(e) = result {
            warn!(%content_id, ?content_type, error = %e, "remote content cleanup failed");
            self.cleanup
                .record(op, content_id.as_str(), e.to_string())
                .await;
        }
    }
}
