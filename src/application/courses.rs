//! Explicit save/load of the course draft.
//!
//! Drafts live purely in the store until the user saves; the backend
//! response is the persisted aggregate (with its own ids) and replaces the
//! local one wholesale.

use crate::application::store::CourseStore;
use crate::domain::course::Course;
use crate::domain::ids::ContentId;
use crate::ports::course_api::CourseApi;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum CourseSyncError {
    #[error("course save failed: {0}")]
    Save(String),

    #[error("course load failed: {0}")]
    Load(String),
}

pub struct CourseSync<C> {
    api: Arc<C>,
    store: CourseStore,
}

impl<C> CourseSync<C>
where
    C: CourseApi,
{
    pub fn new(api: Arc<C>, store: CourseStore) -> Self {
        Self { api, store }
    }

    /// Persist the current draft and adopt the backend's version of it.
    pub async fn save(&self) -> Result<Course, CourseSyncError> {
        let draft = self.store.snapshot().await;
        let persisted = self
            .api
            .save_course(&draft)
            .await
            .map_err(|e| CourseSyncError::Save(e.to_string()))?;
        info!(course_id = %persisted.id, "course draft saved");
        self.store.replace(persisted.clone()).await;
        Ok(persisted)
    }

    /// Load a course into the store, replacing the current draft.
    pub async fn load(&self, course_id: &ContentId) -> Result<Course, CourseSyncError> {
        let course = self
            .api
            .fetch_course(course_id)
            .await
            .map_err(|e| CourseSyncError::Load(e.to_string()))?;
        self.store.replace(course.clone()).await;
        Ok(course)
    }
}
