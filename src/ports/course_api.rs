use crate::domain::course::Course;
use crate::domain::ids::ContentId;
use async_trait::async_trait;
use std::error::Error;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseApi: Send + Sync {
    /// Persist the whole course draft. The response is the persisted
    /// aggregate, with backend-assigned ids replacing client-generated
    /// temporary ones.
    async fn save_course(&self, course: &Course) -> Result<Course, Box<dyn Error + Send + Sync>>;

    /// Load a course aggregate.
    async fn fetch_course(
        &self,
        course_id: &ContentId,
    ) -> Result<Course, Box<dyn Error + Send + Sync>>;
}
