//! Course API port implementation.

use super::BackendClient;
use crate::domain::course::Course;
use crate::domain::ids::ContentId;
use crate::ports::course_api::CourseApi;
use async_trait::async_trait;
use std::error::Error;

#[async_trait]
impl CourseApi for BackendClient {
    async fn save_course(&self, course: &Course) -> Result<Course, Box<dyn Error + Send + Sync>> {
        Ok(self.post_json("/api/courses", course).await?)
    }

    async fn fetch_course(
        &self,
        course_id: &ContentId,
    ) -> Result<Course, Box<dyn Error + Send + Sync>> {
        Ok(self.get_json(&format!("/api/courses/{course_id}")).await?)
    }
}
