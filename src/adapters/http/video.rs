//! Video API port implementation.

use super::BackendClient;
use crate::domain::ids::ContentId;
use crate::domain::upload::{CreateUploadRequest, UploadTarget};
use crate::ports::video_api::VideoApi;
use async_trait::async_trait;
use std::error::Error;

#[async_trait]
impl VideoApi for BackendClient {
    async fn create_upload(
        &self,
        request: &CreateUploadRequest,
    ) -> Result<UploadTarget, Box<dyn Error + Send + Sync>> {
        Ok(self.post_json("/api/mux/create-upload", request).await?)
    }

    async fn cancel_upload(&self, upload_id: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(self
            .delete(&format!("/api/mux/cancel-upload/{upload_id}"))
            .await?)
    }

    async fn delete_video(
        &self,
        video_id: &ContentId,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        // Canonical plural form, matching the other collection endpoints.
        Ok(self.delete(&format!("/api/videos/{video_id}")).await?)
    }
}
