use crate::domain::ids::ContentId;
use crate::domain::upload::{CreateUploadRequest, UploadTarget};
use async_trait::async_trait;
use std::error::Error;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoApi: Send + Sync {
    /// Request an upload target and a provisional video identity for a
    /// lesson, passing its title and section context.
    async fn create_upload(
        &self,
        request: &CreateUploadRequest,
    ) -> Result<UploadTarget, Box<dyn Error + Send + Sync>>;

    /// Cancel an in-flight upload and discard the partial video record.
    async fn cancel_upload(&self, upload_id: &str) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Delete a video record that finished uploading but is no longer
    /// wanted (cancelled before confirmation, or content type changed).
    async fn delete_video(
        &self,
        video_id: &ContentId,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;
}
