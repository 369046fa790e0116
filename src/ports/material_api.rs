use crate::domain::course::MaterialUpload;
use crate::domain::ids::ContentId;
use async_trait::async_trait;
use std::error::Error;
use std::path::Path;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MaterialApi: Send + Sync {
    /// Upload a document for a lesson (multipart: file, lesson title,
    /// owning section).
    async fn upload_material(
        &self,
        file: &Path,
        lesson_title: &str,
        section_id: &ContentId,
    ) -> Result<MaterialUpload, Box<dyn Error + Send + Sync>>;

    /// Delete a stored material by its backend identity.
    async fn delete_material(
        &self,
        material_id: &ContentId,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;
}
