//! Material API port implementation.

use super::{BackendClient, BackendError};
use crate::domain::course::MaterialUpload;
use crate::domain::ids::ContentId;
use crate::ports::material_api::MaterialApi;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::error::Error;
use std::path::Path;
use tokio_util::io::ReaderStream;

#[async_trait]
impl MaterialApi for BackendClient {
    async fn upload_material(
        &self,
        file: &Path,
        lesson_title: &str,
        section_id: &ContentId,
    ) -> Result<MaterialUpload, Box<dyn Error + Send + Sync>> {
        let token = self.bearer().await?;
        let handle = tokio::fs::File::open(file).await?;
        let file_name = file
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("material")
            .to_string();

        let part = Part::stream(reqwest::Body::wrap_stream(ReaderStream::new(handle)))
            .file_name(file_name);
        let form = Form::new()
            .part("file", part)
            .text("lessonTitle", lesson_title.to_string())
            .text("sectionId", section_id.to_string());

        let response = self
            .http
            .post(self.url("/api/material/upload"))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .map_err(BackendError::from)?;
        Ok(Self::decode::<MaterialUpload>(response).await?)
    }

    async fn delete_material(
        &self,
        material_id: &ContentId,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(self
            .delete(&format!("/api/material/delete/{material_id}"))
            .await?)
    }
}
