//! Transient upload-session state.

use super::ids::ContentId;
use serde::{Deserialize, Serialize};

/// Lifecycle of one lesson's video upload.
///
/// `Processing` means the chunk stream finished locally and the platform is
/// encoding; only a push event moves a lesson past it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    #[default]
    Idle,
    Uploading,
    Processing,
    Success,
    Error,
}

/// Upload target issued by the backend: where to stream the file, plus the
/// provisional identity of the video being created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTarget {
    pub upload_url: String,
    pub upload_id: String,
    pub video_id: ContentId,
    #[serde(default)]
    pub asset_id: Option<ContentId>,
}

/// Body of the upload-target request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUploadRequest {
    pub lesson_title: String,
    pub section_id: ContentId,
}

/// Bookkeeping for an in-flight upload. Exists only while the status is
/// `Uploading` or `Processing`; terminal transitions remove it.
///
/// `upload_id` is spent once the chunk stream completes - from then on only
/// the video record is addressable for cleanup.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadSession {
    pub upload_id: Option<String>,
    pub video_id: Option<ContentId>,
    pub progress: u8,
    pub status: UploadStatus,
}

impl UploadSession {
    pub fn started(target: &UploadTarget) -> Self {
        Self {
            upload_id: Some(target.upload_id.clone()),
            video_id: Some(target.video_id.clone()),
            progress: 0,
            status: UploadStatus::Uploading,
        }
    }
}
