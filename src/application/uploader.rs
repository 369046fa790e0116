//! Video upload orchestration - one lifecycle per lesson.
//!
//! `idle -> uploading -> processing -> {ready | error | idle(on cancel)}`.
//! The chunk stream finishing locally only ever reaches `processing`; the
//! push channel is the sole authority on `ready`.

use crate::application::cancel::{CancelHandle, CancelRegistry};
use crate::application::cleanup::{CleanupLog, CleanupOp};
use crate::application::store::CourseStore;
use crate::domain::ids::ContentId;
use crate::domain::upload::CreateUploadRequest;
use crate::ports::transport::{ChunkTransport, DEFAULT_CHUNK_BYTES};
use crate::ports::video_api::VideoApi;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("'{0}' is not a video file")]
    NotAVideo(String),

    #[error("lesson {0} already has an upload in flight")]
    AlreadyInFlight(ContentId),

    #[error("unknown lesson {0}")]
    UnknownLesson(ContentId),

    #[error("upload target request failed: {0}")]
    Target(String),
}

/// A local file picked for upload.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub content_type: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, content_type: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content_type: content_type.into(),
        }
    }

    /// Guesses the MIME type from the file extension. Unknown extensions
    /// map to `application/octet-stream`, which upload validation rejects.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let content_type = match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("mp4") => "video/mp4",
            Some("m4v") => "video/x-m4v",
            Some("mov") => "video/quicktime",
            Some("webm") => "video/webm",
            Some("mkv") => "video/x-matroska",
            Some("avi") => "video/x-msvideo",
            _ => "application/octet-stream",
        };
        Self {
            content_type: content_type.to_string(),
            path,
        }
    }
}

/// Drives uploads against the video API and the chunk transport, writing
/// every state change into the shared course store.
pub struct UploadService<V, T> {
    api: Arc<V>,
    transport: Arc<T>,
    store: CourseStore,
    registry: CancelRegistry,
    cleanup: CleanupLog,
    chunk_bytes: usize,
}

impl<V, T> UploadService<V, T>
where
    V: VideoApi + 'static,
    T: ChunkTransport + 'static,
{
    pub fn new(
        api: Arc<V>,
        transport: Arc<T>,
        store: CourseStore,
        registry: CancelRegistry,
        cleanup: CleanupLog,
    ) -> Self {
        Self {
            api,
            transport,
            store,
            registry,
            cleanup,
            chunk_bytes: DEFAULT_CHUNK_BYTES,
        }
    }

    pub fn with_chunk_bytes(mut self, chunk_bytes: usize) -> Self {
        self.chunk_bytes = chunk_bytes;
        self
    }

    /// Validates the file, requests an upload target, and streams the
    /// chunks on a background task. Returns the cancel handle, which is
    /// also registered under the lesson id.
    pub async fn start_upload(
        &self,
        lesson_id: &ContentId,
        file: SourceFile,
    ) -> Result<Arc<UploadHandle<V>>, UploadError> {
        // Rejected before any port is touched.
        if !file.content_type.starts_with("video/") {
            let message = format!("{} is not a video file", file.content_type);
            self.store.fail_upload(lesson_id, message).await;
            return Err(UploadError::NotAVideo(file.content_type));
        }

        let Some(context) = self.store.lesson_context(lesson_id).await else {
            return Err(UploadError::UnknownLesson(lesson_id.clone()));
        };
        if self.store.is_uploading(lesson_id).await {
            return Err(UploadError::AlreadyInFlight(lesson_id.clone()));
        }

        let request = CreateUploadRequest {
            lesson_title: context.lesson_title,
            section_id: context.section_id,
        };
        let target = match self.api.create_upload(&request).await {
            Ok(target) => target,
            Err(e) => {
                self.store.fail_upload(lesson_id, e.to_string()).await;
                return Err(UploadError::Target(e.to_string()));
            }
        };

        if !self.store.begin_upload(lesson_id, &target).await {
            // The lesson disappeared (or raced another upload) between the
            // checks above and here; give the target back, best-effort.
            if let Err(e) = self.api.cancel_upload(&target.upload_id).await {
                self.cleanup
                    .record(CleanupOp::CancelUpload, target.upload_id.clone(), e.to_string())
                    .await;
            }
            return Err(UploadError::AlreadyInFlight(lesson_id.clone()));
        }

        let token = CancellationToken::new();
        let handle = Arc::new(UploadHandle {
            lesson_id: lesson_id.clone(),
            token: token.clone(),
            cancelled: AtomicBool::new(false),
            api: Arc::clone(&self.api),
            store: self.store.clone(),
            cleanup: self.cleanup.clone(),
        });
        self.registry
            .register(lesson_id.clone(), handle.clone())
            .await;

        // Progress flows through a channel so transport implementations
        // stay free of store knowledge.
        let (progress_tx, mut progress_rx) = mpsc::unbounded_channel();
        {
            let store = self.store.clone();
            let lesson_id = lesson_id.clone();
            tokio::spawn(async move {
                while let Some(pct) = progress_rx.recv().await {
                    store.set_progress(&lesson_id, pct).await;
                }
            });
        }

        let transport = Arc::clone(&self.transport);
        let store = self.store.clone();
        let registry = self.registry.clone();
        let lesson_id = lesson_id.clone();
        let chunk_bytes = self.chunk_bytes;
        tokio::spawn(async move {
            let sent = transport
                .send_file(
                    &file.path,
                    &target.upload_url,
                    chunk_bytes,
                    progress_tx,
                    token.clone(),
                )
                .await;
            match sent {
                Ok(()) => {
                    // Local completion proves the stream finished, nothing
                    // else. The push channel decides readiness.
                    store.mark_processing(&lesson_id).await;
                }
                Err(e) if token.is_cancelled() => {
                    // The cancel path owns state from here.
                    debug!(lesson = %lesson_id, error = %e, "chunk stream aborted");
                }
                Err(e) => {
                    error!(lesson = %lesson_id, error = %e, "chunk stream failed");
                    store.fail_upload(&lesson_id, e.to_string()).await;
                    registry.discard(&lesson_id).await;
                }
            }
        });

        Ok(handle)
    }

    /// User-initiated abort, addressed by lesson. Safe to call repeatedly.
    pub async fn cancel(&self, lesson_id: &ContentId) -> bool {
        self.registry.invoke(lesson_id).await
    }
}

/// Cancel handle for one lesson's in-flight upload.
pub struct UploadHandle<V> {
    lesson_id: ContentId,
    token: CancellationToken,
    cancelled: AtomicBool,
    api: Arc<V>,
    store: CourseStore,
    cleanup: CleanupLog,
}

#[async_trait]
impl<V> CancelHandle for UploadHandle<V>
where
    V: VideoApi + 'static,
{
    async fn cancel(&self) {
        // Re-entrant guard: rapid duplicate calls collapse into one
        // effective cancellation.
        if self.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        self.token.cancel();

        // Remote cleanup is best-effort; local state converges regardless.
        if let Some(session) = self.store.take_upload(&self.lesson_id).await {
            if let Some(upload_id) = session.upload_id.as_deref() {
                if let Err(e) = self.api.cancel_upload(upload_id).await {
                    warn!(upload_id, error = %e, "upload cancellation did not reach the backend");
                    self.cleanup
                        .record(CleanupOp::CancelUpload, upload_id, e.to_string())
                        .await;
                }
            } else if let Some(video_id) = session.video_id.as_ref() {
                // The chunk stream already finished; only the unconfirmed
                // video record is left to discard.
                if let Err(e) = self.api.delete_video(video_id).await {
                    warn!(%video_id, error = %e, "orphaned video delete did not reach the backend");
                    self.cleanup
                        .record(CleanupOp::DeleteVideo, video_id.as_str(), e.to_string())
                        .await;
                }
            }
            self.store.clear_video(&self.lesson_id).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::course::{ContentType, Course, EncodeStatus, VideoContent};
    use crate::domain::events::{PushStatus, VideoStatusEvent};
    use crate::domain::upload::{UploadStatus, UploadTarget};
    use crate::ports::transport::MockChunkTransport;
    use crate::ports::video_api::MockVideoApi;
    use std::time::Duration;

    fn target(video_id: &str) -> UploadTarget {
        UploadTarget {
            upload_url: "https://upload.example/1".into(),
            upload_id: "up1".into(),
            video_id: ContentId::from(video_id),
            asset_id: None,
        }
    }

    async fn store_with_lesson() -> (CourseStore, ContentId) {
        let store = CourseStore::new(Course::new("C"));
        let section_id = store.add_section("S1").await;
        let lesson_id = store
            .add_lesson(&section_id, "L1", ContentType::Video)
            .await
            .unwrap();
        (store, lesson_id)
    }

    fn service(
        api: MockVideoApi,
        transport: MockChunkTransport,
        store: &CourseStore,
    ) -> UploadService<MockVideoApi, MockChunkTransport> {
        UploadService::new(
            Arc::new(api),
            Arc::new(transport),
            store.clone(),
            CancelRegistry::new(),
            CleanupLog::new(),
        )
    }

    async fn wait_for_status(store: &CourseStore, lesson_id: &ContentId, wanted: UploadStatus) {
        for _ in 0..200 {
            if store.upload_status(lesson_id).await == wanted {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("lesson never reached {wanted:?}");
    }

    #[tokio::test]
    async fn non_video_files_are_rejected_without_any_network_call() {
        let (store, lesson_id) = store_with_lesson().await;
        let mut api = MockVideoApi::new();
        api.expect_create_upload().times(0);
        api.expect_cancel_upload().times(0);
        api.expect_delete_video().times(0);
        let mut transport = MockChunkTransport::new();
        transport.expect_send_file().times(0);

        let service = service(api, transport, &store);
        let result = service
            .start_upload(&lesson_id, SourceFile::new("notes.txt", "text/plain"))
            .await;

        assert!(matches!(result, Err(UploadError::NotAVideo(_))));
        assert_eq!(store.upload_status(&lesson_id).await, UploadStatus::Error);
        let lesson = store.lesson_snapshot(&lesson_id).await.unwrap();
        assert_eq!(
            lesson.video.error.as_deref(),
            Some("text/plain is not a video file")
        );
    }

    #[tokio::test]
    async fn a_completed_stream_lands_on_processing_until_the_push_channel_confirms() {
        let (store, lesson_id) = store_with_lesson().await;
        let mut api = MockVideoApi::new();
        api.expect_create_upload()
            .times(1)
            .returning(|_| Ok(target("v1")));
        let mut transport = MockChunkTransport::new();
        transport
            .expect_send_file()
            .times(1)
            .returning(|_, _, _, progress, _| {
                let _ = progress.send(40);
                let _ = progress.send(100);
                Ok(())
            });

        let service = service(api, transport, &store);
        service
            .start_upload(&lesson_id, SourceFile::new("talk.mp4", "video/mp4"))
            .await
            .unwrap();

        wait_for_status(&store, &lesson_id, UploadStatus::Processing).await;
        let lesson = store.lesson_snapshot(&lesson_id).await.unwrap();
        assert_eq!(lesson.video.video_id, Some(ContentId::from("v1")));
        // Still not playable.
        assert_eq!(lesson.video.status, EncodeStatus::Processing);
        assert!(store.is_uploading(&lesson_id).await);

        // The push channel's verdict finalizes the lesson.
        store
            .apply_status_event(&VideoStatusEvent {
                video_id: ContentId::from("v1"),
                status: PushStatus::Ready,
                asset_id: None,
                playback_id: Some("abc".into()),
                content_url: None,
                duration: Some(50.0),
                error: None,
            })
            .await;
        assert_eq!(store.upload_status(&lesson_id).await, UploadStatus::Success);
        let lesson = store.lesson_snapshot(&lesson_id).await.unwrap();
        assert_eq!(lesson.video.playback_id.as_deref(), Some("abc"));
        assert!(store.uploading_lessons().await.is_empty());
    }

    #[tokio::test]
    async fn a_failed_stream_marks_the_lesson_errored() {
        let (store, lesson_id) = store_with_lesson().await;
        let mut api = MockVideoApi::new();
        api.expect_create_upload()
            .times(1)
            .returning(|_| Ok(target("v1")));
        let mut transport = MockChunkTransport::new();
        transport
            .expect_send_file()
            .times(1)
            .returning(|_, _, _, _, _| {
                Err(Box::new(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "connection reset",
                )) as _)
            });

        let service = service(api, transport, &store);
        service
            .start_upload(&lesson_id, SourceFile::new("talk.mp4", "video/mp4"))
            .await
            .unwrap();

        wait_for_status(&store, &lesson_id, UploadStatus::Error).await;
        let lesson = store.lesson_snapshot(&lesson_id).await.unwrap();
        assert_eq!(lesson.video.error.as_deref(), Some("connection reset"));
        assert!(!store.is_uploading(&lesson_id).await);
    }

    #[tokio::test]
    async fn a_second_start_while_in_flight_is_rejected() {
        let (store, lesson_id) = store_with_lesson().await;
        let mut api = MockVideoApi::new();
        api.expect_create_upload()
            .times(1)
            .returning(|_| Ok(target("v1")));
        let mut transport = MockChunkTransport::new();
        transport
            .expect_send_file()
            .times(1)
            .returning(|_, _, _, _, _| Ok(()));

        let service = service(api, transport, &store);
        service
            .start_upload(&lesson_id, SourceFile::new("talk.mp4", "video/mp4"))
            .await
            .unwrap();

        let second = service
            .start_upload(&lesson_id, SourceFile::new("talk.mp4", "video/mp4"))
            .await;
        assert!(matches!(second, Err(UploadError::AlreadyInFlight(_))));
    }

    #[tokio::test]
    async fn rapid_duplicate_cancels_send_exactly_one_remote_cancellation() {
        let (store, lesson_id) = store_with_lesson().await;
        assert!(store.begin_upload(&lesson_id, &target("v1")).await);

        let mut api = MockVideoApi::new();
        api.expect_cancel_upload()
            .times(1)
            .returning(|_| Ok(()));
        api.expect_delete_video().times(0);

        let handle = UploadHandle {
            lesson_id: lesson_id.clone(),
            token: CancellationToken::new(),
            cancelled: AtomicBool::new(false),
            api: Arc::new(api),
            store: store.clone(),
            cleanup: CleanupLog::new(),
        };

        tokio::join!(handle.cancel(), handle.cancel());

        assert_eq!(store.upload_status(&lesson_id).await, UploadStatus::Idle);
        let lesson = store.lesson_snapshot(&lesson_id).await.unwrap();
        assert_eq!(lesson.video, VideoContent::default());
        assert!(!store.is_uploading(&lesson_id).await);
    }

    #[tokio::test]
    async fn cancel_after_local_completion_deletes_the_video_record_instead() {
        let (store, lesson_id) = store_with_lesson().await;
        assert!(store.begin_upload(&lesson_id, &target("v1")).await);
        store.mark_processing(&lesson_id).await;

        let mut api = MockVideoApi::new();
        api.expect_cancel_upload().times(0);
        api.expect_delete_video()
            .times(1)
            .withf(|video_id| video_id == &ContentId::from("v1"))
            .returning(|_| Ok(()));

        let handle = UploadHandle {
            lesson_id: lesson_id.clone(),
            token: CancellationToken::new(),
            cancelled: AtomicBool::new(false),
            api: Arc::new(api),
            store: store.clone(),
            cleanup: CleanupLog::new(),
        };
        handle.cancel().await;

        assert_eq!(store.upload_status(&lesson_id).await, UploadStatus::Idle);
    }

    #[tokio::test]
    async fn failed_remote_cleanup_is_dead_lettered_and_state_still_converges() {
        let (store, lesson_id) = store_with_lesson().await;
        assert!(store.begin_upload(&lesson_id, &target("v1")).await);

        let mut api = MockVideoApi::new();
        api.expect_cancel_upload()
            .times(1)
            .returning(|_| {
                Err(Box::new(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "gateway timeout",
                )) as _)
            });

        let cleanup = CleanupLog::new();
        let handle = UploadHandle {
            lesson_id: lesson_id.clone(),
            token: CancellationToken::new(),
            cancelled: AtomicBool::new(false),
            api: Arc::new(api),
            store: store.clone(),
            cleanup: cleanup.clone(),
        };
        handle.cancel().await;

        // Local convergence first, observability second.
        assert_eq!(store.upload_status(&lesson_id).await, UploadStatus::Idle);
        let entries = cleanup.drain().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].op, CleanupOp::CancelUpload);
        assert_eq!(entries[0].id, "up1");
    }

    #[test]
    fn mime_types_are_guessed_from_extensions() {
        assert_eq!(SourceFile::from_path("a/talk.MP4").content_type, "video/mp4");
        assert_eq!(SourceFile::from_path("clip.webm").content_type, "video/webm");
        assert_eq!(
            SourceFile::from_path("slides.pdf").content_type,
            "application/octet-stream"
        );
        assert_eq!(
            SourceFile::from_path("no_extension").content_type,
            "application/octet-stream"
        );
    }
}
