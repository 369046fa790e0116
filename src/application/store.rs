//! In-memory course aggregate and upload bookkeeping.
//!
//! The store is the single source of truth the rest of the process reads.
//! Everything mutates by identifier (lesson id, then section id), never by
//! array position: upload completions and push events interleave freely
//! with user edits, so positions mean nothing by the time a callback runs.

use crate::domain::course::{
    ContentType, Course, EncodeStatus, Lesson, MaterialContent, MaterialUpload, QuizContent,
    Section, VideoContent,
};
use crate::domain::events::{PushStatus, VideoStatusEvent};
use crate::domain::ids::ContentId;
use crate::domain::quiz::QuizQuestion;
use crate::domain::upload::{UploadSession, UploadStatus, UploadTarget};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

#[derive(Debug)]
struct State {
    course: Course,
    /// lesson id -> open upload session
    sessions: HashMap<ContentId, UploadSession>,
    /// lessons with work in flight (uploading or processing)
    uploading: HashSet<ContentId>,
}

/// Title and owning section of a lesson, for upload-target requests.
#[derive(Debug, Clone)]
pub struct LessonContext {
    pub section_id: ContentId,
    pub lesson_title: String,
    pub content_type: ContentType,
}

#[derive(Clone)]
pub struct CourseStore {
    state: Arc<Mutex<State>>,
}

impl CourseStore {
    pub fn new(course: Course) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                course,
                sessions: HashMap::new(),
                uploading: HashSet::new(),
            })),
        }
    }

    /// Clone of the aggregate for rendering or saving.
    pub async fn snapshot(&self) -> Course {
        self.state.lock().await.course.clone()
    }

    /// Replace the aggregate wholesale, e.g. after a save returned the
    /// persisted ids. Upload bookkeeping is untouched.
    pub async fn replace(&self, course: Course) {
        self.state.lock().await.course = course;
    }

    pub async fn add_section(&self, title: &str) -> ContentId {
        let mut state = self.state.lock().await;
        let section = Section::new(title);
        let id = section.id.clone();
        state.course.sections.push(section);
        id
    }

    pub async fn remove_section(&self, section_id: &ContentId) -> bool {
        let mut state = self.state.lock().await;
        let Some(index) = state
            .course
            .sections
            .iter()
            .position(|s| &s.id == section_id)
        else {
            return false;
        };
        let section = state.course.sections.remove(index);
        for lesson in &section.lessons {
            state.sessions.remove(&lesson.id);
            state.uploading.remove(&lesson.id);
        }
        true
    }

    pub async fn add_lesson(
        &self,
        section_id: &ContentId,
        title: &str,
        content_type: ContentType,
    ) -> Option<ContentId> {
        let mut state = self.state.lock().await;
        let section = state.course.section_mut(section_id)?;
        let lesson = Lesson::new(title, content_type);
        let id = lesson.id.clone();
        section.lessons.push(lesson);
        Some(id)
    }

    pub async fn rename_lesson(&self, lesson_id: &ContentId, title: &str) -> bool {
        let mut state = self.state.lock().await;
        match state.course.lesson_mut(lesson_id) {
            Some(lesson) => {
                lesson.title = title.to_string();
                true
            }
            None => false,
        }
    }

    pub async fn remove_lesson(&self, lesson_id: &ContentId) -> bool {
        let mut state = self.state.lock().await;
        state.sessions.remove(lesson_id);
        state.uploading.remove(lesson_id);
        for section in &mut state.course.sections {
            if let Some(index) = section.lessons.iter().position(|l| &l.id == lesson_id) {
                section.lessons.remove(index);
                return true;
            }
        }
        false
    }

    pub async fn lesson_snapshot(&self, lesson_id: &ContentId) -> Option<Lesson> {
        self.state.lock().await.course.lesson(lesson_id).cloned()
    }

    pub async fn lesson_context(&self, lesson_id: &ContentId) -> Option<LessonContext> {
        let state = self.state.lock().await;
        for section in &state.course.sections {
            if let Some(lesson) = section.lessons.iter().find(|l| &l.id == lesson_id) {
                return Some(LessonContext {
                    section_id: section.id.clone(),
                    lesson_title: lesson.title.clone(),
                    content_type: lesson.content_type,
                });
            }
        }
        None
    }

    // --- upload lifecycle ---

    /// Records the provisional video identity on the lesson and opens the
    /// session. Returns false when the lesson is unknown or already has an
    /// upload in flight.
    pub async fn begin_upload(&self, lesson_id: &ContentId, target: &UploadTarget) -> bool {
        let mut state = self.state.lock().await;
        if state.uploading.contains(lesson_id) {
            return false;
        }
        let state = &mut *state;
        let Some(lesson) = state.course.lesson_mut(lesson_id) else {
            return false;
        };
        lesson.video = VideoContent {
            video_id: Some(target.video_id.clone()),
            asset_id: target.asset_id.clone(),
            ..VideoContent::default()
        };
        state
            .sessions
            .insert(lesson_id.clone(), UploadSession::started(target));
        state.uploading.insert(lesson_id.clone());
        true
    }

    /// Latest chunk progress. Values are displayed as delivered, not
    /// checked for monotonicity.
    pub async fn set_progress(&self, lesson_id: &ContentId, pct: u8) {
        let mut state = self.state.lock().await;
        if let Some(session) = state.sessions.get_mut(lesson_id) {
            if session.status == UploadStatus::Uploading {
                session.progress = pct.min(100);
            }
        }
    }

    pub async fn progress(&self, lesson_id: &ContentId) -> Option<u8> {
        self.state
            .lock()
            .await
            .sessions
            .get(lesson_id)
            .map(|s| s.progress)
    }

    /// Local chunk-stream completion: processing has started, nothing
    /// more. The upload id is spent; from here only the video record is
    /// addressable for cleanup.
    pub async fn mark_processing(&self, lesson_id: &ContentId) {
        let mut state = self.state.lock().await;
        let state = &mut *state;
        if let Some(session) = state.sessions.get_mut(lesson_id) {
            session.status = UploadStatus::Processing;
            session.upload_id = None;
        }
        if let Some(lesson) = state.course.lesson_mut(lesson_id) {
            lesson.video.status = EncodeStatus::Processing;
        }
    }

    /// Terminal local failure: the session closes, the lesson keeps an
    /// error status and message.
    pub async fn fail_upload(&self, lesson_id: &ContentId, message: impl Into<String>) {
        let mut state = self.state.lock().await;
        let state = &mut *state;
        state.sessions.remove(lesson_id);
        state.uploading.remove(lesson_id);
        if let Some(lesson) = state.course.lesson_mut(lesson_id) {
            lesson.video.status = EncodeStatus::Error;
            lesson.video.error = Some(message.into());
        }
    }

    /// Removes and returns the open session, if any. The cancel path uses
    /// this to decide which remote cleanup call is still meaningful.
    pub async fn take_upload(&self, lesson_id: &ContentId) -> Option<UploadSession> {
        self.state.lock().await.sessions.remove(lesson_id)
    }

    /// Clears every video field and closes the upload, leaving the lesson
    /// back at idle.
    pub async fn clear_video(&self, lesson_id: &ContentId) {
        let mut state = self.state.lock().await;
        let state = &mut *state;
        state.sessions.remove(lesson_id);
        state.uploading.remove(lesson_id);
        if let Some(lesson) = state.course.lesson_mut(lesson_id) {
            lesson.video = VideoContent::default();
        }
    }

    pub async fn is_uploading(&self, lesson_id: &ContentId) -> bool {
        self.state.lock().await.uploading.contains(lesson_id)
    }

    pub async fn uploading_lessons(&self) -> HashSet<ContentId> {
        self.state.lock().await.uploading.clone()
    }

    /// Session status while one is open, otherwise derived from the
    /// lesson: a ready video reads as success, a failed one as error.
    pub async fn upload_status(&self, lesson_id: &ContentId) -> UploadStatus {
        let state = self.state.lock().await;
        if let Some(session) = state.sessions.get(lesson_id) {
            return session.status;
        }
        match state.course.lesson(lesson_id).map(|l| l.video.status) {
            Some(EncodeStatus::Ready) => UploadStatus::Success,
            Some(EncodeStatus::Error) => UploadStatus::Error,
            _ => UploadStatus::Idle,
        }
    }

    // --- content edits ---

    /// Drops every payload and declares the new content type. Any open
    /// upload for the lesson is forgotten locally; remote cleanup is the
    /// caller's job.
    pub async fn reset_content(&self, lesson_id: &ContentId, new_type: ContentType) -> bool {
        let mut state = self.state.lock().await;
        let state = &mut *state;
        state.sessions.remove(lesson_id);
        state.uploading.remove(lesson_id);
        match state.course.lesson_mut(lesson_id) {
            Some(lesson) => {
                lesson.clear_payloads();
                lesson.content_type = new_type;
                true
            }
            None => false,
        }
    }

    pub async fn set_material(&self, lesson_id: &ContentId, upload: &MaterialUpload) -> bool {
        let mut state = self.state.lock().await;
        match state.course.lesson_mut(lesson_id) {
            Some(lesson) => {
                lesson.material = MaterialContent {
                    material_id: Some(upload.material_id.clone()),
                    file_url: Some(upload.file_url.clone()),
                    file_name: Some(upload.file_name.clone()),
                };
                true
            }
            None => false,
        }
    }

    pub async fn set_quiz(
        &self,
        lesson_id: &ContentId,
        quiz_id: ContentId,
        questions: Vec<QuizQuestion>,
    ) -> bool {
        let mut state = self.state.lock().await;
        match state.course.lesson_mut(lesson_id) {
            Some(lesson) => {
                lesson.quiz = QuizContent {
                    quiz_id: Some(quiz_id),
                    questions,
                };
                true
            }
            None => false,
        }
    }

    // --- push events ---

    /// Applies one push event, keyed strictly by the normalized video id.
    /// Events for videos no lesson is tracking are dropped.
    pub async fn apply_status_event(&self, event: &VideoStatusEvent) {
        let mut state = self.state.lock().await;
        let state = &mut *state;
        let Some(lesson) = state.course.lesson_by_video_mut(&event.video_id) else {
            debug!(video_id = %event.video_id, "push event for unknown video, ignored");
            return;
        };
        let lesson_id = lesson.id.clone();
        match event.status {
            PushStatus::Processing => {
                lesson.video.status = EncodeStatus::Processing;
                if let Some(session) = state.sessions.get_mut(&lesson_id) {
                    session.status = UploadStatus::Processing;
                }
            }
            PushStatus::Ready => {
                lesson.video.status = EncodeStatus::Ready;
                lesson.video.error = None;
                if event.asset_id.is_some() {
                    lesson.video.asset_id = event.asset_id.clone();
                }
                lesson.video.playback_id = event.playback_id.clone();
                lesson.video.content_url = event.content_url.clone();
                lesson.video.duration = event.duration;
                state.sessions.remove(&lesson_id);
                state.uploading.remove(&lesson_id);
            }
            PushStatus::Error => {
                lesson.video.status = EncodeStatus::Error;
                lesson.video.error = Some(
                    event
                        .error
                        .clone()
                        .unwrap_or_else(|| String::from("video processing failed")),
                );
                state.sessions.remove(&lesson_id);
                state.uploading.remove(&lesson_id);
            }
            PushStatus::Cancelled => {
                lesson.video = VideoContent::default();
                state.sessions.remove(&lesson_id);
                state.uploading.remove(&lesson_id);
            }
            PushStatus::Unknown => {
                warn!(video_id = %event.video_id, "push event with unrecognized status, ignored");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(video_id: &str) -> UploadTarget {
        UploadTarget {
            upload_url: "https://upload.example/1".into(),
            upload_id: "up1".into(),
            video_id: ContentId::from(video_id),
            asset_id: Some(ContentId::from("asset1")),
        }
    }

    fn event(video_id: &str, status: PushStatus) -> VideoStatusEvent {
        VideoStatusEvent {
            video_id: ContentId::from(video_id),
            status,
            asset_id: None,
            playback_id: None,
            content_url: None,
            duration: None,
            error: None,
        }
    }

    async fn video_lesson(store: &CourseStore) -> ContentId {
        let section_id = store.add_section("S1").await;
        store
            .add_lesson(&section_id, "L1", ContentType::Video)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn begin_upload_opens_exactly_one_session() {
        let store = CourseStore::new(Course::new("C"));
        let lesson_id = video_lesson(&store).await;

        assert!(store.begin_upload(&lesson_id, &target("v1")).await);
        assert!(!store.begin_upload(&lesson_id, &target("v2")).await);

        assert_eq!(store.upload_status(&lesson_id).await, UploadStatus::Uploading);
        let lesson = store.lesson_snapshot(&lesson_id).await.unwrap();
        assert_eq!(lesson.video.video_id, Some(ContentId::from("v1")));
    }

    #[tokio::test]
    async fn mark_processing_spends_the_upload_id() {
        let store = CourseStore::new(Course::new("C"));
        let lesson_id = video_lesson(&store).await;
        store.begin_upload(&lesson_id, &target("v1")).await;

        store.set_progress(&lesson_id, 100).await;
        store.mark_processing(&lesson_id).await;

        let session = store.take_upload(&lesson_id).await.unwrap();
        assert_eq!(session.status, UploadStatus::Processing);
        assert_eq!(session.upload_id, None);
        assert_eq!(session.video_id, Some(ContentId::from("v1")));
    }

    #[tokio::test]
    async fn a_ready_event_finalizes_the_lesson_and_closes_the_session() {
        let store = CourseStore::new(Course::new("C"));
        let lesson_id = video_lesson(&store).await;
        store.begin_upload(&lesson_id, &target("v1")).await;
        store.mark_processing(&lesson_id).await;

        let mut ready = event("v1", PushStatus::Ready);
        ready.playback_id = Some("abc".into());
        ready.duration = Some(30.0);
        store.apply_status_event(&ready).await;

        let lesson = store.lesson_snapshot(&lesson_id).await.unwrap();
        assert_eq!(lesson.video.status, EncodeStatus::Ready);
        assert_eq!(lesson.video.playback_id.as_deref(), Some("abc"));
        assert_eq!(store.upload_status(&lesson_id).await, UploadStatus::Success);
        assert!(store.uploading_lessons().await.is_empty());
        assert_eq!(store.take_upload(&lesson_id).await, None);
    }

    #[tokio::test]
    async fn an_error_event_keeps_the_backend_message() {
        let store = CourseStore::new(Course::new("C"));
        let lesson_id = video_lesson(&store).await;
        store.begin_upload(&lesson_id, &target("v1")).await;

        let mut failed = event("v1", PushStatus::Error);
        failed.error = Some("encode blew up".into());
        store.apply_status_event(&failed).await;

        let lesson = store.lesson_snapshot(&lesson_id).await.unwrap();
        assert_eq!(lesson.video.status, EncodeStatus::Error);
        assert_eq!(lesson.video.error.as_deref(), Some("encode blew up"));
        assert_eq!(store.upload_status(&lesson_id).await, UploadStatus::Error);
        assert!(!store.is_uploading(&lesson_id).await);
    }

    #[tokio::test]
    async fn a_cancelled_event_returns_the_lesson_to_idle() {
        let store = CourseStore::new(Course::new("C"));
        let lesson_id = video_lesson(&store).await;
        store.begin_upload(&lesson_id, &target("v1")).await;

        store
            .apply_status_event(&event("v1", PushStatus::Cancelled))
            .await;

        let lesson = store.lesson_snapshot(&lesson_id).await.unwrap();
        assert_eq!(lesson.video, VideoContent::default());
        assert_eq!(store.upload_status(&lesson_id).await, UploadStatus::Idle);
    }

    #[tokio::test]
    async fn unknown_video_ids_and_unknown_statuses_mutate_nothing() {
        let store = CourseStore::new(Course::new("C"));
        let lesson_id = video_lesson(&store).await;
        store.begin_upload(&lesson_id, &target("v1")).await;

        store
            .apply_status_event(&event("other", PushStatus::Ready))
            .await;
        store
            .apply_status_event(&event("v1", PushStatus::Unknown))
            .await;

        assert_eq!(store.upload_status(&lesson_id).await, UploadStatus::Uploading);
        assert!(store.is_uploading(&lesson_id).await);
    }

    #[tokio::test]
    async fn events_keep_finding_their_lesson_across_edits() {
        // A rename while the upload is in flight must not detach the
        // completion from the lesson: routing goes by id, not position.
        let store = CourseStore::new(Course::new("C"));
        let section_id = store.add_section("S1").await;
        let first = store
            .add_lesson(&section_id, "first", ContentType::Video)
            .await
            .unwrap();
        let second = store
            .add_lesson(&section_id, "second", ContentType::Video)
            .await
            .unwrap();

        store.begin_upload(&second, &target("v2")).await;
        store.remove_lesson(&first).await;
        store.rename_lesson(&second, "renamed").await;

        store.apply_status_event(&event("v2", PushStatus::Ready)).await;

        let lesson = store.lesson_snapshot(&second).await.unwrap();
        assert_eq!(lesson.title, "renamed");
        assert_eq!(lesson.video.status, EncodeStatus::Ready);
    }

    #[tokio::test]
    async fn progress_is_only_tracked_while_uploading() {
        let store = CourseStore::new(Course::new("C"));
        let lesson_id = video_lesson(&store).await;
        store.begin_upload(&lesson_id, &target("v1")).await;

        store.set_progress(&lesson_id, 40).await;
        assert_eq!(store.progress(&lesson_id).await, Some(40));

        store.mark_processing(&lesson_id).await;
        store.set_progress(&lesson_id, 90).await;
        assert_eq!(store.progress(&lesson_id).await, Some(40));
    }

    #[tokio::test]
    async fn reset_content_clears_payloads_and_bookkeeping() {
        let store = CourseStore::new(Course::new("C"));
        let lesson_id = video_lesson(&store).await;
        store.begin_upload(&lesson_id, &target("v1")).await;

        assert!(store.reset_content(&lesson_id, ContentType::Material).await);

        let lesson = store.lesson_snapshot(&lesson_id).await.unwrap();
        assert_eq!(lesson.content_type, ContentType::Material);
        assert_eq!(lesson.video, VideoContent::default());
        assert!(!store.is_uploading(&lesson_id).await);
    }
}
