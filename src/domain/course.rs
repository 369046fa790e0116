//! Course aggregate: sections, lessons, and their content payloads.

use super::ids::ContentId;
use super::quiz::QuizQuestion;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a lesson holds. Exactly one payload is meaningful at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Video,
    Material,
    Quiz,
}

/// Encoding state of a lesson's video as reported by the push channel.
/// `Ready` is only ever set from a push event - local chunk-stream
/// completion proves that processing started, not that it succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodeStatus {
    #[default]
    None,
    Processing,
    Ready,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoContent {
    pub video_id: Option<ContentId>,
    pub asset_id: Option<ContentId>,
    pub playback_id: Option<String>,
    pub content_url: Option<String>,
    pub duration: Option<f64>,
    #[serde(default)]
    pub status: EncodeStatus,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialContent {
    pub material_id: Option<ContentId>,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizContent {
    pub quiz_id: Option<ContentId>,
    #[serde(default)]
    pub questions: Vec<QuizQuestion>,
}

/// Response of the material upload endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialUpload {
    pub material_id: ContentId,
    pub file_url: String,
    pub file_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: ContentId,
    pub title: String,
    pub content_type: ContentType,
    #[serde(default)]
    pub video: VideoContent,
    #[serde(default)]
    pub material: MaterialContent,
    #[serde(default)]
    pub quiz: QuizContent,
}

impl Lesson {
    /// New lesson with a client-generated id. The backend replaces the id
    /// when the course draft is saved.
    pub fn new(title: &str, content_type: ContentType) -> Self {
        Self {
            id: ContentId::new(Uuid::new_v4().to_string()),
            title: title.to_string(),
            content_type,
            video: VideoContent::default(),
            material: MaterialContent::default(),
            quiz: QuizContent::default(),
        }
    }

    /// Drops every type-specific payload. Used when the declared content
    /// type changes, so a lesson never carries fields of two types at once.
    pub fn clear_payloads(&mut self) {
        self.video = VideoContent::default();
        self.material = MaterialContent::default();
        self.quiz = QuizContent::default();
    }

    /// Backend identity of the current payload, if the content was ever
    /// persisted. This is what must be deleted remotely before the payload
    /// can be dropped.
    pub fn persisted_content_id(&self) -> Option<(ContentType, ContentId)> {
        match self.content_type {
            ContentType::Video => self
                .video
                .video_id
                .clone()
                .map(|id| (ContentType::Video, id)),
            ContentType::Material => self
                .material
                .material_id
                .clone()
                .map(|id| (ContentType::Material, id)),
            ContentType::Quiz => self.quiz.quiz_id.clone().map(|id| (ContentType::Quiz, id)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: ContentId,
    pub title: String,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

impl Section {
    pub fn new(title: &str) -> Self {
        Self {
            id: ContentId::new(Uuid::new_v4().to_string()),
            title: title.to_string(),
            lessons: Vec::new(),
        }
    }
}

/// Aggregate root. Section and lesson order is display order only - all
/// lookups go by identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: ContentId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl Course {
    pub fn new(title: &str) -> Self {
        Self {
            id: ContentId::new(Uuid::new_v4().to_string()),
            title: title.to_string(),
            description: String::new(),
            category: None,
            price: 0.0,
            sections: Vec::new(),
        }
    }

    pub fn section_mut(&mut self, section_id: &ContentId) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| &s.id == section_id)
    }

    pub fn lesson(&self, lesson_id: &ContentId) -> Option<&Lesson> {
        self.sections
            .iter()
            .flat_map(|s| s.lessons.iter())
            .find(|l| &l.id == lesson_id)
    }

    pub fn lesson_mut(&mut self, lesson_id: &ContentId) -> Option<&mut Lesson> {
        self.sections
            .iter_mut()
            .flat_map(|s| s.lessons.iter_mut())
            .find(|l| &l.id == lesson_id)
    }

    /// Lesson currently holding the given provisional video identity.
    pub fn lesson_by_video_mut(&mut self, video_id: &ContentId) -> Option<&mut Lesson> {
        self.sections
            .iter_mut()
            .flat_map(|s| s.lessons.iter_mut())
            .find(|l| l.video.video_id.as_ref() == Some(video_id))
    }
}
