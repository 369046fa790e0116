//! Lectern - Course Studio Client Core
//!
//! Headless client engine for an online-course studio: the lesson/section
//! aggregate, the video-upload lifecycle, and the push-status plumbing that
//! keeps both in sync with the backend.
//!
//! Hexagonal Architecture:
//! - domain/: Pure course and upload state (lessons, quizzes, push events)
//! - ports/: Trait definitions for the external services
//! - adapters/: Concrete implementations (HTTP backend, chunk transport, push channel)
//! - application/: Generic services that use ports
//! - config: Environment configuration

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports for convenience
pub use adapters::push::hub::StatusHub;
pub use application::cancel::CancelRegistry;
pub use application::cleanup::CleanupLog;
pub use application::store::CourseStore;
pub use application::uploader::{SourceFile, UploadService};
pub use config::StudioConfig;
