//! Ports - Trait seams to every external service.

pub mod course_api;
pub mod material_api;
pub mod quiz_api;
pub mod token;
pub mod transport;
pub mod video_api;
